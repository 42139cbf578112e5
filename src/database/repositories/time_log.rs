use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{LocationStamp, LogSource, TimeLog};

/// Row-level write fields; `hours` arrives pre-derived from the calculator.
#[derive(Debug, Clone)]
pub struct NewTimeLog {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub is_double_day: bool,
    pub deduction_hours: f64,
    pub hours: f64,
    pub source: LogSource,
    pub location: Option<LocationStamp>,
    pub photo_url: Option<String>,
}

#[derive(Clone)]
pub struct TimeLogRepository {
    pool: PgPool,
}

impl TimeLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_log(&self, business_id: Uuid, log: NewTimeLog) -> Result<TimeLog> {
        let row = sqlx::query_as::<_, TimeLog>(
            r#"
            INSERT INTO time_logs (business_id, employee_id, date, time_in, time_out,
                                   is_double_day, deduction_hours, hours, source, location, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(log.employee_id)
        .bind(log.date)
        .bind(log.time_in)
        .bind(log.time_out)
        .bind(log.is_double_day)
        .bind(log.deduction_hours)
        .bind(log.hours)
        .bind(log.source)
        .bind(log.location.map(Json))
        .bind(log.photo_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create_log_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        log: NewTimeLog,
    ) -> Result<TimeLog> {
        let row = sqlx::query_as::<_, TimeLog>(
            r#"
            INSERT INTO time_logs (business_id, employee_id, date, time_in, time_out,
                                   is_double_day, deduction_hours, hours, source, location, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(log.employee_id)
        .bind(log.date)
        .bind(log.time_in)
        .bind(log.time_out)
        .bind(log.is_double_day)
        .bind(log.deduction_hours)
        .bind(log.hours)
        .bind(log.source)
        .bind(log.location.map(Json))
        .bind(log.photo_url)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }

    pub async fn get_log(&self, business_id: Uuid, id: Uuid) -> Result<Option<TimeLog>> {
        let row = sqlx::query_as::<_, TimeLog>(
            "SELECT * FROM time_logs WHERE id = $1 AND business_id = $2",
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_logs(&self, business_id: Uuid) -> Result<Vec<TimeLog>> {
        let rows = sqlx::query_as::<_, TimeLog>(
            "SELECT * FROM time_logs WHERE business_id = $1 ORDER BY date DESC",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// The aggregation snapshot: every unpaid log in the tenant. Logs arriving
    /// after this read are simply picked up by the next pass.
    pub async fn list_unpaid(&self, business_id: Uuid) -> Result<Vec<TimeLog>> {
        let rows = sqlx::query_as::<_, TimeLog>(
            "SELECT * FROM time_logs WHERE business_id = $1 AND is_paid = false ORDER BY date ASC",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_entry(
        &self,
        business_id: Uuid,
        id: Uuid,
        date: NaiveDate,
        time_in: Option<NaiveTime>,
        time_out: Option<NaiveTime>,
        is_double_day: bool,
        deduction_hours: f64,
        hours: f64,
    ) -> Result<Option<TimeLog>> {
        let row = sqlx::query_as::<_, TimeLog>(
            r#"
            UPDATE time_logs
            SET date = $1, time_in = $2, time_out = $3, is_double_day = $4,
                deduction_hours = $5, hours = $6
            WHERE id = $7 AND business_id = $8
            RETURNING *
            "#,
        )
        .bind(date)
        .bind(time_in)
        .bind(time_out)
        .bind(is_double_day)
        .bind(deduction_hours)
        .bind(hours)
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_log(&self, business_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM time_logs WHERE id = $1 AND business_id = $2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_logs_for_employee(&self, business_id: Uuid, employee_id: Uuid) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM time_logs WHERE employee_id = $1 AND business_id = $2")
                .bind(employee_id)
                .bind(business_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Settlement-path deletion: retires a set of consumed logs inside the
    /// caller's transaction and reports how many rows actually went away.
    pub async fn delete_logs_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        ids: &[Uuid],
    ) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM time_logs WHERE business_id = $1 AND id = ANY($2)")
                .bind(business_id)
                .bind(ids)
                .execute(&mut **tx)
                .await?;

        Ok(result.rows_affected())
    }
}
