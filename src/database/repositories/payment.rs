use anyhow::Result;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{Adjustment, Payment, PaymentInput, SettledLine};

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_payment(&self, business_id: Uuid, input: PaymentInput) -> Result<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (business_id, employee_id, date, amount, hours, deduction_ccss,
                                  net_amount, start_date, end_date, logs_detail, is_imported)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(input.employee_id)
        .bind(input.date)
        .bind(input.amount)
        .bind(input.hours)
        .bind(input.deduction_ccss)
        .bind(input.net_amount)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(Json(input.logs_detail))
        .bind(input.is_imported)
        .fetch_one(&self.pool)
        .await?;

        Ok(payment)
    }

    pub async fn create_payment_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        input: PaymentInput,
    ) -> Result<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (business_id, employee_id, date, amount, hours, deduction_ccss,
                                  net_amount, start_date, end_date, logs_detail, is_imported)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(input.employee_id)
        .bind(input.date)
        .bind(input.amount)
        .bind(input.hours)
        .bind(input.deduction_ccss)
        .bind(input.net_amount)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(Json(input.logs_detail))
        .bind(input.is_imported)
        .fetch_one(&mut **tx)
        .await?;

        Ok(payment)
    }

    pub async fn get_payment(&self, business_id: Uuid, id: Uuid) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE id = $1 AND business_id = $2",
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    pub async fn list_payments(&self, business_id: Uuid) -> Result<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE business_id = $1 ORDER BY date DESC",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Single atomic rewrite of a payment's derived state after an
    /// edit-after-settlement: the mutated snapshot and the totals recomputed
    /// from it land together.
    pub async fn update_totals_and_detail(
        &self,
        business_id: Uuid,
        id: Uuid,
        hours: f64,
        amount: f64,
        net_amount: f64,
        logs_detail: Vec<SettledLine>,
    ) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET hours = $1, amount = $2, net_amount = $3, logs_detail = $4
            WHERE id = $5 AND business_id = $6
            RETURNING *
            "#,
        )
        .bind(hours)
        .bind(amount)
        .bind(net_amount)
        .bind(Json(logs_detail))
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    /// Manual total override; the appended adjustment record and the new
    /// amounts are written in one statement.
    pub async fn apply_adjustment(
        &self,
        business_id: Uuid,
        id: Uuid,
        amount: f64,
        net_amount: f64,
        adjustments: Vec<Adjustment>,
    ) -> Result<Option<Payment>> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET amount = $1, net_amount = $2, adjustments = $3
            WHERE id = $4 AND business_id = $5
            RETURNING *
            "#,
        )
        .bind(amount)
        .bind(net_amount)
        .bind(Json(adjustments))
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    pub async fn delete_payment(&self, business_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1 AND business_id = $2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
