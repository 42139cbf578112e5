use anyhow::Result;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::{
    DEFAULT_OVERTIME_MULTIPLIER, DEFAULT_OVERTIME_THRESHOLD, Employee, EmployeeInput,
    EmployeeStatus,
};

#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_employee(
        &self,
        business_id: Uuid,
        input: EmployeeInput,
    ) -> Result<Employee> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (business_id, name, cedula, phone, pin, position, hourly_rate,
                                   status, apply_ccss, overtime_threshold, overtime_multiplier,
                                   enable_overtime, start_date, end_date, salary_history)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(input.name)
        .bind(input.cedula)
        .bind(input.phone)
        .bind(input.pin)
        .bind(input.position)
        .bind(input.hourly_rate)
        .bind(input.status.unwrap_or_default())
        .bind(input.apply_ccss.unwrap_or(false))
        .bind(input.overtime_threshold.unwrap_or(DEFAULT_OVERTIME_THRESHOLD))
        .bind(input.overtime_multiplier.unwrap_or(DEFAULT_OVERTIME_MULTIPLIER))
        .bind(input.enable_overtime.unwrap_or(true))
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(Json(input.salary_history.unwrap_or_default()))
        .fetch_one(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn get_employee(&self, business_id: Uuid, id: Uuid) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE id = $1 AND business_id = $2",
        )
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn list_employees(&self, business_id: Uuid) -> Result<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE business_id = $1 ORDER BY name ASC",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    pub async fn list_by_status(
        &self,
        business_id: Uuid,
        status: EmployeeStatus,
    ) -> Result<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE business_id = $1 AND status = $2 ORDER BY name ASC",
        )
        .bind(business_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    /// Kiosk marker login: an active employee by PIN, across the tenant.
    pub async fn find_active_by_pin(
        &self,
        business_id: Uuid,
        pin: &str,
    ) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE business_id = $1 AND pin = $2 AND status = $3",
        )
        .bind(business_id)
        .bind(pin)
        .bind(EmployeeStatus::Active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn update_employee(
        &self,
        business_id: Uuid,
        id: Uuid,
        input: EmployeeInput,
    ) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET name = $1, cedula = $2, phone = $3, pin = $4, position = $5, hourly_rate = $6,
                status = $7, apply_ccss = $8, overtime_threshold = $9, overtime_multiplier = $10,
                enable_overtime = $11, start_date = $12, end_date = $13, salary_history = $14,
                updated_at = now()
            WHERE id = $15 AND business_id = $16
            RETURNING *
            "#,
        )
        .bind(input.name)
        .bind(input.cedula)
        .bind(input.phone)
        .bind(input.pin)
        .bind(input.position)
        .bind(input.hourly_rate)
        .bind(input.status.unwrap_or_default())
        .bind(input.apply_ccss.unwrap_or(false))
        .bind(input.overtime_threshold.unwrap_or(DEFAULT_OVERTIME_THRESHOLD))
        .bind(input.overtime_multiplier.unwrap_or(DEFAULT_OVERTIME_MULTIPLIER))
        .bind(input.enable_overtime.unwrap_or(true))
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(Json(input.salary_history.unwrap_or_default()))
        .bind(id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn delete_employee(&self, business_id: Uuid, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1 AND business_id = $2")
            .bind(id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert used by the import reconciler inside its per-row transaction.
    pub async fn create_employee_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business_id: Uuid,
        input: EmployeeInput,
    ) -> Result<Employee> {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (business_id, name, cedula, phone, pin, position, hourly_rate,
                                   status, apply_ccss, overtime_threshold, overtime_multiplier,
                                   enable_overtime, start_date, end_date, salary_history)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(business_id)
        .bind(input.name)
        .bind(input.cedula)
        .bind(input.phone)
        .bind(input.pin)
        .bind(input.position)
        .bind(input.hourly_rate)
        .bind(input.status.unwrap_or_default())
        .bind(input.apply_ccss.unwrap_or(false))
        .bind(input.overtime_threshold.unwrap_or(DEFAULT_OVERTIME_THRESHOLD))
        .bind(input.overtime_multiplier.unwrap_or(DEFAULT_OVERTIME_MULTIPLIER))
        .bind(input.enable_overtime.unwrap_or(true))
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(Json(input.salary_history.unwrap_or_default()))
        .fetch_one(&mut **tx)
        .await?;

        Ok(employee)
    }
}
