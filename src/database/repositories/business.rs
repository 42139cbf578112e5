use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Business, BusinessSettingsInput, CycleType};

#[derive(Clone)]
pub struct BusinessRepository {
    pool: PgPool,
}

impl BusinessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_business(&self, business_id: Uuid) -> Result<Option<Business>> {
        let business = sqlx::query_as::<_, Business>("SELECT * FROM businesses WHERE id = $1")
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(business)
    }

    /// Pay-cycle policy for a tenant. Falls back to Weekly when the tenant
    /// row is missing so aggregation previews still work mid-onboarding.
    pub async fn get_cycle_policy(&self, business_id: Uuid) -> Result<CycleType> {
        let cycle = sqlx::query_scalar::<_, CycleType>(
            "SELECT cycle_type FROM businesses WHERE id = $1",
        )
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cycle.unwrap_or_default())
    }

    pub async fn update_settings(
        &self,
        business_id: Uuid,
        input: BusinessSettingsInput,
    ) -> Result<Option<Business>> {
        let business = sqlx::query_as::<_, Business>(
            r#"
            UPDATE businesses
            SET name = $1, cedula_juridica = $2, cycle_type = $3, default_overtime_multiplier = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(input.name)
        .bind(input.cedula_juridica)
        .bind(input.cycle_type)
        .bind(input.default_overtime_multiplier)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }
}
