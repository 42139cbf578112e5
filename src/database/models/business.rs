use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::macros::string_enum;

/// Tenant record. The pay-cycle policy that scales every employee's overtime
/// threshold lives here, not on the employee.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub cedula_juridica: Option<String>,
    pub cycle_type: CycleType,
    pub default_overtime_multiplier: f64,
    pub created_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum CycleType {
        #[default]
        Weekly => "weekly",
        Biweekly => "biweekly",
        Monthly => "monthly",
    }
}

impl CycleType {
    /// How many base (weekly) overtime-threshold units one pay cycle spans.
    /// Monthly is treated as a nominal 4-week block, not a calendar month.
    pub fn threshold_multiplier(&self) -> f64 {
        match self {
            CycleType::Weekly => 1.0,
            CycleType::Biweekly => 2.0,
            CycleType::Monthly => 4.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessSettingsInput {
    pub name: String,
    pub cedula_juridica: Option<String>,
    pub cycle_type: CycleType,
    pub default_overtime_multiplier: f64,
}
