use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::database::models::macros::string_enum;

pub const DEFAULT_OVERTIME_THRESHOLD: f64 = 48.0;
pub const DEFAULT_OVERTIME_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub cedula: Option<String>,
    pub phone: Option<String>,
    /// Kiosk marker PIN.
    pub pin: Option<String>,
    pub position: Option<String>,
    pub hourly_rate: f64,
    pub status: EmployeeStatus,
    pub apply_ccss: bool,
    /// Hours per week before overtime starts; scaled by the business cycle.
    pub overtime_threshold: f64,
    pub overtime_multiplier: f64,
    pub enable_overtime: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub salary_history: Json<Vec<SalaryRevision>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum EmployeeStatus {
        #[default]
        Active => "active",
        Inactive => "inactive",
    }
}

/// One entry of the append-only, oldest-first salary history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRevision {
    pub date: NaiveDate,
    pub rate: f64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub name: String,
    pub cedula: Option<String>,
    pub phone: Option<String>,
    pub pin: Option<String>,
    pub position: Option<String>,
    pub hourly_rate: f64,
    pub status: Option<EmployeeStatus>,
    pub apply_ccss: Option<bool>,
    pub overtime_threshold: Option<f64>,
    pub overtime_multiplier: Option<f64>,
    pub enable_overtime: Option<bool>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub salary_history: Option<Vec<SalaryRevision>>,
}

impl Employee {
    /// Overtime threshold for one full pay cycle of the given policy.
    pub fn cycle_threshold(&self, cycle: crate::database::models::CycleType) -> f64 {
        self.overtime_threshold * cycle.threshold_multiplier()
    }
}
