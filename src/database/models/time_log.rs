use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::database::models::macros::string_enum;

/// One work interval (or a lone clock event when either time is missing) for
/// one employee. Destroyed exactly once, when its amount is folded into a
/// payment; `is_paid` rows are never mutated outside that settlement path.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimeLog {
    pub id: Uuid,
    pub business_id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub is_double_day: bool,
    pub deduction_hours: f64,
    /// Payable hours, derived by the hours calculator at write time.
    pub hours: f64,
    pub is_paid: bool,
    pub source: LogSource,
    pub location: Option<Json<LocationStamp>>,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum LogSource {
        #[default]
        Manual => "manual",
        Marker => "marker",
        Imported => "imported",
    }
}

/// GPS fix captured by the kiosk marker alongside the clock event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationStamp {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLogInput {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub is_double_day: Option<bool>,
    pub deduction_hours: Option<f64>,
    pub source: Option<LogSource>,
    pub location: Option<LocationStamp>,
    pub photo_url: Option<String>,
}

/// Fields an operator may change on a log; hours are always re-derived.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLogEdit {
    pub date: NaiveDate,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub is_double_day: bool,
    pub deduction_hours: f64,
}
