use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

/// Accumulated unpaid balance for one employee, produced by the pay
/// aggregator. A short-lived value handed back to the caller — never cached
/// between requests, so detail views and settlement always work from the
/// same snapshot they were given.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBalance {
    pub employee_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub hours: f64,
    pub regular_hours: f64,
    /// Hours beyond the cycle-scaled threshold. Informational for the
    /// summary view; the net total below is a flat per-log sum.
    pub extra_hours: f64,
    pub double_hours: f64,
    pub gross: f64,
    pub deduction: f64,
    pub net: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lines: Vec<PendingLine>,
}

/// Per-log drill-down row inside a pending balance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLine {
    pub log_id: Uuid,
    pub date: NaiveDate,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub hours: f64,
    pub is_double_day: bool,
    pub deduction_hours: f64,
    pub gross: f64,
    pub deduction: f64,
    pub net: f64,
}
