use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// A settled pay period. `logs_detail` is a denormalized snapshot of the
/// consumed time logs and is the sole source of truth for the period — the
/// originating rows are deleted in the same transaction that creates this.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub business_id: Uuid,
    pub employee_id: Uuid,
    /// Settlement date.
    pub date: NaiveDate,
    pub amount: f64,
    pub hours: f64,
    pub deduction_ccss: f64,
    pub net_amount: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub logs_detail: Json<Vec<SettledLine>>,
    pub adjustments: Json<Vec<Adjustment>>,
    pub is_imported: bool,
    pub created_at: DateTime<Utc>,
}

/// Immutable copy of one settled log line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettledLine {
    pub date: NaiveDate,
    pub time_in: Option<NaiveTime>,
    pub time_out: Option<NaiveTime>,
    pub hours: f64,
    pub is_double_day: bool,
    pub deduction_hours: f64,
    pub net: f64,
    pub note: Option<String>,
}

/// Audit record for a manual override of a payment's totals. Corrections to
/// an immutable financial record always leave one of these behind instead of
/// silently rewriting the amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub date: NaiveDate,
    pub previous_amount: f64,
    pub new_amount: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub amount: f64,
    pub hours: f64,
    pub deduction_ccss: f64,
    pub net_amount: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub logs_detail: Vec<SettledLine>,
    pub is_imported: bool,
}

impl Payment {
    /// Sum of per-line hours in the snapshot.
    pub fn detail_hours(&self) -> f64 {
        self.logs_detail.0.iter().map(|l| l.hours).sum()
    }

    /// Sum of per-line net amounts in the snapshot.
    pub fn detail_net(&self) -> f64 {
        self.logs_detail.0.iter().map(|l| l.net).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn line(day: u32, hours: f64, net: f64) -> SettledLine {
        SettledLine {
            date: NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
            time_in: None,
            time_out: None,
            hours,
            is_double_day: false,
            deduction_hours: 0.0,
            net,
            note: None,
        }
    }

    #[test]
    fn detail_sums_match_the_stored_totals() {
        let payment = Payment {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 7, 8).unwrap(),
            amount: 30000.0,
            hours: 15.0,
            deduction_ccss: 0.0,
            net_amount: 30000.0,
            start_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 2),
            logs_detail: Json(vec![line(1, 9.0, 18000.0), line(2, 6.0, 12000.0)]),
            adjustments: Json(Vec::new()),
            is_imported: false,
            created_at: Utc::now(),
        };

        assert_eq!(payment.detail_hours(), payment.hours);
        assert_eq!(payment.detail_net(), payment.amount);
    }
}
