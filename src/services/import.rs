use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Employee, EmployeeInput, PaymentInput, SettledLine};
use crate::database::repositories::{EmployeeRepository, PaymentRepository};
use crate::error::AppError;
use crate::services::hours::round2;

/// Hourly rate assigned to auto-provisioned employees when the row's totals
/// can't synthesize one.
pub const FALLBACK_HOURLY_RATE: f64 = 3500.0;

const IMPORTED_POSITION: &str = "Importado";
const IMPORTED_NOTE: &str = "Importado de liquidación externa";

/// One externally-computed payroll row, already parsed out of the
/// spreadsheet by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRow {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub name: String,
    pub hours: f64,
    pub amount: f64,
}

/// How a row's display name lined up against the tenant's employees. A fuzzy
/// hit is a heuristic, not a guarantee — it is surfaced for human
/// confirmation before anything is written.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum RowMatch {
    Exact { employee_id: Uuid, name: String },
    Fuzzy { employee_id: Uuid, name: String },
    NoMatch,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowResolution {
    pub row: ImportRow,
    pub matched: RowMatch,
    /// Rate the row settles (or provisions) at: the matched employee's rate,
    /// else amount/hours when both are positive, else the fixed fallback.
    pub rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub imported: usize,
    pub matched: usize,
    pub created_employees: usize,
    pub skipped: usize,
    pub failures: Vec<String>,
}

/// First-match-wins name resolution: exact case-insensitive equality first,
/// then substring containment in either direction. Comparison is
/// accent-sensitive; "Perez" will not find "Pérez".
pub fn match_employee(name: &str, employees: &[Employee]) -> RowMatch {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return RowMatch::NoMatch;
    }

    if let Some(emp) = employees
        .iter()
        .find(|e| e.name.trim().to_lowercase() == needle)
    {
        return RowMatch::Exact {
            employee_id: emp.id,
            name: emp.name.clone(),
        };
    }

    if let Some(emp) = employees.iter().find(|e| {
        let existing = e.name.trim().to_lowercase();
        existing.contains(&needle) || needle.contains(&existing)
    }) {
        log::warn!(
            "Ambiguous import match: row '{}' resolved to employee '{}' by substring",
            name,
            emp.name
        );
        return RowMatch::Fuzzy {
            employee_id: emp.id,
            name: emp.name.clone(),
        };
    }

    RowMatch::NoMatch
}

/// Preview pass: tags every row with its match outcome without writing
/// anything, so an operator can confirm fuzzy hits and auto-provisions.
pub fn resolve_rows(rows: &[ImportRow], employees: &[Employee]) -> Vec<RowResolution> {
    rows.iter()
        .map(|row| {
            let matched = match_employee(&row.name, employees);
            let rate = match &matched {
                RowMatch::Exact { employee_id, .. } | RowMatch::Fuzzy { employee_id, .. } => {
                    employees
                        .iter()
                        .find(|e| e.id == *employee_id)
                        .map(|e| e.hourly_rate)
                        .unwrap_or(FALLBACK_HOURLY_RATE)
                }
                RowMatch::NoMatch => synthesized_rate(row),
            };
            RowResolution {
                row: row.clone(),
                matched,
                rate,
            }
        })
        .collect()
}

fn synthesized_rate(row: &ImportRow) -> f64 {
    if row.hours > 0.0 && row.amount > 0.0 {
        round2(row.amount / row.hours)
    } else {
        FALLBACK_HOURLY_RATE
    }
}

#[derive(Clone)]
pub struct ImportService {
    pool: PgPool,
    employees: EmployeeRepository,
    payments: PaymentRepository,
}

impl ImportService {
    pub fn new(pool: PgPool, employees: EmployeeRepository, payments: PaymentRepository) -> Self {
        Self {
            pool,
            employees,
            payments,
        }
    }

    pub async fn preview(
        &self,
        business_id: Uuid,
        rows: &[ImportRow],
    ) -> Result<Vec<RowResolution>, AppError> {
        let employees = self.employees.list_employees(business_id).await?;
        Ok(resolve_rows(rows, &employees))
    }

    /// Commits a confirmed import: each row becomes exactly one imported
    /// payment, provisioning the employee first when no match exists. Fuzzy
    /// matches are only written when the operator confirmed them. Rows fail
    /// individually — one bad row never aborts the run — and re-running the
    /// same file will duplicate payments by design; this is a supervised,
    /// manual step, not a replayable sync.
    pub async fn execute(
        &self,
        business_id: Uuid,
        rows: &[ImportRow],
        confirm_fuzzy: bool,
        today: NaiveDate,
    ) -> Result<ImportOutcome, AppError> {
        if rows.is_empty() {
            return Err(AppError::validation("nothing to import"));
        }

        // Fresh snapshot; the run keeps it updated with its own provisions so
        // a name repeated in one file is only created once.
        let mut employees = self.employees.list_employees(business_id).await?;

        let mut outcome = ImportOutcome {
            imported: 0,
            matched: 0,
            created_employees: 0,
            skipped: 0,
            failures: Vec::new(),
        };

        for row in rows {
            if row.name.trim().is_empty() {
                outcome.skipped += 1;
                continue;
            }

            match self
                .import_row(business_id, row, confirm_fuzzy, today, &mut employees)
                .await
            {
                Ok(RowOutcome::Written { created, matched }) => {
                    outcome.imported += 1;
                    if created {
                        outcome.created_employees += 1;
                    }
                    if matched {
                        outcome.matched += 1;
                    }
                }
                Ok(RowOutcome::NeedsConfirmation(name)) => {
                    outcome.skipped += 1;
                    outcome.failures.push(format!(
                        "'{}': fuzzy match against '{}' requires confirmation",
                        row.name, name
                    ));
                }
                Err(err) => {
                    log::error!("Import row '{}' failed: {}", row.name, err);
                    outcome
                        .failures
                        .push(format!("'{}': {}", row.name, err));
                }
            }
        }

        Ok(outcome)
    }

    async fn import_row(
        &self,
        business_id: Uuid,
        row: &ImportRow,
        confirm_fuzzy: bool,
        today: NaiveDate,
        employees: &mut Vec<Employee>,
    ) -> Result<RowOutcome, AppError> {
        let matched = match_employee(&row.name, employees);
        if let RowMatch::Fuzzy { name, .. } = &matched {
            if !confirm_fuzzy {
                return Ok(RowOutcome::NeedsConfirmation(name.clone()));
            }
        }

        let mut tx = self.pool.begin().await?;

        let (employee_id, created, was_match) = match matched {
            RowMatch::Exact { employee_id, .. } | RowMatch::Fuzzy { employee_id, .. } => {
                (employee_id, false, true)
            }
            RowMatch::NoMatch => {
                let employee = self
                    .employees
                    .create_employee_tx(
                        &mut tx,
                        business_id,
                        EmployeeInput {
                            name: row.name.trim().to_string(),
                            cedula: None,
                            phone: None,
                            pin: None,
                            position: Some(IMPORTED_POSITION.to_string()),
                            hourly_rate: synthesized_rate(row),
                            status: None,
                            apply_ccss: Some(false),
                            overtime_threshold: None,
                            overtime_multiplier: None,
                            enable_overtime: None,
                            start_date: row.end_date.unwrap_or(today),
                            end_date: None,
                            salary_history: None,
                        },
                    )
                    .await?;
                let id = employee.id;
                employees.push(employee);
                (id, true, false)
            }
        };

        let date = row.end_date.unwrap_or(today);
        self.payments
            .create_payment_tx(
                &mut tx,
                business_id,
                PaymentInput {
                    employee_id,
                    date,
                    amount: round2(row.amount),
                    hours: round2(row.hours),
                    deduction_ccss: 0.0,
                    net_amount: round2(row.amount),
                    start_date: row.start_date,
                    end_date: row.end_date,
                    logs_detail: vec![SettledLine {
                        date,
                        time_in: None,
                        time_out: None,
                        hours: round2(row.hours),
                        is_double_day: false,
                        deduction_hours: 0.0,
                        net: round2(row.amount),
                        note: Some(IMPORTED_NOTE.to_string()),
                    }],
                    is_imported: true,
                },
            )
            .await?;

        tx.commit().await?;

        Ok(RowOutcome::Written {
            created,
            matched: was_match,
        })
    }
}

enum RowOutcome {
    Written { created: bool, matched: bool },
    NeedsConfirmation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use sqlx::types::Json;

    use crate::database::models::EmployeeStatus;

    fn employee(name: &str, rate: f64) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            name: name.to_string(),
            cedula: None,
            phone: None,
            pin: None,
            position: None,
            hourly_rate: rate,
            status: EmployeeStatus::Active,
            apply_ccss: false,
            overtime_threshold: 48.0,
            overtime_multiplier: 1.5,
            enable_overtime: true,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: None,
            salary_history: Json(Vec::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn row(name: &str, hours: f64, amount: f64) -> ImportRow {
        ImportRow {
            start_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 7, 7),
            name: name.to_string(),
            hours,
            amount,
        }
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let emps = vec![employee("Juan Perez", 2000.0)];
        let m = match_employee("  juan perez ", &emps);
        assert!(matches!(m, RowMatch::Exact { .. }));
    }

    #[test]
    fn substring_match_works_in_both_directions() {
        let emps = vec![employee("Juan Perez Rodriguez", 2000.0)];
        // row name contained in the employee's full name
        assert!(matches!(
            match_employee("Juan Perez", &emps),
            RowMatch::Fuzzy { .. }
        ));

        let emps = vec![employee("Ana", 2000.0)];
        // employee name contained in the row's longer name
        assert!(matches!(
            match_employee("Ana Venegas", &emps),
            RowMatch::Fuzzy { .. }
        ));
    }

    #[test]
    fn first_match_wins_among_plausible_candidates() {
        let first = employee("Maria Jose Castro", 2000.0);
        let second = employee("Maria Jose Vargas", 2500.0);
        let expected = first.id;
        let m = match_employee("Maria Jose", &[first, second]);
        match m {
            RowMatch::Fuzzy { employee_id, .. } => assert_eq!(employee_id, expected),
            other => panic!("expected fuzzy match, got {:?}", other),
        }
    }

    #[test]
    fn fuzzy_match_is_accent_sensitive() {
        // Open question preserved as-is: no unicode folding, so an accented
        // employee name is NOT found by its unaccented spelling.
        let emps = vec![employee("Juan Pérez Rodríguez", 2000.0)];
        assert_eq!(match_employee("Juan Perez", &emps), RowMatch::NoMatch);
    }

    #[test]
    fn no_match_for_unknown_or_blank_names() {
        let emps = vec![employee("Carlos", 2000.0)];
        assert_eq!(match_employee("Beatriz", &emps), RowMatch::NoMatch);
        assert_eq!(match_employee("   ", &emps), RowMatch::NoMatch);
    }

    #[test]
    fn resolution_rate_prefers_the_matched_employees_rate() {
        let emps = vec![employee("Juan Perez", 2000.0)];
        let resolutions = resolve_rows(&[row("Juan Perez", 40.0, 100000.0)], &emps);
        assert_eq!(resolutions[0].rate, 2000.0);
    }

    #[test]
    fn resolution_rate_synthesizes_from_totals_for_new_employees() {
        let resolutions = resolve_rows(&[row("Nueva Persona", 40.0, 100000.0)], &[]);
        assert_eq!(resolutions[0].matched, RowMatch::NoMatch);
        assert_eq!(resolutions[0].rate, 2500.0);
    }

    #[test]
    fn resolution_rate_falls_back_when_totals_are_unusable() {
        let resolutions = resolve_rows(&[row("Nueva Persona", 0.0, 100000.0)], &[]);
        assert_eq!(resolutions[0].rate, FALLBACK_HOURLY_RATE);
    }
}
