use std::collections::HashMap;

use uuid::Uuid;

use crate::database::models::{CycleType, Employee, PendingBalance, PendingLine, TimeLog};
use crate::database::repositories::{BusinessRepository, EmployeeRepository, TimeLogRepository};
use crate::error::AppError;

/// Statutory CCSS deduction rate. An engine constant for this jurisdiction,
/// not runtime configuration; employees only carry the opt-in flag.
pub const CCSS_RATE: f64 = 0.1067;

/// Groups unpaid logs into per-employee pending balances.
///
/// Pure over the snapshot it is given: logs whose employee no longer exists
/// are skipped (and logged) rather than failing the whole batch, and the
/// overtime split is recomputed from the running regular-hours total on every
/// log so insertion order cannot change the result.
///
/// `extra_hours` is informational for the summary view. The accumulated `net`
/// is the flat per-log sum — the overtime premium is not applied to the
/// aggregate total.
pub fn aggregate_pending(
    logs: &[TimeLog],
    employees: &[Employee],
    cycle: CycleType,
) -> HashMap<Uuid, PendingBalance> {
    let by_id: HashMap<Uuid, &Employee> = employees.iter().map(|e| (e.id, e)).collect();
    let mut pending: HashMap<Uuid, PendingBalance> = HashMap::new();

    for log in logs.iter().filter(|l| !l.is_paid) {
        let Some(employee) = by_id.get(&log.employee_id) else {
            log::warn!(
                "Skipping unpaid log {} for unknown employee {}",
                log.id,
                log.employee_id
            );
            continue;
        };

        let balance = pending
            .entry(employee.id)
            .or_insert_with(|| PendingBalance {
                employee_id: employee.id,
                name: employee.name.clone(),
                phone: employee.phone.clone(),
                hours: 0.0,
                regular_hours: 0.0,
                extra_hours: 0.0,
                double_hours: 0.0,
                gross: 0.0,
                deduction: 0.0,
                net: 0.0,
                start_date: log.date,
                end_date: log.date,
                lines: Vec::new(),
            });

        let hours = log.hours;
        if log.is_double_day {
            balance.double_hours += hours;
        } else {
            balance.regular_hours += hours;
        }

        let threshold = employee.cycle_threshold(cycle);
        if employee.enable_overtime && balance.regular_hours > threshold {
            balance.extra_hours = balance.regular_hours - threshold;
        }

        let gross = hours * employee.hourly_rate;
        let deduction = if employee.apply_ccss {
            gross * CCSS_RATE
        } else {
            0.0
        };
        let net = gross - deduction;

        balance.hours += hours;
        balance.gross += gross;
        balance.deduction += deduction;
        balance.net += net;
        balance.start_date = balance.start_date.min(log.date);
        balance.end_date = balance.end_date.max(log.date);
        balance.lines.push(PendingLine {
            log_id: log.id,
            date: log.date,
            time_in: log.time_in,
            time_out: log.time_out,
            hours,
            is_double_day: log.is_double_day,
            deduction_hours: log.deduction_hours,
            gross,
            deduction,
            net,
        });
    }

    pending
}

#[derive(Clone)]
pub struct PayrollService {
    logs: TimeLogRepository,
    employees: EmployeeRepository,
    businesses: BusinessRepository,
}

impl PayrollService {
    pub fn new(
        logs: TimeLogRepository,
        employees: EmployeeRepository,
        businesses: BusinessRepository,
    ) -> Self {
        Self {
            logs,
            employees,
            businesses,
        }
    }

    /// Snapshot of every pending balance in the tenant, sorted by employee
    /// name. Handed back to the caller; detail views and settlement reuse
    /// this same value instead of re-reading mutable shared state.
    pub async fn pending_summary(&self, business_id: Uuid) -> Result<Vec<PendingBalance>, AppError> {
        let logs = self.logs.list_unpaid(business_id).await?;
        let employees = self.employees.list_employees(business_id).await?;
        let cycle = self.businesses.get_cycle_policy(business_id).await?;

        let mut balances: Vec<PendingBalance> =
            aggregate_pending(&logs, &employees, cycle).into_values().collect();
        balances.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(balances)
    }

    /// The pending balance for a single employee, if any logs are waiting.
    pub async fn pending_for_employee(
        &self,
        business_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Option<PendingBalance>, AppError> {
        let summary = self.pending_summary(business_id).await?;
        Ok(summary.into_iter().find(|b| b.employee_id == employee_id))
    }
}
