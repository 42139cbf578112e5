use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    Adjustment, Payment, PaymentInput, PendingBalance, PendingLine, SettledLine, TimeLogEdit,
};
use crate::database::repositories::{EmployeeRepository, PaymentRepository, TimeLogRepository};
use crate::error::AppError;
use crate::services::hours::{payable_hours, round2};
use crate::services::notification::{self, NotificationSender};

/// Outcome of settling several selected balances in one pass. Failures are
/// carried alongside the successes so the caller can retry exactly the
/// balances that did not go through.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementBatch {
    pub payments: Vec<Payment>,
    pub total_hours: f64,
    pub total_net: f64,
    pub failures: Vec<SettlementFailure>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementFailure {
    pub employee_id: Uuid,
    pub name: String,
    pub reason: String,
}

/// Builds the payment row a pending balance settles into. Totals and line
/// values are rounded here, at the persistence boundary.
pub(crate) fn payment_from_balance(balance: &PendingBalance, date: NaiveDate) -> PaymentInput {
    let logs_detail = balance
        .lines
        .iter()
        .map(|line| SettledLine {
            date: line.date,
            time_in: line.time_in,
            time_out: line.time_out,
            hours: round2(line.hours),
            is_double_day: line.is_double_day,
            deduction_hours: line.deduction_hours,
            net: round2(line.net),
            note: None,
        })
        .collect();

    PaymentInput {
        employee_id: balance.employee_id,
        date,
        amount: round2(balance.net),
        hours: round2(balance.hours),
        deduction_ccss: round2(balance.deduction),
        net_amount: round2(balance.net),
        start_date: Some(balance.start_date),
        end_date: Some(balance.end_date),
        logs_detail,
        is_imported: false,
    }
}

/// Single-line variant: the payment spans exactly that day.
pub(crate) fn payment_from_line(
    employee_id: Uuid,
    line: &PendingLine,
    date: NaiveDate,
) -> PaymentInput {
    PaymentInput {
        employee_id,
        date,
        amount: round2(line.net),
        hours: round2(line.hours),
        deduction_ccss: round2(line.deduction),
        net_amount: round2(line.net),
        start_date: Some(line.date),
        end_date: Some(line.date),
        logs_detail: vec![SettledLine {
            date: line.date,
            time_in: line.time_in,
            time_out: line.time_out,
            hours: round2(line.hours),
            is_double_day: line.is_double_day,
            deduction_hours: line.deduction_hours,
            net: round2(line.net),
            note: None,
        }],
        is_imported: false,
    }
}

/// Applies an edit to one settled line and recomputes the payment totals
/// from the full mutated snapshot. The line's hours come from the hours
/// calculator and its net from the rate the caller passes in — corrections
/// use the employee's current rate, not the rate at settlement time.
pub(crate) fn rewrite_line(
    detail: &[SettledLine],
    index: usize,
    edit: &TimeLogEdit,
    hourly_rate: f64,
) -> Result<(Vec<SettledLine>, f64, f64), AppError> {
    let mut detail = detail.to_vec();
    let Some(slot) = detail.get_mut(index) else {
        return Err(AppError::validation(format!(
            "payment has no line at index {}",
            index
        )));
    };

    let hours = round2(payable_hours(
        edit.time_in,
        edit.time_out,
        edit.deduction_hours,
        edit.is_double_day,
    ));
    *slot = SettledLine {
        date: edit.date,
        time_in: edit.time_in,
        time_out: edit.time_out,
        hours,
        is_double_day: edit.is_double_day,
        deduction_hours: edit.deduction_hours,
        net: round2(hours * hourly_rate),
        note: slot.note.clone(),
    };

    let total_hours = round2(detail.iter().map(|l| l.hours).sum());
    let total_net = round2(detail.iter().map(|l| l.net).sum());

    Ok((detail, total_hours, total_net))
}

#[derive(Clone)]
pub struct SettlementService {
    pool: PgPool,
    payments: PaymentRepository,
    logs: TimeLogRepository,
    employees: EmployeeRepository,
    notifier: Arc<dyn NotificationSender>,
}

impl SettlementService {
    pub fn new(
        pool: PgPool,
        payments: PaymentRepository,
        logs: TimeLogRepository,
        employees: EmployeeRepository,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            pool,
            payments,
            logs,
            employees,
            notifier,
        }
    }

    /// Settles one employee's full pending balance: one payment row carrying
    /// the aggregate totals and the per-log snapshot, and the consumed logs
    /// deleted, all inside one transaction. Either everything lands or
    /// nothing does.
    pub async fn settle_group(
        &self,
        business_id: Uuid,
        balance: &PendingBalance,
        date: NaiveDate,
    ) -> Result<Payment, AppError> {
        if balance.lines.is_empty() || balance.hours <= 0.0 || balance.net <= 0.0 {
            return Err(AppError::validation(
                "nothing payable in the pending balance",
            ));
        }

        let employee = self
            .employees
            .get_employee(business_id, balance.employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("employee no longer exists"))?;

        let log_ids: Vec<Uuid> = balance.lines.iter().map(|l| l.log_id).collect();
        let input = payment_from_balance(balance, date);

        let mut tx = self.pool.begin().await?;
        let payment = self
            .payments
            .create_payment_tx(&mut tx, business_id, input)
            .await?;
        let deleted = self.logs.delete_logs_tx(&mut tx, business_id, &log_ids).await?;
        if deleted != log_ids.len() as u64 {
            // Another administrator settled part of this balance first; the
            // snapshot is stale. Dropping the transaction rolls everything
            // back instead of double-paying.
            log::warn!(
                "Stale settlement for employee {}: {} of {} logs already gone",
                balance.employee_id,
                log_ids.len() as u64 - deleted,
                log_ids.len()
            );
            return Err(AppError::validation(
                "pending balance is stale; some logs were already settled",
            ));
        }
        tx.commit().await?;

        self.notify(&employee.phone, notification::settlement_receipt(&employee.name, &payment));

        Ok(payment)
    }

    /// Settles a single pending line: same contract as a group settlement,
    /// restricted to one log and a single-entry snapshot.
    pub async fn settle_line(
        &self,
        business_id: Uuid,
        employee_id: Uuid,
        line: &PendingLine,
        date: NaiveDate,
    ) -> Result<Payment, AppError> {
        if line.hours <= 0.0 || line.net <= 0.0 {
            return Err(AppError::validation("nothing payable on this line"));
        }

        let employee = self
            .employees
            .get_employee(business_id, employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("employee no longer exists"))?;

        let input = payment_from_line(employee_id, line, date);

        let mut tx = self.pool.begin().await?;
        let payment = self
            .payments
            .create_payment_tx(&mut tx, business_id, input)
            .await?;
        let deleted = self
            .logs
            .delete_logs_tx(&mut tx, business_id, &[line.log_id])
            .await?;
        if deleted != 1 {
            return Err(AppError::validation(
                "log was already settled by someone else",
            ));
        }
        tx.commit().await?;

        self.notify(
            &employee.phone,
            notification::line_receipt(
                &employee.name,
                line.date,
                line.time_in,
                line.time_out,
                line.hours,
                line.net,
            ),
        );

        Ok(payment)
    }

    /// Settles every selected balance from a summary snapshot, continuing on
    /// per-employee failure. A mixed outcome is returned with its failures so
    /// the caller can surface a partial settlement and retry the remainder
    /// without re-paying anyone.
    pub async fn settle_many(
        &self,
        business_id: Uuid,
        summary: &[PendingBalance],
        selected: &[Uuid],
        date: NaiveDate,
    ) -> Result<SettlementBatch, AppError> {
        if selected.is_empty() {
            return Err(AppError::validation("no employees selected"));
        }

        let mut batch = SettlementBatch {
            payments: Vec::new(),
            total_hours: 0.0,
            total_net: 0.0,
            failures: Vec::new(),
        };

        for employee_id in selected {
            let Some(balance) = summary.iter().find(|b| b.employee_id == *employee_id) else {
                batch.failures.push(SettlementFailure {
                    employee_id: *employee_id,
                    name: employee_id.to_string(),
                    reason: "no pending balance in the summary".to_string(),
                });
                continue;
            };

            match self.settle_group(business_id, balance, date).await {
                Ok(payment) => {
                    batch.total_hours += payment.hours;
                    batch.total_net += payment.net_amount;
                    batch.payments.push(payment);
                }
                Err(err) => {
                    log::error!("Failed to settle balance for {}: {}", balance.name, err);
                    batch.failures.push(SettlementFailure {
                        employee_id: *employee_id,
                        name: balance.name.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(batch)
    }

    /// Edit-after-settlement: recompute one snapshot line at the employee's
    /// current rate, then rewrite the payment's detail and totals in a single
    /// update. The original time logs are long gone and are never touched.
    pub async fn edit_paid_line(
        &self,
        business_id: Uuid,
        payment_id: Uuid,
        index: usize,
        edit: TimeLogEdit,
    ) -> Result<Payment, AppError> {
        if edit.deduction_hours < 0.0 {
            return Err(AppError::validation("deduction hours cannot be negative"));
        }

        let payment = self
            .payments
            .get_payment(business_id, payment_id)
            .await?
            .ok_or_else(|| AppError::not_found("payment not found"))?;

        let employee = self
            .employees
            .get_employee(business_id, payment.employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("employee no longer exists"))?;

        let (detail, total_hours, total_net) =
            rewrite_line(&payment.logs_detail.0, index, &edit, employee.hourly_rate)?;

        self.payments
            .update_totals_and_detail(
                business_id,
                payment_id,
                total_hours,
                total_net,
                total_net,
                detail,
            )
            .await?
            .ok_or_else(|| AppError::not_found("payment not found"))
    }

    /// Audited manual override of a payment's totals. The previous amount and
    /// the operator's reason are appended to the payment's adjustment trail;
    /// the snapshot lines stay untouched, so the trail is what explains any
    /// divergence from their sum.
    pub async fn adjust_payment(
        &self,
        business_id: Uuid,
        payment_id: Uuid,
        new_amount: f64,
        reason: String,
        date: NaiveDate,
    ) -> Result<Payment, AppError> {
        if new_amount <= 0.0 {
            return Err(AppError::validation("adjusted amount must be positive"));
        }
        if reason.trim().is_empty() {
            return Err(AppError::validation("an adjustment requires a reason"));
        }

        let payment = self
            .payments
            .get_payment(business_id, payment_id)
            .await?
            .ok_or_else(|| AppError::not_found("payment not found"))?;

        let mut adjustments = payment.adjustments.0.clone();
        adjustments.push(Adjustment {
            date,
            previous_amount: payment.amount,
            new_amount: round2(new_amount),
            reason,
        });

        self.payments
            .apply_adjustment(
                business_id,
                payment_id,
                round2(new_amount),
                round2(new_amount),
                adjustments,
            )
            .await?
            .ok_or_else(|| AppError::not_found("payment not found"))
    }

    fn notify(&self, phone: &Option<String>, message: String) {
        if let Some(phone) = phone {
            if let Err(err) = self.notifier.deliver(phone, &message) {
                log::warn!("Notification delivery failed: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn t(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn line(day: u32, hours: f64, net: f64) -> PendingLine {
        PendingLine {
            log_id: Uuid::new_v4(),
            date: d(day),
            time_in: t(8, 0),
            time_out: t(17, 0),
            hours,
            is_double_day: false,
            deduction_hours: 0.0,
            gross: net,
            deduction: 0.0,
            net,
        }
    }

    fn balance(lines: Vec<PendingLine>) -> PendingBalance {
        let hours = lines.iter().map(|l| l.hours).sum();
        let net = lines.iter().map(|l| l.net).sum();
        let start = lines.iter().map(|l| l.date).min().unwrap();
        let end = lines.iter().map(|l| l.date).max().unwrap();
        PendingBalance {
            employee_id: Uuid::new_v4(),
            name: "Carlos Solano".to_string(),
            phone: None,
            hours,
            regular_hours: hours,
            extra_hours: 0.0,
            double_hours: 0.0,
            gross: net,
            deduction: 0.0,
            net,
            start_date: start,
            end_date: end,
            lines,
        }
    }

    #[test]
    fn group_payment_matches_balance_totals_and_span() {
        let b = balance(vec![line(3, 9.0, 18000.0), line(1, 8.0, 16000.0)]);
        let input = payment_from_balance(&b, d(5));

        assert_eq!(input.hours, 17.0);
        assert_eq!(input.amount, 34000.0);
        assert_eq!(input.net_amount, 34000.0);
        assert_eq!(input.start_date, Some(d(1)));
        assert_eq!(input.end_date, Some(d(3)));
        assert_eq!(input.logs_detail.len(), 2);
        assert!(!input.is_imported);

        let detail_hours: f64 = input.logs_detail.iter().map(|l| l.hours).sum();
        let detail_net: f64 = input.logs_detail.iter().map(|l| l.net).sum();
        assert_eq!(detail_hours, input.hours);
        assert_eq!(detail_net, input.amount);
    }

    #[test]
    fn line_payment_snapshots_exactly_one_day() {
        let l = line(4, 8.0, 16000.0);
        let input = payment_from_line(Uuid::new_v4(), &l, d(10));

        assert_eq!(input.logs_detail.len(), 1);
        assert_eq!(input.start_date, Some(d(4)));
        assert_eq!(input.end_date, Some(d(4)));
        assert_eq!(input.amount, l.net);
        assert_eq!(input.hours, l.hours);
        assert_eq!(input.logs_detail[0].net, l.net);
    }

    #[test]
    fn rewrite_line_recomputes_totals_from_full_detail() {
        let detail = vec![
            SettledLine {
                date: d(1),
                time_in: t(8, 0),
                time_out: t(17, 0),
                hours: 9.0,
                is_double_day: false,
                deduction_hours: 0.0,
                net: 18000.0,
                note: None,
            },
            SettledLine {
                date: d(2),
                time_in: t(8, 0),
                time_out: t(16, 0),
                hours: 8.0,
                is_double_day: false,
                deduction_hours: 0.0,
                net: 16000.0,
                note: None,
            },
        ];

        // Corrected to a 6h day with an hour of lunch, at the current ₡2500 rate
        let edit = TimeLogEdit {
            date: d(2),
            time_in: t(9, 0),
            time_out: t(16, 0),
            is_double_day: false,
            deduction_hours: 1.0,
        };
        let (new_detail, total_hours, total_net) = rewrite_line(&detail, 1, &edit, 2500.0).unwrap();

        assert_eq!(new_detail[1].hours, 6.0);
        assert_eq!(new_detail[1].net, 15000.0);
        assert_eq!(total_hours, 15.0);
        assert_eq!(total_net, 33000.0);

        // round-trip invariant: totals equal the sums over the mutated detail
        let sum_hours: f64 = new_detail.iter().map(|l| l.hours).sum();
        let sum_net: f64 = new_detail.iter().map(|l| l.net).sum();
        assert_eq!(round2(sum_hours), total_hours);
        assert_eq!(round2(sum_net), total_net);
    }

    #[test]
    fn rewrite_line_applies_double_day_at_current_rate() {
        let detail = vec![SettledLine {
            date: d(1),
            time_in: t(8, 0),
            time_out: t(12, 0),
            hours: 4.0,
            is_double_day: false,
            deduction_hours: 0.0,
            net: 4000.0,
            note: None,
        }];

        let edit = TimeLogEdit {
            date: d(1),
            time_in: t(8, 0),
            time_out: t(12, 0),
            is_double_day: true,
            deduction_hours: 0.0,
        };
        let (new_detail, total_hours, total_net) = rewrite_line(&detail, 0, &edit, 1500.0).unwrap();

        assert_eq!(new_detail[0].hours, 8.0);
        assert_eq!(total_hours, 8.0);
        assert_eq!(total_net, 12000.0);
    }

    #[test]
    fn rewrite_line_rejects_out_of_range_index() {
        let detail: Vec<SettledLine> = Vec::new();
        let edit = TimeLogEdit {
            date: d(1),
            time_in: t(8, 0),
            time_out: t(12, 0),
            is_double_day: false,
            deduction_hours: 0.0,
        };

        assert!(matches!(
            rewrite_line(&detail, 0, &edit, 1000.0),
            Err(AppError::Validation(_))
        ));
    }
}
