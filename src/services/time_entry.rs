use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Employee, TimeLog, TimeLogEdit, TimeLogInput};
use crate::database::repositories::{EmployeeRepository, NewTimeLog, TimeLogRepository};
use crate::error::AppError;
use crate::services::hours::{payable_hours, round2};
use crate::services::notification::{self, DayLine, NotificationSender};
use crate::services::payroll::CCSS_RATE;

/// One row of a batch registration. All fields are required — the batch form
/// drops incomplete rows before they reach the engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub date: NaiveDate,
    pub time_in: NaiveTime,
    pub time_out: NaiveTime,
    pub is_double_day: bool,
    pub deduction_hours: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSubmission {
    pub count: usize,
    pub total_hours: f64,
    pub total_net: f64,
    /// The summary text handed to the notification trigger.
    pub message: String,
    pub notified: bool,
}

#[derive(Clone)]
pub struct TimeEntryService {
    pool: PgPool,
    logs: TimeLogRepository,
    employees: EmployeeRepository,
    notifier: Arc<dyn NotificationSender>,
}

impl TimeEntryService {
    pub fn new(
        pool: PgPool,
        logs: TimeLogRepository,
        employees: EmployeeRepository,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            pool,
            logs,
            employees,
            notifier,
        }
    }

    /// Creates one log. Payable hours are always derived here, never taken
    /// from the caller, so the denormalized column can't drift from the
    /// calculator.
    pub async fn create_entry(
        &self,
        business_id: Uuid,
        input: TimeLogInput,
    ) -> Result<TimeLog, AppError> {
        let deduction = input.deduction_hours.unwrap_or(0.0);
        if deduction < 0.0 {
            return Err(AppError::validation("deduction hours cannot be negative"));
        }

        self.require_employee(business_id, input.employee_id).await?;

        let is_double = input.is_double_day.unwrap_or(false);
        let hours = round2(payable_hours(input.time_in, input.time_out, deduction, is_double));

        let log = self
            .logs
            .create_log(
                business_id,
                NewTimeLog {
                    employee_id: input.employee_id,
                    date: input.date,
                    time_in: input.time_in,
                    time_out: input.time_out,
                    is_double_day: is_double,
                    deduction_hours: deduction,
                    hours,
                    source: input.source.unwrap_or_default(),
                    location: input.location,
                    photo_url: input.photo_url,
                },
            )
            .await?;

        Ok(log)
    }

    /// Edit-before-settlement. Recomputes the hours and persists the new
    /// value; payments are never involved. Paid logs are off limits — those
    /// corrections go through the settlement engine's paid-line edit.
    pub async fn edit_unpaid(
        &self,
        business_id: Uuid,
        log_id: Uuid,
        edit: TimeLogEdit,
    ) -> Result<TimeLog, AppError> {
        if edit.deduction_hours < 0.0 {
            return Err(AppError::validation("deduction hours cannot be negative"));
        }

        let log = self
            .logs
            .get_log(business_id, log_id)
            .await?
            .ok_or_else(|| AppError::not_found("time log not found"))?;

        if log.is_paid {
            return Err(AppError::validation(
                "log is already settled; edit it through its payment",
            ));
        }

        let hours = round2(payable_hours(
            edit.time_in,
            edit.time_out,
            edit.deduction_hours,
            edit.is_double_day,
        ));

        self.logs
            .update_entry(
                business_id,
                log_id,
                edit.date,
                edit.time_in,
                edit.time_out,
                edit.is_double_day,
                edit.deduction_hours,
                hours,
            )
            .await?
            .ok_or_else(|| AppError::not_found("time log not found"))
    }

    /// Registers a whole batch of days for one employee in one transaction,
    /// then fires the summary notification. Delivery failure never fails the
    /// batch — the rows are already committed.
    pub async fn submit_batch(
        &self,
        business_id: Uuid,
        employee_id: Uuid,
        entries: Vec<BatchEntry>,
    ) -> Result<BatchSubmission, AppError> {
        if entries.is_empty() {
            return Err(AppError::validation("batch contains no entries"));
        }
        if entries.iter().any(|e| e.deduction_hours < 0.0) {
            return Err(AppError::validation("deduction hours cannot be negative"));
        }

        let employee = self.require_employee(business_id, employee_id).await?;

        let mut total_hours = 0.0;
        let mut total_net = 0.0;
        let mut day_lines = Vec::with_capacity(entries.len());

        let mut tx = self.pool.begin().await?;
        for entry in &entries {
            let hours = round2(payable_hours(
                Some(entry.time_in),
                Some(entry.time_out),
                entry.deduction_hours,
                entry.is_double_day,
            ));

            self.logs
                .create_log_tx(
                    &mut tx,
                    business_id,
                    NewTimeLog {
                        employee_id,
                        date: entry.date,
                        time_in: Some(entry.time_in),
                        time_out: Some(entry.time_out),
                        is_double_day: entry.is_double_day,
                        deduction_hours: entry.deduction_hours,
                        hours,
                        source: Default::default(),
                        location: None,
                        photo_url: None,
                    },
                )
                .await?;

            let gross = hours * employee.hourly_rate;
            let deduction = if employee.apply_ccss {
                gross * CCSS_RATE
            } else {
                0.0
            };
            let net = gross - deduction;
            total_hours += hours;
            total_net += net;

            day_lines.push(DayLine {
                date: entry.date,
                time_in: Some(entry.time_in),
                time_out: Some(entry.time_out),
                hours,
                is_double_day: entry.is_double_day,
                deduction_hours: entry.deduction_hours,
                net,
            });
        }
        tx.commit().await?;

        let message =
            notification::batch_summary(&employee.name, &day_lines, total_hours, total_net);

        let notified = match &employee.phone {
            Some(phone) => match self.notifier.deliver(phone, &message) {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Batch summary delivery failed: {}", err);
                    false
                }
            },
            None => false,
        };

        Ok(BatchSubmission {
            count: entries.len(),
            total_hours,
            total_net,
            message,
            notified,
        })
    }

    async fn require_employee(
        &self,
        business_id: Uuid,
        employee_id: Uuid,
    ) -> Result<Employee, AppError> {
        self.employees
            .get_employee(business_id, employee_id)
            .await?
            .ok_or_else(|| AppError::not_found("employee not found in this business"))
    }
}
