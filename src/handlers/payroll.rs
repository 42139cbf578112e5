use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::TenantContext;
use crate::services::{NotificationSender, PayrollService, SettlementService, notification};

/// Current pending balances, one per employee with unpaid logs.
pub async fn pending_summary(
    tenant: TenantContext,
    payroll: web::Data<PayrollService>,
) -> Result<HttpResponse, AppError> {
    let summary = payroll.pending_summary(tenant.business_id).await?;
    Ok(ApiResponse::success(summary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleRequest {
    pub employee_ids: Vec<Uuid>,
}

/// Settles the selected pending balances against a fresh aggregation
/// snapshot. A mixed outcome is reported as a partial settlement so the
/// operator can retry the remainder without re-paying anyone.
pub async fn settle(
    tenant: TenantContext,
    payroll: web::Data<PayrollService>,
    settlement: web::Data<SettlementService>,
    input: web::Json<SettleRequest>,
) -> Result<HttpResponse, AppError> {
    let summary = payroll.pending_summary(tenant.business_id).await?;
    let batch = settlement
        .settle_many(
            tenant.business_id,
            &summary,
            &input.employee_ids,
            Utc::now().date_naive(),
        )
        .await?;

    if batch.failures.is_empty() {
        return Ok(ApiResponse::created(batch));
    }

    let reasons: Vec<String> = batch
        .failures
        .iter()
        .map(|f| format!("{}: {}", f.name, f.reason))
        .collect();

    if batch.payments.is_empty() {
        return Err(AppError::validation(format!(
            "no balances settled ({})",
            reasons.join("; ")
        )));
    }

    Err(AppError::PartialSettlement(format!(
        "{} of {} balances settled; failed: {}",
        batch.payments.len(),
        input.employee_ids.len(),
        reasons.join("; ")
    )))
}

/// Builds the employee's pending-balance summary and hands it to the
/// notification sender. Delivery is fire-and-forget; the rendered text is
/// returned either way so the operator can forward it by hand.
pub async fn share_pending(
    tenant: TenantContext,
    payroll: web::Data<PayrollService>,
    notifier: web::Data<dyn NotificationSender>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let balance = payroll
        .pending_for_employee(tenant.business_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("employee has no pending balance"))?;

    let message = notification::pending_summary(&balance);
    match &balance.phone {
        Some(phone) => {
            if let Err(err) = notifier.deliver(phone, &message) {
                log::warn!("Pending summary delivery failed: {}", err);
            }
        }
        None => log::info!("{} has no phone on file; summary not sent", balance.name),
    }

    Ok(ApiResponse::success(message))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleLineRequest {
    pub employee_id: Uuid,
    pub log_id: Uuid,
}

/// Settles exactly one pending day for one employee.
pub async fn settle_line(
    tenant: TenantContext,
    payroll: web::Data<PayrollService>,
    settlement: web::Data<SettlementService>,
    input: web::Json<SettleLineRequest>,
) -> Result<HttpResponse, AppError> {
    let balance = payroll
        .pending_for_employee(tenant.business_id, input.employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("employee has no pending balance"))?;

    let line = balance
        .lines
        .iter()
        .find(|l| l.log_id == input.log_id)
        .ok_or_else(|| AppError::not_found("log is not part of the pending balance"))?;

    let payment = settlement
        .settle_line(
            tenant.business_id,
            input.employee_id,
            line,
            Utc::now().date_naive(),
        )
        .await?;

    Ok(ApiResponse::created(payment))
}
