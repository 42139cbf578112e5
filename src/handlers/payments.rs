use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::TimeLogEdit;
use crate::database::repositories::PaymentRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::TenantContext;
use crate::services::SettlementService;

pub async fn list_payments(
    tenant: TenantContext,
    repo: web::Data<PaymentRepository>,
) -> Result<HttpResponse, AppError> {
    let payments = repo.list_payments(tenant.business_id).await?;
    Ok(ApiResponse::success(payments))
}

pub async fn get_payment(
    tenant: TenantContext,
    repo: web::Data<PaymentRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let payment = repo
        .get_payment(tenant.business_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("payment not found"))?;
    Ok(ApiResponse::success(payment))
}

pub async fn delete_payment(
    tenant: TenantContext,
    repo: web::Data<PaymentRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let deleted = repo
        .delete_payment(tenant.business_id, path.into_inner())
        .await?;
    if !deleted {
        return Err(AppError::not_found("payment not found"));
    }
    Ok(ApiResponse::message("payment deleted"))
}

/// Edit one settled line inside a payment's snapshot. Hours and the line net
/// are re-derived; the payment totals follow the mutated snapshot.
pub async fn edit_paid_line(
    tenant: TenantContext,
    service: web::Data<SettlementService>,
    path: web::Path<(Uuid, usize)>,
    edit: web::Json<TimeLogEdit>,
) -> Result<HttpResponse, AppError> {
    let (payment_id, index) = path.into_inner();
    let payment = service
        .edit_paid_line(tenant.business_id, payment_id, index, edit.into_inner())
        .await?;
    Ok(ApiResponse::success(payment))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentRequest {
    pub amount: f64,
    pub reason: String,
}

/// Manual total override, recorded in the payment's adjustment trail.
pub async fn adjust_payment(
    tenant: TenantContext,
    service: web::Data<SettlementService>,
    path: web::Path<Uuid>,
    input: web::Json<AdjustmentRequest>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let payment = service
        .adjust_payment(
            tenant.business_id,
            path.into_inner(),
            input.amount,
            input.reason,
            Utc::now().date_naive(),
        )
        .await?;
    Ok(ApiResponse::success(payment))
}
