use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{TimeLogEdit, TimeLogInput};
use crate::database::repositories::TimeLogRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::TenantContext;
use crate::services::TimeEntryService;
use crate::services::time_entry::BatchEntry;

pub async fn list_logs(
    tenant: TenantContext,
    repo: web::Data<TimeLogRepository>,
) -> Result<HttpResponse, AppError> {
    let logs = repo.list_logs(tenant.business_id).await?;
    Ok(ApiResponse::success(logs))
}

pub async fn create_log(
    tenant: TenantContext,
    service: web::Data<TimeEntryService>,
    input: web::Json<TimeLogInput>,
) -> Result<HttpResponse, AppError> {
    let log = service
        .create_entry(tenant.business_id, input.into_inner())
        .await?;
    Ok(ApiResponse::created(log))
}

pub async fn update_log(
    tenant: TenantContext,
    service: web::Data<TimeEntryService>,
    path: web::Path<Uuid>,
    edit: web::Json<TimeLogEdit>,
) -> Result<HttpResponse, AppError> {
    let log = service
        .edit_unpaid(tenant.business_id, path.into_inner(), edit.into_inner())
        .await?;
    Ok(ApiResponse::success(log))
}

pub async fn delete_log(
    tenant: TenantContext,
    repo: web::Data<TimeLogRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let deleted = repo.delete_log(tenant.business_id, path.into_inner()).await?;
    if !deleted {
        return Err(AppError::not_found("time log not found"));
    }
    Ok(ApiResponse::message("log deleted"))
}

pub async fn delete_employee_logs(
    tenant: TenantContext,
    repo: web::Data<TimeLogRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let removed = repo
        .delete_logs_for_employee(tenant.business_id, path.into_inner())
        .await?;
    Ok(ApiResponse::success_with_message(
        removed,
        "pending logs cleared",
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub employee_id: Uuid,
    pub logs: Vec<BatchEntry>,
}

pub async fn submit_batch(
    tenant: TenantContext,
    service: web::Data<TimeEntryService>,
    input: web::Json<BatchRequest>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let submission = service
        .submit_batch(tenant.business_id, input.employee_id, input.logs)
        .await?;
    Ok(ApiResponse::created(submission))
}
