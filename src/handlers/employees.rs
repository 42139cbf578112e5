use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{EmployeeInput, EmployeeStatus};
use crate::database::repositories::EmployeeRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::TenantContext;

#[derive(Debug, Deserialize)]
pub struct ListEmployeesQuery {
    pub status: Option<EmployeeStatus>,
}

pub async fn list_employees(
    tenant: TenantContext,
    repo: web::Data<EmployeeRepository>,
    query: web::Query<ListEmployeesQuery>,
) -> Result<HttpResponse, AppError> {
    let employees = match query.status {
        Some(status) => repo.list_by_status(tenant.business_id, status).await?,
        None => repo.list_employees(tenant.business_id).await?,
    };
    Ok(ApiResponse::success(employees))
}

pub async fn create_employee(
    tenant: TenantContext,
    repo: web::Data<EmployeeRepository>,
    input: web::Json<EmployeeInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    if input.name.trim().is_empty() {
        return Err(AppError::validation("employee name is required"));
    }
    if input.hourly_rate <= 0.0 {
        return Err(AppError::validation("hourly rate must be positive"));
    }

    let employee = repo.create_employee(tenant.business_id, input).await?;
    Ok(ApiResponse::created(employee))
}

pub async fn get_employee(
    tenant: TenantContext,
    repo: web::Data<EmployeeRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let employee = repo
        .get_employee(tenant.business_id, path.into_inner())
        .await?
        .ok_or_else(|| AppError::not_found("employee not found"))?;
    Ok(ApiResponse::success(employee))
}

pub async fn update_employee(
    tenant: TenantContext,
    repo: web::Data<EmployeeRepository>,
    path: web::Path<Uuid>,
    input: web::Json<EmployeeInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    if input.hourly_rate <= 0.0 {
        return Err(AppError::validation("hourly rate must be positive"));
    }

    let employee = repo
        .update_employee(tenant.business_id, path.into_inner(), input)
        .await?
        .ok_or_else(|| AppError::not_found("employee not found"))?;
    Ok(ApiResponse::success(employee))
}

pub async fn delete_employee(
    tenant: TenantContext,
    repo: web::Data<EmployeeRepository>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let deleted = repo
        .delete_employee(tenant.business_id, path.into_inner())
        .await?;
    if !deleted {
        return Err(AppError::not_found("employee not found"));
    }
    Ok(ApiResponse::message("employee deleted"))
}

#[derive(Debug, Deserialize)]
pub struct PinAuthRequest {
    pub pin: String,
}

/// Kiosk marker login: resolves an active employee by PIN within the tenant.
pub async fn authenticate_pin(
    tenant: TenantContext,
    repo: web::Data<EmployeeRepository>,
    input: web::Json<PinAuthRequest>,
) -> Result<HttpResponse, AppError> {
    let employee = repo
        .find_active_by_pin(tenant.business_id, &input.pin)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(ApiResponse::success(employee))
}
