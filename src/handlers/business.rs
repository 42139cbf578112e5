use actix_web::{HttpResponse, web};

use crate::database::models::BusinessSettingsInput;
use crate::database::repositories::BusinessRepository;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::TenantContext;

pub async fn get_settings(
    tenant: TenantContext,
    repo: web::Data<BusinessRepository>,
) -> Result<HttpResponse, AppError> {
    let business = repo
        .get_business(tenant.business_id)
        .await?
        .ok_or_else(|| AppError::not_found("business not found"))?;
    Ok(ApiResponse::success(business))
}

pub async fn update_settings(
    tenant: TenantContext,
    repo: web::Data<BusinessRepository>,
    input: web::Json<BusinessSettingsInput>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    if input.default_overtime_multiplier < 1.0 {
        return Err(AppError::validation(
            "overtime multiplier cannot be below 1.0",
        ));
    }

    let business = repo
        .update_settings(tenant.business_id, input)
        .await?
        .ok_or_else(|| AppError::not_found("business not found"))?;
    Ok(ApiResponse::success(business))
}
