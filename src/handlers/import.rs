use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::TenantContext;
use crate::services::ImportService;
use crate::services::import::ImportRow;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub rows: Vec<ImportRow>,
}

/// Preview: tag every spreadsheet row with its employee match so the
/// operator can review fuzzy hits before anything is written.
pub async fn resolve(
    tenant: TenantContext,
    service: web::Data<ImportService>,
    input: web::Json<ResolveRequest>,
) -> Result<HttpResponse, AppError> {
    let resolutions = service.preview(tenant.business_id, &input.rows).await?;
    Ok(ApiResponse::success(resolutions))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub rows: Vec<ImportRow>,
    /// The operator reviewed the preview and accepts substring matches.
    #[serde(default)]
    pub confirm_fuzzy: bool,
}

pub async fn execute(
    tenant: TenantContext,
    service: web::Data<ImportService>,
    input: web::Json<ExecuteRequest>,
) -> Result<HttpResponse, AppError> {
    let input = input.into_inner();
    let outcome = service
        .execute(
            tenant.business_id,
            &input.rows,
            input.confirm_fuzzy,
            Utc::now().date_naive(),
        )
        .await?;
    Ok(ApiResponse::created(outcome))
}
