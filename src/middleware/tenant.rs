use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::error::AppError;

/// Tenant identity for the request, taken from the `x-business-id` header the
/// session layer stamps on every call. Every handler extracts this and every
/// repository call is scoped by it; a request without a resolvable tenant
/// never reaches a handler body.
#[derive(Clone, Debug)]
pub struct TenantContext {
    pub business_id: Uuid,
}

impl FromRequest for TenantContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let business_id = req
            .headers()
            .get("x-business-id")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok());

        ready(match business_id {
            Some(business_id) => Ok(TenantContext { business_id }),
            None => Err(AppError::Unauthorized.into()),
        })
    }
}
