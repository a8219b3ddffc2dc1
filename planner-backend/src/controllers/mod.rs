pub mod dashboard;
pub mod health;
pub mod notes;
pub mod tasks;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use planner_types::StatusResponse;
use thiserror::Error;

use crate::store::StoreError;

/// Any request failure. The dashboard only distinguishes success from
/// failure, so every variant renders as a bare 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        log::error!("[API] {}", self);
        HttpResponse::InternalServerError().finish()
    }
}

pub type ApiResult = Result<HttpResponse, ApiError>;

/// JSON extractor settings: bad bodies become 500 rather than actix's 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::MalformedRequest(err.to_string()).into())
}

fn success() -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse::success())
}
