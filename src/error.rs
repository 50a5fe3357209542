use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 套餐额度用尽，前端应展示升级提示
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Stripe error: {0}")]
    StripeError(#[from] stripe::StripeError),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::ExternalApiError(_)
            | AppError::ReqwestError(_)
            | AppError::StripeError(_) => "EXTERNAL_API_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (actix_web::http::StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (actix_web::http::StatusCode::UNAUTHORIZED, msg.clone())
            }
            AppError::JwtError(err) => {
                log::warn!("JWT error: {err}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "Invalid token".to_string(),
                )
            }
            AppError::NotFound(msg) => (actix_web::http::StatusCode::NOT_FOUND, msg.clone()),
            AppError::QuotaExceeded(msg) => {
                log::info!("Quota exceeded: {msg}");
                (actix_web::http::StatusCode::FORBIDDEN, msg.clone())
            }
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "Forbidden".to_string(),
                )
            }
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) | AppError::StripeError(_) => {
                log::error!("External API error: {self}");
                (
                    actix_web::http::StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_quota_exceeded_is_forbidden() {
        let err = AppError::QuotaExceeded("Search limit reached".into());
        assert_eq!(err.code(), "QUOTA_EXCEEDED");
        assert_eq!(err.error_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_not_found_status() {
        let err = AppError::NotFound("User not found".into());
        assert_eq!(err.error_response().status(), StatusCode::NOT_FOUND);
    }
}
