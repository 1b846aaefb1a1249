//! 服務錯誤對應到 HTTP 回應

use crate::utils::error::ServiceError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 所有驗證失敗共用的固定訊息
pub const VALIDATION_ERRORS: &str = "validation errors";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// 路徑中的 id 無法解析為整數
    #[error("{0} not found")]
    UnknownRoute(&'static str),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Service(ServiceError::NotFound { .. }) | ApiError::UnknownRoute(_) => {
                let body = Json(json!({ "error": self.to_string() }));
                (StatusCode::NOT_FOUND, body).into_response()
            }
            ApiError::Service(err) if err.is_client_error() => {
                tracing::debug!("Rejected request: {}", err);
                validation_errors()
            }
            ApiError::BadRequest(reason) => {
                tracing::debug!("Rejected request body: {}", reason);
                validation_errors()
            }
            ApiError::Service(err) => {
                tracing::error!(
                    "Request failed: {} (Category: {:?}, Severity: {:?})",
                    err,
                    err.category(),
                    err.severity()
                );
                let body = Json(json!({ "error": "Internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

fn validation_errors() -> Response {
    let body = Json(json!({ "errors": [VALIDATION_ERRORS] }));
    (StatusCode::BAD_REQUEST, body).into_response()
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                ApiError::Service(ServiceError::NotFound { entity: "Pizza" }),
                StatusCode::NOT_FOUND,
            ),
            (ApiError::UnknownRoute("Restaurant"), StatusCode::NOT_FOUND),
            (
                ApiError::Service(ServiceError::validation("price out of range")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Service(ServiceError::integrity("unknown pizza")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::BadRequest("EOF while parsing".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Service(ServiceError::InconsistentData {
                    message: "restaurant_pizza 1 references missing pizza 1".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Service(ServiceError::BlockingTaskError {
                    message: "sqlite worker cancelled".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let label = err.to_string();
            assert_eq!(err.into_response().status(), expected, "{}", label);
        }
    }
}
