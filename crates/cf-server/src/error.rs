use axum::Json;
use axum::response::{IntoResponse, Response};
use cascadeflow_core::HttpError;
use serde::Serialize;

/// `{error, code, message, statusCode, details?}` error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Wraps any domain error implementing [`HttpError`] so it can be returned
/// directly from an axum handler
pub struct ApiError(Box<dyn HttpError>);

impl<E: HttpError + 'static> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(Box::new(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let body = ErrorBody {
            error: self.0.error_code().to_owned(),
            code: self.0.error_code().to_owned(),
            message: self.0.client_message(),
            status_code: status.as_u16(),
            details: self.0.details(),
        };
        (status, Json(body)).into_response()
    }
}
