use cascadeflow_core::HttpError;
use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no model in the cost book is suitable for this query")]
    NoSuitableModel,

    #[error("every step in the cascade chain failed")]
    AllCascadeStepsFailed,
}

impl HttpError for RoutingError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoSuitableModel => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AllCascadeStepsFailed => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Self::NoSuitableModel => "NO_SUITABLE_MODEL",
            Self::AllCascadeStepsFailed => "ALL_CASCADE_STEPS_FAILED",
        }
    }
}
