use cascadeflow_core::HttpError;
use http::StatusCode;
use thiserror::Error;

/// Errors returned while admitting a request against the budget
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Daily spend has reached or exceeded 100% of the configured limit
    #[error("daily budget exceeded")]
    Exceeded,
}

impl HttpError for BudgetError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Exceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Self::Exceeded => "BUDGET_EXCEEDED",
        }
    }
}
