use cascadeflow_core::HttpError;
use cascadeflow_provider::ProviderError;
use cascadeflow_routing::RoutingError;
use http::StatusCode;
use thiserror::Error;

/// Terminal error surfaced to the HTTP layer by `process_query`
///
/// Propagation policy: lower layers never swallow errors to hide them; this
/// type is where the taxonomy converges before mapping to an HTTP response.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("request content must not be empty")]
    InvalidInput,

    #[error("daily budget exhausted: {spent:.2} of {limit:.2}")]
    BudgetExceeded { spent: f64, limit: f64 },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("no provider is registered for {provider}")]
    UnknownProvider { provider: String },
}

impl HttpError for OrchestratorError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::BudgetExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Provider(e) => e.status_code(),
            Self::Routing(e) => e.status_code(),
            Self::UnknownProvider { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::BudgetExceeded { .. } => "BUDGET_EXCEEDED",
            Self::Provider(e) => e.error_code(),
            Self::Routing(e) => e.error_code(),
            Self::UnknownProvider { .. } => "INTERNAL_ERROR",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::BudgetExceeded { spent, limit } => Some(serde_json::json!({ "spent": spent, "limit": limit })),
            Self::Provider(e) => e.details(),
            Self::Routing(e) => e.details(),
            Self::InvalidInput | Self::UnknownProvider { .. } => None,
        }
    }
}
