use cascadeflow_core::HttpError;
use http::StatusCode;
use thiserror::Error;

/// Errors wrapped with provider name, model, and status code where known
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider {provider} model {model} returned status {status}: {message}")]
    Upstream {
        provider: String,
        model: String,
        status: u16,
        message: String,
    },

    #[error("provider {provider} model {model} timed out")]
    Timeout { provider: String, model: String },

    #[error("provider {provider} is unavailable")]
    Unavailable { provider: String },
}

impl ProviderError {
    /// Whether a retry attempt is worth making for this failure
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable { .. })
            || matches!(self, Self::Upstream { status, .. } if *status >= 500)
    }
}

impl HttpError for ProviderError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Self::Upstream { .. } => "PROVIDER_UPSTREAM_ERROR",
            Self::Timeout { .. } => "PROVIDER_TIMEOUT",
            Self::Unavailable { .. } => "PROVIDER_UNAVAILABLE",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::Upstream { provider, model, status, .. } => {
                Some(serde_json::json!({ "provider": provider, "model": model, "status": status }))
            }
            Self::Timeout { provider, model } => Some(serde_json::json!({ "provider": provider, "model": model })),
            Self::Unavailable { provider } => Some(serde_json::json!({ "provider": provider })),
        }
    }
}
