use http::StatusCode;
use serde_json::Value;

/// Maps one domain error onto the wire error contract every route handler
/// returns: `{error, code, message, statusCode, details?}`.
///
/// Each subsystem crate (`cascadeflow-budget`, `cascadeflow-provider`, ...)
/// implements this once on its own error enum instead of hand-rolling an
/// axum `IntoResponse` per variant; `cascadeflow-server` holds the single
/// place that actually builds an HTTP response from it.
pub trait HttpError: std::error::Error {
    /// HTTP status this error maps to
    fn status_code(&self) -> StatusCode;

    /// Machine-readable code a client can match on, e.g. `BUDGET_EXCEEDED`
    fn error_code(&self) -> &str;

    /// Message safe to show an API consumer. Defaults to the error's
    /// `Display` impl; override when that text leaks internal detail.
    fn client_message(&self) -> String {
        self.to_string()
    }

    /// Structured context for the `details` field of the error body, e.g.
    /// `{"spent": 4.99, "limit": 5.0}` for a budget rejection. Most errors
    /// have none.
    fn details(&self) -> Option<Value> {
        None
    }
}
