use thiserror::Error;

/// Errors a [`crate::CacheBackend`] can report
///
/// Per the failure model, backend errors never abort a request: callers
/// convert them to a cache miss and log, rather than propagating them as
/// `cf_core::HttpError`.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend: {0}")]
    Backend(String),
}
