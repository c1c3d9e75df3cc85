//! Shared primitives for the cascadeflow routing core
//!
//! Kept deliberately small: an `HttpError` trait every subsystem's error
//! type implements, rounding conventions for money, and identifier/time
//! newtypes. Everything domain-specific lives in its own crate.

#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod ids;
pub mod money;
pub mod time;

pub use error::HttpError;
pub use ids::{ArtifactId, EventId, QueryId, new_id};
