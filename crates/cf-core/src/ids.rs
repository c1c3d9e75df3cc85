//! Identifier newtypes shared across the routing core

use uuid::Uuid;

/// Identifies one client query end-to-end through classification, cache,
/// routing, cascade execution, and artifact/event emission
pub type QueryId = Uuid;

/// Identifies a single stored [`RoutingArtifact`](../cf_artifacts)
pub type ArtifactId = Uuid;

/// Identifies a single analytics event
pub type EventId = Uuid;

/// Mint a fresh identifier
#[must_use]
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}
