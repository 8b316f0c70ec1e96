//! Port for relationship edge persistence.
//!
//! The [`RelationshipStore`] trait is the storage contract the reconciliation
//! rules depend on: idempotent upsert-by-identity, lookup-by-identity, and a
//! pairwise-atomic preference application. Exactly two adapters implement it:
//! the Diesel/PostgreSQL store and the in-memory test double.

use async_trait::async_trait;

use crate::domain::relationship::{
    PreferenceState, RelationshipEdge, RelationshipKind, RelationshipState,
};
use crate::domain::user::UserId;

/// Errors raised by relationship store adapters.
///
/// Absence of an edge is never an error; lookups signal it with `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelationshipStoreError {
    /// Store connection could not be established.
    #[error("relationship store connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("relationship store query failed: {message}")]
    Query { message: String },

    /// A write referenced a user that does not exist.
    #[error("relationship endpoint does not exist: {message}")]
    MissingUser { message: String },
}

impl RelationshipStoreError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a missing-user error with the given message.
    pub fn missing_user(message: impl Into<String>) -> Self {
        Self::MissingUser {
            message: message.into(),
        }
    }
}

/// Port for relationship edge storage.
///
/// The edge identity key is `(subject, object, kind)`: at most one edge
/// exists per ordered pair per kind, and a later write to the same key
/// overwrites `state` only. Edges are never deleted.
///
/// # Atomicity
///
/// [`RelationshipStore::apply_preference`] must execute its whole
/// upsert-read-decide-write sequence under mutual exclusion with every other
/// concurrent call touching the same unordered user pair, so that one of two
/// near-simultaneous mutual likes deterministically performs the match
/// promotion and the other observes the promoted result. Distinct pairs need
/// no coordination.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Apply a desired preference from `subject` toward `object` as one
    /// atomic unit and return the final forward edge.
    ///
    /// The sequence: upsert the forward edge to `desired`, read the reverse
    /// edge, consult [`crate::domain::relationship::plan_followup`], perform
    /// any follow-up writes. A failure rolls the whole unit back; a promotion
    /// can never be left half-written.
    async fn apply_preference(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
        desired: PreferenceState,
    ) -> Result<RelationshipEdge, RelationshipStoreError>;

    /// Create the edge if absent, otherwise overwrite its state only.
    ///
    /// Safe to call repeatedly with the same arguments.
    async fn upsert_edge(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
        state: RelationshipState,
    ) -> Result<RelationshipEdge, RelationshipStoreError>;

    /// Exact-key lookup; `None` when no edge exists for the key.
    async fn find_edge(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
    ) -> Result<Option<RelationshipEdge>, RelationshipStoreError>;

    /// All edges whose subject matches, in unspecified order.
    async fn list_edges_from(
        &self,
        subject: UserId,
    ) -> Result<Vec<RelationshipEdge>, RelationshipStoreError>;

    /// Exact-key cardinality (0 or 1 given the identity-key uniqueness).
    async fn count_edges(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
    ) -> Result<u64, RelationshipStoreError>;
}
