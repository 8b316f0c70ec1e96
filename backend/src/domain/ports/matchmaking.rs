//! Driving ports consumed by inbound adapters.
//!
//! HTTP handlers depend on these traits rather than on concrete services so
//! they remain testable without I/O.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::relationship::{PreferenceState, RelationshipEdge};
use crate::domain::user::{User, UserId, UserName};

/// One desired-state change from a requesting user toward a target user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetPreference {
    /// The requesting user.
    pub subject: UserId,
    /// The target user.
    pub object: UserId,
    /// The preference being expressed. `matched` is unrepresentable here.
    pub desired: PreferenceState,
}

/// Apply preference updates, reconciling the affected edge pair.
#[async_trait]
pub trait RelationshipCommand: Send + Sync {
    /// Reconcile one preference update and return the authoritative forward
    /// edge.
    async fn set_preference(&self, request: SetPreference) -> Result<RelationshipEdge, Error>;
}

/// Read access to a user's outgoing relationship edges.
#[async_trait]
pub trait RelationshipQuery: Send + Sync {
    /// All edges whose subject is `subject`, in unspecified order.
    async fn list_for_user(&self, subject: UserId) -> Result<Vec<RelationshipEdge>, Error>;
}

/// Read access to the user directory.
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// All registered users.
    async fn list_users(&self) -> Result<Vec<User>, Error>;
}

/// Register new users.
#[async_trait]
pub trait UserOnboarding: Send + Sync {
    /// Create a user with the given name. The stored role is always `user`;
    /// callers cannot influence it.
    async fn register_user(&self, name: UserName) -> Result<User, Error>;
}
