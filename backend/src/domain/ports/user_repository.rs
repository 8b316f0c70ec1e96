//! Port for user persistence.

use async_trait::async_trait;

use crate::domain::user::{User, UserName};

/// Errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
}

impl UserRepositoryError {
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
}

/// Port for user storage and retrieval.
///
/// Users are immutable once created; the contract offers no update or delete.
/// Every insert stores `role = user` — no path creates an `admin`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All registered users, in unspecified order.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Persist a new user with a generated id and `role = user`.
    async fn insert(&self, name: UserName) -> Result<User, UserRepositoryError>;
}
