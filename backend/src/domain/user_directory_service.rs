//! User directory service.
//!
//! Listing and registration over a [`UserRepository`]. Registration carries
//! the role-forcing invariant: the service accepts only a validated name, so
//! a caller-supplied role can never reach storage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::error::Error;
use crate::domain::ports::{UserOnboarding, UserRepository, UserRepositoryError, UsersQuery};
use crate::domain::user::{User, UserName};

/// Directory service over a [`UserRepository`].
#[derive(Clone)]
pub struct UserDirectoryService<R> {
    users: Arc<R>,
}

impl<R> UserDirectoryService<R> {
    /// Create a new service with the given repository.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

impl<R> UserDirectoryService<R>
where
    R: UserRepository,
{
    fn map_repository_error(error: UserRepositoryError) -> Error {
        match error {
            UserRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserRepositoryError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
        }
    }
}

#[async_trait]
impl<R> UsersQuery for UserDirectoryService<R>
where
    R: UserRepository,
{
    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(Self::map_repository_error)
    }
}

#[async_trait]
impl<R> UserOnboarding for UserDirectoryService<R>
where
    R: UserRepository,
{
    async fn register_user(&self, name: UserName) -> Result<User, Error> {
        debug!(name = %name, "registering user");
        self.users
            .insert(name)
            .await
            .map_err(Self::map_repository_error)
    }
}
