//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{User, UserId, UserName, UserRole};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to user repository errors.
fn map_pool_error(error: PoolError) -> UserRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to user repository errors.
fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserRepositoryError::connection("database connection error")
        }
        DieselError::NotFound => UserRepositoryError::query("record not found"),
        _ => UserRepositoryError::query("database error"),
    }
}

/// Convert a database row to a domain user, rejecting invalid stored values.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let role = UserRole::from_str(&row.role)
        .map_err(|err| UserRepositoryError::query(format!("unrecognised role value: {err}")))?;
    let name = UserName::new(row.name)
        .map_err(|err| UserRepositoryError::query(format!("invalid stored user name: {err}")))?;

    Ok(User {
        id: UserId::new(row.id),
        name,
        role,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn insert(&self, name: UserName) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Role is pinned here: the repository offers no way to store anything
        // other than `user`.
        let row: UserRow = diesel::insert_into(users::table)
            .values(NewUserRow {
                name: name.as_ref(),
                role: UserRole::User.as_str(),
            })
            .returning(UserRow::as_select())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row)
    }
}
