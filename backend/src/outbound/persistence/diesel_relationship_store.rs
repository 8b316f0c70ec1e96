//! PostgreSQL-backed `RelationshipStore` implementation using Diesel.
//!
//! [`RelationshipStore::apply_preference`] runs inside a transaction that
//! first takes `pg_advisory_xact_lock` on a key derived from the unordered
//! user pair and kind. Concurrent reconciliations touching the same pair are
//! serialised; unrelated pairs proceed concurrently. The transaction spans
//! the forward upsert, the reverse read, and every follow-up write, so an
//! aborted call never leaves a promotion half-written.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{RelationshipStore, RelationshipStoreError};
use crate::domain::relationship::{
    Followup, PreferenceState, RelationshipEdge, RelationshipKind, RelationshipState,
    plan_followup,
};
use crate::domain::user::UserId;

use super::models::{NewRelationshipRow, RelationshipRow};
use super::pool::{DbPool, PoolError};
use super::schema::relationships;

/// Diesel-backed implementation of the `RelationshipStore` port.
#[derive(Clone)]
pub struct DieselRelationshipStore {
    pool: DbPool,
}

impl DieselRelationshipStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to relationship store errors.
fn map_pool_error(error: PoolError) -> RelationshipStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RelationshipStoreError::connection(message)
        }
    }
}

/// Map Diesel errors to relationship store errors.
fn map_diesel_error(error: diesel::result::Error) -> RelationshipStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            RelationshipStoreError::missing_user(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RelationshipStoreError::connection("database connection error")
        }
        DieselError::NotFound => RelationshipStoreError::query("record not found"),
        _ => RelationshipStoreError::query("database error"),
    }
}

impl From<diesel::result::Error> for RelationshipStoreError {
    fn from(error: diesel::result::Error) -> Self {
        map_diesel_error(error)
    }
}

fn parse_state(value: &str) -> Result<RelationshipState, RelationshipStoreError> {
    RelationshipState::from_str(value)
        .map_err(|err| RelationshipStoreError::query(format!("unrecognised state value: {err}")))
}

/// Convert a database row to a domain edge, rejecting out-of-set tag values.
fn row_to_edge(row: RelationshipRow) -> Result<RelationshipEdge, RelationshipStoreError> {
    let state = parse_state(&row.state)?;
    let kind = RelationshipKind::from_str(&row.kind)
        .map_err(|err| RelationshipStoreError::query(format!("unrecognised kind value: {err}")))?;

    Ok(RelationshipEdge {
        id: row.id,
        subject: UserId::new(row.subject),
        object: UserId::new(row.object),
        state,
        kind,
    })
}

/// Advisory lock key for one unordered user pair and kind.
///
/// Symmetric in the two users so both directions contend on the same key.
/// A collision between distinct pairs serialises unrelated reconciliations;
/// it never affects correctness.
fn pair_lock_key(subject: UserId, object: UserId, kind: RelationshipKind) -> i64 {
    let (a, b) = (subject.as_i64(), object.as_i64());
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let kind_tag: u64 = match kind {
        RelationshipKind::Relationship => 0,
        RelationshipKind::Watch => 1,
    };

    let mixed = (lo as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .rotate_left(31)
        .wrapping_add((hi as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F))
        .wrapping_add(kind_tag);
    mixed as i64
}

/// Upsert one edge on an open connection, returning the stored row.
async fn upsert_edge_on(
    conn: &mut AsyncPgConnection,
    subject: UserId,
    object: UserId,
    kind: RelationshipKind,
    state: RelationshipState,
) -> Result<RelationshipRow, diesel::result::Error> {
    diesel::insert_into(relationships::table)
        .values(NewRelationshipRow {
            subject: subject.as_i64(),
            object: object.as_i64(),
            state: state.as_str(),
            kind: kind.as_str(),
        })
        .on_conflict((
            relationships::subject,
            relationships::object,
            relationships::kind,
        ))
        .do_update()
        .set(relationships::state.eq(state.as_str()))
        .returning(RelationshipRow::as_select())
        .get_result(conn)
        .await
}

/// Exact-key lookup on an open connection.
async fn find_edge_on(
    conn: &mut AsyncPgConnection,
    subject: UserId,
    object: UserId,
    kind: RelationshipKind,
) -> Result<Option<RelationshipRow>, diesel::result::Error> {
    relationships::table
        .filter(relationships::subject.eq(subject.as_i64()))
        .filter(relationships::object.eq(object.as_i64()))
        .filter(relationships::kind.eq(kind.as_str()))
        .select(RelationshipRow::as_select())
        .first(conn)
        .await
        .optional()
}

#[async_trait]
impl RelationshipStore for DieselRelationshipStore {
    async fn apply_preference(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
        desired: PreferenceState,
    ) -> Result<RelationshipEdge, RelationshipStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let lock_key = pair_lock_key(subject, object, kind);

        conn.transaction::<RelationshipEdge, RelationshipStoreError, _>(|conn| {
            async move {
                diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
                    .bind::<BigInt, _>(lock_key)
                    .execute(conn)
                    .await?;

                let forward =
                    upsert_edge_on(conn, subject, object, kind, desired.into_state()).await?;
                let reverse = find_edge_on(conn, object, subject, kind).await?;
                let reverse_state = reverse
                    .as_ref()
                    .map(|row| parse_state(&row.state))
                    .transpose()?;

                match plan_followup(desired, reverse_state) {
                    Some(Followup::Promote) => {
                        let promoted =
                            upsert_edge_on(conn, subject, object, kind, RelationshipState::Matched)
                                .await?;
                        upsert_edge_on(conn, object, subject, kind, RelationshipState::Matched)
                            .await?;
                        row_to_edge(promoted)
                    }
                    Some(Followup::DemoteReverse) => {
                        upsert_edge_on(conn, object, subject, kind, RelationshipState::Like)
                            .await?;
                        row_to_edge(forward)
                    }
                    None => row_to_edge(forward),
                }
            }
            .scope_boxed()
        })
        .await
    }

    async fn upsert_edge(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
        state: RelationshipState,
    ) -> Result<RelationshipEdge, RelationshipStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = upsert_edge_on(&mut conn, subject, object, kind, state)
            .await
            .map_err(map_diesel_error)?;
        row_to_edge(row)
    }

    async fn find_edge(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
    ) -> Result<Option<RelationshipEdge>, RelationshipStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = find_edge_on(&mut conn, subject, object, kind)
            .await
            .map_err(map_diesel_error)?;
        row.map(row_to_edge).transpose()
    }

    async fn list_edges_from(
        &self,
        subject: UserId,
    ) -> Result<Vec<RelationshipEdge>, RelationshipStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RelationshipRow> = relationships::table
            .filter(relationships::subject.eq(subject.as_i64()))
            .select(RelationshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_edge).collect()
    }

    async fn count_edges(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
    ) -> Result<u64, RelationshipStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = relationships::table
            .filter(relationships::subject.eq(subject.as_i64()))
            .filter(relationships::object.eq(object.as_i64()))
            .filter(relationships::kind.eq(kind.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}
