//! Relationship reconciliation service.
//!
//! Implements the driving ports for preference updates. The transition rules
//! themselves live in [`crate::domain::relationship::plan_followup`] and are
//! executed atomically by the store; this service contributes validation (by
//! way of the closed [`PreferenceState`] input type), orchestration, and the
//! mapping from store errors to domain errors.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::error::Error;
use crate::domain::ports::{
    RelationshipCommand, RelationshipQuery, RelationshipStore, RelationshipStoreError,
    SetPreference,
};
use crate::domain::relationship::{RelationshipEdge, RelationshipKind};
use crate::domain::user::UserId;

/// Reconciliation service over a [`RelationshipStore`].
#[derive(Clone)]
pub struct MatchmakingService<S> {
    store: Arc<S>,
}

impl<S> MatchmakingService<S> {
    /// Create a new service with the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> MatchmakingService<S>
where
    S: RelationshipStore,
{
    fn map_store_error(error: RelationshipStoreError) -> Error {
        match error {
            RelationshipStoreError::Connection { message } => {
                Error::service_unavailable(format!("relationship store unavailable: {message}"))
            }
            RelationshipStoreError::Query { message } => {
                Error::internal(format!("relationship store error: {message}"))
            }
            RelationshipStoreError::MissingUser { message } => {
                Error::not_found(format!("no such user: {message}"))
            }
        }
    }
}

#[async_trait]
impl<S> RelationshipCommand for MatchmakingService<S>
where
    S: RelationshipStore,
{
    async fn set_preference(&self, request: SetPreference) -> Result<RelationshipEdge, Error> {
        let SetPreference {
            subject,
            object,
            desired,
        } = request;
        debug!(%subject, %object, desired = %desired, "applying preference");

        self.store
            .apply_preference(subject, object, RelationshipKind::Relationship, desired)
            .await
            .map_err(Self::map_store_error)
    }
}

#[async_trait]
impl<S> RelationshipQuery for MatchmakingService<S>
where
    S: RelationshipStore,
{
    async fn list_for_user(&self, subject: UserId) -> Result<Vec<RelationshipEdge>, Error> {
        self.store
            .list_edges_from(subject)
            .await
            .map_err(Self::map_store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockRelationshipStore;
    use crate::domain::relationship::{PreferenceState, RelationshipState};

    fn edge(subject: i64, object: i64, state: RelationshipState) -> RelationshipEdge {
        RelationshipEdge {
            id: 1,
            subject: UserId::new(subject),
            object: UserId::new(object),
            state,
            kind: RelationshipKind::Relationship,
        }
    }

    #[tokio::test]
    async fn set_preference_targets_the_relationship_kind() {
        let mut store = MockRelationshipStore::new();
        store
            .expect_apply_preference()
            .withf(|subject, object, kind, desired| {
                *subject == UserId::new(1)
                    && *object == UserId::new(2)
                    && *kind == RelationshipKind::Relationship
                    && *desired == PreferenceState::Like
            })
            .times(1)
            .return_once(|_, _, _, _| Ok(edge(1, 2, RelationshipState::Like)));

        let service = MatchmakingService::new(Arc::new(store));
        let result = service
            .set_preference(SetPreference {
                subject: UserId::new(1),
                object: UserId::new(2),
                desired: PreferenceState::Like,
            })
            .await
            .expect("preference applies");

        assert_eq!(result.state, RelationshipState::Like);
        assert_eq!(result.object, UserId::new(2));
    }

    #[tokio::test]
    async fn connection_failure_surfaces_as_service_unavailable() {
        let mut store = MockRelationshipStore::new();
        store
            .expect_apply_preference()
            .return_once(|_, _, _, _| Err(RelationshipStoreError::connection("refused")));

        let service = MatchmakingService::new(Arc::new(store));
        let error = service
            .set_preference(SetPreference {
                subject: UserId::new(1),
                object: UserId::new(2),
                desired: PreferenceState::Dislike,
            })
            .await
            .expect_err("connection failure");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn missing_user_surfaces_as_not_found() {
        let mut store = MockRelationshipStore::new();
        store
            .expect_apply_preference()
            .return_once(|_, _, _, _| Err(RelationshipStoreError::missing_user("user 9")));

        let service = MatchmakingService::new(Arc::new(store));
        let error = service
            .set_preference(SetPreference {
                subject: UserId::new(1),
                object: UserId::new(9),
                desired: PreferenceState::Like,
            })
            .await
            .expect_err("unknown target");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn query_failure_surfaces_as_internal() {
        let mut store = MockRelationshipStore::new();
        store
            .expect_list_edges_from()
            .return_once(|_| Err(RelationshipStoreError::query("bad statement")));

        let service = MatchmakingService::new(Arc::new(store));
        let error = service
            .list_for_user(UserId::new(1))
            .await
            .expect_err("query failure");

        assert_eq!(error.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn list_for_user_returns_store_edges() {
        let mut store = MockRelationshipStore::new();
        store.expect_list_edges_from().return_once(|_| {
            Ok(vec![
                edge(1, 2, RelationshipState::Matched),
                edge(1, 3, RelationshipState::Like),
            ])
        });

        let service = MatchmakingService::new(Arc::new(store));
        let edges = service
            .list_for_user(UserId::new(1))
            .await
            .expect("listing succeeds");

        assert_eq!(edges.len(), 2);
        assert!(edges.iter().all(|e| e.subject == UserId::new(1)));
    }
}
