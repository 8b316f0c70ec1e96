//! In-memory adapters for the persistence ports.
//!
//! The deterministic test double demanded by the store contract, and the
//! fallback backend when no database is configured. One mutex guards the
//! whole edge table, so `apply_preference` is trivially pairwise atomic: the
//! upsert-read-decide-write sequence runs entirely inside a single critical
//! section.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    RelationshipStore, RelationshipStoreError, UserRepository, UserRepositoryError,
};
use crate::domain::relationship::{
    Followup, PreferenceState, RelationshipEdge, RelationshipKind, RelationshipState,
    plan_followup,
};
use crate::domain::user::{User, UserId, UserName, UserRole};

#[derive(Debug, Default)]
struct EdgeTable {
    next_id: i64,
    edges: HashMap<(UserId, UserId, RelationshipKind), StoredEdge>,
}

#[derive(Debug, Clone, Copy)]
struct StoredEdge {
    id: i64,
    state: RelationshipState,
}

impl EdgeTable {
    fn upsert(
        &mut self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
        state: RelationshipState,
    ) -> RelationshipEdge {
        let next_id = &mut self.next_id;
        let stored = self
            .edges
            .entry((subject, object, kind))
            .and_modify(|edge| edge.state = state)
            .or_insert_with(|| {
                *next_id += 1;
                StoredEdge {
                    id: *next_id,
                    state,
                }
            });

        RelationshipEdge {
            id: stored.id,
            subject,
            object,
            state: stored.state,
            kind,
        }
    }

    fn find(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
    ) -> Option<RelationshipEdge> {
        self.edges
            .get(&(subject, object, kind))
            .map(|stored| RelationshipEdge {
                id: stored.id,
                subject,
                object,
                state: stored.state,
                kind,
            })
    }
}

/// In-memory implementation of the `RelationshipStore` port.
#[derive(Debug, Default)]
pub struct MemoryRelationshipStore {
    inner: Mutex<EdgeTable>,
}

impl MemoryRelationshipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EdgeTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RelationshipStore for MemoryRelationshipStore {
    async fn apply_preference(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
        desired: PreferenceState,
    ) -> Result<RelationshipEdge, RelationshipStoreError> {
        let mut table = self.lock();

        let forward = table.upsert(subject, object, kind, desired.into_state());
        let reverse_state = table.find(object, subject, kind).map(|edge| edge.state);

        match plan_followup(desired, reverse_state) {
            Some(Followup::Promote) => {
                let promoted = table.upsert(subject, object, kind, RelationshipState::Matched);
                table.upsert(object, subject, kind, RelationshipState::Matched);
                Ok(promoted)
            }
            Some(Followup::DemoteReverse) => {
                table.upsert(object, subject, kind, RelationshipState::Like);
                Ok(forward)
            }
            None => Ok(forward),
        }
    }

    async fn upsert_edge(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
        state: RelationshipState,
    ) -> Result<RelationshipEdge, RelationshipStoreError> {
        Ok(self.lock().upsert(subject, object, kind, state))
    }

    async fn find_edge(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
    ) -> Result<Option<RelationshipEdge>, RelationshipStoreError> {
        Ok(self.lock().find(subject, object, kind))
    }

    async fn list_edges_from(
        &self,
        subject: UserId,
    ) -> Result<Vec<RelationshipEdge>, RelationshipStoreError> {
        let table = self.lock();
        Ok(table
            .edges
            .iter()
            .filter(|((edge_subject, _, _), _)| *edge_subject == subject)
            .map(|(&(edge_subject, object, kind), stored)| RelationshipEdge {
                id: stored.id,
                subject: edge_subject,
                object,
                state: stored.state,
                kind,
            })
            .collect())
    }

    async fn count_edges(
        &self,
        subject: UserId,
        object: UserId,
        kind: RelationshipKind,
    ) -> Result<u64, RelationshipStoreError> {
        Ok(u64::from(self.lock().find(subject, object, kind).is_some()))
    }
}

/// In-memory implementation of the `UserRepository` port.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    inner: Mutex<UserTable>,
}

#[derive(Debug, Default)]
struct UserTable {
    next_id: i64,
    users: Vec<User>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, UserTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        Ok(self.lock().users.clone())
    }

    async fn insert(&self, name: UserName) -> Result<User, UserRepositoryError> {
        let mut table = self.lock();
        table.next_id += 1;
        let user = User {
            id: UserId::new(table.next_id),
            name,
            role: UserRole::User,
        };
        table.users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIND: RelationshipKind = RelationshipKind::Relationship;

    fn uid(id: i64) -> UserId {
        UserId::new(id)
    }

    #[tokio::test]
    async fn upsert_creates_then_overwrites_state_only() {
        let store = MemoryRelationshipStore::new();

        let created = store
            .upsert_edge(uid(1), uid(2), KIND, RelationshipState::Like)
            .await
            .expect("create edge");
        let overwritten = store
            .upsert_edge(uid(1), uid(2), KIND, RelationshipState::Dislike)
            .await
            .expect("overwrite edge");

        assert_eq!(created.id, overwritten.id);
        assert_eq!(overwritten.state, RelationshipState::Dislike);
        assert_eq!(
            store.count_edges(uid(1), uid(2), KIND).await.expect("count"),
            1
        );
    }

    #[tokio::test]
    async fn find_edge_is_exact_key() {
        let store = MemoryRelationshipStore::new();
        store
            .upsert_edge(uid(1), uid(2), KIND, RelationshipState::Like)
            .await
            .expect("create edge");

        assert!(
            store
                .find_edge(uid(2), uid(1), KIND)
                .await
                .expect("lookup")
                .is_none()
        );
        assert!(
            store
                .find_edge(uid(1), uid(2), RelationshipKind::Watch)
                .await
                .expect("lookup")
                .is_none()
        );
        assert!(
            store
                .find_edge(uid(1), uid(2), KIND)
                .await
                .expect("lookup")
                .is_some()
        );
    }

    #[tokio::test]
    async fn apply_preference_is_idempotent() {
        let store = MemoryRelationshipStore::new();

        let first = store
            .apply_preference(uid(1), uid(2), KIND, PreferenceState::Like)
            .await
            .expect("first application");
        let second = store
            .apply_preference(uid(1), uid(2), KIND, PreferenceState::Like)
            .await
            .expect("second application");

        assert_eq!(first.state, second.state);
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn mutual_likes_promote_both_edges() {
        let store = MemoryRelationshipStore::new();

        store
            .apply_preference(uid(1), uid(2), KIND, PreferenceState::Like)
            .await
            .expect("first like");
        let promoted = store
            .apply_preference(uid(2), uid(1), KIND, PreferenceState::Like)
            .await
            .expect("second like");

        assert_eq!(promoted.state, RelationshipState::Matched);
        let forward = store
            .find_edge(uid(1), uid(2), KIND)
            .await
            .expect("lookup")
            .expect("edge exists");
        assert_eq!(forward.state, RelationshipState::Matched);
    }

    #[tokio::test]
    async fn dislike_of_a_match_demotes_only_the_other_side() {
        let store = MemoryRelationshipStore::new();
        store
            .upsert_edge(uid(1), uid(2), KIND, RelationshipState::Matched)
            .await
            .expect("seed forward");
        store
            .upsert_edge(uid(2), uid(1), KIND, RelationshipState::Matched)
            .await
            .expect("seed reverse");

        let result = store
            .apply_preference(uid(1), uid(2), KIND, PreferenceState::Dislike)
            .await
            .expect("dislike");

        assert_eq!(result.state, RelationshipState::Dislike);
        let reverse = store
            .find_edge(uid(2), uid(1), KIND)
            .await
            .expect("lookup")
            .expect("edge exists");
        assert_eq!(reverse.state, RelationshipState::Like);
    }

    #[tokio::test]
    async fn listing_returns_exactly_the_subjects_edges() {
        let store = MemoryRelationshipStore::new();
        store
            .upsert_edge(uid(1), uid(2), KIND, RelationshipState::Like)
            .await
            .expect("seed");
        store
            .upsert_edge(uid(1), uid(3), KIND, RelationshipState::Dislike)
            .await
            .expect("seed");
        store
            .upsert_edge(uid(1), uid(2), RelationshipKind::Watch, RelationshipState::Like)
            .await
            .expect("seed");
        store
            .upsert_edge(uid(2), uid(1), KIND, RelationshipState::Like)
            .await
            .expect("seed");

        let edges = store.list_edges_from(uid(1)).await.expect("listing");

        // One per distinct (object, kind) pair ever written for the subject.
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|edge| edge.subject == uid(1)));
    }

    #[tokio::test]
    async fn concurrent_mutual_likes_always_converge_to_matched() {
        use std::sync::Arc;

        let store = Arc::new(MemoryRelationshipStore::new());
        let (a, b) = (Arc::clone(&store), Arc::clone(&store));

        let (first, second) = tokio::join!(
            tokio::spawn(
                async move { a.apply_preference(uid(1), uid(2), KIND, PreferenceState::Like).await }
            ),
            tokio::spawn(
                async move { b.apply_preference(uid(2), uid(1), KIND, PreferenceState::Like).await }
            ),
        );
        first.expect("task").expect("apply");
        second.expect("task").expect("apply");

        for (subject, object) in [(1, 2), (2, 1)] {
            let edge = store
                .find_edge(uid(subject), uid(object), KIND)
                .await
                .expect("lookup")
                .expect("edge exists");
            assert_eq!(edge.state, RelationshipState::Matched);
        }
    }

    #[tokio::test]
    async fn user_repository_generates_ids_and_pins_role() {
        let repo = MemoryUserRepository::new();

        let first = repo
            .insert(UserName::new("Ada").expect("valid name"))
            .await
            .expect("insert");
        let second = repo
            .insert(UserName::new("Grace").expect("valid name"))
            .await
            .expect("insert");

        assert_ne!(first.id, second.id);
        assert_eq!(first.role, UserRole::User);
        assert_eq!(repo.list().await.expect("list").len(), 2);
    }
}
