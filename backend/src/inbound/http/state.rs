//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on domain ports and remain testable without I/O. No global or
//! request-scoped registry exists; dependencies are passed explicitly.

use std::sync::Arc;

use crate::domain::ports::{RelationshipCommand, RelationshipQuery, UserOnboarding, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UsersQuery>,
    pub onboarding: Arc<dyn UserOnboarding>,
    pub relationships: Arc<dyn RelationshipCommand>,
    pub relationships_query: Arc<dyn RelationshipQuery>,
}

impl HttpState {
    /// Construct state from the four driving ports.
    pub fn new(
        users: Arc<dyn UsersQuery>,
        onboarding: Arc<dyn UserOnboarding>,
        relationships: Arc<dyn RelationshipCommand>,
        relationships_query: Arc<dyn RelationshipQuery>,
    ) -> Self {
        Self {
            users,
            onboarding,
            relationships,
            relationships_query,
        }
    }
}
