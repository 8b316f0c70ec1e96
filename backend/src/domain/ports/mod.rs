//! Ports connecting the domain to its adapters.
//!
//! Driven ports ([`RelationshipStore`], [`UserRepository`]) are implemented
//! by outbound adapters; driving ports ([`RelationshipCommand`],
//! [`RelationshipQuery`], [`UsersQuery`], [`UserOnboarding`]) are implemented
//! by domain services and consumed by the HTTP adapter.

pub mod matchmaking;
pub mod relationship_store;
pub mod user_repository;

pub use self::matchmaking::{
    RelationshipCommand, RelationshipQuery, SetPreference, UserOnboarding, UsersQuery,
};
pub use self::relationship_store::{RelationshipStore, RelationshipStoreError};
pub use self::user_repository::{UserRepository, UserRepositoryError};

#[cfg(test)]
pub use self::relationship_store::MockRelationshipStore;
#[cfg(test)]
pub use self::user_repository::MockUserRepository;
