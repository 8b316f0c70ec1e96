//! Persistence adapters for the relationship store and user repository.
//!
//! Two implementations exist per port: a Diesel/PostgreSQL adapter for
//! production and an in-memory adapter used as the deterministic test double
//! (and as a fallback when no database is configured).

mod diesel_relationship_store;
mod diesel_user_repository;
mod memory;
mod models;
mod pool;
pub(crate) mod schema;

pub use self::diesel_relationship_store::DieselRelationshipStore;
pub use self::diesel_user_repository::DieselUserRepository;
pub use self::memory::{MemoryRelationshipStore, MemoryUserRepository};
pub use self::pool::{DbPool, PoolConfig, PoolError};
