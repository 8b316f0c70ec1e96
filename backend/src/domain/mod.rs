//! Domain model and services.
//!
//! Everything in this module is transport and storage agnostic. Adapters
//! depend on the ports defined in [`ports`]; the domain never depends on an
//! adapter.

pub mod error;
mod matchmaking_service;
pub mod ports;
pub mod relationship;
pub mod user;
mod user_directory_service;

pub use self::error::{Error, ErrorCode};
pub use self::matchmaking_service::MatchmakingService;
pub use self::relationship::{
    Followup, ParseStateError, PreferenceState, RelationshipEdge, RelationshipKind,
    RelationshipState, plan_followup,
};
pub use self::user::{USER_NAME_MAX, User, UserId, UserName, UserRole, UserValidationError};
pub use self::user_directory_service::UserDirectoryService;
