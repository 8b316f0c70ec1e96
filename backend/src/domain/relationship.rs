//! Relationship model and the pure reconciliation rules.
//!
//! A relationship between two users is represented by two independent
//! directed edges, `(u -> v)` and `(v -> u)`. Symmetry, where it exists, is
//! produced by the rules in [`plan_followup`] and never by storage.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::UserId;

/// Error returned when a tag value falls outside its closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised tag value: {value}")]
pub struct ParseStateError {
    value: String,
}

impl ParseStateError {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The offending input.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

/// State carried by a stored relationship edge.
///
/// `Matched` is reachable only through mutual promotion; it is never a legal
/// direct input (see [`PreferenceState`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipState {
    Like,
    Dislike,
    Matched,
}

impl RelationshipState {
    /// Stable lowercase tag used on the wire and in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Matched => "matched",
        }
    }
}

impl std::str::FromStr for RelationshipState {
    type Err = ParseStateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            "matched" => Ok(Self::Matched),
            other => Err(ParseStateError::new(other)),
        }
    }
}

impl fmt::Display for RelationshipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a relationship edge.
///
/// Only `Relationship` is exercised by the reconciliation rules; `Watch` is
/// reserved as a valid tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Relationship,
    Watch,
}

impl RelationshipKind {
    /// Stable lowercase tag used on the wire and in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relationship => "relationship",
            Self::Watch => "watch",
        }
    }
}

impl std::str::FromStr for RelationshipKind {
    type Err = ParseStateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "relationship" => Ok(Self::Relationship),
            "watch" => Ok(Self::Watch),
            other => Err(ParseStateError::new(other)),
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired state accepted from callers.
///
/// This is the validation boundary demanded by the reconciliation rules: the
/// closed set excludes `matched`, so an explicit attempt to set it fails at
/// parse time and can never reach a service or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceState {
    Like,
    Dislike,
}

impl PreferenceState {
    /// The edge state this preference writes.
    pub const fn into_state(self) -> RelationshipState {
        match self {
            Self::Like => RelationshipState::Like,
            Self::Dislike => RelationshipState::Dislike,
        }
    }

    /// Stable lowercase tag used on the wire.
    pub const fn as_str(self) -> &'static str {
        self.into_state().as_str()
    }
}

impl std::str::FromStr for PreferenceState {
    type Err = ParseStateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            other => Err(ParseStateError::new(other)),
        }
    }
}

impl fmt::Display for PreferenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed relationship record from `subject` to `object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RelationshipEdge {
    pub id: i64,
    pub subject: UserId,
    pub object: UserId,
    pub state: RelationshipState,
    pub kind: RelationshipKind,
}

/// Follow-up writes owed after the forward edge has been set to the desired
/// state and the reverse edge has been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// Both edges of the pair are promoted to `matched`.
    Promote,
    /// The reverse edge alone is downgraded from `matched` to `like`.
    ///
    /// Deliberately asymmetric: the disliking side keeps `dislike` while the
    /// other side reverts to a pending `like` without being notified.
    DemoteReverse,
}

/// Decide the follow-up writes for one preference application.
///
/// Called after the forward edge holds `desired`, with the reverse edge state
/// as observed inside the same atomic unit (`None` when the reverse edge does
/// not exist). First match wins:
///
/// - `like` meeting a reverse `like` promotes both edges to `matched`;
/// - `dislike` meeting a reverse `matched` downgrades the reverse edge to
///   `like`;
/// - anything else leaves the pair as written.
pub fn plan_followup(
    desired: PreferenceState,
    reverse: Option<RelationshipState>,
) -> Option<Followup> {
    match (desired, reverse) {
        (PreferenceState::Like, Some(RelationshipState::Like)) => Some(Followup::Promote),
        (PreferenceState::Dislike, Some(RelationshipState::Matched)) => {
            Some(Followup::DemoteReverse)
        }
        _ => None,
    }
}
