//! Internal Diesel row structs for database operations.
//!
//! Implementation details of the persistence layer; never exposed to the
//! domain. Tag columns hold raw strings here and are parsed into the closed
//! domain enums when rows are converted.

use diesel::prelude::*;

use super::schema::{relationships, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub role: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub role: &'a str,
}

/// Row struct for reading from the relationships table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = relationships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RelationshipRow {
    pub id: i64,
    pub subject: i64,
    pub object: i64,
    pub state: String,
    pub kind: String,
}

/// Insertable struct for creating new relationship edges.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = relationships)]
pub(crate) struct NewRelationshipRow<'a> {
    pub subject: i64,
    pub object: i64,
    pub state: &'a str,
    pub kind: &'a str,
}
