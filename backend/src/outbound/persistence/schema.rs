//! Diesel table definitions for the PostgreSQL schema.
//!
//! These must match the deployed schema exactly. The `relationships` table
//! carries a unique index on `(subject, object, kind)` — the edge identity
//! key the upsert relies on — and foreign keys from both endpoints to
//! `users(id)`.

diesel::table! {
    /// Registered users.
    users (id) {
        /// Primary key, generated.
        id -> BigInt,
        /// Display name, validated to 64 characters.
        name -> Varchar,
        /// Role tag: `user` or `admin`.
        role -> Varchar,
    }
}

diesel::table! {
    /// Directed relationship edges.
    relationships (id) {
        /// Primary key, generated.
        id -> BigInt,
        /// Requesting user (FK to users.id).
        subject -> BigInt,
        /// Target user (FK to users.id).
        object -> BigInt,
        /// State tag: `like`, `dislike` or `matched`.
        state -> Varchar,
        /// Kind tag: `relationship` or `watch`.
        kind -> Varchar,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, relationships);
