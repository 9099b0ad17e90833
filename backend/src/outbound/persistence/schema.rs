//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them
//! for compile-time query validation. Regenerate with `diesel print-schema`
//! after a migration changes the layout.

diesel::table! {
    /// Player accounts with denormalised scoreboard aggregates.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Optional employee number captured at first login.
        employee_number -> Nullable<Varchar>,
        /// Display name; refreshed on every login.
        username -> Varchar,
        /// Maximum score over the user's game records.
        high_score -> Int4,
        /// Count of the user's game records.
        total_games -> Int4,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last login timestamp.
        last_login -> Timestamptz,
    }
}

diesel::table! {
    /// Immutable per-game result records.
    game_records (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user; cascades on user deletion.
        user_id -> Uuid,
        /// Final score.
        score -> Int4,
        /// Level reached.
        level_reached -> Int4,
        /// Lines cleared.
        lines_cleared -> Int4,
        /// Duration in seconds.
        game_duration -> Int4,
        /// Completion timestamp.
        played_at -> Timestamptz,
    }
}

diesel::joinable!(game_records -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(users, game_records);
