// ABOUTME: Storage for the per-user engine state with optimistic-concurrency writes
// ABOUTME: Every advance is a compare-and-swap on the stored revision
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::codec::{
    enum_from_text, enum_to_text, opt_timestamp_from_text, revision_from_column,
    revision_to_column, timestamp_from_text, timestamp_to_text, u32_from_column, uuid_from_text,
    write_error,
};
use super::Database;
use cadence_core::errors::{AppError, AppResult};
use cadence_core::models::EngineState;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_engine_state(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS engine_states (
                user_id TEXT PRIMARY KEY,
                nutrition_mode TEXT NOT NULL,
                training_mode TEXT NOT NULL,
                anti_reversal_lock_until TEXT,
                program_lock_until TEXT,
                weeks_since_last_deload INTEGER NOT NULL,
                weeks_since_last_change INTEGER NOT NULL,
                revision INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "engine_states table",
        )
        .await
    }

    /// First state for a user. Fails with `CONCURRENT_MODIFICATION` if another
    /// cycle created it first.
    pub(super) async fn insert_engine_state(
        conn: &mut SqliteConnection,
        state: &EngineState,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO engine_states (
                user_id, nutrition_mode, training_mode, anti_reversal_lock_until,
                program_lock_until, weeks_since_last_deload, weeks_since_last_change,
                revision, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(state.user_id.to_string())
        .bind(enum_to_text(&state.nutrition_mode)?)
        .bind(enum_to_text(&state.training_mode)?)
        .bind(state.anti_reversal_lock_until.as_ref().map(timestamp_to_text))
        .bind(state.program_lock_until.as_ref().map(timestamp_to_text))
        .bind(i64::from(state.weeks_since_last_deload))
        .bind(i64::from(state.weeks_since_last_change))
        .bind(revision_to_column(state.revision)?)
        .bind(timestamp_to_text(&state.updated_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| write_error(&e, "engine state"))?;
        Ok(())
    }

    /// Replace the state only if the stored revision is still `expected_revision`
    pub(super) async fn advance_engine_state(
        conn: &mut SqliteConnection,
        state: &EngineState,
        expected_revision: u64,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE engine_states SET
                nutrition_mode = $1,
                training_mode = $2,
                anti_reversal_lock_until = $3,
                program_lock_until = $4,
                weeks_since_last_deload = $5,
                weeks_since_last_change = $6,
                revision = $7,
                updated_at = $8
            WHERE user_id = $9 AND revision = $10
            ",
        )
        .bind(enum_to_text(&state.nutrition_mode)?)
        .bind(enum_to_text(&state.training_mode)?)
        .bind(state.anti_reversal_lock_until.as_ref().map(timestamp_to_text))
        .bind(state.program_lock_until.as_ref().map(timestamp_to_text))
        .bind(i64::from(state.weeks_since_last_deload))
        .bind(i64::from(state.weeks_since_last_change))
        .bind(revision_to_column(state.revision)?)
        .bind(timestamp_to_text(&state.updated_at))
        .bind(state.user_id.to_string())
        .bind(revision_to_column(expected_revision)?)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to advance engine state: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::conflict(format!(
                "engine state is no longer at revision {expected_revision}"
            ))
            .with_user_id(state.user_id));
        }
        Ok(())
    }

    /// Current engine state for a user
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or the row cannot be decoded
    pub async fn engine_state(&self, user_id: Uuid) -> AppResult<Option<EngineState>> {
        let row = sqlx::query("SELECT * FROM engine_states WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get engine state: {e}")))?;

        row.as_ref().map(row_to_state).transpose()
    }
}

fn row_to_state(row: &SqliteRow) -> AppResult<EngineState> {
    let user_id: String = row.get("user_id");
    let nutrition_mode: String = row.get("nutrition_mode");
    let training_mode: String = row.get("training_mode");
    let anti_reversal_lock_until: Option<String> = row.get("anti_reversal_lock_until");
    let program_lock_until: Option<String> = row.get("program_lock_until");
    let updated_at: String = row.get("updated_at");

    Ok(EngineState {
        user_id: uuid_from_text(&user_id, "user_id")?,
        nutrition_mode: enum_from_text(&nutrition_mode, "nutrition_mode")?,
        training_mode: enum_from_text(&training_mode, "training_mode")?,
        anti_reversal_lock_until: opt_timestamp_from_text(
            anti_reversal_lock_until.as_deref(),
            "anti_reversal_lock_until",
        )?,
        program_lock_until: opt_timestamp_from_text(
            program_lock_until.as_deref(),
            "program_lock_until",
        )?,
        weeks_since_last_deload: u32_from_column(
            row.get("weeks_since_last_deload"),
            "weeks_since_last_deload",
        )?,
        weeks_since_last_change: u32_from_column(
            row.get("weeks_since_last_change"),
            "weeks_since_last_change",
        )?,
        revision: revision_from_column(row.get("revision"))?,
        updated_at: timestamp_from_text(&updated_at, "updated_at")?,
    })
}
