// ABOUTME: Storage for the append-only decision record log
// ABOUTME: The full record is stored as JSON beside indexed columns and its content hash
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::codec::{enum_to_text, json_from_text, json_to_text, timestamp_to_text, write_error};
use super::Database;
use cadence_core::errors::{AppError, AppResult};
use cadence_core::models::DecisionRecord;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_decisions(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS decision_records (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                trigger_type TEXT NOT NULL,
                rule_pack_version TEXT NOT NULL,
                outcome TEXT NOT NULL,
                record TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            "decision_records table",
        )
        .await?;

        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_decision_records_user ON decision_records(user_id, created_at)",
            "decision_records index",
        )
        .await
    }

    pub(super) async fn insert_decision_record(
        conn: &mut SqliteConnection,
        record: &DecisionRecord,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO decision_records (
                id, user_id, trigger_type, rule_pack_version, outcome, record,
                content_hash, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.to_string())
        .bind(record.trigger.as_str())
        .bind(&record.rule_pack_version)
        .bind(enum_to_text(&record.outcome)?)
        .bind(json_to_text(record)?)
        .bind(&record.content_hash)
        .bind(timestamp_to_text(&record.created_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| write_error(&e, "decision record"))?;
        Ok(())
    }

    /// Every decision record for a user, oldest first
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or a record cannot be decoded
    pub async fn decision_records(&self, user_id: Uuid) -> AppResult<Vec<DecisionRecord>> {
        let rows = sqlx::query(
            r"
            SELECT record, content_hash FROM decision_records
            WHERE user_id = $1
            ORDER BY created_at ASC, rowid ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list decision records: {e}")))?;

        rows.iter().map(row_to_record).collect()
    }

    /// One decision record by id
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or the record cannot be decoded
    pub async fn decision_record(&self, id: Uuid) -> AppResult<Option<DecisionRecord>> {
        let row = sqlx::query("SELECT record, content_hash FROM decision_records WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get decision record: {e}")))?;

        row.as_ref().map(row_to_record).transpose()
    }
}

/// The `content_hash` column is authoritative; a record body edited without
/// recomputing it fails verification.
fn row_to_record(row: &SqliteRow) -> AppResult<DecisionRecord> {
    let body: String = row.get("record");
    let mut record: DecisionRecord = json_from_text(&body, "record")?;
    record.content_hash = row.get("content_hash");
    Ok(record)
}
