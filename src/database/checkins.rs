// ABOUTME: Storage for the append-only weekly check-in ledger
// ABOUTME: Week numbers are unique per user, so two cycles cannot claim the same week
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::codec::{
    enum_from_text, enum_to_text, json_from_text, json_to_text, opt_enum_from_text,
    opt_enum_to_text, timestamp_from_text, timestamp_to_text, u32_from_column, u8_from_column,
    uuid_from_text, write_error,
};
use super::Database;
use cadence_core::errors::{AppError, AppResult};
use cadence_core::models::CheckIn;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_checkins(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS checkins (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                week_number INTEGER NOT NULL CHECK (week_number >= 1),
                weight_kg REAL NOT NULL,
                waist_cm REAL,
                energy INTEGER NOT NULL CHECK (energy BETWEEN 0 AND 10),
                hunger INTEGER NOT NULL CHECK (hunger BETWEEN 0 AND 10),
                sleep INTEGER NOT NULL CHECK (sleep BETWEEN 0 AND 10),
                stress INTEGER NOT NULL CHECK (stress BETWEEN 0 AND 10),
                adherence TEXT NOT NULL,
                events TEXT NOT NULL,
                training_performance TEXT,
                note TEXT NOT NULL DEFAULT '',
                recorded_at TEXT NOT NULL,
                UNIQUE (user_id, week_number)
            )
            ",
            "checkins table",
        )
        .await
    }

    /// Insert a check-in inside a cycle transaction
    pub(super) async fn insert_checkin(
        conn: &mut SqliteConnection,
        checkin: &CheckIn,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO checkins (
                id, user_id, week_number, weight_kg, waist_cm, energy, hunger, sleep,
                stress, adherence, events, training_performance, note, recorded_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ",
        )
        .bind(checkin.id.to_string())
        .bind(checkin.user_id.to_string())
        .bind(i64::from(checkin.week_number))
        .bind(checkin.weight_kg)
        .bind(checkin.waist_cm)
        .bind(i64::from(checkin.energy))
        .bind(i64::from(checkin.hunger))
        .bind(i64::from(checkin.sleep))
        .bind(i64::from(checkin.stress))
        .bind(enum_to_text(&checkin.adherence)?)
        .bind(json_to_text(&checkin.events)?)
        .bind(opt_enum_to_text(checkin.training_performance.as_ref())?)
        .bind(&checkin.note)
        .bind(timestamp_to_text(&checkin.recorded_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| write_error(&e, "check-in"))?;
        Ok(())
    }

    /// Most recent `limit` check-ins, oldest first
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or a stored row cannot be decoded
    pub async fn recent_checkins(&self, user_id: Uuid, limit: u32) -> AppResult<Vec<CheckIn>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM checkins
            WHERE user_id = $1
            ORDER BY week_number DESC
            LIMIT $2
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get check-ins: {e}")))?;

        let mut checkins = rows.iter().map(row_to_checkin).collect::<AppResult<Vec<_>>>()?;
        checkins.reverse();
        Ok(checkins)
    }

    /// Full check-in history, oldest first
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or a stored row cannot be decoded
    pub async fn checkins(&self, user_id: Uuid) -> AppResult<Vec<CheckIn>> {
        let rows =
            sqlx::query("SELECT * FROM checkins WHERE user_id = $1 ORDER BY week_number ASC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to list check-ins: {e}")))?;

        rows.iter().map(row_to_checkin).collect()
    }

    /// Highest stored week number, 0 when the user has no check-ins
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails
    pub async fn latest_week_number(&self, user_id: Uuid) -> AppResult<u32> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(week_number), 0) AS week FROM checkins WHERE user_id = $1",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get latest week: {e}")))?;

        u32_from_column(row.get("week"), "week_number")
    }
}

fn row_to_checkin(row: &SqliteRow) -> AppResult<CheckIn> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let adherence: String = row.get("adherence");
    let events: String = row.get("events");
    let training_performance: Option<String> = row.get("training_performance");
    let recorded_at: String = row.get("recorded_at");

    Ok(CheckIn {
        id: uuid_from_text(&id, "id")?,
        user_id: uuid_from_text(&user_id, "user_id")?,
        week_number: u32_from_column(row.get("week_number"), "week_number")?,
        weight_kg: row.get("weight_kg"),
        waist_cm: row.get("waist_cm"),
        energy: u8_from_column(row.get("energy"), "energy")?,
        hunger: u8_from_column(row.get("hunger"), "hunger")?,
        sleep: u8_from_column(row.get("sleep"), "sleep")?,
        stress: u8_from_column(row.get("stress"), "stress")?,
        adherence: enum_from_text(&adherence, "adherence")?,
        events: json_from_text(&events, "events")?,
        training_performance: opt_enum_from_text(
            training_performance.as_deref(),
            "training_performance",
        )?,
        note: row.get("note"),
        recorded_at: timestamp_from_text(&recorded_at, "recorded_at")?,
    })
}
