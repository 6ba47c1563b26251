// ABOUTME: Storage for onboarding profile revisions
// ABOUTME: A resubmission inserts revision N+1; earlier revisions are never edited
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::codec::{
    enum_from_text, enum_to_text, json_from_text, json_to_text, timestamp_from_text,
    timestamp_to_text, u32_from_column, uuid_from_text, write_error,
};
use super::Database;
use cadence_core::errors::{AppError, AppResult};
use cadence_core::models::AnthropometricProfile;
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_profiles(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT NOT NULL,
                revision INTEGER NOT NULL CHECK (revision >= 1),
                age_years INTEGER NOT NULL,
                sex TEXT NOT NULL,
                height_cm REAL NOT NULL,
                weight_kg REAL NOT NULL,
                activity_level TEXT NOT NULL,
                goal TEXT NOT NULL,
                training TEXT NOT NULL,
                submitted_at TEXT NOT NULL,
                PRIMARY KEY (user_id, revision)
            )
            ",
            "profiles table",
        )
        .await
    }

    /// Insert a profile revision inside a cycle transaction
    pub(super) async fn insert_profile(
        conn: &mut SqliteConnection,
        profile: &AnthropometricProfile,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO profiles (
                user_id, revision, age_years, sex, height_cm, weight_kg,
                activity_level, goal, training, submitted_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(profile.user_id.to_string())
        .bind(i64::from(profile.revision))
        .bind(i64::from(profile.age_years))
        .bind(enum_to_text(&profile.sex)?)
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(enum_to_text(&profile.activity_level)?)
        .bind(enum_to_text(&profile.goal)?)
        .bind(json_to_text(&profile.training)?)
        .bind(timestamp_to_text(&profile.submitted_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| write_error(&e, "profile revision"))?;
        Ok(())
    }

    /// Most recent profile revision for a user
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or a stored row cannot be decoded
    pub async fn latest_profile(&self, user_id: Uuid) -> AppResult<Option<AnthropometricProfile>> {
        let row = sqlx::query(
            r"
            SELECT * FROM profiles
            WHERE user_id = $1
            ORDER BY revision DESC
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get profile: {e}")))?;

        row.as_ref().map(row_to_profile).transpose()
    }

    /// Every profile revision for a user, oldest first
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or a stored row cannot be decoded
    pub async fn profile_revisions(&self, user_id: Uuid) -> AppResult<Vec<AnthropometricProfile>> {
        let rows = sqlx::query("SELECT * FROM profiles WHERE user_id = $1 ORDER BY revision ASC")
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list profiles: {e}")))?;

        rows.iter().map(row_to_profile).collect()
    }
}

fn row_to_profile(row: &SqliteRow) -> AppResult<AnthropometricProfile> {
    let user_id: String = row.get("user_id");
    let sex: String = row.get("sex");
    let activity_level: String = row.get("activity_level");
    let goal: String = row.get("goal");
    let training: String = row.get("training");
    let submitted_at: String = row.get("submitted_at");

    Ok(AnthropometricProfile {
        user_id: uuid_from_text(&user_id, "user_id")?,
        revision: u32_from_column(row.get("revision"), "revision")?,
        age_years: u32_from_column(row.get("age_years"), "age_years")?,
        sex: enum_from_text(&sex, "sex")?,
        height_cm: row.get("height_cm"),
        weight_kg: row.get("weight_kg"),
        activity_level: enum_from_text(&activity_level, "activity_level")?,
        goal: enum_from_text(&goal, "goal")?,
        training: json_from_text(&training, "training")?,
        submitted_at: timestamp_from_text(&submitted_at, "submitted_at")?,
    })
}
