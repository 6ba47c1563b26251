// ABOUTME: Storage for immutable nutrition/training plan versions and the active-plan pointer
// ABOUTME: Versions are keyed (user, version); the pointer is repointed inside the cycle transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::codec::{
    timestamp_from_text, timestamp_to_text, u32_from_column, uuid_from_text, write_error,
};
use super::Database;
use cadence_core::errors::{AppError, AppResult};
use cadence_core::models::{ActivePlanPointer, MacroTargets, NutritionPlan, TrainingPlan};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_plans(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS nutrition_plans (
                user_id TEXT NOT NULL,
                version INTEGER NOT NULL CHECK (version >= 1),
                calorie_target INTEGER NOT NULL,
                calorie_min INTEGER NOT NULL,
                calorie_max INTEGER NOT NULL,
                tdee INTEGER NOT NULL,
                protein_g REAL NOT NULL,
                fat_g REAL NOT NULL,
                carbs_g REAL NOT NULL CHECK (carbs_g >= 0),
                protein_kcal REAL NOT NULL,
                fat_kcal REAL NOT NULL,
                carbs_kcal REAL NOT NULL,
                projected_weekly_change_kg REAL NOT NULL,
                valid_from TEXT NOT NULL,
                valid_until TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (user_id, version)
            )
            ",
            "nutrition_plans table",
        )
        .await?;

        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS training_plans (
                user_id TEXT NOT NULL,
                version INTEGER NOT NULL CHECK (version >= 1),
                program_id TEXT NOT NULL,
                program_week INTEGER NOT NULL,
                volume_multiplier REAL NOT NULL,
                intensity_multiplier REAL NOT NULL,
                deload INTEGER NOT NULL,
                valid_from TEXT NOT NULL,
                valid_until TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (user_id, version)
            )
            ",
            "training_plans table",
        )
        .await?;

        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS active_plans (
                user_id TEXT PRIMARY KEY,
                nutrition_version INTEGER NOT NULL,
                training_version INTEGER NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id, nutrition_version) REFERENCES nutrition_plans (user_id, version),
                FOREIGN KEY (user_id, training_version) REFERENCES training_plans (user_id, version)
            )
            ",
            "active_plans table",
        )
        .await
    }

    pub(super) async fn insert_nutrition_plan(
        conn: &mut SqliteConnection,
        plan: &NutritionPlan,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO nutrition_plans (
                user_id, version, calorie_target, calorie_min, calorie_max, tdee,
                protein_g, fat_g, carbs_g, protein_kcal, fat_kcal, carbs_kcal,
                projected_weekly_change_kg, valid_from, valid_until, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ",
        )
        .bind(plan.user_id.to_string())
        .bind(i64::from(plan.version))
        .bind(plan.calorie_target)
        .bind(plan.calorie_min)
        .bind(plan.calorie_max)
        .bind(plan.tdee)
        .bind(plan.macros.protein_g)
        .bind(plan.macros.fat_g)
        .bind(plan.macros.carbs_g)
        .bind(plan.macros.protein_kcal)
        .bind(plan.macros.fat_kcal)
        .bind(plan.macros.carbs_kcal)
        .bind(plan.projected_weekly_change_kg)
        .bind(timestamp_to_text(&plan.valid_from))
        .bind(timestamp_to_text(&plan.valid_until))
        .bind(timestamp_to_text(&plan.created_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| write_error(&e, "nutrition plan version"))?;
        Ok(())
    }

    pub(super) async fn insert_training_plan(
        conn: &mut SqliteConnection,
        plan: &TrainingPlan,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO training_plans (
                user_id, version, program_id, program_week, volume_multiplier,
                intensity_multiplier, deload, valid_from, valid_until, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(plan.user_id.to_string())
        .bind(i64::from(plan.version))
        .bind(&plan.program_id)
        .bind(i64::from(plan.program_week))
        .bind(plan.volume_multiplier)
        .bind(plan.intensity_multiplier)
        .bind(plan.deload)
        .bind(timestamp_to_text(&plan.valid_from))
        .bind(timestamp_to_text(&plan.valid_until))
        .bind(timestamp_to_text(&plan.created_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| write_error(&e, "training plan version"))?;
        Ok(())
    }

    pub(super) async fn fetch_active_pointer(
        conn: &mut SqliteConnection,
        user_id: Uuid,
    ) -> AppResult<Option<ActivePlanPointer>> {
        let row = sqlx::query("SELECT * FROM active_plans WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::database(format!("Failed to get active plans: {e}")))?;

        row.as_ref().map(row_to_pointer).transpose()
    }

    pub(super) async fn upsert_active_pointer(
        conn: &mut SqliteConnection,
        pointer: &ActivePlanPointer,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO active_plans (user_id, nutrition_version, training_version, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                nutrition_version = excluded.nutrition_version,
                training_version = excluded.training_version,
                updated_at = excluded.updated_at
            ",
        )
        .bind(pointer.user_id.to_string())
        .bind(i64::from(pointer.nutrition_version))
        .bind(i64::from(pointer.training_version))
        .bind(timestamp_to_text(&pointer.updated_at))
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database(format!("Failed to repoint active plans: {e}")))?;
        Ok(())
    }

    /// The user's active-plan pointer
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or the row cannot be decoded
    pub async fn active_pointer(&self, user_id: Uuid) -> AppResult<Option<ActivePlanPointer>> {
        let row = sqlx::query("SELECT * FROM active_plans WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get active plans: {e}")))?;

        row.as_ref().map(row_to_pointer).transpose()
    }

    /// One nutrition plan version
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or the row cannot be decoded
    pub async fn nutrition_plan(
        &self,
        user_id: Uuid,
        version: u32,
    ) -> AppResult<Option<NutritionPlan>> {
        let row = sqlx::query("SELECT * FROM nutrition_plans WHERE user_id = $1 AND version = $2")
            .bind(user_id.to_string())
            .bind(i64::from(version))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get nutrition plan: {e}")))?;

        row.as_ref().map(row_to_nutrition_plan).transpose()
    }

    /// One training plan version
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or the row cannot be decoded
    pub async fn training_plan(
        &self,
        user_id: Uuid,
        version: u32,
    ) -> AppResult<Option<TrainingPlan>> {
        let row = sqlx::query("SELECT * FROM training_plans WHERE user_id = $1 AND version = $2")
            .bind(user_id.to_string())
            .bind(i64::from(version))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get training plan: {e}")))?;

        row.as_ref().map(row_to_training_plan).transpose()
    }

    /// Every nutrition plan version, oldest first
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the query fails or a row cannot be decoded
    pub async fn nutrition_plan_history(&self, user_id: Uuid) -> AppResult<Vec<NutritionPlan>> {
        let rows =
            sqlx::query("SELECT * FROM nutrition_plans WHERE user_id = $1 ORDER BY version ASC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to list nutrition plans: {e}"))
                })?;

        rows.iter().map(row_to_nutrition_plan).collect()
    }
}

fn row_to_pointer(row: &SqliteRow) -> AppResult<ActivePlanPointer> {
    let user_id: String = row.get("user_id");
    let updated_at: String = row.get("updated_at");
    Ok(ActivePlanPointer {
        user_id: uuid_from_text(&user_id, "user_id")?,
        nutrition_version: u32_from_column(row.get("nutrition_version"), "nutrition_version")?,
        training_version: u32_from_column(row.get("training_version"), "training_version")?,
        updated_at: timestamp_from_text(&updated_at, "updated_at")?,
    })
}

fn row_to_nutrition_plan(row: &SqliteRow) -> AppResult<NutritionPlan> {
    let user_id: String = row.get("user_id");
    let valid_from: String = row.get("valid_from");
    let valid_until: String = row.get("valid_until");
    let created_at: String = row.get("created_at");

    Ok(NutritionPlan {
        user_id: uuid_from_text(&user_id, "user_id")?,
        version: u32_from_column(row.get("version"), "version")?,
        calorie_target: row.get("calorie_target"),
        calorie_min: row.get("calorie_min"),
        calorie_max: row.get("calorie_max"),
        tdee: row.get("tdee"),
        macros: MacroTargets {
            protein_g: row.get("protein_g"),
            fat_g: row.get("fat_g"),
            carbs_g: row.get("carbs_g"),
            protein_kcal: row.get("protein_kcal"),
            fat_kcal: row.get("fat_kcal"),
            carbs_kcal: row.get("carbs_kcal"),
        },
        projected_weekly_change_kg: row.get("projected_weekly_change_kg"),
        valid_from: timestamp_from_text(&valid_from, "valid_from")?,
        valid_until: timestamp_from_text(&valid_until, "valid_until")?,
        created_at: timestamp_from_text(&created_at, "created_at")?,
    })
}

fn row_to_training_plan(row: &SqliteRow) -> AppResult<TrainingPlan> {
    let user_id: String = row.get("user_id");
    let valid_from: String = row.get("valid_from");
    let valid_until: String = row.get("valid_until");
    let created_at: String = row.get("created_at");

    Ok(TrainingPlan {
        user_id: uuid_from_text(&user_id, "user_id")?,
        version: u32_from_column(row.get("version"), "version")?,
        program_id: row.get("program_id"),
        program_week: u32_from_column(row.get("program_week"), "program_week")?,
        volume_multiplier: row.get("volume_multiplier"),
        intensity_multiplier: row.get("intensity_multiplier"),
        deload: row.get("deload"),
        valid_from: timestamp_from_text(&valid_from, "valid_from")?,
        valid_until: timestamp_from_text(&valid_until, "valid_until")?,
        created_at: timestamp_from_text(&created_at, "created_at")?,
    })
}
