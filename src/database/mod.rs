// ABOUTME: SQLite persistence for profiles, check-ins, plan versions, engine state, and decisions
// ABOUTME: Owns the connection pool and schema; check-ins, plans, and decisions are append-only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! Typed models are encoded to columns here and nowhere else. Append-only
//! tables are enforced by triggers that abort any `UPDATE` or `DELETE`.

mod checkins;
mod codec;
mod cycles;
mod decisions;
mod engine_state;
mod plans;
mod profiles;
mod transactions;

pub use cycles::CycleCommit;
pub use transactions::TransactionGuard;

use cadence_core::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::debug;

/// Tables that reject `UPDATE` and `DELETE`
const APPEND_ONLY_TABLES: [&str; 5] = [
    "profiles",
    "checkins",
    "nutrition_plans",
    "training_plans",
    "decision_records",
];

/// Database manager for engine storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// In-memory databases get a single connection that is never recycled, so every
    /// query sees the same database.
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the URL is invalid, the connection fails, or migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::database(format!("Invalid database URL {database_url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to {database_url}: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_profiles().await?;
        self.migrate_checkins().await?;
        self.migrate_plans().await?;
        self.migrate_engine_state().await?;
        self.migrate_decisions().await?;

        for table in APPEND_ONLY_TABLES {
            self.enforce_append_only(table).await?;
        }
        debug!("Database schema ready");
        Ok(())
    }

    async fn enforce_append_only(&self, table: &str) -> AppResult<()> {
        for operation in ["UPDATE", "DELETE"] {
            let trigger = format!(
                "CREATE TRIGGER IF NOT EXISTS {table}_no_{op} BEFORE {operation} ON {table} \
                 BEGIN SELECT RAISE(ABORT, '{table} is append-only'); END",
                op = operation.to_lowercase()
            );
            sqlx::query(&trigger)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to create {table} trigger: {e}"))
                })?;
        }
        Ok(())
    }

    async fn execute_ddl(&self, statement: &str, what: &str) -> AppResult<()> {
        sqlx::query(statement)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create {what}: {e}")))?;
        Ok(())
    }
}
