// ABOUTME: RAII transaction guard that rolls back unless explicitly committed
// ABOUTME: Wraps an sqlx SQLite transaction for the multi-table cycle commit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use cadence_core::errors::{AppError, AppResult};
use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::{debug, warn};

/// Transaction that is rolled back when dropped without [`Self::commit`]
///
/// ```text
/// let mut guard = TransactionGuard::new(pool.begin().await?);
/// sqlx::query("INSERT INTO checkins ...").execute(guard.executor()?).await?;
/// guard.commit().await?;
/// ```
pub struct TransactionGuard<'c> {
    transaction: Option<Transaction<'c, Sqlite>>,
}

impl<'c> TransactionGuard<'c> {
    /// Guard an open transaction
    #[must_use]
    pub fn new(transaction: Transaction<'c, Sqlite>) -> Self {
        Self {
            transaction: Some(transaction),
        }
    }

    /// Connection to run statements on inside the transaction
    ///
    /// # Errors
    ///
    /// Returns `INTERNAL_ERROR` if the guard was already committed
    pub fn executor(&mut self) -> AppResult<&mut SqliteConnection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit")
        })
    }

    /// Commit and consume the guard
    ///
    /// # Errors
    ///
    /// Returns `DATABASE_ERROR` if the commit fails
    pub async fn commit(mut self) -> AppResult<()> {
        let Some(tx) = self.transaction.take() else {
            return Err(AppError::internal(
                "Transaction already consumed - cannot commit",
            ));
        };
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
        debug!("Transaction committed");
        Ok(())
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            warn!("Transaction dropped without commit, rolling back");
        }
    }
}
