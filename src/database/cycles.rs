// ABOUTME: Atomic commit of one engine cycle across every table it touches
// ABOUTME: State CAS, new profile/check-in, plan versions, pointer repoint, and decision record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::transactions::TransactionGuard;
use super::Database;
use cadence_core::errors::{AppError, AppResult};
use cadence_core::models::{ActivePlanPointer, AnthropometricProfile, CheckIn};
use cadence_intelligence::CycleOutcome;
use tracing::debug;

/// Everything one cycle writes
#[derive(Debug, Clone)]
pub struct CycleCommit {
    /// Engine state revision the cycle was computed from; `None` for a first onboarding
    pub expected_revision: Option<u64>,
    /// Profile revision submitted this cycle
    pub profile: Option<AnthropometricProfile>,
    /// Check-in submitted this cycle
    pub checkin: Option<CheckIn>,
    /// Engine output
    pub outcome: CycleOutcome,
}

impl Database {
    /// Write a cycle in one transaction. Nothing is written unless everything is.
    ///
    /// # Errors
    ///
    /// Returns `CONCURRENT_MODIFICATION` when the engine state moved past
    /// `expected_revision` or another cycle already claimed the same week,
    /// plan version, or first state; `DATABASE_ERROR` for any other failure
    pub async fn commit_cycle(&self, commit: &CycleCommit) -> AppResult<()> {
        let record = &commit.outcome.record;
        let user_id = record.user_id;

        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::new(tx);
        let conn = guard.executor()?;

        match commit.expected_revision {
            Some(expected) => Self::advance_engine_state(conn, &record.post_state, expected).await?,
            None => Self::insert_engine_state(conn, &record.post_state).await?,
        }

        if let Some(profile) = &commit.profile {
            Self::insert_profile(conn, profile).await?;
        }
        if let Some(checkin) = &commit.checkin {
            Self::insert_checkin(conn, checkin).await?;
        }

        let nutrition = commit.outcome.nutrition_plan.as_ref();
        let training = commit.outcome.training_plan.as_ref();
        if let Some(plan) = nutrition {
            Self::insert_nutrition_plan(conn, plan).await?;
        }
        if let Some(plan) = training {
            Self::insert_training_plan(conn, plan).await?;
        }

        if nutrition.is_some() || training.is_some() {
            let current = Self::fetch_active_pointer(conn, user_id).await?;
            let nutrition_version = nutrition
                .map(|p| p.version)
                .or_else(|| current.map(|p| p.nutrition_version));
            let training_version = training
                .map(|p| p.version)
                .or_else(|| current.map(|p| p.training_version));
            let (Some(nutrition_version), Some(training_version)) =
                (nutrition_version, training_version)
            else {
                return Err(AppError::internal(
                    "first plan commit must create both nutrition and training versions",
                )
                .with_user_id(user_id));
            };
            Self::upsert_active_pointer(
                conn,
                &ActivePlanPointer {
                    user_id,
                    nutrition_version,
                    training_version,
                    updated_at: record.created_at,
                },
            )
            .await?;
        }

        Self::insert_decision_record(conn, record).await?;
        guard.commit().await?;

        debug!(
            user.id = %user_id,
            decision.id = %record.id,
            revision = record.post_state.revision,
            "Cycle committed"
        );
        Ok(())
    }
}
