// ABOUTME: Storage abstraction the plan generator runs against
// ABOUTME: Read access by user and version, plus the single atomic cycle commit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::CycleCommit;
use async_trait::async_trait;
use cadence_core::errors::AppResult;
use cadence_core::models::{
    ActivePlanPointer, AnthropometricProfile, CheckIn, DecisionRecord, EngineState,
    NutritionPlan, TrainingPlan,
};
use uuid::Uuid;

/// SQLite implementation
pub mod sqlite;

/// Persistence contract
///
/// Implementations must keep check-ins, plan versions and decision records
/// append-only, and must apply a [`CycleCommit`] atomically: the engine-state
/// compare-and-swap, new versions, pointer repoint and decision record either
/// all land or none do.
#[async_trait]
pub trait EngineStore: Send + Sync + Clone + 'static {
    // ================================
    // Profiles and check-ins
    // ================================

    /// Most recent profile revision
    async fn latest_profile(&self, user_id: Uuid) -> AppResult<Option<AnthropometricProfile>>;

    /// Most recent `limit` check-ins, oldest first
    async fn recent_checkins(&self, user_id: Uuid, limit: u32) -> AppResult<Vec<CheckIn>>;

    /// Highest stored week number, 0 when none
    async fn latest_week_number(&self, user_id: Uuid) -> AppResult<u32>;

    // ================================
    // State and plans
    // ================================

    /// Current engine state
    async fn engine_state(&self, user_id: Uuid) -> AppResult<Option<EngineState>>;

    /// Active-plan pointer
    async fn active_pointer(&self, user_id: Uuid) -> AppResult<Option<ActivePlanPointer>>;

    /// Nutrition plan by version
    async fn nutrition_plan(&self, user_id: Uuid, version: u32)
        -> AppResult<Option<NutritionPlan>>;

    /// Training plan by version
    async fn training_plan(&self, user_id: Uuid, version: u32) -> AppResult<Option<TrainingPlan>>;

    // ================================
    // Decisions
    // ================================

    /// Decision log, oldest first
    async fn decision_records(&self, user_id: Uuid) -> AppResult<Vec<DecisionRecord>>;

    /// One decision record
    async fn decision_record(&self, id: Uuid) -> AppResult<Option<DecisionRecord>>;

    /// Apply one cycle atomically
    async fn commit_cycle(&self, commit: &CycleCommit) -> AppResult<()>;
}
