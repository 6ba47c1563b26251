// ABOUTME: SQLite-backed EngineStore delegating to the Database manager
// ABOUTME: Keeps the service layer independent of the concrete storage type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::EngineStore;
use crate::database::{CycleCommit, Database};
use async_trait::async_trait;
use cadence_core::errors::AppResult;
use cadence_core::models::{
    ActivePlanPointer, AnthropometricProfile, CheckIn, DecisionRecord, EngineState,
    NutritionPlan, TrainingPlan,
};
use uuid::Uuid;

#[async_trait]
impl EngineStore for Database {
    async fn latest_profile(&self, user_id: Uuid) -> AppResult<Option<AnthropometricProfile>> {
        Self::latest_profile(self, user_id).await
    }

    async fn recent_checkins(&self, user_id: Uuid, limit: u32) -> AppResult<Vec<CheckIn>> {
        Self::recent_checkins(self, user_id, limit).await
    }

    async fn latest_week_number(&self, user_id: Uuid) -> AppResult<u32> {
        Self::latest_week_number(self, user_id).await
    }

    async fn engine_state(&self, user_id: Uuid) -> AppResult<Option<EngineState>> {
        Self::engine_state(self, user_id).await
    }

    async fn active_pointer(&self, user_id: Uuid) -> AppResult<Option<ActivePlanPointer>> {
        Self::active_pointer(self, user_id).await
    }

    async fn nutrition_plan(
        &self,
        user_id: Uuid,
        version: u32,
    ) -> AppResult<Option<NutritionPlan>> {
        Self::nutrition_plan(self, user_id, version).await
    }

    async fn training_plan(&self, user_id: Uuid, version: u32) -> AppResult<Option<TrainingPlan>> {
        Self::training_plan(self, user_id, version).await
    }

    async fn decision_records(&self, user_id: Uuid) -> AppResult<Vec<DecisionRecord>> {
        Self::decision_records(self, user_id).await
    }

    async fn decision_record(&self, id: Uuid) -> AppResult<Option<DecisionRecord>> {
        Self::decision_record(self, id).await
    }

    async fn commit_cycle(&self, commit: &CycleCommit) -> AppResult<()> {
        Self::commit_cycle(self, commit).await
    }
}
