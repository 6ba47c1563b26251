// ABOUTME: Plan generator service: the only side-effecting step around the pure engine
// ABOUTME: Read state, run the cycle, commit atomically; serialized per user with CAS retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Plan Generator
//!
//! Every operation that changes a user's plans runs as
//! *read current state → decide → write new state*:
//!
//! 1. take the user's in-process lock, so cycles for one user never overlap here
//! 2. load profile, engine state, active plans and the check-in window
//! 3. run [`PlanEngine`] (pure)
//! 4. commit through [`EngineStore::commit_cycle`], which compare-and-swaps the
//!    engine-state revision
//!
//! A writer in another process can still win the race between steps 2 and 4.
//! The commit then fails with `CONCURRENT_MODIFICATION` and the whole cycle is
//! recomputed against the advanced state, up to `max_retries` attempts.

use super::explanation::{Explainer, TemplateExplainer};
use crate::config::DEFAULT_MAX_RETRIES;
use crate::database::CycleCommit;
use crate::database_plugins::EngineStore;
use crate::logging::DecisionLogger;
use crate::rule_packs::RulePackRegistry;
use cadence_core::errors::{AppError, AppResult};
use cadence_core::models::{
    ActivityLevel, AnthropometricProfile, BiologicalSex, DecisionInputs, DecisionRecord,
    EngineState, Goal, NewCheckIn, NutritionPlan, TrainingPlan, TrainingProfile,
};
use cadence_intelligence::plan_engine::{CycleOutcome, PlanEngine, RecordStamp, ReplayReport};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{info, instrument};
use uuid::Uuid;

/// Onboarding payload. Omitting `user_id` onboards a new user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSubmission {
    /// Existing user to resubmit for
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Age in whole years
    pub age_years: u32,
    /// Biological sex
    pub sex: BiologicalSex,
    /// Height (cm)
    pub height_cm: f64,
    /// Body weight (kg)
    pub weight_kg: f64,
    /// Habitual activity level
    pub activity_level: ActivityLevel,
    /// Primary goal
    pub goal: Goal,
    /// Training context
    pub training: TrainingProfile,
}

impl ProfileSubmission {
    fn into_profile(
        self,
        user_id: Uuid,
        revision: u32,
        submitted_at: DateTime<Utc>,
    ) -> AnthropometricProfile {
        AnthropometricProfile {
            user_id,
            revision,
            age_years: self.age_years,
            sex: self.sex,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            activity_level: self.activity_level,
            goal: self.goal,
            training: self.training,
            submitted_at,
        }
    }
}

/// Result of an onboarding or check-in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    /// Committed decision record
    pub record: DecisionRecord,
    /// Nutrition plan active after the cycle
    pub nutrition_plan: Option<NutritionPlan>,
    /// Training plan active after the cycle
    pub training_plan: Option<TrainingPlan>,
    /// Text from the explanation collaborator
    pub explanation: String,
}

/// A user's live state and active plan versions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivePlans {
    /// Engine state
    pub state: EngineState,
    /// Active nutrition plan
    pub nutrition: NutritionPlan,
    /// Active training plan
    pub training: TrainingPlan,
}

/// Outcome of re-hashing a user's decision log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    /// User checked
    pub user_id: Uuid,
    /// Records checked
    pub checked: usize,
    /// Records whose content no longer matches their hash
    pub tampered: Vec<Uuid>,
}

impl IntegrityReport {
    /// No record failed verification
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.tampered.is_empty()
    }
}

/// Orchestrator around the pure engine
#[derive(Clone)]
pub struct PlanGenerator<S: EngineStore> {
    store: S,
    rule_packs: Arc<RulePackRegistry>,
    explainer: Arc<dyn Explainer>,
    user_locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
    max_retries: u32,
}

impl<S: EngineStore> PlanGenerator<S> {
    /// Service over `store` using the registry's active rule pack
    #[must_use]
    pub fn new(store: S, rule_packs: Arc<RulePackRegistry>) -> Self {
        Self {
            store,
            rule_packs,
            explainer: Arc::new(TemplateExplainer),
            user_locks: Arc::new(DashMap::new()),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Replace the explanation collaborator
    #[must_use]
    pub fn with_explainer(mut self, explainer: Arc<dyn Explainer>) -> Self {
        self.explainer = explainer;
        self
    }

    /// Attempts per cycle when the engine state moves underneath it (minimum 1)
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Rule pack registry
    #[must_use]
    pub fn rule_packs(&self) -> &RulePackRegistry {
        &self.rule_packs
    }

    /// Onboard a new user, or resubmit the profile of an existing one
    ///
    /// # Errors
    ///
    /// See [`Self::onboard_at`]
    pub async fn onboard(&self, submission: ProfileSubmission) -> AppResult<CycleReport> {
        self.onboard_at(submission, Utc::now()).await
    }

    /// [`Self::onboard`] evaluated at `now`
    ///
    /// A blocked onboarding is not an error: the record is committed with
    /// outcome `blocked` and no new plan versions.
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` / `INVALID_INPUT` for an implausible profile,
    /// `CONCURRENT_MODIFICATION` when retries are exhausted, and storage errors
    pub async fn onboard_at(
        &self,
        submission: ProfileSubmission,
        now: DateTime<Utc>,
    ) -> AppResult<CycleReport> {
        let user_id = submission.user_id.unwrap_or_else(Uuid::new_v4);
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let submission = &submission;
        let report = self
            .with_retries(user_id, || self.try_onboard(user_id, submission, now))
            .await?;
        Ok(self.finish(report))
    }

    /// Record a weekly check-in and run the adjustment cycle
    ///
    /// # Errors
    ///
    /// See [`Self::submit_checkin_at`]
    pub async fn submit_checkin(
        &self,
        user_id: Uuid,
        checkin: NewCheckIn,
    ) -> AppResult<CycleReport> {
        self.submit_checkin_at(user_id, checkin, Utc::now()).await
    }

    /// [`Self::submit_checkin`] evaluated at `now`
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` for invalid ratings or metrics,
    /// `RESOURCE_NOT_FOUND` for an unknown user, `MISSING_REQUIRED_FIELD` when
    /// the user has no active plans, `CONCURRENT_MODIFICATION` when retries are
    /// exhausted, and storage errors
    pub async fn submit_checkin_at(
        &self,
        user_id: Uuid,
        checkin: NewCheckIn,
        now: DateTime<Utc>,
    ) -> AppResult<CycleReport> {
        checkin.validate().map_err(|e| e.with_user_id(user_id))?;
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let checkin = &checkin;
        let report = self
            .with_retries(user_id, || self.try_checkin(user_id, checkin, now))
            .await?;
        Ok(self.finish(report))
    }

    /// Engine state and active plan versions
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` if the user has no state or no active plans
    pub async fn current_plan(&self, user_id: Uuid) -> AppResult<ActivePlans> {
        let state = self
            .store
            .engine_state(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Engine state for user {user_id}")))?;
        let (nutrition, training) = self.active_plans(user_id).await?.ok_or_else(|| {
            AppError::not_found(format!("Active plans for user {user_id}")).with_user_id(user_id)
        })?;
        Ok(ActivePlans {
            state,
            nutrition,
            training,
        })
    }

    /// Decision log, oldest first
    ///
    /// # Errors
    ///
    /// Propagates storage errors
    pub async fn history(&self, user_id: Uuid) -> AppResult<Vec<DecisionRecord>> {
        self.store.decision_records(user_id).await
    }

    /// Re-hash every stored decision record for a user
    ///
    /// # Errors
    ///
    /// Propagates storage errors; tampering is reported, not raised
    pub async fn verify_history(&self, user_id: Uuid) -> AppResult<IntegrityReport> {
        let records = self.store.decision_records(user_id).await?;
        let mut tampered = Vec::new();
        for record in &records {
            if record.verify_integrity().is_err() {
                DecisionLogger::log_tampered(user_id, record.id);
                tampered.push(record.id);
            }
        }
        Ok(IntegrityReport {
            user_id,
            checked: records.len(),
            tampered,
        })
    }

    /// Re-run one stored decision under the rule pack version it was made with
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` for an unknown record or an unloaded rule
    /// pack version
    pub async fn replay(&self, record_id: Uuid) -> AppResult<ReplayReport> {
        let record = self
            .store
            .decision_record(record_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Decision record {record_id}")))?;
        self.replay_record(&record)
    }

    /// Replay a user's entire decision log
    ///
    /// # Errors
    ///
    /// As [`Self::replay`]
    pub async fn replay_history(&self, user_id: Uuid) -> AppResult<Vec<ReplayReport>> {
        let records = self.store.decision_records(user_id).await?;
        records.iter().map(|r| self.replay_record(r)).collect()
    }

    fn replay_record(&self, record: &DecisionRecord) -> AppResult<ReplayReport> {
        let pack = self.rule_packs.get(&record.rule_pack_version).ok_or_else(|| {
            AppError::not_found(format!("Rule pack {}", record.rule_pack_version))
                .with_user_id(record.user_id)
        })?;
        PlanEngine::replay(record, &pack)
    }

    fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.user_locks.entry(user_id).or_default().clone()
    }

    async fn with_retries<T, F, Fut>(&self, user_id: Uuid, mut attempt_cycle: F) -> AppResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match attempt_cycle().await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    // 20ms, 40ms, 80ms, ...
                    let backoff_ms = 10_u64 << attempt.min(10);
                    DecisionLogger::log_retry(user_id, attempt, self.max_retries, backoff_ms);
                    sleep(Duration::from_millis(backoff_ms)).await;
                }
                result => return result,
            }
        }
    }

    async fn active_plans(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<(NutritionPlan, TrainingPlan)>> {
        let Some(pointer) = self.store.active_pointer(user_id).await? else {
            return Ok(None);
        };
        let nutrition = self
            .store
            .nutrition_plan(user_id, pointer.nutrition_version)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!(
                    "active nutrition plan version {} missing",
                    pointer.nutrition_version
                ))
                .with_user_id(user_id)
            })?;
        let training = self
            .store
            .training_plan(user_id, pointer.training_version)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!(
                    "active training plan version {} missing",
                    pointer.training_version
                ))
                .with_user_id(user_id)
            })?;
        Ok(Some((nutrition, training)))
    }

    #[instrument(skip(self, submission), fields(user.id = %user_id))]
    async fn try_onboard(
        &self,
        user_id: Uuid,
        submission: &ProfileSubmission,
        now: DateTime<Utc>,
    ) -> AppResult<CommittedCycle> {
        let pack = self.rule_packs.active()?;
        let revision = self
            .store
            .latest_profile(user_id)
            .await?
            .map_or(1, |p| p.revision + 1);
        let profile = submission.clone().into_profile(user_id, revision, now);
        let prior_state = self.store.engine_state(user_id).await?;
        let prior_plans = self.active_plans(user_id).await?;
        let expected_revision = prior_state.as_ref().map(|s| s.revision);
        let (prior_nutrition, prior_training) = prior_plans.unzip();

        let inputs = DecisionInputs {
            profile: profile.clone(),
            checkins: Vec::new(),
            prior_state,
            prior_nutrition,
            prior_training,
            evaluated_at: now,
        };
        let outcome = PlanEngine::onboard(inputs, &pack, RecordStamp::new(now))
            .map_err(|e| e.with_user_id(user_id))?;

        self.commit(CycleCommit {
            expected_revision,
            profile: Some(profile),
            checkin: None,
            outcome,
        })
        .await
    }

    #[instrument(skip(self, submission), fields(user.id = %user_id))]
    async fn try_checkin(
        &self,
        user_id: Uuid,
        submission: &NewCheckIn,
        now: DateTime<Utc>,
    ) -> AppResult<CommittedCycle> {
        let pack = self.rule_packs.active()?;
        let profile = self.store.latest_profile(user_id).await?.ok_or_else(|| {
            AppError::not_found(format!("Profile for user {user_id}")).with_user_id(user_id)
        })?;
        let state = self.store.engine_state(user_id).await?.ok_or_else(|| {
            AppError::missing_field("user has not been onboarded").with_user_id(user_id)
        })?;
        let (prior_nutrition, prior_training) =
            self.active_plans(user_id).await?.ok_or_else(|| {
                AppError::missing_field(
                    "user has no active plan; resubmit the profile to generate one",
                )
                .with_user_id(user_id)
            })?;

        let history_len = pack
            .signals
            .window_size
            .max(pack.progress.stall_window)
            .saturating_sub(1);
        let mut checkins = self
            .store
            .recent_checkins(user_id, u32::try_from(history_len).unwrap_or(u32::MAX))
            .await?;
        let week_number = self.store.latest_week_number(user_id).await? + 1;
        let checkin = submission.clone().into_checkin(user_id, week_number, now);
        if let Some(previous) = checkins.last() {
            if checkin.recorded_at < previous.recorded_at {
                return Err(AppError::invalid_input(format!(
                    "check-in recorded at {} precedes week {} ({})",
                    checkin.recorded_at, previous.week_number, previous.recorded_at
                ))
                .with_user_id(user_id));
            }
        }
        checkins.push(checkin.clone());

        let inputs = DecisionInputs {
            profile,
            checkins,
            prior_state: Some(state.clone()),
            prior_nutrition: Some(prior_nutrition),
            prior_training: Some(prior_training),
            evaluated_at: now,
        };
        let outcome = PlanEngine::checkin(inputs, &pack, RecordStamp::new(now))
            .map_err(|e| e.with_user_id(user_id))?;

        self.commit(CycleCommit {
            expected_revision: Some(state.revision),
            profile: None,
            checkin: Some(checkin),
            outcome,
        })
        .await
    }

    async fn commit(&self, commit: CycleCommit) -> AppResult<CommittedCycle> {
        let record = &commit.outcome.record;
        DecisionLogger::log_guardrails(record.user_id, &record.guardrails);
        self.store.commit_cycle(&commit).await?;
        DecisionLogger::log_committed(&commit.outcome.record);

        let active = self.active_plans(commit.outcome.record.user_id).await?;
        Ok(CommittedCycle {
            outcome: commit.outcome,
            active,
        })
    }

    fn finish(&self, committed: CommittedCycle) -> CycleReport {
        let CommittedCycle { outcome, active } = committed;
        let explanation = self.explainer.explain(&outcome.record);
        info!(
            user.id = %outcome.record.user_id,
            decision.id = %outcome.record.id,
            "{explanation}"
        );
        let (nutrition_plan, training_plan) = active.unzip();
        CycleReport {
            record: outcome.record,
            nutrition_plan,
            training_plan,
            explanation,
        }
    }
}

/// A cycle that has been written, before it is explained
struct CommittedCycle {
    outcome: CycleOutcome,
    active: Option<(NutritionPlan, TrainingPlan)>,
}
