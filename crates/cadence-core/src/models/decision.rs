// ABOUTME: Append-only decision record, the audit trail of every engine cycle
// ABOUTME: Input snapshot, derived signals, state transition, guardrails, and a SHA-256 content hash
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::checkin::CheckIn;
use super::engine_state::{EngineState, NutritionMode, TrainingMode};
use super::plan::{NutritionPlan, TrainingPlan};
use super::profile::AnthropometricProfile;
use super::signals::{DerivedSignals, ProgressAnalysis};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// What started the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// Profile submission (initial or resubmission)
    Onboarding,
    /// Weekly check-in
    Checkin,
}

impl TriggerType {
    /// Stable string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::Checkin => "checkin",
        }
    }
}

/// How the cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// First check-in: recorded as a baseline, nothing adjusted
    Baseline,
    /// New plan version(s) created
    Applied,
    /// Analysis ran, no change warranted
    NoChange,
    /// A change was proposed but a safety violation blocked it
    Blocked,
}

/// Severity of a guardrail event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailSeverity {
    /// Hard failure; the proposal was not applied as-is
    Violation,
    /// Advisory only
    Warning,
    /// The proposal was clamped into bounds and then applied
    Clamp,
    /// A lock suppressed an otherwise-selected change
    Suppressed,
}

/// One guardrail that fired during the cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailEvent {
    /// Stable identifier of the guardrail (e.g. `calorie_floor`)
    pub code: String,
    /// Severity
    pub severity: GuardrailSeverity,
    /// Human-readable detail
    pub message: String,
    /// Value proposed before the guardrail
    pub proposed: Option<f64>,
    /// Value after the guardrail, when it was clamped rather than rejected
    pub applied: Option<f64>,
}

impl GuardrailEvent {
    /// Build an event without numeric context
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        severity: GuardrailSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            proposed: None,
            applied: None,
        }
    }

    /// Attach the proposed and applied values
    #[must_use]
    pub fn with_values(mut self, proposed: f64, applied: Option<f64>) -> Self {
        self.proposed = Some(proposed);
        self.applied = applied;
        self
    }

    /// Whether this event blocks the change
    #[must_use]
    pub const fn is_violation(&self) -> bool {
        matches!(self.severity, GuardrailSeverity::Violation)
    }
}

/// Resulting action set of a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSet {
    /// Applied calorie change (kcal/day)
    pub calorie_delta_kcal: i32,
    /// Calorie target in effect after the cycle
    pub calorie_target: i32,
    /// Nutrition plan version created this cycle
    pub nutrition_version: Option<u32>,
    /// Training plan version created this cycle
    pub training_version: Option<u32>,
    /// Fractional volume change applied (e.g. -0.10)
    pub volume_change_fraction: f64,
    /// Whether a deload starts this cycle
    pub deload: bool,
    /// Nutrition mode after the cycle
    pub nutrition_mode: NutritionMode,
    /// Training mode after the cycle
    pub training_mode: TrainingMode,
}

/// Snapshot of everything the cycle was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionInputs {
    /// Profile revision in force
    pub profile: AnthropometricProfile,
    /// Check-in window, oldest first (empty for onboarding)
    pub checkins: Vec<CheckIn>,
    /// Engine state before the cycle
    pub prior_state: Option<EngineState>,
    /// Active nutrition plan before the cycle
    pub prior_nutrition: Option<NutritionPlan>,
    /// Active training plan before the cycle
    pub prior_training: Option<TrainingPlan>,
    /// Logical evaluation time
    pub evaluated_at: DateTime<Utc>,
}

/// Append-only audit entry, one per onboarding or check-in event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// What started the cycle
    pub trigger: TriggerType,
    /// Rule pack version the cycle was computed under
    pub rule_pack_version: String,
    /// Input snapshot
    pub inputs: DecisionInputs,
    /// Derived signals (check-in cycles with enough history)
    pub signals: Option<DerivedSignals>,
    /// Progress analysis (check-in cycles with enough history)
    pub progress: Option<ProgressAnalysis>,
    /// Engine state before the cycle
    pub pre_state: Option<EngineState>,
    /// Engine state after the cycle
    pub post_state: EngineState,
    /// Names of the rules that fired, in evaluation order
    pub rules_fired: Vec<String>,
    /// Guardrails applied
    pub guardrails: Vec<GuardrailEvent>,
    /// Resulting actions
    pub actions: ActionSet,
    /// How the cycle ended
    pub outcome: DecisionOutcome,
    /// Hex SHA-256 over every other field
    pub content_hash: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Borrowed view of a record without its hash; the hashed byte layout
#[derive(Serialize)]
struct HashedContent<'a> {
    id: &'a Uuid,
    user_id: &'a Uuid,
    trigger: &'a TriggerType,
    rule_pack_version: &'a str,
    inputs: &'a DecisionInputs,
    signals: &'a Option<DerivedSignals>,
    progress: &'a Option<ProgressAnalysis>,
    pre_state: &'a Option<EngineState>,
    post_state: &'a EngineState,
    rules_fired: &'a [String],
    guardrails: &'a [GuardrailEvent],
    actions: &'a ActionSet,
    outcome: &'a DecisionOutcome,
    created_at: &'a DateTime<Utc>,
}

impl DecisionRecord {
    /// Compute the content hash of this record's fields (excluding the hash itself)
    ///
    /// # Errors
    ///
    /// Returns `SERIALIZATION_ERROR` if a field cannot be encoded
    pub fn compute_hash(&self) -> AppResult<String> {
        let content = HashedContent {
            id: &self.id,
            user_id: &self.user_id,
            trigger: &self.trigger,
            rule_pack_version: &self.rule_pack_version,
            inputs: &self.inputs,
            signals: &self.signals,
            progress: &self.progress,
            pre_state: &self.pre_state,
            post_state: &self.post_state,
            rules_fired: &self.rules_fired,
            guardrails: &self.guardrails,
            actions: &self.actions,
            outcome: &self.outcome,
            created_at: &self.created_at,
        };
        let bytes = serde_json::to_vec(&content)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    /// Fill in `content_hash`. Call once, after every other field is final.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::compute_hash`] failures
    pub fn seal(mut self) -> AppResult<Self> {
        self.content_hash = self.compute_hash()?;
        Ok(self)
    }

    /// Check the stored hash against the record's content
    ///
    /// # Errors
    ///
    /// Returns `INTEGRITY_ERROR` when the hash does not match
    pub fn verify_integrity(&self) -> AppResult<()> {
        let expected = self.compute_hash()?;
        if expected == self.content_hash {
            Ok(())
        } else {
            Err(AppError::integrity(format!(
                "decision record {} hash mismatch (stored {}, computed {expected})",
                self.id, self.content_hash
            ))
            .with_user_id(self.user_id))
        }
    }
}
