// ABOUTME: Per-user engine state: nutrition/training modes, locks, and week counters
// ABOUTME: Advanced only by the plan generator; history lives in decision records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::profile::Goal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Nutrition program state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NutritionMode {
    /// Deficit being actively driven
    CutActive,
    /// Deficit held, no further reductions
    CutHold,
    /// Deficit eased for recovery
    CutRecovery,
    /// Maintenance calories
    Maintain,
    /// Surplus being actively driven
    GainActive,
    /// Surplus held
    GainHold,
}

/// Coarse grouping of nutrition modes used by the action rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeFamily {
    /// `CUT_*` modes
    Cut,
    /// `MAINTAIN`
    Maintain,
    /// `GAIN_*` modes
    Gain,
}

impl NutritionMode {
    /// Mode a fresh onboarding starts in
    #[must_use]
    pub const fn initial_for(goal: Goal) -> Self {
        match goal {
            Goal::WeightLoss => Self::CutActive,
            Goal::Maintenance => Self::Maintain,
            Goal::MuscleGain => Self::GainActive,
        }
    }

    /// Family this mode belongs to
    #[must_use]
    pub const fn family(&self) -> ModeFamily {
        match self {
            Self::CutActive | Self::CutHold | Self::CutRecovery => ModeFamily::Cut,
            Self::Maintain => ModeFamily::Maintain,
            Self::GainActive | Self::GainHold => ModeFamily::Gain,
        }
    }

    /// Stable string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CutActive => "CUT_ACTIVE",
            Self::CutHold => "CUT_HOLD",
            Self::CutRecovery => "CUT_RECOVERY",
            Self::Maintain => "MAINTAIN",
            Self::GainActive => "GAIN_ACTIVE",
            Self::GainHold => "GAIN_HOLD",
        }
    }
}

/// Training program state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingMode {
    /// Volume may step up
    Progress,
    /// Volume held
    Hold,
    /// Scheduled or risk-driven reduction
    Deload,
}

impl TrainingMode {
    /// Stable string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Progress => "PROGRESS",
            Self::Hold => "HOLD",
            Self::Deload => "DELOAD",
        }
    }
}

/// Live engine state. One per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineState {
    /// Owner
    pub user_id: Uuid,
    /// Nutrition mode
    pub nutrition_mode: NutritionMode,
    /// Training mode
    pub training_mode: TrainingMode,
    /// Goal-driven calorie changes are suppressed until this instant
    pub anti_reversal_lock_until: Option<DateTime<Utc>>,
    /// Training volume step changes are suppressed until this instant
    pub program_lock_until: Option<DateTime<Utc>>,
    /// Check-in cycles since the last deload
    pub weeks_since_last_deload: u32,
    /// Check-in cycles since the last applied calorie change
    pub weeks_since_last_change: u32,
    /// Optimistic-concurrency revision, incremented on every write
    pub revision: u64,
    /// Last time the state advanced
    pub updated_at: DateTime<Utc>,
}

impl EngineState {
    /// Whether the anti-reversal lock is active at `now`
    #[must_use]
    pub fn calorie_locked(&self, now: DateTime<Utc>) -> bool {
        self.anti_reversal_lock_until.is_some_and(|until| now < until)
    }

    /// Whether the program lock is active at `now`
    #[must_use]
    pub fn program_locked(&self, now: DateTime<Utc>) -> bool {
        self.program_lock_until.is_some_and(|until| now < until)
    }
}
