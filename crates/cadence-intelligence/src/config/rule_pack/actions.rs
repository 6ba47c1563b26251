// ABOUTME: Action selection configuration: confidence gate, override deltas, lock durations
// ABOUTME: Calorie deltas per mode family and the plan calorie band
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Settings for the action selector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionsConfig {
    /// Minimum confidence to act: 0.5
    pub min_confidence: f64,
    /// Calorie increase on critical recovery risk (kcal): 200
    pub critical_increase_kcal: i32,
    /// Calorie increase on high risk with a decreasing trend (kcal): 100
    pub high_risk_increase_kcal: i32,
    /// Cut plateau response (kcal): -100
    pub cut_plateau_kcal: i32,
    /// Cut reversal response (kcal): -150
    pub cut_reversal_kcal: i32,
    /// Gain plateau response (kcal): +100
    pub gain_plateau_kcal: i32,
    /// Gain reversal response (kcal): +150
    pub gain_reversal_kcal: i32,
    /// Days goal-driven calorie changes are suppressed after a change: 14
    pub anti_reversal_lock_days: i64,
    /// Half-width of the plan's acceptable intake band (kcal): 100
    pub calorie_band_kcal: i32,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            critical_increase_kcal: 200,
            high_risk_increase_kcal: 100,
            cut_plateau_kcal: -100,
            cut_reversal_kcal: -150,
            gain_plateau_kcal: 100,
            gain_reversal_kcal: 150,
            anti_reversal_lock_days: 14,
            calorie_band_kcal: 100,
        }
    }
}
