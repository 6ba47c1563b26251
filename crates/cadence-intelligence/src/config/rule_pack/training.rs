// ABOUTME: Training configuration: volume steps, deload cadence, program lock, age and injury scaling
// ABOUTME: Consumed by the action selector's volume rule and the training planner
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Training settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    /// Volume change when performance regresses: -0.10
    pub regress_volume_step: f64,
    /// Volume change when performance stalls: +0.05
    pub stall_volume_step: f64,
    /// Lowest volume multiplier: 0.5
    pub min_volume: f64,
    /// Highest volume multiplier: 1.3
    pub max_volume: f64,
    /// Deload cadence and depth
    pub deload: DeloadConfig,
    /// Days volume steps are suppressed after onboarding: 14
    pub program_lock_days: i64,
    /// Validity window of every plan version (days): 7
    pub plan_validity_days: i64,
    /// Age brackets, ascending by `min_age`; the highest matching bracket applies
    pub age_adjustments: Vec<AgeAdjustment>,
    /// Volume factor applied per injury flag: 0.9
    pub injury_volume_factor: f64,
    /// Intensity factor applied per injury flag: 0.95
    pub injury_intensity_factor: f64,
    /// Floor for onboarding multipliers: 0.6
    pub multiplier_floor: f64,
}

/// Deload cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeloadConfig {
    /// Weeks between deloads: 5
    pub frequency_weeks: u32,
    /// Lowest permitted frequency: 3
    pub min_frequency_weeks: u32,
    /// Highest permitted frequency: 8
    pub max_frequency_weeks: u32,
    /// Volume multiplier during a deload: 0.6
    pub volume_multiplier: f64,
    /// Intensity multiplier during a deload: 0.9
    pub intensity_multiplier: f64,
}

/// Multipliers for one age bracket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeAdjustment {
    /// Bracket applies from this age
    pub min_age: u32,
    /// Volume multiplier
    pub volume_multiplier: f64,
    /// Intensity multiplier
    pub intensity_multiplier: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            regress_volume_step: -0.10,
            stall_volume_step: 0.05,
            min_volume: 0.5,
            max_volume: 1.3,
            deload: DeloadConfig {
                frequency_weeks: 5,
                min_frequency_weeks: 3,
                max_frequency_weeks: 8,
                volume_multiplier: 0.6,
                intensity_multiplier: 0.9,
            },
            program_lock_days: 14,
            plan_validity_days: 7,
            age_adjustments: vec![
                AgeAdjustment {
                    min_age: 50,
                    volume_multiplier: 0.9,
                    intensity_multiplier: 0.95,
                },
                AgeAdjustment {
                    min_age: 65,
                    volume_multiplier: 0.8,
                    intensity_multiplier: 0.9,
                },
            ],
            injury_volume_factor: 0.9,
            injury_intensity_factor: 0.95,
            multiplier_floor: 0.6,
        }
    }
}
