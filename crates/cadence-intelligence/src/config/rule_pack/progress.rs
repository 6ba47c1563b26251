// ABOUTME: Progress analysis configuration: tolerances, thresholds, and fixed corrections
// ABOUTME: Drives pattern classification and the recommended calorie adjustment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Settings for the progress analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressConfig {
    /// On-track tolerance for weight loss and muscle gain (kg/week): 0.2
    pub tolerance_kg: f64,
    /// On-track tolerance for maintenance (kg/week): 0.3
    pub maintenance_tolerance_kg: f64,
    /// Difference beyond which a rate is too fast or too slow (kg/week): 0.3
    pub action_threshold_kg: f64,
    /// Shortfall beyond which a gain is too slow (kg/week): 0.2
    pub gain_slow_threshold_kg: f64,
    /// Calorie response per kg/week of difference: 1100
    pub kcal_per_kg_delta: f64,
    /// Cap on the proportional adjustment (kcal): 200
    pub max_adjustment_kcal: i32,
    /// Weight gained during a cut (kcal): -150
    pub reversed_cut_kcal: i32,
    /// Muscle gain too fast (kcal): -100
    pub gain_too_fast_kcal: i32,
    /// Muscle gain too slow (kcal): +150
    pub gain_too_slow_kcal: i32,
    /// Weight lost during a gain (kcal): +200
    pub reversed_gain_kcal: i32,
    /// Maintenance correction magnitude (kcal): 100
    pub maintenance_correction_kcal: i32,
    /// Loss rate at or below which a gain counts as reversed (kg/week): 0.2
    pub reversed_gain_loss_kg: f64,
    /// Number of recent weights checked for a stall: 4
    pub stall_window: usize,
    /// Span below which recent weights count as stalled (kg): 0.3
    pub stall_range_kg: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tolerance_kg: 0.2,
            maintenance_tolerance_kg: 0.3,
            action_threshold_kg: 0.3,
            gain_slow_threshold_kg: 0.2,
            kcal_per_kg_delta: 1100.0,
            max_adjustment_kcal: 200,
            reversed_cut_kcal: -150,
            gain_too_fast_kcal: -100,
            gain_too_slow_kcal: 150,
            reversed_gain_kcal: 200,
            maintenance_correction_kcal: 100,
            reversed_gain_loss_kg: 0.2,
            stall_window: 4,
            stall_range_kg: 0.3,
        }
    }
}
