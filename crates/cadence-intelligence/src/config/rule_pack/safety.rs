// ABOUTME: Safety guardrail configuration: calorie floors, balance caps, protein bounds
// ABOUTME: Every threshold the safety validator and the action clamp enforce
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Hard numeric bounds applied before any plan is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SafetyConfig {
    /// Minimum daily calories for males (kcal): 1500
    pub calorie_floor_male: i32,
    /// Minimum daily calories for females (kcal): 1200
    pub calorie_floor_female: i32,
    /// Largest permitted deficit below TDEE (kcal/day): 500
    pub max_deficit_kcal: i32,
    /// Largest permitted surplus above TDEE (kcal/day): 300
    pub max_surplus_kcal: i32,
    /// Physiological protein floor (g/kg): 1.6
    pub protein_floor_g_per_kg: f64,
    /// Protein intake above which a warning is raised (g/kg): 3.0
    pub protein_warning_g_per_kg: f64,
    /// Largest projected weekly loss as a percentage of body weight: 1.0
    pub max_weekly_loss_percent: f64,
    /// Largest single-step calorie change (kcal): 200
    pub max_step_kcal: i32,
    /// Single-step change at or above which a warning is raised (kcal): 150
    pub warn_step_kcal: i32,
    /// Step used when an unsafe recommendation is clamped (kcal): 100
    pub fallback_step_kcal: i32,
    /// Deficit cap relative to TDEE used by the action clamp: 0.25
    pub max_deficit_fraction_of_tdee: f64,
    /// Surplus cap relative to TDEE used by the action clamp: 0.15
    pub max_surplus_fraction_of_tdee: f64,
    /// Allowed mismatch between macro energy and target calories: 0.05
    pub macro_tolerance_fraction: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            calorie_floor_male: 1500,
            calorie_floor_female: 1200,
            max_deficit_kcal: 500,
            max_surplus_kcal: 300,
            protein_floor_g_per_kg: 1.6,
            protein_warning_g_per_kg: 3.0,
            max_weekly_loss_percent: 1.0,
            max_step_kcal: 200,
            warn_step_kcal: 150,
            fallback_step_kcal: 100,
            max_deficit_fraction_of_tdee: 0.25,
            max_surplus_fraction_of_tdee: 0.15,
            macro_tolerance_fraction: 0.05,
        }
    }
}
