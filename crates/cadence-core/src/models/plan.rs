// ABOUTME: Immutable, versioned nutrition and training plans plus the active-plan pointer
// ABOUTME: Plans are never edited; a change creates version N+1 and repoints the user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily macronutrient targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    /// Protein (g)
    pub protein_g: f64,
    /// Fat (g)
    pub fat_g: f64,
    /// Carbohydrate (g), never negative
    pub carbs_g: f64,
    /// Energy from protein (kcal)
    pub protein_kcal: f64,
    /// Energy from fat (kcal)
    pub fat_kcal: f64,
    /// Energy from carbohydrate (kcal)
    pub carbs_kcal: f64,
}

impl MacroTargets {
    /// Energy reconstructed from all three macros (kcal)
    #[must_use]
    pub fn total_kcal(&self) -> f64 {
        self.protein_kcal + self.fat_kcal + self.carbs_kcal
    }
}

/// One version of a user's nutrition plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPlan {
    /// Owner
    pub user_id: Uuid,
    /// Version, starting at 1, monotonically increasing per user
    pub version: u32,
    /// Daily calorie target (kcal)
    pub calorie_target: i32,
    /// Lower edge of the acceptable intake band (kcal)
    pub calorie_min: i32,
    /// Upper edge of the acceptable intake band (kcal)
    pub calorie_max: i32,
    /// TDEE estimate the target was derived from (kcal)
    pub tdee: i32,
    /// Macronutrient split of the target
    pub macros: MacroTargets,
    /// Projected weekly weight change at this target (kg/week)
    pub projected_weekly_change_kg: f64,
    /// Start of validity
    pub valid_from: DateTime<Utc>,
    /// End of validity; superseded earlier if a new version is created
    pub valid_until: DateTime<Utc>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// One version of a user's training plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    /// Owner
    pub user_id: Uuid,
    /// Version, starting at 1, monotonically increasing per user
    pub version: u32,
    /// Program identifier from the selection table
    pub program_id: String,
    /// Week within the program
    pub program_week: u32,
    /// Volume multiplier relative to the program's base volume
    pub volume_multiplier: f64,
    /// Intensity multiplier relative to the program's base loads
    pub intensity_multiplier: f64,
    /// Whether this week is a deload
    pub deload: bool,
    /// Start of validity
    pub valid_from: DateTime<Utc>,
    /// End of validity
    pub valid_until: DateTime<Utc>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Points a user at their current plan versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePlanPointer {
    /// Owner
    pub user_id: Uuid,
    /// Active nutrition plan version
    pub nutrition_version: u32,
    /// Active training plan version
    pub training_version: u32,
    /// Last repoint time
    pub updated_at: DateTime<Utc>,
}
