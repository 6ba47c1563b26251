// ABOUTME: Anthropometric and training profile submitted at onboarding
// ABOUTME: Sex, activity level, goal, and training-context enums with validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::anthropometrics::{
    MAX_AGE_YEARS, MAX_HEIGHT_CM, MAX_TRAINING_DAYS, MAX_WEIGHT_KG, MIN_AGE_YEARS,
    MIN_TRAINING_DAYS,
};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Biological sex used by the BMR equation and calorie floors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiologicalSex {
    /// Male (+5 kcal BMR constant)
    Male,
    /// Female (-161 kcal BMR constant)
    Female,
}

/// Habitual activity level, mapped to a TDEE multiplier by the rule pack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Light exercise 1-3 days/week
    Light,
    /// Moderate exercise 3-5 days/week
    Moderate,
    /// Hard exercise 6-7 days/week
    Active,
    /// Hard daily exercise plus a physical job
    VeryActive,
}

/// Primary goal driving energy balance and macro ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Caloric deficit
    WeightLoss,
    /// Caloric balance
    Maintenance,
    /// Caloric surplus
    MuscleGain,
}

impl Goal {
    /// Stable string form used in logs and storage keys
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WeightLoss => "weight_loss",
            Self::Maintenance => "maintenance",
            Self::MuscleGain => "muscle_gain",
        }
    }
}

/// Resistance-training experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Experience {
    /// Less than a year of structured training
    Beginner,
    /// One to three years
    Intermediate,
    /// More than three years
    Advanced,
}

impl Experience {
    /// Program-id fragment
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

/// Equipment available for training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    /// Commercial gym
    FullGym,
    /// Adjustable dumbbells and a bench at home
    HomeDumbbells,
    /// No equipment
    Bodyweight,
}

impl Equipment {
    /// Program-id fragment
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FullGym => "gym",
            Self::HomeDumbbells => "dumbbell",
            Self::Bodyweight => "bodyweight",
        }
    }
}

/// Training context used to select a program at onboarding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingProfile {
    /// Training experience
    pub experience: Experience,
    /// Sessions per week the user can commit to
    pub days_per_week: u8,
    /// Available equipment
    pub equipment: Equipment,
    /// Free-form injury flags (e.g. "lower_back", "knee")
    #[serde(default)]
    pub injuries: Vec<String>,
}

/// Onboarding submission. Immutable once stored; a resubmission creates a new
/// revision rather than editing this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropometricProfile {
    /// Owner
    pub user_id: Uuid,
    /// Revision number, starting at 1 and incremented on every resubmission
    pub revision: u32,
    /// Age in whole years
    pub age_years: u32,
    /// Biological sex
    pub sex: BiologicalSex,
    /// Height in centimeters
    pub height_cm: f64,
    /// Body weight in kilograms at submission time
    pub weight_kg: f64,
    /// Habitual activity level
    pub activity_level: ActivityLevel,
    /// Primary goal
    pub goal: Goal,
    /// Training context
    pub training: TrainingProfile,
    /// When this revision was submitted
    pub submitted_at: DateTime<Utc>,
}

impl AnthropometricProfile {
    /// Check the submission against plausibility bounds.
    ///
    /// The energy calculators assume their inputs are valid; this is the
    /// upstream gate that makes that assumption true.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` / `VALUE_OUT_OF_RANGE` for implausible values
    pub fn validate(&self) -> AppResult<()> {
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 || self.weight_kg > MAX_WEIGHT_KG
        {
            return Err(AppError::out_of_range(format!(
                "weight_kg must be between 0 and {MAX_WEIGHT_KG}"
            )));
        }
        if !self.height_cm.is_finite() || self.height_cm <= 0.0 || self.height_cm > MAX_HEIGHT_CM
        {
            return Err(AppError::out_of_range(format!(
                "height_cm must be between 0 and {MAX_HEIGHT_CM}"
            )));
        }
        if !(MIN_AGE_YEARS..=MAX_AGE_YEARS).contains(&self.age_years) {
            return Err(AppError::out_of_range(format!(
                "age_years must be between {MIN_AGE_YEARS} and {MAX_AGE_YEARS}"
            )));
        }
        if !(MIN_TRAINING_DAYS..=MAX_TRAINING_DAYS).contains(&self.training.days_per_week) {
            return Err(AppError::out_of_range(format!(
                "days_per_week must be between {MIN_TRAINING_DAYS} and {MAX_TRAINING_DAYS}"
            )));
        }
        if self.revision == 0 {
            return Err(AppError::invalid_input("profile revision starts at 1"));
        }
        Ok(())
    }
}
