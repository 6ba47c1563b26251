// ABOUTME: Physiological and service constants shared across the Cadence workspace
// ABOUTME: Energy densities, rating scales, trigger names, and service identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Values that are facts rather than policy. Anything a product owner may want to
//! tune lives in the rule pack instead.

/// Energy density of macronutrients (Atwater general factors)
pub mod energy {
    /// Protein energy density (kcal per gram)
    pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
    /// Carbohydrate energy density (kcal per gram)
    pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
    /// Fat energy density (kcal per gram)
    pub const KCAL_PER_GRAM_FAT: f64 = 9.0;
    /// Days per week, used to project daily balances onto weekly weight change
    pub const DAYS_PER_WEEK: f64 = 7.0;
}

/// Subjective rating scale bounds used by check-ins
pub mod ratings {
    /// Lowest accepted rating
    pub const MIN_RATING: u8 = 0;
    /// Highest accepted rating
    pub const MAX_RATING: u8 = 10;
}

/// Anthropometric plausibility bounds enforced when a profile is submitted
pub mod anthropometrics {
    /// Minimum supported age in years
    pub const MIN_AGE_YEARS: u32 = 16;
    /// Maximum supported age in years
    pub const MAX_AGE_YEARS: u32 = 100;
    /// Maximum plausible body weight (kg)
    pub const MAX_WEIGHT_KG: f64 = 350.0;
    /// Maximum plausible height (cm)
    pub const MAX_HEIGHT_CM: f64 = 260.0;
    /// Minimum number of training days per week
    pub const MIN_TRAINING_DAYS: u8 = 2;
    /// Maximum number of training days per week
    pub const MAX_TRAINING_DAYS: u8 = 6;
}

/// Service identification
pub mod service_names {
    /// Service name used in structured logs
    pub const CADENCE: &str = "cadence";
    /// Binary name of the administrative CLI
    pub const CADENCE_CLI: &str = "cadence-cli";
}
