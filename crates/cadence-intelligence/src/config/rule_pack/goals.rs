// ABOUTME: Per-goal energy balance fractions and macronutrient ratio ranges
// ABOUTME: Encodes which point of the protein range each goal uses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Goal Defaults Configuration
//!
//! # Scientific References
//!
//! - Protein: Phillips & Van Loon (2011) DOI: 10.1080/02640414.2011.619204
//! - Protein under deficit: Helms et al. (2014) DOI: 10.1186/1550-2783-11-20

use cadence_core::models::Goal;
use serde::{Deserialize, Serialize};

/// An inclusive g/kg range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RatioRange {
    /// Low end (g/kg)
    pub min: f64,
    /// High end (g/kg)
    pub max: f64,
}

impl RatioRange {
    /// Midpoint of the range
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Value at the requested point
    #[must_use]
    pub fn at(&self, point: RangePoint) -> f64 {
        match point {
            RangePoint::LowEnd => self.min,
            RangePoint::Midpoint => self.midpoint(),
            RangePoint::HighEnd => self.max,
        }
    }
}

/// Which point of a range a goal targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePoint {
    /// Low end
    LowEnd,
    /// Midpoint
    Midpoint,
    /// High end
    HighEnd,
}

/// Defaults for one goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoalDefaults {
    /// Signed fraction of TDEE applied as deficit (negative) or surplus (positive)
    pub energy_fraction: f64,
    /// Protein range (g/kg)
    pub protein_g_per_kg: RatioRange,
    /// Point of the protein range this goal uses
    pub protein_point: RangePoint,
    /// Fat range (g/kg); the midpoint is used
    pub fat_g_per_kg: RatioRange,
}

/// Defaults for every goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoalsConfig {
    /// Weight loss: -20% of TDEE, protein 1.8-2.4 g/kg at the high end
    pub weight_loss: GoalDefaults,
    /// Maintenance: 0%, protein 1.6-2.2 g/kg midpoint
    pub maintenance: GoalDefaults,
    /// Muscle gain: +10% of TDEE, protein 1.8-2.2 g/kg midpoint
    pub muscle_gain: GoalDefaults,
}

impl GoalsConfig {
    /// Defaults for `goal`
    #[must_use]
    pub const fn for_goal(&self, goal: Goal) -> &GoalDefaults {
        match goal {
            Goal::WeightLoss => &self.weight_loss,
            Goal::Maintenance => &self.maintenance,
            Goal::MuscleGain => &self.muscle_gain,
        }
    }
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            weight_loss: GoalDefaults {
                energy_fraction: -0.20,
                protein_g_per_kg: RatioRange { min: 1.8, max: 2.4 },
                protein_point: RangePoint::HighEnd,
                fat_g_per_kg: RatioRange { min: 0.6, max: 1.0 },
            },
            maintenance: GoalDefaults {
                energy_fraction: 0.0,
                protein_g_per_kg: RatioRange { min: 1.6, max: 2.2 },
                protein_point: RangePoint::Midpoint,
                fat_g_per_kg: RatioRange { min: 0.8, max: 1.2 },
            },
            muscle_gain: GoalDefaults {
                energy_fraction: 0.10,
                protein_g_per_kg: RatioRange { min: 1.8, max: 2.2 },
                protein_point: RangePoint::Midpoint,
                fat_g_per_kg: RatioRange { min: 0.8, max: 1.2 },
            },
        }
    }
}
