// ABOUTME: Energy expenditure configuration for the rule pack
// ABOUTME: Activity multipliers for TDEE and the energy density of body tissue
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Energy Expenditure Configuration
//!
//! # Scientific References
//!
//! - BMR: Mifflin et al. (1990) DOI: 10.1093/ajcn/51.2.241
//! - Activity factors: `McArdle`, Katch & Katch (2010). Exercise Physiology
//! - Tissue energy: Wishnofsky (1958), ~7700 kcal per kg of body mass change

use serde::{Deserialize, Serialize};

/// Energy expenditure settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnergyConfig {
    /// Energy per kilogram of body-mass change (kcal/kg): 7700
    pub kcal_per_kg_tissue: f64,
    /// Activity multipliers for TDEE
    pub activity_multipliers: ActivityMultipliers,
}

/// Activity factor multipliers for TDEE calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityMultipliers {
    /// Sedentary (little/no exercise): 1.2
    pub sedentary: f64,
    /// Light (1-3 days/week): 1.375
    pub light: f64,
    /// Moderate (3-5 days/week): 1.55
    pub moderate: f64,
    /// Active (6-7 days/week): 1.725
    pub active: f64,
    /// Very active (hard training twice a day): 1.9
    pub very_active: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            kcal_per_kg_tissue: 7700.0,
            activity_multipliers: ActivityMultipliers::default(),
        }
    }
}

impl Default for ActivityMultipliers {
    fn default() -> Self {
        Self {
            sedentary: 1.2,
            light: 1.375,
            moderate: 1.55,
            active: 1.725,
            very_active: 1.9,
        }
    }
}
