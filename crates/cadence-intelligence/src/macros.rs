// ABOUTME: Macronutrient allocator splitting a calorie target into protein, fat, and carbohydrate
// ABOUTME: Protein and fat from per-goal g/kg ratios; carbohydrate absorbs the remainder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Macro Allocation
//!
//! # Scientific References
//!
//! - Phillips, S.M., & Van Loon, L.J. (2011). Dietary protein for athletes.
//!   *Journal of Sports Sciences*, 29(sup1), S29-S38.
//!   <https://doi.org/10.1080/02640414.2011.619204>
//! - Helms, E.R., et al. (2014). Evidence-based recommendations for natural bodybuilding
//!   contest preparation. *JISSN*, 11, 20. <https://doi.org/10.1186/1550-2783-11-20>

use crate::config::RulePack;
use crate::numeric::round1;
use cadence_core::constants::energy::{
    KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN,
};
use cadence_core::models::{Goal, MacroTargets};

/// Splits calories into macronutrient grams
pub struct MacroAllocator;

impl MacroAllocator {
    /// Allocate `target_calories` for a person of `weight_kg` pursuing `goal`
    #[must_use]
    pub fn allocate(weight_kg: f64, target_calories: i32, goal: Goal, pack: &RulePack) -> MacroTargets {
        let defaults = pack.goals.for_goal(goal);
        let protein_g = round1(weight_kg * defaults.protein_g_per_kg.at(defaults.protein_point));
        let fat_g = round1(weight_kg * defaults.fat_g_per_kg.midpoint());

        let protein_kcal = protein_g * KCAL_PER_GRAM_PROTEIN;
        let fat_kcal = fat_g * KCAL_PER_GRAM_FAT;
        let remaining = f64::from(target_calories) - protein_kcal - fat_kcal;
        let carbs_g = round1((remaining / KCAL_PER_GRAM_CARBS).max(0.0));

        MacroTargets {
            protein_g,
            fat_g,
            carbs_g,
            protein_kcal: round1(protein_kcal),
            fat_kcal: round1(fat_kcal),
            carbs_kcal: round1(carbs_g * KCAL_PER_GRAM_CARBS),
        }
    }

    /// Whether macro energy reconstructs `target_calories` within `tolerance_fraction`
    #[must_use]
    pub fn within_tolerance(macros: &MacroTargets, target_calories: i32, tolerance_fraction: f64) -> bool {
        let target = f64::from(target_calories);
        if target <= 0.0 {
            return false;
        }
        ((macros.total_kcal() - target).abs() / target) <= tolerance_fraction
    }
}
