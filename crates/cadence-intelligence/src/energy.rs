// ABOUTME: Energy estimator (BMR/TDEE) and energy balance selector for initial calorie targets
// ABOUTME: Mifflin-St Jeor BMR, activity multipliers, and capped deficit or surplus selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Energy Estimation and Balance
//!
//! # Scientific References
//!
//! - Mifflin, M.D., et al. (1990). A new predictive equation for resting energy expenditure.
//!   *American Journal of Clinical Nutrition*, 51(2), 241-247.
//!   <https://doi.org/10.1093/ajcn/51.2.241>
//!
//! - Hall, K.D. (2008). What is the required energy deficit per unit weight loss?
//!   *International Journal of Obesity*, 32(3), 573-576.
//!   <https://doi.org/10.1038/sj.ijo.0803720>

use crate::config::RulePack;
use crate::numeric::{round2, round3};
use cadence_core::constants::energy::DAYS_PER_WEEK;
use cadence_core::models::{ActivityLevel, AnthropometricProfile, BiologicalSex, Goal};
use serde::{Deserialize, Serialize};

/// Mifflin-St Jeor weight coefficient
const MSJ_WEIGHT_COEF: f64 = 10.0;
/// Mifflin-St Jeor height coefficient
const MSJ_HEIGHT_COEF: f64 = 6.25;
/// Mifflin-St Jeor age coefficient
const MSJ_AGE_COEF: f64 = -5.0;
/// Mifflin-St Jeor male offset
const MSJ_MALE_CONSTANT: f64 = 5.0;
/// Mifflin-St Jeor female offset
const MSJ_FEMALE_CONSTANT: f64 = -161.0;

/// BMR and TDEE for one profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyEstimate {
    /// Basal metabolic rate (kcal/day)
    pub bmr: i32,
    /// Total daily energy expenditure (kcal/day)
    pub tdee: i32,
}

/// Basal and total energy expenditure
pub struct EnergyEstimator;

impl EnergyEstimator {
    /// BMR via Mifflin-St Jeor, rounded to the nearest kcal
    ///
    /// Inputs are validated upstream; this never fails.
    #[must_use]
    pub fn bmr(weight_kg: f64, height_cm: f64, age_years: u32, sex: BiologicalSex) -> i32 {
        let sex_constant = match sex {
            BiologicalSex::Male => MSJ_MALE_CONSTANT,
            BiologicalSex::Female => MSJ_FEMALE_CONSTANT,
        };
        let bmr = MSJ_AGE_COEF.mul_add(
            f64::from(age_years),
            MSJ_WEIGHT_COEF.mul_add(weight_kg, MSJ_HEIGHT_COEF * height_cm),
        ) + sex_constant;
        bmr.round() as i32
    }

    /// TDEE = round(BMR x activity multiplier)
    #[must_use]
    pub fn tdee(bmr: i32, activity_level: ActivityLevel, pack: &RulePack) -> i32 {
        (f64::from(bmr) * pack.activity_multiplier(activity_level)).round() as i32
    }

    /// BMR and TDEE for `profile`
    #[must_use]
    pub fn estimate(profile: &AnthropometricProfile, pack: &RulePack) -> EnergyEstimate {
        let bmr = Self::bmr(
            profile.weight_kg,
            profile.height_cm,
            profile.age_years,
            profile.sex,
        );
        EnergyEstimate {
            bmr,
            tdee: Self::tdee(bmr, profile.activity_level, pack),
        }
    }
}

/// Initial calorie target for a goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyBalance {
    /// Daily calorie target (kcal)
    pub target_calories: i32,
    /// Target minus TDEE; negative is a deficit (kcal/day)
    pub deficit_kcal: i32,
    /// `deficit_kcal / tdee`
    pub deficit_fraction: f64,
    /// Projected weekly weight change (kg/week, two decimals)
    pub projected_weekly_change_kg: f64,
    /// Projected weekly change as a percentage of body weight
    pub projected_weekly_change_percent: f64,
    /// The absolute cap was tighter than the goal percentage
    pub capped: bool,
    /// The target was raised to the calorie floor
    pub floor_applied: bool,
}

/// Picks the initial deficit, surplus, or maintenance target
pub struct EnergyBalanceSelector;

impl EnergyBalanceSelector {
    /// Apply the goal's energy fraction to TDEE, then the absolute cap; the tighter wins
    #[must_use]
    pub fn select(
        tdee: i32,
        goal: Goal,
        weight_kg: f64,
        sex: BiologicalSex,
        pack: &RulePack,
    ) -> EnergyBalance {
        let fraction = pack.goals.for_goal(goal).energy_fraction;
        let raw = (f64::from(tdee) * fraction).round() as i32;

        let (delta, capped) = match goal {
            Goal::WeightLoss => {
                let cap = -pack.safety.max_deficit_kcal;
                (raw.max(cap), raw < cap)
            }
            Goal::MuscleGain => {
                let cap = pack.safety.max_surplus_kcal;
                (raw.min(cap), raw > cap)
            }
            Goal::Maintenance => (0, false),
        };

        let floor = pack.calorie_floor(sex);
        let uncapped_target = tdee + delta;
        let floor_applied = uncapped_target < floor;
        let target_calories = uncapped_target.max(floor);
        let deficit_kcal = target_calories - tdee;

        let projected = Self::projected_weekly_change(deficit_kcal, pack);
        let percent = if weight_kg > 0.0 {
            round3(projected / weight_kg * 100.0)
        } else {
            0.0
        };

        EnergyBalance {
            target_calories,
            deficit_kcal,
            deficit_fraction: if tdee > 0 {
                round3(f64::from(deficit_kcal) / f64::from(tdee))
            } else {
                0.0
            },
            projected_weekly_change_kg: projected,
            projected_weekly_change_percent: percent,
            capped,
            floor_applied,
        }
    }

    /// Weekly weight change implied by a daily energy delta (kg/week, two decimals)
    #[must_use]
    pub fn projected_weekly_change(delta_kcal: i32, pack: &RulePack) -> f64 {
        round2(f64::from(delta_kcal) * DAYS_PER_WEEK / pack.energy.kcal_per_kg_tissue)
    }
}
