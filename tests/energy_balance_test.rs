// ABOUTME: Tests for BMR/TDEE estimation and initial energy balance selection
// ABOUTME: Mifflin-St Jeor values, activity multipliers, deficit and surplus caps, calorie floors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use cadence::engine::config::RulePack;
use cadence::engine::energy::{EnergyBalanceSelector, EnergyEstimator};
use cadence::models::{ActivityLevel, BiologicalSex, Goal};
use uuid::Uuid;

mod common;

// ============================================================================
// BMR / TDEE
// ============================================================================

#[test]
fn test_bmr_male_typical() {
    // 10 * 90 + 6.25 * 180 - 5 * 30 + 5 = 1880
    assert_eq!(EnergyEstimator::bmr(90.0, 180.0, 30, BiologicalSex::Male), 1880);
}

#[test]
fn test_bmr_female_typical() {
    // 10 * 60 + 6.25 * 165 - 5 * 25 - 161 = 1345.25
    assert_eq!(EnergyEstimator::bmr(60.0, 165.0, 25, BiologicalSex::Female), 1345);
}

#[test]
fn test_tdee_all_activity_levels() {
    let pack = RulePack::baseline();
    let cases = [
        (ActivityLevel::Sedentary, 2256),
        (ActivityLevel::Light, 2585),
        (ActivityLevel::Moderate, 2914),
        (ActivityLevel::Active, 3243),
        (ActivityLevel::VeryActive, 3572),
    ];
    for (level, expected) in cases {
        assert_eq!(EnergyEstimator::tdee(1880, level, &pack), expected, "{level:?}");
    }
}

#[test]
fn test_estimate_from_profile() {
    let pack = RulePack::baseline();
    let estimate = EnergyEstimator::estimate(&common::cut_profile(Uuid::new_v4()), &pack);
    assert_eq!(estimate.bmr, 1880);
    assert_eq!(estimate.tdee, 2914);
}

#[test]
fn test_reference_male_80kg_cut() {
    let pack = RulePack::baseline();
    // 10 * 80 + 6.25 * 180 - 5 * 30 + 5 = 1780; x 1.55 = 2759
    let bmr = EnergyEstimator::bmr(80.0, 180.0, 30, BiologicalSex::Male);
    let tdee = EnergyEstimator::tdee(bmr, ActivityLevel::Moderate, &pack);
    assert_eq!(bmr, 1780);
    assert_eq!(tdee, 2759);

    let balance =
        EnergyBalanceSelector::select(tdee, Goal::WeightLoss, 80.0, BiologicalSex::Male, &pack);
    assert_eq!(balance.target_calories, 2259);
    assert_eq!(balance.deficit_kcal, -500);
    assert!(balance.capped);
}

// ============================================================================
// ENERGY BALANCE
// ============================================================================

#[test]
fn test_weight_loss_deficit_capped_at_absolute_limit() {
    let pack = RulePack::baseline();
    // 20% of 2914 is 583 kcal, above the 500 kcal cap
    let balance = EnergyBalanceSelector::select(2914, Goal::WeightLoss, 90.0, BiologicalSex::Male, &pack);

    assert_eq!(balance.target_calories, 2414);
    assert_eq!(balance.deficit_kcal, -500);
    assert!(balance.capped);
    assert!(!balance.floor_applied);
    assert!((balance.projected_weekly_change_kg - -0.45).abs() < 1e-9);
    assert!((balance.projected_weekly_change_percent - -0.5).abs() < 1e-9);
}

#[test]
fn test_weight_loss_percentage_wins_when_tighter() {
    let pack = RulePack::baseline();
    // 20% of 1884 is 377 kcal, inside the cap
    let balance =
        EnergyBalanceSelector::select(1884, Goal::WeightLoss, 65.0, BiologicalSex::Female, &pack);

    assert_eq!(balance.target_calories, 1507);
    assert_eq!(balance.deficit_kcal, -377);
    assert!(!balance.capped);
    assert!((balance.deficit_fraction - -0.2).abs() < 1e-9);
}

#[test]
fn test_calorie_floor_raises_target() {
    let pack = RulePack::baseline();
    let balance =
        EnergyBalanceSelector::select(1120, Goal::WeightLoss, 45.0, BiologicalSex::Female, &pack);

    assert_eq!(balance.target_calories, 1200);
    assert!(balance.floor_applied);
    assert_eq!(balance.deficit_kcal, 80);
}

#[test]
fn test_maintenance_targets_tdee() {
    let pack = RulePack::baseline();
    let balance =
        EnergyBalanceSelector::select(2500, Goal::Maintenance, 75.0, BiologicalSex::Male, &pack);

    assert_eq!(balance.target_calories, 2500);
    assert_eq!(balance.deficit_kcal, 0);
    assert!(!balance.capped);
    assert!(balance.projected_weekly_change_kg.abs() < 1e-9);
}

#[test]
fn test_muscle_gain_surplus_capped() {
    let pack = RulePack::baseline();
    // 10% of 3941 is 394 kcal, above the 300 kcal cap
    let balance =
        EnergyBalanceSelector::select(3941, Goal::MuscleGain, 100.0, BiologicalSex::Male, &pack);

    assert_eq!(balance.target_calories, 4241);
    assert_eq!(balance.deficit_kcal, 300);
    assert!(balance.capped);
}

#[test]
fn test_muscle_gain_uncapped_surplus() {
    let pack = RulePack::baseline();
    let balance =
        EnergyBalanceSelector::select(2697, Goal::MuscleGain, 75.0, BiologicalSex::Male, &pack);

    assert_eq!(balance.target_calories, 2967);
    assert!(!balance.capped);
    assert!((balance.projected_weekly_change_kg - 0.25).abs() < 1e-9);
}

#[test]
fn test_projected_weekly_change() {
    let pack = RulePack::baseline();
    assert!((EnergyBalanceSelector::projected_weekly_change(-500, &pack) - -0.45).abs() < 1e-9);
    assert!((EnergyBalanceSelector::projected_weekly_change(300, &pack) - 0.27).abs() < 1e-9);
    assert!(EnergyBalanceSelector::projected_weekly_change(0, &pack).abs() < 1e-9);
}
