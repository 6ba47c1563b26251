// ABOUTME: Tests for full onboarding and check-in cycles of the pure plan engine
// ABOUTME: Baselines, applied and blocked changes, risk deloads, determinism and replay
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use cadence::engine::action_selector::TDEE_BOUNDS;
use cadence::engine::config::RulePack;
use cadence::engine::plan_engine::{CycleOutcome, PlanEngine, RecordStamp};
use cadence::engine::safety_validator::codes;
use cadence::errors::ErrorCode;
use cadence::models::{
    ActivityLevel, AnthropometricProfile, BiologicalSex, CheckIn, DecisionInputs,
    DecisionOutcome, GuardrailSeverity, NutritionMode, TrainingMode, TriggerType,
};
use chrono::Duration;
use common::{checkin, cut_profile, rated_checkin, t0, week};
use uuid::Uuid;

mod common;

fn onboard(profile: AnthropometricProfile, pack: &RulePack) -> CycleOutcome {
    let inputs = DecisionInputs {
        profile,
        checkins: Vec::new(),
        prior_state: None,
        prior_nutrition: None,
        prior_training: None,
        evaluated_at: t0(),
    };
    PlanEngine::onboard(inputs, pack, RecordStamp::new(t0())).unwrap()
}

/// Inputs for a check-in following `previous`, evaluated at the latest check-in's week
fn checkin_inputs(previous: &CycleOutcome, checkins: Vec<CheckIn>) -> DecisionInputs {
    let latest_week = checkins.iter().map(|c| c.week_number).max().unwrap_or(1);
    DecisionInputs {
        profile: previous.record.inputs.profile.clone(),
        checkins,
        prior_state: Some(previous.post_state().clone()),
        prior_nutrition: previous
            .nutrition_plan
            .clone()
            .or_else(|| previous.record.inputs.prior_nutrition.clone()),
        prior_training: previous
            .training_plan
            .clone()
            .or_else(|| previous.record.inputs.prior_training.clone()),
        evaluated_at: week(i64::from(latest_week)),
    }
}

fn run_checkin(previous: &CycleOutcome, checkins: Vec<CheckIn>, pack: &RulePack) -> CycleOutcome {
    let inputs = checkin_inputs(previous, checkins);
    let stamp = RecordStamp::new(inputs.evaluated_at);
    PlanEngine::checkin(inputs, pack, stamp).unwrap()
}

/// Onboarded cut user after a baseline week-1 check-in at 90 kg
fn after_baseline(pack: &RulePack) -> (CycleOutcome, CheckIn) {
    let user = Uuid::new_v4();
    let onboarded = onboard(cut_profile(user), pack);
    let first = checkin(user, 1, 90.0);
    let baseline = run_checkin(&onboarded, vec![first.clone()], pack);
    (baseline, first)
}

// ============================================================================
// ONBOARDING
// ============================================================================

#[test]
fn test_onboarding_creates_first_versions() {
    let pack = RulePack::baseline();
    let outcome = onboard(cut_profile(Uuid::new_v4()), &pack);

    let nutrition = outcome.nutrition_plan.as_ref().unwrap();
    assert_eq!(nutrition.version, 1);
    assert_eq!(nutrition.calorie_target, 2414);
    assert_eq!(nutrition.tdee, 2914);
    assert_eq!(nutrition.calorie_min, 2314);
    assert_eq!(nutrition.calorie_max, 2514);
    assert!((nutrition.macros.protein_g - 216.0).abs() < 1e-9);

    let training = outcome.training_plan.as_ref().unwrap();
    assert_eq!(training.version, 1);
    assert_eq!(training.program_id, "intermediate_upper_lower_gym");

    let record = &outcome.record;
    assert_eq!(record.trigger, TriggerType::Onboarding);
    assert_eq!(record.outcome, DecisionOutcome::Applied);
    assert_eq!(record.rule_pack_version, pack.version);
    assert!(record.rules_fired.iter().any(|r| r == "program_selection"));
    assert_eq!(record.guardrails.len(), 1);
    assert_eq!(record.guardrails[0].code, codes::MAX_DEFICIT);
    assert_eq!(record.guardrails[0].severity, GuardrailSeverity::Clamp);
    assert_eq!(record.actions.nutrition_version, Some(1));
    record.verify_integrity().unwrap();
}

#[test]
fn test_onboarding_initial_state() {
    let pack = RulePack::baseline();
    let outcome = onboard(cut_profile(Uuid::new_v4()), &pack);
    let state = outcome.post_state();

    assert_eq!(state.nutrition_mode, NutritionMode::CutActive);
    assert_eq!(state.training_mode, TrainingMode::Progress);
    assert_eq!(state.program_lock_until, Some(t0() + Duration::days(14)));
    assert!(state.anti_reversal_lock_until.is_none());
    assert_eq!(state.revision, 1);
    assert!(outcome.record.pre_state.is_none());
}

#[test]
fn test_unsafe_profile_blocks_onboarding() {
    let pack = RulePack::baseline();
    let profile = AnthropometricProfile {
        age_years: 20,
        sex: BiologicalSex::Female,
        height_cm: 180.0,
        weight_kg: 40.0,
        activity_level: ActivityLevel::VeryActive,
        ..cut_profile(Uuid::new_v4())
    };
    // TDEE 2402, target 1922, projected loss 0.44 kg/week above 1% of 40 kg
    let outcome = onboard(profile, &pack);

    assert_eq!(outcome.record.outcome, DecisionOutcome::Blocked);
    assert!(outcome.nutrition_plan.is_none());
    assert!(outcome.training_plan.is_none());
    assert!(outcome
        .record
        .rules_fired
        .iter()
        .any(|r| r == "onboarding_blocked"));
    assert!(outcome
        .record
        .guardrails
        .iter()
        .any(|g| g.code == codes::WEEKLY_LOSS_RATE && g.is_violation()));
}

#[test]
fn test_invalid_profile_rejected() {
    let pack = RulePack::baseline();
    let profile = AnthropometricProfile {
        age_years: 12,
        ..cut_profile(Uuid::new_v4())
    };
    let inputs = DecisionInputs {
        profile,
        checkins: Vec::new(),
        prior_state: None,
        prior_nutrition: None,
        prior_training: None,
        evaluated_at: t0(),
    };
    let err = PlanEngine::onboard(inputs, &pack, RecordStamp::new(t0())).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
}

// ============================================================================
// CHECK-INS
// ============================================================================

#[test]
fn test_first_checkin_is_baseline() {
    let pack = RulePack::baseline();
    let (baseline, _) = after_baseline(&pack);

    let record = &baseline.record;
    assert_eq!(record.outcome, DecisionOutcome::Baseline);
    assert_eq!(record.rules_fired, vec!["baseline"]);
    assert!(record.signals.is_some());
    assert!(record.progress.is_none());
    assert!(baseline.nutrition_plan.is_none());
    assert_eq!(baseline.post_state().revision, 2);
    assert_eq!(baseline.post_state().weeks_since_last_deload, 1);
    assert_eq!(record.actions.calorie_target, 2414);
}

#[test]
fn test_on_track_week_changes_nothing() {
    let pack = RulePack::baseline();
    let (baseline, first) = after_baseline(&pack);
    let second = checkin(first.user_id, 2, 89.5);
    let outcome = run_checkin(&baseline, vec![first, second], &pack);

    let record = &outcome.record;
    assert_eq!(record.outcome, DecisionOutcome::NoChange);
    assert_eq!(record.rules_fired, vec!["cut_on_track", "volume_progressing"]);
    assert!(outcome.nutrition_plan.is_none());
    assert!(outcome.training_plan.is_none());
    assert_eq!(record.actions.calorie_target, 2414);
    assert_eq!(outcome.post_state().weeks_since_last_change, 2);
}

#[test]
fn test_fast_loss_raises_calories() {
    let pack = RulePack::baseline();
    let (baseline, first) = after_baseline(&pack);
    let second = checkin(first.user_id, 2, 88.5);
    let outcome = run_checkin(&baseline, vec![first, second], &pack);

    let record = &outcome.record;
    assert_eq!(record.outcome, DecisionOutcome::Applied);
    assert_eq!(record.rules_fired[0], "cut_rate_correction");
    let nutrition = outcome.nutrition_plan.as_ref().unwrap();
    assert_eq!(nutrition.version, 2);
    assert_eq!(nutrition.calorie_target, 2614);
    // TDEE re-estimated from 88.5 kg
    assert_eq!(nutrition.tdee, 2891);
    assert!(record
        .guardrails
        .iter()
        .any(|g| g.code == codes::STEP_SIZE_WARNING));

    let state = outcome.post_state();
    assert_eq!(state.anti_reversal_lock_until, Some(week(2) + Duration::days(14)));
    assert_eq!(state.weeks_since_last_change, 0);
}

#[test]
fn test_oversized_step_falls_back_to_fixed_step() {
    let mut pack = RulePack::baseline();
    pack.actions.critical_increase_kcal = 300;
    let (baseline, first) = after_baseline(&pack);
    let second = rated_checkin(first.user_id, 2, 89.5, (1, 9, 2, 9));
    let outcome = run_checkin(&baseline, vec![first, second], &pack);

    let record = &outcome.record;
    assert_eq!(record.outcome, DecisionOutcome::Applied);
    assert!(record.rules_fired.iter().any(|r| r == "step_fallback"));
    assert_eq!(record.actions.calorie_delta_kcal, 100);
    assert_eq!(outcome.nutrition_plan.as_ref().unwrap().calorie_target, 2514);

    let event = record
        .guardrails
        .iter()
        .find(|g| g.code == codes::STEP_SIZE)
        .unwrap();
    assert_eq!(event.severity, GuardrailSeverity::Clamp);
    assert_eq!(event.proposed, Some(2714.0));
    assert_eq!(event.applied, Some(2514.0));
}

#[test]
fn test_step_fallback_keeps_recommended_direction() {
    let pack = RulePack::baseline();
    let (baseline, first) = after_baseline(&pack);
    let second = rated_checkin(first.user_id, 2, 89.5, (1, 9, 2, 9));
    let mut inputs = checkin_inputs(&baseline, vec![first, second]);
    // Far above the TDEE band: the clamp turns the +200 increase into a large cut
    inputs.prior_nutrition.as_mut().unwrap().calorie_target = 3600;
    let stamp = RecordStamp::new(inputs.evaluated_at);
    let outcome = PlanEngine::checkin(inputs, &pack, stamp).unwrap();

    let record = &outcome.record;
    assert_eq!(record.rules_fired[0], "critical_risk");
    assert!(record.rules_fired.iter().any(|r| r == "step_fallback"));
    assert!(record.guardrails.iter().any(|g| g.code == TDEE_BOUNDS));
    let event = record
        .guardrails
        .iter()
        .find(|g| g.code == codes::STEP_SIZE)
        .unwrap();
    assert_eq!(event.applied, Some(3700.0));
    assert_eq!(record.actions.calorie_delta_kcal, 100);
}

#[test]
fn test_plateau_reduction_blocked_by_deficit_cap() {
    let pack = RulePack::baseline();
    let (baseline, first) = after_baseline(&pack);
    let second = checkin(first.user_id, 2, 90.0);
    let outcome = run_checkin(&baseline, vec![first, second], &pack);

    let record = &outcome.record;
    assert_eq!(record.outcome, DecisionOutcome::Blocked);
    assert_eq!(
        record.rules_fired,
        vec!["cut_plateau", "volume_progressing", "stall_detected", "safety_block"]
    );
    assert!(record
        .guardrails
        .iter()
        .any(|g| g.code == codes::MAX_DEFICIT && g.is_violation()));
    assert!(outcome.nutrition_plan.is_none());
    assert_eq!(record.actions.calorie_delta_kcal, 0);
    assert_eq!(record.actions.calorie_target, 2414);
    assert_eq!(outcome.post_state().nutrition_mode, NutritionMode::CutActive);
    assert!(outcome.post_state().anti_reversal_lock_until.is_none());
}

#[test]
fn test_critical_risk_recovers_and_deloads() {
    let pack = RulePack::baseline();
    let (baseline, first) = after_baseline(&pack);
    let second = rated_checkin(first.user_id, 2, 89.5, (1, 9, 2, 9));
    let outcome = run_checkin(&baseline, vec![first, second], &pack);

    assert_eq!(outcome.record.outcome, DecisionOutcome::Applied);
    assert_eq!(outcome.nutrition_plan.as_ref().unwrap().calorie_target, 2614);

    let training = outcome.training_plan.as_ref().unwrap();
    assert_eq!(training.version, 2);
    assert_eq!(training.program_week, 3);
    assert!(training.deload);
    assert!((training.volume_multiplier - 0.6).abs() < 1e-9);
    assert!((training.intensity_multiplier - 0.9).abs() < 1e-9);

    let state = outcome.post_state();
    assert_eq!(state.nutrition_mode, NutritionMode::CutRecovery);
    assert_eq!(state.training_mode, TrainingMode::Deload);
    assert_eq!(state.weeks_since_last_deload, 0);
    assert!(outcome.record.actions.deload);
    assert!((outcome.record.actions.volume_change_fraction - -0.4).abs() < 1e-9);
}

#[test]
fn test_checkin_requires_onboarding() {
    let pack = RulePack::baseline();
    let user = Uuid::new_v4();
    let inputs = DecisionInputs {
        profile: cut_profile(user),
        checkins: vec![checkin(user, 1, 90.0)],
        prior_state: None,
        prior_nutrition: None,
        prior_training: None,
        evaluated_at: week(1),
    };
    let err = PlanEngine::checkin(inputs, &pack, RecordStamp::new(week(1))).unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
}

// ============================================================================
// DETERMINISM AND REPLAY
// ============================================================================

#[test]
fn test_same_inputs_same_record() {
    let pack = RulePack::baseline();
    let (baseline, first) = after_baseline(&pack);
    let second = checkin(first.user_id, 2, 88.5);
    let inputs = checkin_inputs(&baseline, vec![first, second]);
    let stamp = RecordStamp::new(week(2));

    let a = PlanEngine::run(TriggerType::Checkin, inputs.clone(), &pack, stamp).unwrap();
    let b = PlanEngine::run(TriggerType::Checkin, inputs, &pack, stamp).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.record.content_hash, b.record.content_hash);
}

#[test]
fn test_replay_matches_stored_records() {
    let pack = RulePack::baseline();
    let user = Uuid::new_v4();
    let onboarded = onboard(cut_profile(user), &pack);
    let first = checkin(user, 1, 90.0);
    let baseline = run_checkin(&onboarded, vec![first.clone()], &pack);
    let applied = run_checkin(&baseline, vec![first, checkin(user, 2, 88.5)], &pack);

    for outcome in [&onboarded, &baseline, &applied] {
        let report = PlanEngine::replay(&outcome.record, &pack).unwrap();
        assert!(report.matches, "{:?}", report.differences);
        assert_eq!(report.stored_hash, report.recomputed_hash);
        assert_eq!(report.record_id, outcome.record.id);
    }
}

#[test]
fn test_replay_requires_recorded_pack_version() {
    let pack = RulePack::baseline();
    let outcome = onboard(cut_profile(Uuid::new_v4()), &pack);

    let mut other = RulePack::baseline();
    other.version = "2025.9".to_owned();
    let err = PlanEngine::replay(&outcome.record, &other).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[test]
fn test_replay_detects_changed_rules() {
    let pack = RulePack::baseline();
    let (baseline, first) = after_baseline(&pack);
    let applied = run_checkin(&baseline, vec![first.clone(), checkin(first.user_id, 2, 88.5)], &pack);

    let mut edited = RulePack::baseline();
    edited.progress.max_adjustment_kcal = 150;
    let report = PlanEngine::replay(&applied.record, &edited).unwrap();

    assert!(!report.matches);
    assert_ne!(report.stored_hash, report.recomputed_hash);
    assert!(report.differences.iter().any(|d| d == "actions"));
    assert!(report.differences.iter().any(|d| d == "progress"));
}
