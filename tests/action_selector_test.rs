// ABOUTME: Tests for the calorie rule table and training decisions
// ABOUTME: Rule precedence, lock suppression, TDEE clamp, deload cadence and volume steps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use cadence::engine::action_selector::{
    ActionContext, ActionSelector, ANTI_REVERSAL_LOCK, CALORIE_RULES, PROGRAM_LOCK, TDEE_BOUNDS,
};
use cadence::engine::config::RulePack;
use cadence::models::{
    BiologicalSex, ConfidenceBreakdown, DerivedSignals, GuardrailSeverity, MetricTrend,
    NutritionMode, ProgressAnalysis, ProgressPattern, RecoveryRisk, RiskFactors, RiskLevel,
    TrainingMode, TrainingPerformance, TrendDirection,
};

fn signals(direction: TrendDirection, confidence: f64, risk: RiskLevel) -> DerivedSignals {
    let total_change = match direction {
        TrendDirection::Increasing => 0.6,
        TrendDirection::Stable => 0.0,
        TrendDirection::Decreasing => -1.5,
    };
    DerivedSignals {
        window_len: 4,
        weight_trend: MetricTrend {
            direction,
            total_change,
            rate_per_week: total_change / 3.0,
        },
        waist_trend: None,
        confidence: ConfidenceBreakdown {
            score: confidence,
            adherence: 1.0,
            data_quality: 1.0,
            event_impact: 1.0,
        },
        recovery_risk: RecoveryRisk {
            score: 2.0,
            level: risk,
            recommended_action: String::new(),
            factors: RiskFactors {
                low_energy: false,
                high_hunger: false,
                poor_sleep: false,
                high_stress: false,
            },
        },
        plateau: false,
        recomposition: false,
    }
}

fn cut_context(signals: &DerivedSignals) -> ActionContext<'_> {
    ActionContext {
        sex: BiologicalSex::Male,
        nutrition_mode: NutritionMode::CutActive,
        training_mode: TrainingMode::Progress,
        signals,
        progress: None,
        current_calories: 2414,
        tdee: 2914,
        training_performance: None,
        weeks_since_last_deload: 1,
        calorie_locked: false,
        program_locked: false,
    }
}

fn gain_context(signals: &DerivedSignals) -> ActionContext<'_> {
    ActionContext {
        nutrition_mode: NutritionMode::GainActive,
        current_calories: 2800,
        tdee: 2697,
        ..cut_context(signals)
    }
}

// ============================================================================
// RULE TABLE
// ============================================================================

#[test]
fn test_rule_table_priorities_ascend() {
    assert!(CALORIE_RULES
        .windows(2)
        .all(|pair| pair[0].priority < pair[1].priority));
    assert_eq!(CALORIE_RULES[0].name, "confidence_gate");
    assert!(CALORIE_RULES.iter().any(|rule| rule.name == "maintain"));
}

#[test]
fn test_confidence_gate_precedes_risk() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.4, RiskLevel::Critical);
    let decision = ActionSelector::select(&cut_context(&s), &pack);

    assert_eq!(decision.rules_fired[0], "confidence_gate");
    assert_eq!(decision.calorie_delta_kcal, 0);
    assert_eq!(decision.nutrition_mode, NutritionMode::CutActive);
    assert!(!decision.training.deload);
}

// ============================================================================
// RISK OVERRIDES
// ============================================================================

#[test]
fn test_critical_risk_raises_calories_and_deloads() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Critical);
    let decision = ActionSelector::select(&cut_context(&s), &pack);

    assert_eq!(decision.rules_fired, vec!["critical_risk", "risk_deload"]);
    assert_eq!(decision.calorie_delta_kcal, 200);
    assert_eq!(decision.nutrition_mode, NutritionMode::CutRecovery);
    assert_eq!(decision.training.mode, TrainingMode::Deload);
    assert!(decision.training.deload);
}

#[test]
fn test_risk_overrides_ignore_lock() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Critical);
    let ctx = ActionContext {
        calorie_locked: true,
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(decision.calorie_delta_kcal, 200);
    assert!(!decision
        .rules_fired
        .iter()
        .any(|rule| rule == ANTI_REVERSAL_LOCK));
}

#[test]
fn test_high_risk_with_loss_eases_deficit() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.9, RiskLevel::High);
    let ctx = ActionContext {
        training_performance: Some(TrainingPerformance::Regressing),
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(decision.rules_fired, vec!["high_risk_increase", "risk_training_hold"]);
    assert_eq!(decision.calorie_delta_kcal, 100);
    assert_eq!(decision.nutrition_mode, NutritionMode::CutHold);
    assert_eq!(decision.training.mode, TrainingMode::Hold);
    assert!((decision.training.volume_change_fraction - -0.10).abs() < 1e-9);
}

#[test]
fn test_high_risk_hold_never_adds_volume() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Increasing, 0.9, RiskLevel::High);
    let ctx = ActionContext {
        training_performance: Some(TrainingPerformance::Stalling),
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(decision.rules_fired[0], "high_risk_hold");
    assert_eq!(decision.calorie_delta_kcal, 0);
    assert_eq!(decision.nutrition_mode, NutritionMode::CutHold);
    assert!(decision.training.volume_change_fraction.abs() < 1e-9);
}

// ============================================================================
// CUT RULES
// ============================================================================

#[test]
fn test_cut_reversal_reduces_calories() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Increasing, 0.9, RiskLevel::Low);
    let decision = ActionSelector::select(&cut_context(&s), &pack);

    assert_eq!(decision.rules_fired[0], "cut_reversal");
    assert_eq!(decision.calorie_delta_kcal, -150);
    assert!(decision.guardrails.is_empty());
}

#[test]
fn test_anti_reversal_lock_suppresses_goal_rule() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Increasing, 0.9, RiskLevel::Low);
    let ctx = ActionContext {
        nutrition_mode: NutritionMode::CutHold,
        calorie_locked: true,
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(
        decision.rules_fired,
        vec!["cut_reversal", ANTI_REVERSAL_LOCK, "volume_progressing"]
    );
    assert_eq!(decision.calorie_delta_kcal, 0);
    assert_eq!(decision.nutrition_mode, NutritionMode::CutHold);
    let event = &decision.guardrails[0];
    assert_eq!(event.code, ANTI_REVERSAL_LOCK);
    assert_eq!(event.severity, GuardrailSeverity::Suppressed);
    assert_eq!(event.proposed, Some(-150.0));
}

#[test]
fn test_reduction_clamped_to_tdee_bounds() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Increasing, 0.9, RiskLevel::Low);
    let ctx = ActionContext {
        current_calories: 2200,
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    // Lower bound is 2914 x 0.75 = 2186
    assert_eq!(decision.recommended_delta_kcal, -150);
    assert_eq!(decision.calorie_delta_kcal, -14);
    let event = &decision.guardrails[0];
    assert_eq!(event.code, TDEE_BOUNDS);
    assert_eq!(event.severity, GuardrailSeverity::Clamp);
    assert_eq!(event.proposed, Some(2050.0));
    assert_eq!(event.applied, Some(2186.0));
}

#[test]
fn test_recomposition_holds_before_plateau() {
    let pack = RulePack::baseline();
    let mut s = signals(TrendDirection::Stable, 0.9, RiskLevel::Low);
    s.recomposition = true;
    let decision = ActionSelector::select(&cut_context(&s), &pack);

    assert_eq!(decision.rules_fired[0], "cut_recomposition_hold");
    assert_eq!(decision.calorie_delta_kcal, 0);
}

#[test]
fn test_cut_plateau_reduces_calories() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Stable, 0.9, RiskLevel::Low);
    let decision = ActionSelector::select(&cut_context(&s), &pack);

    assert_eq!(decision.rules_fired[0], "cut_plateau");
    assert_eq!(decision.calorie_delta_kcal, -100);
}

#[test]
fn test_cut_rate_correction_follows_progress() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Low);
    let progress = ProgressAnalysis {
        weekly_change_kg: -1.5,
        expected_change_kg: -0.45,
        difference_kg: -1.05,
        pattern: ProgressPattern::TooFast,
        recommended_adjustment_kcal: 200,
        stalled: false,
    };
    let ctx = ActionContext {
        progress: Some(&progress),
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(decision.rules_fired[0], "cut_rate_correction");
    assert_eq!(decision.calorie_delta_kcal, 200);
    assert_eq!(decision.nutrition_mode, NutritionMode::CutActive);
}

#[test]
fn test_cut_on_track_keeps_target() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Low);
    let decision = ActionSelector::select(&cut_context(&s), &pack);

    assert_eq!(decision.rules_fired, vec!["cut_on_track", "volume_progressing"]);
    assert_eq!(decision.calorie_delta_kcal, 0);
}

// ============================================================================
// GAIN AND MAINTENANCE
// ============================================================================

#[test]
fn test_gain_plateau_and_reversal() {
    let pack = RulePack::baseline();

    let stable = signals(TrendDirection::Stable, 0.9, RiskLevel::Low);
    let decision = ActionSelector::select(&gain_context(&stable), &pack);
    assert_eq!(decision.rules_fired[0], "gain_plateau");
    assert_eq!(decision.calorie_delta_kcal, 100);

    let losing = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Low);
    let decision = ActionSelector::select(&gain_context(&losing), &pack);
    assert_eq!(decision.rules_fired[0], "gain_reversal");
    assert_eq!(decision.calorie_delta_kcal, 150);
    assert_eq!(decision.nutrition_mode, NutritionMode::GainActive);
}

#[test]
fn test_gain_increase_clamped_to_surplus_bound() {
    let pack = RulePack::baseline();
    let losing = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Low);
    let ctx = ActionContext {
        current_calories: 2967,
        ..gain_context(&losing)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    // Upper bound is 2697 x 1.15 = 3102
    assert_eq!(decision.calorie_delta_kcal, 135);
    assert_eq!(decision.guardrails[0].code, TDEE_BOUNDS);
}

#[test]
fn test_maintain_applies_no_change() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Increasing, 0.9, RiskLevel::Low);
    let ctx = ActionContext {
        nutrition_mode: NutritionMode::Maintain,
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(decision.rules_fired[0], "maintain");
    assert_eq!(decision.calorie_delta_kcal, 0);
    assert_eq!(decision.nutrition_mode, NutritionMode::Maintain);
}

#[test]
fn test_apply_guardrails_bounds() {
    let pack = RulePack::baseline();
    assert_eq!(
        ActionSelector::apply_guardrails(1100, 1300, BiologicalSex::Female, &pack),
        1200
    );
    assert_eq!(
        ActionSelector::apply_guardrails(2500, 2914, BiologicalSex::Male, &pack),
        2500
    );
    // Floor above the surplus bound
    assert_eq!(
        ActionSelector::apply_guardrails(1100, 1000, BiologicalSex::Female, &pack),
        1200
    );
}

// ============================================================================
// TRAINING
// ============================================================================

#[test]
fn test_scheduled_deload_after_frequency() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Low);
    let ctx = ActionContext {
        weeks_since_last_deload: 5,
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(decision.training.rule, "scheduled_deload");
    assert!(decision.training.deload);
    assert!(ActionSelector::deload_due(5, &pack));
    assert!(!ActionSelector::deload_due(4, &pack));
}

#[test]
fn test_deload_completes_next_cycle() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Low);
    let ctx = ActionContext {
        training_mode: TrainingMode::Deload,
        weeks_since_last_deload: 6,
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(decision.training.rule, "deload_complete");
    assert_eq!(decision.training.mode, TrainingMode::Progress);
    assert!(decision.training.deload_ended);
    assert!(!decision.training.deload);
}

#[test]
fn test_volume_steps_by_performance() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Low);

    let regressing = ActionContext {
        training_performance: Some(TrainingPerformance::Regressing),
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&regressing, &pack).training;
    assert_eq!(decision.rule, "volume_regressing");
    assert_eq!(decision.mode, TrainingMode::Hold);
    assert!((decision.volume_change_fraction - -0.10).abs() < 1e-9);

    let stalling = ActionContext {
        training_performance: Some(TrainingPerformance::Stalling),
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&stalling, &pack).training;
    assert_eq!(decision.rule, "volume_stalling");
    assert!((decision.volume_change_fraction - 0.05).abs() < 1e-9);
}

#[test]
fn test_program_lock_suppresses_volume_step() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Low);
    let ctx = ActionContext {
        training_performance: Some(TrainingPerformance::Stalling),
        program_locked: true,
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(decision.training.rule, PROGRAM_LOCK);
    assert!(decision.training.volume_change_fraction.abs() < 1e-9);
    assert_eq!(decision.guardrails[0].code, PROGRAM_LOCK);
    assert_eq!(decision.guardrails[0].severity, GuardrailSeverity::Suppressed);
}

#[test]
fn test_program_lock_applies_during_risk_hold() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Increasing, 0.9, RiskLevel::High);
    let ctx = ActionContext {
        training_performance: Some(TrainingPerformance::Regressing),
        program_locked: true,
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(decision.training.rule, "risk_training_hold");
    assert_eq!(decision.training.mode, TrainingMode::Hold);
    assert!(decision.training.volume_change_fraction.abs() < 1e-9);
    assert!(!decision.training.deload);
    assert!(decision
        .guardrails
        .iter()
        .any(|g| g.code == PROGRAM_LOCK && g.severity == GuardrailSeverity::Suppressed));

    // Unlocked, the same hold still allows the reduction
    let unlocked = ActionSelector::select(
        &ActionContext {
            program_locked: false,
            ..ctx
        },
        &pack,
    );
    assert!((unlocked.training.volume_change_fraction + 0.10).abs() < 1e-9);
}

#[test]
fn test_program_lock_ignores_progressing() {
    let pack = RulePack::baseline();
    let s = signals(TrendDirection::Decreasing, 0.9, RiskLevel::Low);
    let ctx = ActionContext {
        training_performance: Some(TrainingPerformance::Progressing),
        program_locked: true,
        ..cut_context(&s)
    };
    let decision = ActionSelector::select(&ctx, &pack);

    assert_eq!(decision.training.rule, "volume_progressing");
    assert!(decision.guardrails.is_empty());
}
