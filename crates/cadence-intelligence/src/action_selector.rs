// ABOUTME: Nutrition and training state machine driven by an ordered, first-match rule table
// ABOUTME: Confidence gate, risk overrides, goal rules, TDEE clamp, volume steps and deload cadence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Action Selector
//!
//! Calorie rules are evaluated top-down by priority and the first match wins:
//! the confidence gate, then critical and high recovery risk, then the
//! mode-family rules. Risk overrides ignore the anti-reversal lock; goal rules
//! do not. Every non-zero calorie change is clamped into
//! `[max(floor, tdee x (1 - deficit fraction)), tdee x (1 + surplus fraction)]`.
//!
//! Training is decided separately: deload cadence first, then the three-way
//! volume rule, which the program lock can suppress.

use crate::config::RulePack;
use cadence_core::models::{
    BiologicalSex, DerivedSignals, GuardrailEvent, GuardrailSeverity, ModeFamily, NutritionMode,
    ProgressAnalysis, ProgressPattern, RiskLevel, TrainingMode, TrainingPerformance,
    TrendDirection,
};
use tracing::debug;

/// Guardrail code for a suppressed goal-driven calorie change
pub const ANTI_REVERSAL_LOCK: &str = "anti_reversal_lock";
/// Guardrail code for a suppressed volume step
pub const PROGRAM_LOCK: &str = "program_lock";
/// Guardrail code for the TDEE-relative calorie clamp
pub const TDEE_BOUNDS: &str = "tdee_bounds";

/// Everything the selector reads
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// Biological sex, for the calorie floor
    pub sex: BiologicalSex,
    /// Current nutrition mode
    pub nutrition_mode: NutritionMode,
    /// Current training mode
    pub training_mode: TrainingMode,
    /// Derived signals for this cycle
    pub signals: &'a DerivedSignals,
    /// Progress analysis for this cycle
    pub progress: Option<&'a ProgressAnalysis>,
    /// Calorie target of the active plan (kcal)
    pub current_calories: i32,
    /// Current TDEE estimate (kcal)
    pub tdee: i32,
    /// Latest reported training performance
    pub training_performance: Option<TrainingPerformance>,
    /// Cycles since the last deload
    pub weeks_since_last_deload: u32,
    /// Anti-reversal lock active
    pub calorie_locked: bool,
    /// Program lock active
    pub program_locked: bool,
}

/// What a calorie rule does when it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalorieAction {
    /// Calorie change (kcal/day)
    pub delta_kcal: i32,
    /// Nutrition mode after the cycle
    pub mode: NutritionMode,
    /// Training mode imposed by a risk override
    pub training_override: Option<TrainingMode>,
}

type Predicate = fn(&ActionContext<'_>, &RulePack) -> bool;
type Action = fn(&ActionContext<'_>, &RulePack) -> CalorieAction;

/// One row of the calorie rule table
pub struct CalorieRule {
    /// Evaluation order, ascending
    pub priority: u16,
    /// Name recorded in `rules_fired`
    pub name: &'static str,
    /// Whether the rule ignores the anti-reversal lock
    pub lock_exempt: bool,
    predicate: Predicate,
    action: Action,
}

const fn keep(delta_kcal: i32, mode: NutritionMode) -> CalorieAction {
    CalorieAction {
        delta_kcal,
        mode,
        training_override: None,
    }
}

const fn family(ctx: &ActionContext<'_>) -> ModeFamily {
    ctx.nutrition_mode.family()
}

const fn trend(ctx: &ActionContext<'_>) -> TrendDirection {
    ctx.signals.weight_trend.direction
}

fn rate_off_target(ctx: &ActionContext<'_>) -> Option<i32> {
    ctx.progress
        .filter(|p| matches!(p.pattern, ProgressPattern::TooFast | ProgressPattern::TooSlow))
        .map(|p| p.recommended_adjustment_kcal)
}

const fn hold_mode(mode: NutritionMode) -> NutritionMode {
    match mode.family() {
        ModeFamily::Cut => NutritionMode::CutHold,
        ModeFamily::Maintain => NutritionMode::Maintain,
        ModeFamily::Gain => NutritionMode::GainHold,
    }
}

const fn recovery_mode(mode: NutritionMode) -> NutritionMode {
    match mode.family() {
        ModeFamily::Cut => NutritionMode::CutRecovery,
        ModeFamily::Maintain => NutritionMode::Maintain,
        ModeFamily::Gain => NutritionMode::GainHold,
    }
}

/// The calorie rule table, in evaluation order
pub static CALORIE_RULES: &[CalorieRule] = &[
    CalorieRule {
        priority: 10,
        name: "confidence_gate",
        lock_exempt: true,
        predicate: |ctx, pack| ctx.signals.confidence.score < pack.actions.min_confidence,
        action: |ctx, _| keep(0, ctx.nutrition_mode),
    },
    CalorieRule {
        priority: 20,
        name: "critical_risk",
        lock_exempt: true,
        predicate: |ctx, _| ctx.signals.recovery_risk.level == RiskLevel::Critical,
        action: |ctx, pack| CalorieAction {
            delta_kcal: pack.actions.critical_increase_kcal,
            mode: recovery_mode(ctx.nutrition_mode),
            training_override: Some(TrainingMode::Deload),
        },
    },
    CalorieRule {
        priority: 30,
        name: "high_risk_increase",
        lock_exempt: true,
        predicate: |ctx, _| {
            ctx.signals.recovery_risk.level == RiskLevel::High
                && trend(ctx) == TrendDirection::Decreasing
        },
        action: |ctx, pack| CalorieAction {
            delta_kcal: pack.actions.high_risk_increase_kcal,
            mode: hold_mode(ctx.nutrition_mode),
            training_override: Some(TrainingMode::Hold),
        },
    },
    CalorieRule {
        priority: 31,
        name: "high_risk_hold",
        lock_exempt: true,
        predicate: |ctx, _| ctx.signals.recovery_risk.level == RiskLevel::High,
        action: |ctx, _| CalorieAction {
            delta_kcal: 0,
            mode: hold_mode(ctx.nutrition_mode),
            training_override: Some(TrainingMode::Hold),
        },
    },
    CalorieRule {
        priority: 40,
        name: "cut_reversal",
        lock_exempt: false,
        predicate: |ctx, _| {
            family(ctx) == ModeFamily::Cut && trend(ctx) == TrendDirection::Increasing
        },
        action: |_, pack| keep(pack.actions.cut_reversal_kcal, NutritionMode::CutActive),
    },
    CalorieRule {
        priority: 41,
        name: "cut_recomposition_hold",
        lock_exempt: false,
        predicate: |ctx, _| family(ctx) == ModeFamily::Cut && ctx.signals.recomposition,
        action: |_, _| keep(0, NutritionMode::CutActive),
    },
    CalorieRule {
        priority: 42,
        name: "cut_plateau",
        lock_exempt: false,
        predicate: |ctx, _| family(ctx) == ModeFamily::Cut && trend(ctx) == TrendDirection::Stable,
        action: |_, pack| keep(pack.actions.cut_plateau_kcal, NutritionMode::CutActive),
    },
    CalorieRule {
        priority: 43,
        name: "cut_rate_correction",
        lock_exempt: false,
        predicate: |ctx, _| family(ctx) == ModeFamily::Cut && rate_off_target(ctx).is_some(),
        action: |ctx, _| {
            keep(rate_off_target(ctx).unwrap_or(0), NutritionMode::CutActive)
        },
    },
    CalorieRule {
        priority: 44,
        name: "cut_on_track",
        lock_exempt: false,
        predicate: |ctx, _| family(ctx) == ModeFamily::Cut,
        action: |_, _| keep(0, NutritionMode::CutActive),
    },
    CalorieRule {
        priority: 50,
        name: "gain_reversal",
        lock_exempt: false,
        predicate: |ctx, _| {
            family(ctx) == ModeFamily::Gain && trend(ctx) == TrendDirection::Decreasing
        },
        action: |_, pack| keep(pack.actions.gain_reversal_kcal, NutritionMode::GainActive),
    },
    CalorieRule {
        priority: 51,
        name: "gain_plateau",
        lock_exempt: false,
        predicate: |ctx, _| family(ctx) == ModeFamily::Gain && trend(ctx) == TrendDirection::Stable,
        action: |_, pack| keep(pack.actions.gain_plateau_kcal, NutritionMode::GainActive),
    },
    CalorieRule {
        priority: 52,
        name: "gain_rate_correction",
        lock_exempt: false,
        predicate: |ctx, _| family(ctx) == ModeFamily::Gain && rate_off_target(ctx).is_some(),
        action: |ctx, _| {
            keep(rate_off_target(ctx).unwrap_or(0), NutritionMode::GainActive)
        },
    },
    CalorieRule {
        priority: 53,
        name: "gain_on_track",
        lock_exempt: false,
        predicate: |ctx, _| family(ctx) == ModeFamily::Gain,
        action: |_, _| keep(0, NutritionMode::GainActive),
    },
    CalorieRule {
        priority: 60,
        name: "maintain",
        lock_exempt: false,
        predicate: |_, _| true,
        action: |_, _| keep(0, NutritionMode::Maintain),
    },
];

/// Training outcome of one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingDecision {
    /// Rule that decided
    pub rule: &'static str,
    /// Training mode after the cycle
    pub mode: TrainingMode,
    /// Fractional volume change (e.g. -0.10)
    pub volume_change_fraction: f64,
    /// A deload starts this cycle
    pub deload: bool,
    /// A deload ended this cycle; base multipliers are restored
    pub deload_ended: bool,
}

const fn decision(
    rule: &'static str,
    mode: TrainingMode,
    volume_change_fraction: f64,
    deload: bool,
    deload_ended: bool,
) -> TrainingDecision {
    TrainingDecision {
        rule,
        mode,
        volume_change_fraction,
        deload,
        deload_ended,
    }
}

/// Complete selector output
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDecision {
    /// Rules fired, in order
    pub rules_fired: Vec<String>,
    /// Locks and clamps applied
    pub guardrails: Vec<GuardrailEvent>,
    /// Calorie change recommended by the fired rule, after locks and before the clamp
    pub recommended_delta_kcal: i32,
    /// Calorie change after locks and clamp (kcal/day)
    pub calorie_delta_kcal: i32,
    /// Nutrition mode after the cycle
    pub nutrition_mode: NutritionMode,
    /// Training outcome
    pub training: TrainingDecision,
}

/// Rule-table state machine
pub struct ActionSelector;

impl ActionSelector {
    /// First calorie rule whose predicate holds
    #[must_use]
    pub fn matching_rule(ctx: &ActionContext<'_>, pack: &RulePack) -> Option<&'static CalorieRule> {
        CALORIE_RULES.iter().find(|rule| (rule.predicate)(ctx, pack))
    }

    /// Select this cycle's calorie and training actions
    #[must_use]
    pub fn select(ctx: &ActionContext<'_>, pack: &RulePack) -> ActionDecision {
        let mut rules_fired = Vec::new();
        let mut guardrails = Vec::new();

        let (mut action, lock_exempt) = Self::matching_rule(ctx, pack).map_or_else(
            || (keep(0, ctx.nutrition_mode), true),
            |rule| {
                debug!(rule = rule.name, priority = rule.priority, "calorie rule fired");
                rules_fired.push(rule.name.to_owned());
                ((rule.action)(ctx, pack), rule.lock_exempt)
            },
        );

        if action.delta_kcal != 0 && ctx.calorie_locked && !lock_exempt {
            rules_fired.push(ANTI_REVERSAL_LOCK.to_owned());
            guardrails.push(
                GuardrailEvent::new(
                    ANTI_REVERSAL_LOCK,
                    GuardrailSeverity::Suppressed,
                    "goal-driven calorie change suppressed by the anti-reversal lock",
                )
                .with_values(f64::from(action.delta_kcal), Some(0.0)),
            );
            action.delta_kcal = 0;
            action.mode = ctx.nutrition_mode;
        }

        let recommended_delta_kcal = action.delta_kcal;
        if action.delta_kcal != 0 {
            let proposed = ctx.current_calories + action.delta_kcal;
            let clamped = Self::apply_guardrails(proposed, ctx.tdee, ctx.sex, pack);
            if clamped != proposed {
                guardrails.push(
                    GuardrailEvent::new(
                        TDEE_BOUNDS,
                        GuardrailSeverity::Clamp,
                        format!("{proposed} kcal clamped to {clamped} kcal"),
                    )
                    .with_values(f64::from(proposed), Some(f64::from(clamped))),
                );
            }
            action.delta_kcal = clamped - ctx.current_calories;
        }

        let training = Self::select_training(ctx, action.training_override, pack, &mut guardrails);
        rules_fired.push(training.rule.to_owned());

        ActionDecision {
            rules_fired,
            guardrails,
            recommended_delta_kcal,
            calorie_delta_kcal: action.delta_kcal,
            nutrition_mode: action.mode,
            training,
        }
    }

    /// Clamp `proposed` into `[max(floor, tdee x (1 - deficit)), tdee x (1 + surplus)]`
    #[must_use]
    pub fn apply_guardrails(proposed: i32, tdee: i32, sex: BiologicalSex, pack: &RulePack) -> i32 {
        let tdee = f64::from(tdee);
        let safety = &pack.safety;
        let lower = pack
            .calorie_floor(sex)
            .max((tdee * (1.0 - safety.max_deficit_fraction_of_tdee)).round() as i32);
        let upper = (tdee * (1.0 + safety.max_surplus_fraction_of_tdee)).round() as i32;
        if lower > upper {
            return lower;
        }
        proposed.clamp(lower, upper)
    }

    /// Volume step for a reported performance trend
    #[must_use]
    pub fn volume_step(performance: Option<TrainingPerformance>, pack: &RulePack) -> f64 {
        match performance {
            Some(TrainingPerformance::Regressing) => pack.training.regress_volume_step,
            Some(TrainingPerformance::Stalling) => pack.training.stall_volume_step,
            Some(TrainingPerformance::Progressing) | None => 0.0,
        }
    }

    /// Whether a deload is due
    #[must_use]
    pub fn deload_due(weeks_since_last_deload: u32, pack: &RulePack) -> bool {
        weeks_since_last_deload >= pack.training.deload.frequency_weeks
    }

    fn select_training(
        ctx: &ActionContext<'_>,
        training_override: Option<TrainingMode>,
        pack: &RulePack,
        guardrails: &mut Vec<GuardrailEvent>,
    ) -> TrainingDecision {
        let in_deload = ctx.training_mode == TrainingMode::Deload;

        if training_override == Some(TrainingMode::Deload) {
            return decision("risk_deload", TrainingMode::Deload, 0.0, !in_deload, false);
        }
        if Self::deload_due(ctx.weeks_since_last_deload, pack) && !in_deload {
            return decision("scheduled_deload", TrainingMode::Deload, 0.0, true, false);
        }
        if in_deload {
            return decision("deload_complete", TrainingMode::Progress, 0.0, false, true);
        }

        let risk_hold = training_override == Some(TrainingMode::Hold);
        let step = Self::volume_step(ctx.training_performance, pack);
        // A risk hold never adds volume
        let step = if risk_hold { step.min(0.0) } else { step };

        if step.abs() > f64::EPSILON && ctx.program_locked {
            guardrails.push(
                GuardrailEvent::new(
                    PROGRAM_LOCK,
                    GuardrailSeverity::Suppressed,
                    "volume step suppressed by the program lock",
                )
                .with_values(step, Some(0.0)),
            );
            let rule = if risk_hold { "risk_training_hold" } else { PROGRAM_LOCK };
            return decision(rule, TrainingMode::Hold, 0.0, false, false);
        }
        if risk_hold {
            return decision("risk_training_hold", TrainingMode::Hold, step, false, false);
        }

        match ctx.training_performance {
            Some(TrainingPerformance::Regressing) => {
                decision("volume_regressing", TrainingMode::Hold, step, false, false)
            }
            Some(TrainingPerformance::Stalling) => {
                decision("volume_stalling", TrainingMode::Progress, step, false, false)
            }
            Some(TrainingPerformance::Progressing) | None => {
                decision("volume_progressing", TrainingMode::Progress, 0.0, false, false)
            }
        }
    }
}
