// ABOUTME: Pure per-cycle decision function composing every engine component
// ABOUTME: Onboarding and check-in cycles produce plan versions, next state and a sealed decision record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Plan Engine
//!
//! A cycle is a pure function of `(DecisionInputs, RulePack, record id,
//! creation time)`. The same arguments always yield the same plans, state and
//! record hash, which is what makes [`PlanEngine::replay`] possible.
//!
//! ## Onboarding
//!
//! Energy estimate, balance selection and macro allocation produce nutrition
//! version N+1; the program lookup produces training version N+1; the plan is
//! validated before anything is created. State is reset for the profile's goal
//! and the program lock starts.
//!
//! ## Check-in
//!
//! A single check-in is a baseline. With two or more, signals, progress and
//! the action selector propose a calorie change, which is step-checked (and
//! reduced to the fallback step if too large), then plan-checked. A failing
//! check blocks the change and keeps the prior nutrition version active.
//! Training changes are versioned independently.

use crate::action_selector::{ActionContext, ActionSelector};
use crate::config::RulePack;
use crate::energy::{EnergyBalanceSelector, EnergyEstimator};
use crate::macros::MacroAllocator;
use crate::numeric::round3;
use crate::progress_analyzer::ProgressAnalyzer;
use crate::safety_validator::{codes, PlanProposal, SafetyValidator};
use crate::signal_interpreter::{chronological, SignalInterpreter};
use crate::training_planner::TrainingPlanner;
use cadence_core::errors::{AppError, AppResult};
use cadence_core::models::{
    ActionSet, DecisionInputs, DecisionOutcome, DecisionRecord, DerivedSignals, EngineState,
    GuardrailEvent, GuardrailSeverity, MacroTargets, NutritionMode, NutritionPlan,
    ProgressAnalysis, TrainingMode, TrainingPlan, TriggerType,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Result of one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    /// Sealed decision record
    pub record: DecisionRecord,
    /// Nutrition version created this cycle
    pub nutrition_plan: Option<NutritionPlan>,
    /// Training version created this cycle
    pub training_plan: Option<TrainingPlan>,
}

impl CycleOutcome {
    /// Engine state after the cycle
    #[must_use]
    pub const fn post_state(&self) -> &EngineState {
        &self.record.post_state
    }
}

/// Result of re-running a stored decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Record replayed
    pub record_id: Uuid,
    /// Rule pack version used
    pub rule_pack_version: String,
    /// Stored content hash
    pub stored_hash: String,
    /// Hash of the recomputed record
    pub recomputed_hash: String,
    /// Whether the recomputation is identical
    pub matches: bool,
    /// Names of the fields that differ
    pub differences: Vec<String>,
}

/// Identity of the record a cycle will produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordStamp {
    /// Record id
    pub id: Uuid,
    /// Record creation time
    pub created_at: DateTime<Utc>,
}

impl RecordStamp {
    /// Fresh id stamped at `created_at`
    #[must_use]
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at,
        }
    }
}

/// Pure cycle entry points
pub struct PlanEngine;

impl PlanEngine {
    /// Run the cycle for `trigger`
    ///
    /// # Errors
    ///
    /// Propagates the input contract errors of [`Self::onboard`] and [`Self::checkin`]
    pub fn run(
        trigger: TriggerType,
        inputs: DecisionInputs,
        pack: &RulePack,
        stamp: RecordStamp,
    ) -> AppResult<CycleOutcome> {
        match trigger {
            TriggerType::Onboarding => Self::onboard(inputs, pack, stamp),
            TriggerType::Checkin => Self::checkin(inputs, pack, stamp),
        }
    }

    /// Onboarding or profile resubmission
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` / `INVALID_INPUT` for an invalid profile
    pub fn onboard(
        inputs: DecisionInputs,
        pack: &RulePack,
        stamp: RecordStamp,
    ) -> AppResult<CycleOutcome> {
        let profile = &inputs.profile;
        profile.validate()?;
        let now = inputs.evaluated_at;

        let energy = EnergyEstimator::estimate(profile, pack);
        let balance = EnergyBalanceSelector::select(
            energy.tdee,
            profile.goal,
            profile.weight_kg,
            profile.sex,
            pack,
        );
        let macros = MacroAllocator::allocate(
            profile.weight_kg,
            balance.target_calories,
            profile.goal,
            pack,
        );

        let mut rules_fired: Vec<String> = ["energy_estimate", "energy_balance", "macro_allocation"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        let mut guardrails = Vec::new();

        if balance.capped {
            let fraction = pack.goals.for_goal(profile.goal).energy_fraction;
            let uncapped = energy.tdee + (f64::from(energy.tdee) * fraction).round() as i32;
            let code = if balance.deficit_kcal < 0 {
                codes::MAX_DEFICIT
            } else {
                codes::MAX_SURPLUS
            };
            guardrails.push(
                GuardrailEvent::new(
                    code,
                    GuardrailSeverity::Clamp,
                    format!(
                        "goal fraction target {uncapped} kcal capped to {} kcal",
                        balance.target_calories
                    ),
                )
                .with_values(f64::from(uncapped), Some(f64::from(balance.target_calories))),
            );
        }
        if balance.floor_applied {
            guardrails.push(
                GuardrailEvent::new(
                    codes::CALORIE_FLOOR,
                    GuardrailSeverity::Clamp,
                    format!("target raised to the {} kcal floor", balance.target_calories),
                )
                .with_values(
                    f64::from(energy.tdee + balance.deficit_kcal),
                    Some(f64::from(balance.target_calories)),
                ),
            );
        }

        let report = SafetyValidator::validate_plan(
            &PlanProposal {
                calories: balance.target_calories,
                tdee: energy.tdee,
                protein_g: macros.protein_g,
                weight_kg: profile.weight_kg,
                sex: profile.sex,
                goal: profile.goal,
                projected_weekly_change_kg: balance.projected_weekly_change_kg,
            },
            pack,
        );
        let safe = report.is_safe();
        guardrails.extend(report.into_events());

        let (nutrition_plan, training_plan) = if safe {
            rules_fired.push("program_selection".to_owned());
            let nutrition = Self::nutrition_plan(
                profile.user_id,
                inputs.prior_nutrition.as_ref().map_or(1, |p| p.version + 1),
                balance.target_calories,
                energy.tdee,
                macros,
                balance.projected_weekly_change_kg,
                now,
                pack,
            );
            let training = TrainingPlanner::initial_plan(
                profile,
                inputs.prior_training.as_ref().map_or(1, |p| p.version + 1),
                now,
                pack,
            );
            (Some(nutrition), Some(training))
        } else {
            rules_fired.push("onboarding_blocked".to_owned());
            (None, None)
        };

        let prior_state = inputs.prior_state.as_ref();
        let post_state = EngineState {
            user_id: profile.user_id,
            nutrition_mode: match (safe, prior_state) {
                (false, Some(state)) => state.nutrition_mode,
                _ => NutritionMode::initial_for(profile.goal),
            },
            training_mode: TrainingMode::Progress,
            anti_reversal_lock_until: None,
            program_lock_until: Some(now + Duration::days(pack.training.program_lock_days)),
            weeks_since_last_deload: 0,
            weeks_since_last_change: 0,
            revision: prior_state.map_or(1, |state| state.revision + 1),
            updated_at: now,
        };

        let prior_target = inputs.prior_nutrition.as_ref().map(|p| p.calorie_target);
        let calorie_target = nutrition_plan
            .as_ref()
            .map(|p| p.calorie_target)
            .or(prior_target)
            .unwrap_or(0);
        let actions = ActionSet {
            calorie_delta_kcal: match (&nutrition_plan, prior_target) {
                (Some(plan), Some(prior)) => plan.calorie_target - prior,
                _ => 0,
            },
            calorie_target,
            nutrition_version: nutrition_plan.as_ref().map(|p| p.version),
            training_version: training_plan.as_ref().map(|p| p.version),
            volume_change_fraction: 0.0,
            deload: false,
            nutrition_mode: post_state.nutrition_mode,
            training_mode: post_state.training_mode,
        };
        let outcome = if safe {
            DecisionOutcome::Applied
        } else {
            DecisionOutcome::Blocked
        };

        let record = Self::seal(
            stamp,
            TriggerType::Onboarding,
            pack,
            inputs,
            None,
            None,
            post_state,
            rules_fired,
            guardrails,
            actions,
            outcome,
        )?;
        Ok(CycleOutcome {
            record,
            nutrition_plan,
            training_plan,
        })
    }

    /// Weekly check-in cycle
    ///
    /// # Errors
    ///
    /// Returns `MISSING_REQUIRED_FIELD` when the user has no engine state or
    /// active plans, and `INVALID_INPUT` when `inputs.checkins` is empty
    pub fn checkin(
        inputs: DecisionInputs,
        pack: &RulePack,
        stamp: RecordStamp,
    ) -> AppResult<CycleOutcome> {
        let (Some(prior_state), Some(prior_nutrition), Some(prior_training)) = (
            inputs.prior_state.as_ref(),
            inputs.prior_nutrition.as_ref(),
            inputs.prior_training.as_ref(),
        ) else {
            return Err(AppError::missing_field(
                "check-in requires an onboarded user with active nutrition and training plans",
            )
            .with_user_id(inputs.profile.user_id));
        };
        let Some(latest) = chronological(&inputs.checkins).last().copied() else {
            return Err(AppError::invalid_input("check-in cycle needs at least one check-in"));
        };

        let profile = &inputs.profile;
        let now = inputs.evaluated_at;
        let signals = SignalInterpreter::interpret(&inputs.checkins, pack)?;

        let mut post_state = prior_state.clone();
        post_state.weeks_since_last_deload += 1;
        post_state.weeks_since_last_change += 1;
        post_state.revision += 1;
        post_state.updated_at = now;

        if inputs.checkins.len() < 2 {
            let actions = ActionSet {
                calorie_delta_kcal: 0,
                calorie_target: prior_nutrition.calorie_target,
                nutrition_version: None,
                training_version: None,
                volume_change_fraction: 0.0,
                deload: false,
                nutrition_mode: post_state.nutrition_mode,
                training_mode: post_state.training_mode,
            };
            let record = Self::seal(
                stamp,
                TriggerType::Checkin,
                pack,
                inputs,
                Some(signals),
                None,
                post_state,
                vec!["baseline".to_owned()],
                Vec::new(),
                actions,
                DecisionOutcome::Baseline,
            )?;
            return Ok(CycleOutcome {
                record,
                nutrition_plan: None,
                training_plan: None,
            });
        }

        let progress = ProgressAnalyzer::analyze(
            &inputs.checkins,
            profile.goal,
            prior_nutrition.projected_weekly_change_kg,
            pack,
        )?;
        let weight_kg = latest.weight_kg;
        let tdee = EnergyEstimator::tdee(
            EnergyEstimator::bmr(weight_kg, profile.height_cm, profile.age_years, profile.sex),
            profile.activity_level,
            pack,
        );

        let ctx = ActionContext {
            sex: profile.sex,
            nutrition_mode: prior_state.nutrition_mode,
            training_mode: prior_state.training_mode,
            signals: &signals,
            progress: Some(&progress),
            current_calories: prior_nutrition.calorie_target,
            tdee,
            training_performance: latest.training_performance,
            weeks_since_last_deload: post_state.weeks_since_last_deload,
            calorie_locked: prior_state.calorie_locked(now),
            program_locked: prior_state.program_locked(now),
        };
        let decision = ActionSelector::select(&ctx, pack);
        let mut rules_fired = decision.rules_fired;
        let mut guardrails = decision.guardrails;
        if progress.stalled {
            rules_fired.push("stall_detected".to_owned());
        }

        let current = prior_nutrition.calorie_target;
        let mut delta = decision.calorie_delta_kcal;
        let mut nutrition_plan = None;
        let mut blocked = false;

        if delta != 0 {
            let mut adjustment =
                SafetyValidator::validate_adjustment(current, current + delta, profile.sex, pack);
            if adjustment.has_violation(codes::STEP_SIZE) {
                // Keep the direction the rule asked for, even when the clamp reversed it
                let direction = match decision.recommended_delta_kcal.signum() {
                    0 => delta.signum(),
                    sign => sign,
                };
                let fallback = pack.safety.fallback_step_kcal * direction;
                rules_fired.push("step_fallback".to_owned());
                guardrails.push(
                    GuardrailEvent::new(
                        codes::STEP_SIZE,
                        GuardrailSeverity::Clamp,
                        format!("{delta} kcal step reduced to {fallback} kcal"),
                    )
                    .with_values(f64::from(current + delta), Some(f64::from(current + fallback))),
                );
                delta = fallback;
                adjustment = SafetyValidator::validate_adjustment(
                    current,
                    current + delta,
                    profile.sex,
                    pack,
                );
            }

            let target = current + delta;
            let macros = MacroAllocator::allocate(weight_kg, target, profile.goal, pack);
            let projected = EnergyBalanceSelector::projected_weekly_change(target - tdee, pack);
            let plan_report = SafetyValidator::validate_plan(
                &PlanProposal {
                    calories: target,
                    tdee,
                    protein_g: macros.protein_g,
                    weight_kg,
                    sex: profile.sex,
                    goal: profile.goal,
                    projected_weekly_change_kg: projected,
                },
                pack,
            );

            if adjustment.is_safe() && plan_report.is_safe() {
                nutrition_plan = Some(Self::nutrition_plan(
                    profile.user_id,
                    prior_nutrition.version + 1,
                    target,
                    tdee,
                    macros,
                    projected,
                    now,
                    pack,
                ));
                post_state.anti_reversal_lock_until =
                    Some(now + Duration::days(pack.actions.anti_reversal_lock_days));
                post_state.weeks_since_last_change = 0;
            } else {
                debug!(delta, "calorie change blocked by safety validation");
                rules_fired.push("safety_block".to_owned());
                blocked = true;
                delta = 0;
            }
            guardrails.extend(adjustment.into_events());
            guardrails.extend(plan_report.into_events());
        }

        if !blocked {
            post_state.nutrition_mode = decision.nutrition_mode;
        }
        post_state.training_mode = decision.training.mode;
        if decision.training.deload {
            post_state.weeks_since_last_deload = 0;
        }

        let training_plan = TrainingPlanner::next_plan(
            prior_training,
            &decision.training,
            latest.week_number + 1,
            now,
            pack,
            &mut guardrails,
        );

        let outcome = if blocked {
            DecisionOutcome::Blocked
        } else if nutrition_plan.is_some() || training_plan.is_some() {
            DecisionOutcome::Applied
        } else {
            DecisionOutcome::NoChange
        };

        let actions = ActionSet {
            calorie_delta_kcal: delta,
            calorie_target: nutrition_plan
                .as_ref()
                .map_or(current, |p| p.calorie_target),
            nutrition_version: nutrition_plan.as_ref().map(|p| p.version),
            training_version: training_plan.as_ref().map(|p| p.version),
            volume_change_fraction: training_plan.as_ref().map_or(0.0, |p| {
                round3(p.volume_multiplier / prior_training.volume_multiplier - 1.0)
            }),
            deload: decision.training.deload,
            nutrition_mode: post_state.nutrition_mode,
            training_mode: post_state.training_mode,
        };

        let record = Self::seal(
            stamp,
            TriggerType::Checkin,
            pack,
            inputs,
            Some(signals),
            Some(progress),
            post_state,
            rules_fired,
            guardrails,
            actions,
            outcome,
        )?;
        Ok(CycleOutcome {
            record,
            nutrition_plan,
            training_plan,
        })
    }

    /// Re-run a stored decision against `pack` and compare
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` if `pack` is not the version the record was
    /// computed under, or any error the cycle itself raises
    pub fn replay(record: &DecisionRecord, pack: &RulePack) -> AppResult<ReplayReport> {
        if pack.version != record.rule_pack_version {
            return Err(AppError::invalid_input(format!(
                "record {} was computed under rule pack {}, not {}",
                record.id, record.rule_pack_version, pack.version
            )));
        }
        let recomputed = Self::run(
            record.trigger,
            record.inputs.clone(),
            pack,
            RecordStamp {
                id: record.id,
                created_at: record.created_at,
            },
        )?
        .record;

        let mut differences = Vec::new();
        let mut compare = |name: &str, same: bool| {
            if !same {
                differences.push(name.to_owned());
            }
        };
        compare("signals", recomputed.signals == record.signals);
        compare("progress", recomputed.progress == record.progress);
        compare("post_state", recomputed.post_state == record.post_state);
        compare("rules_fired", recomputed.rules_fired == record.rules_fired);
        compare("guardrails", recomputed.guardrails == record.guardrails);
        compare("actions", recomputed.actions == record.actions);
        compare("outcome", recomputed.outcome == record.outcome);

        Ok(ReplayReport {
            record_id: record.id,
            rule_pack_version: record.rule_pack_version.clone(),
            matches: recomputed.content_hash == record.content_hash && differences.is_empty(),
            stored_hash: record.content_hash.clone(),
            recomputed_hash: recomputed.content_hash,
            differences,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn nutrition_plan(
        user_id: Uuid,
        version: u32,
        calorie_target: i32,
        tdee: i32,
        macros: MacroTargets,
        projected_weekly_change_kg: f64,
        now: DateTime<Utc>,
        pack: &RulePack,
    ) -> NutritionPlan {
        let band = pack.actions.calorie_band_kcal;
        NutritionPlan {
            user_id,
            version,
            calorie_target,
            calorie_min: calorie_target - band,
            calorie_max: calorie_target + band,
            tdee,
            macros,
            projected_weekly_change_kg,
            valid_from: now,
            valid_until: now + Duration::days(pack.training.plan_validity_days),
            created_at: now,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn seal(
        stamp: RecordStamp,
        trigger: TriggerType,
        pack: &RulePack,
        inputs: DecisionInputs,
        signals: Option<DerivedSignals>,
        progress: Option<ProgressAnalysis>,
        post_state: EngineState,
        rules_fired: Vec<String>,
        guardrails: Vec<GuardrailEvent>,
        actions: ActionSet,
        outcome: DecisionOutcome,
    ) -> AppResult<DecisionRecord> {
        DecisionRecord {
            id: stamp.id,
            user_id: inputs.profile.user_id,
            trigger,
            rule_pack_version: pack.version.clone(),
            pre_state: inputs.prior_state.clone(),
            inputs,
            signals,
            progress,
            post_state,
            rules_fired,
            guardrails,
            actions,
            outcome,
            content_hash: String::new(),
            created_at: stamp.created_at,
        }
        .seal()
    }
}
