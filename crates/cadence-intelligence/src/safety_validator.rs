// ABOUTME: Pure guardrail checker for proposed plans and single-step calorie adjustments
// ABOUTME: Evaluates every check and reports violations (blocking) and warnings (advisory)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Safety Validator
//!
//! Called before any plan is persisted. Every check runs; nothing short-circuits,
//! so a report lists all problems with a proposal at once. Violations and
//! warnings are data, never errors.

use crate::config::RulePack;
use cadence_core::models::{BiologicalSex, Goal, GuardrailEvent, GuardrailSeverity};
use serde::{Deserialize, Serialize};

/// Guardrail codes emitted by the validator
pub mod codes {
    /// Calories below the sex-specific floor
    pub const CALORIE_FLOOR: &str = "calorie_floor";
    /// Deficit larger than the absolute cap
    pub const MAX_DEFICIT: &str = "max_deficit";
    /// Surplus larger than the absolute cap
    pub const MAX_SURPLUS: &str = "max_surplus";
    /// Protein below the physiological floor
    pub const PROTEIN_FLOOR: &str = "protein_floor";
    /// Protein above the advisory ceiling
    pub const PROTEIN_HIGH: &str = "protein_high";
    /// Projected weekly loss above the percentage cap
    pub const WEEKLY_LOSS_RATE: &str = "weekly_loss_rate";
    /// Single-step change above the cap
    pub const STEP_SIZE: &str = "step_size";
    /// Single-step change large but permitted
    pub const STEP_SIZE_WARNING: &str = "step_size_warning";
}

/// A plan about to be persisted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanProposal {
    /// Daily calorie target (kcal)
    pub calories: i32,
    /// TDEE the target is measured against (kcal)
    pub tdee: i32,
    /// Daily protein (g)
    pub protein_g: f64,
    /// Current body weight (kg)
    pub weight_kg: f64,
    /// Biological sex
    pub sex: BiologicalSex,
    /// Goal in force
    pub goal: Goal,
    /// Projected weekly weight change (kg/week, negative is loss)
    pub projected_weekly_change_kg: f64,
}

/// Outcome of a validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyReport {
    /// Blocking problems
    pub violations: Vec<GuardrailEvent>,
    /// Advisory problems
    pub warnings: Vec<GuardrailEvent>,
}

impl SafetyReport {
    /// No violations
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.violations.is_empty()
    }

    /// Whether a violation with `code` was raised
    #[must_use]
    pub fn has_violation(&self, code: &str) -> bool {
        self.violations.iter().any(|event| event.code == code)
    }

    /// Whether a warning with `code` was raised
    #[must_use]
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|event| event.code == code)
    }

    /// Violations followed by warnings
    #[must_use]
    pub fn into_events(self) -> Vec<GuardrailEvent> {
        let mut events = self.violations;
        events.extend(self.warnings);
        events
    }

    fn violation(&mut self, code: &str, message: String, proposed: f64) {
        self.violations.push(
            GuardrailEvent::new(code, GuardrailSeverity::Violation, message)
                .with_values(proposed, None),
        );
    }

    fn warning(&mut self, code: &str, message: String, proposed: f64) {
        self.warnings.push(
            GuardrailEvent::new(code, GuardrailSeverity::Warning, message)
                .with_values(proposed, Some(proposed)),
        );
    }
}

/// Pure guardrail checks
pub struct SafetyValidator;

impl SafetyValidator {
    /// Check a complete plan proposal
    #[must_use]
    pub fn validate_plan(proposal: &PlanProposal, pack: &RulePack) -> SafetyReport {
        let safety = &pack.safety;
        let mut report = SafetyReport::default();
        let calories = f64::from(proposal.calories);

        let floor = pack.calorie_floor(proposal.sex);
        if proposal.calories < floor {
            report.violation(
                codes::CALORIE_FLOOR,
                format!("{} kcal is below the {floor} kcal floor", proposal.calories),
                calories,
            );
        }

        if proposal.goal == Goal::WeightLoss {
            let deficit = proposal.tdee - proposal.calories;
            if deficit > safety.max_deficit_kcal {
                report.violation(
                    codes::MAX_DEFICIT,
                    format!(
                        "{deficit} kcal deficit exceeds the {} kcal cap",
                        safety.max_deficit_kcal
                    ),
                    calories,
                );
            }
        }

        if proposal.goal == Goal::MuscleGain {
            let surplus = proposal.calories - proposal.tdee;
            if surplus > safety.max_surplus_kcal {
                report.violation(
                    codes::MAX_SURPLUS,
                    format!(
                        "{surplus} kcal surplus exceeds the {} kcal cap",
                        safety.max_surplus_kcal
                    ),
                    calories,
                );
            }
        }

        let protein_floor = proposal.weight_kg * safety.protein_floor_g_per_kg;
        if proposal.protein_g < protein_floor {
            report.violation(
                codes::PROTEIN_FLOOR,
                format!(
                    "{:.1} g protein is below the {protein_floor:.1} g floor",
                    proposal.protein_g
                ),
                proposal.protein_g,
            );
        }

        let protein_ceiling = proposal.weight_kg * safety.protein_warning_g_per_kg;
        if proposal.protein_g > protein_ceiling {
            report.warning(
                codes::PROTEIN_HIGH,
                format!(
                    "{:.1} g protein exceeds {protein_ceiling:.1} g",
                    proposal.protein_g
                ),
                proposal.protein_g,
            );
        }

        if proposal.goal == Goal::WeightLoss {
            let weekly_loss = -proposal.projected_weekly_change_kg;
            let max_loss = proposal.weight_kg * safety.max_weekly_loss_percent / 100.0;
            if weekly_loss > max_loss {
                report.violation(
                    codes::WEEKLY_LOSS_RATE,
                    format!(
                        "projected loss {weekly_loss:.2} kg/week exceeds {max_loss:.2} kg/week"
                    ),
                    weekly_loss,
                );
            }
        }

        report
    }

    /// Check a single-step move from `current` to `proposed` calories
    #[must_use]
    pub fn validate_adjustment(
        current: i32,
        proposed: i32,
        sex: BiologicalSex,
        pack: &RulePack,
    ) -> SafetyReport {
        let safety = &pack.safety;
        let mut report = SafetyReport::default();
        let step = (proposed - current).abs();

        if step > safety.max_step_kcal {
            report.violation(
                codes::STEP_SIZE,
                format!(
                    "{step} kcal step exceeds the {} kcal cap",
                    safety.max_step_kcal
                ),
                f64::from(proposed),
            );
        } else if step >= safety.warn_step_kcal {
            report.warning(
                codes::STEP_SIZE_WARNING,
                format!("{step} kcal step is large"),
                f64::from(proposed),
            );
        }

        let floor = pack.calorie_floor(sex);
        if proposed < floor {
            report.violation(
                codes::CALORIE_FLOOR,
                format!("{proposed} kcal is below the {floor} kcal floor"),
                f64::from(proposed),
            );
        }

        report
    }
}
