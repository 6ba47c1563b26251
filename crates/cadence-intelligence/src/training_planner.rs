// ABOUTME: Training program selection and training plan versioning
// ABOUTME: Experience x frequency x equipment lookup, age/injury scaling, volume steps and deloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::action_selector::TrainingDecision;
use crate::config::RulePack;
use crate::numeric::round3;
use cadence_core::models::{
    AnthropometricProfile, Experience, GuardrailEvent, GuardrailSeverity, TrainingPlan,
    TrainingProfile,
};
use chrono::{DateTime, Duration, Utc};

/// Guardrail code for the volume multiplier bounds
pub const VOLUME_BOUNDS: &str = "volume_bounds";

/// Builds and revises training plans
pub struct TrainingPlanner;

impl TrainingPlanner {
    /// Program id `{experience}_{split}_{equipment}`
    ///
    /// Split is `full_body` up to three days, `upper_lower` at four, and
    /// `push_pull_legs` from five; beginners never go past `upper_lower`.
    #[must_use]
    pub fn select_program(training: &TrainingProfile) -> String {
        let split = match (training.experience, training.days_per_week) {
            (_, 0..=3) => "full_body",
            (Experience::Beginner, _) | (_, 4) => "upper_lower",
            _ => "push_pull_legs",
        };
        format!(
            "{}_{split}_{}",
            training.experience.as_str(),
            training.equipment.as_str()
        )
    }

    /// Starting (volume, intensity) multipliers for age and injury flags
    #[must_use]
    pub fn onboarding_multipliers(age_years: u32, injury_count: usize, pack: &RulePack) -> (f64, f64) {
        let cfg = &pack.training;
        let (age_volume, age_intensity) = cfg
            .age_adjustments
            .iter()
            .rev()
            .find(|bracket| age_years >= bracket.min_age)
            .map_or((1.0, 1.0), |bracket| {
                (bracket.volume_multiplier, bracket.intensity_multiplier)
            });

        let injuries = i32::try_from(injury_count).unwrap_or(i32::MAX);
        let volume = age_volume * cfg.injury_volume_factor.powi(injuries);
        let intensity = age_intensity * cfg.injury_intensity_factor.powi(injuries);

        (
            round3(volume.max(cfg.multiplier_floor)),
            round3(intensity.max(cfg.multiplier_floor)),
        )
    }

    /// First training plan for a profile
    #[must_use]
    pub fn initial_plan(
        profile: &AnthropometricProfile,
        version: u32,
        now: DateTime<Utc>,
        pack: &RulePack,
    ) -> TrainingPlan {
        let (volume_multiplier, intensity_multiplier) = Self::onboarding_multipliers(
            profile.age_years,
            profile.training.injuries.len(),
            pack,
        );
        TrainingPlan {
            user_id: profile.user_id,
            version,
            program_id: Self::select_program(&profile.training),
            program_week: 1,
            volume_multiplier,
            intensity_multiplier,
            deload: false,
            valid_from: now,
            valid_until: now + Duration::days(pack.training.plan_validity_days),
            created_at: now,
        }
    }

    /// Next plan version, or `None` when the decision leaves the plan unchanged
    #[must_use]
    pub fn next_plan(
        prior: &TrainingPlan,
        decision: &TrainingDecision,
        program_week: u32,
        now: DateTime<Utc>,
        pack: &RulePack,
        guardrails: &mut Vec<GuardrailEvent>,
    ) -> Option<TrainingPlan> {
        let cfg = &pack.training;
        let (volume, intensity, deload) = if decision.deload {
            (
                prior.volume_multiplier * cfg.deload.volume_multiplier,
                prior.intensity_multiplier * cfg.deload.intensity_multiplier,
                true,
            )
        } else if decision.deload_ended && prior.deload {
            (
                prior.volume_multiplier / cfg.deload.volume_multiplier,
                prior.intensity_multiplier / cfg.deload.intensity_multiplier,
                false,
            )
        } else if decision.volume_change_fraction.abs() > f64::EPSILON {
            let proposed = round3(prior.volume_multiplier * (1.0 + decision.volume_change_fraction));
            let bounded = proposed.clamp(cfg.min_volume, cfg.max_volume);
            if (bounded - proposed).abs() > f64::EPSILON {
                guardrails.push(
                    GuardrailEvent::new(
                        VOLUME_BOUNDS,
                        GuardrailSeverity::Clamp,
                        format!("volume multiplier {proposed} clamped to {bounded}"),
                    )
                    .with_values(proposed, Some(bounded)),
                );
            }
            if (bounded - prior.volume_multiplier).abs() <= f64::EPSILON {
                return None;
            }
            (bounded, prior.intensity_multiplier, false)
        } else {
            return None;
        };

        Some(TrainingPlan {
            user_id: prior.user_id,
            version: prior.version + 1,
            program_id: prior.program_id.clone(),
            program_week,
            volume_multiplier: round3(volume),
            intensity_multiplier: round3(intensity),
            deload,
            valid_from: now,
            valid_until: now + Duration::days(cfg.plan_validity_days),
            created_at: now,
        })
    }
}
