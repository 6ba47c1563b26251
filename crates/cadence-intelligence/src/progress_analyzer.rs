// ABOUTME: Compares actual against expected weekly weight change and classifies the pattern
// ABOUTME: Produces a bounded calorie recommendation and an independent stall flag
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Progress Analyzer
//!
//! Classification order: on track, then reversed, then too fast, then too slow.
//! A difference outside tolerance that reaches none of the action thresholds
//! is reported as stalled when recent weights are flat, otherwise on track.
//! Every branch yields one of the five patterns.

use crate::config::rule_pack::ProgressConfig;
use crate::config::RulePack;
use crate::numeric::round2;
use crate::signal_interpreter::{chronological, elapsed_weeks};
use cadence_core::errors::{AppError, AppResult};
use cadence_core::models::{CheckIn, Goal, ProgressAnalysis, ProgressPattern};

/// Rate comparison and calorie recommendation
pub struct ProgressAnalyzer;

impl ProgressAnalyzer {
    /// Analyse the two most recent check-ins against `expected_change_kg`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` with fewer than two check-ins, or when the two
    /// most recent cannot be ordered in time
    pub fn analyze(
        checkins: &[CheckIn],
        goal: Goal,
        expected_change_kg: f64,
        pack: &RulePack,
    ) -> AppResult<ProgressAnalysis> {
        let ordered = chronological(checkins);
        let [.., previous, latest] = ordered.as_slice() else {
            return Err(AppError::invalid_input(
                "progress analysis needs at least two check-ins",
            ));
        };
        let weeks = elapsed_weeks(previous, latest).ok_or_else(|| {
            AppError::invalid_input("the two most recent check-ins share a timestamp and week")
        })?;

        let weekly_change_kg = round2((latest.weight_kg - previous.weight_kg) / weeks);
        let expected_change_kg = round2(expected_change_kg);
        let stalled = Self::detect_stall(checkins, pack);
        let (pattern, recommended_adjustment_kcal) =
            Self::classify(goal, weekly_change_kg, expected_change_kg, stalled, &pack.progress);

        Ok(ProgressAnalysis {
            weekly_change_kg,
            expected_change_kg,
            difference_kg: round2(weekly_change_kg - expected_change_kg),
            pattern,
            recommended_adjustment_kcal,
            stalled,
        })
    }

    /// Pattern and recommended adjustment for a goal
    #[must_use]
    pub fn classify(
        goal: Goal,
        actual: f64,
        expected: f64,
        stalled: bool,
        cfg: &ProgressConfig,
    ) -> (ProgressPattern, i32) {
        let difference = round2(actual - expected);
        let fallthrough = if stalled {
            (ProgressPattern::Stalled, 0)
        } else {
            (ProgressPattern::OnTrack, 0)
        };

        match goal {
            Goal::WeightLoss => {
                if difference.abs() <= cfg.tolerance_kg {
                    (ProgressPattern::OnTrack, 0)
                } else if actual >= 0.0 {
                    (ProgressPattern::Reversed, cfg.reversed_cut_kcal)
                } else if difference < -cfg.action_threshold_kg {
                    (ProgressPattern::TooFast, Self::proportional(difference, cfg))
                } else if difference > cfg.action_threshold_kg {
                    (ProgressPattern::TooSlow, -Self::proportional(difference, cfg))
                } else {
                    fallthrough
                }
            }
            Goal::MuscleGain => {
                if difference.abs() <= cfg.tolerance_kg {
                    (ProgressPattern::OnTrack, 0)
                } else if actual <= -cfg.reversed_gain_loss_kg {
                    (ProgressPattern::Reversed, cfg.reversed_gain_kcal)
                } else if difference > cfg.action_threshold_kg {
                    (ProgressPattern::TooFast, cfg.gain_too_fast_kcal)
                } else if difference < -cfg.gain_slow_threshold_kg {
                    (ProgressPattern::TooSlow, cfg.gain_too_slow_kcal)
                } else {
                    fallthrough
                }
            }
            Goal::Maintenance => {
                if difference.abs() <= cfg.maintenance_tolerance_kg {
                    (ProgressPattern::OnTrack, 0)
                } else if difference > 0.0 {
                    (ProgressPattern::TooFast, -cfg.maintenance_correction_kcal)
                } else {
                    (ProgressPattern::TooSlow, cfg.maintenance_correction_kcal)
                }
            }
        }
    }

    /// `min(max_adjustment, |difference| x kcal_per_kg_delta)`, rounded
    fn proportional(difference: f64, cfg: &ProgressConfig) -> i32 {
        let magnitude = (difference.abs() * cfg.kcal_per_kg_delta).round() as i32;
        magnitude.min(cfg.max_adjustment_kcal)
    }

    /// Whether the most recent (up to `stall_window`) weights span less than `stall_range_kg`
    #[must_use]
    pub fn detect_stall(checkins: &[CheckIn], pack: &RulePack) -> bool {
        let cfg = &pack.progress;
        let ordered = chronological(checkins);
        if ordered.is_empty() {
            return false;
        }
        let recent = &ordered[ordered.len().saturating_sub(cfg.stall_window)..];
        let (min, max) = recent.iter().fold((f64::MAX, f64::MIN), |(lo, hi), c| {
            (lo.min(c.weight_kg), hi.max(c.weight_kg))
        });
        round2(max - min) < cfg.stall_range_kg
    }

    /// Apply a recommendation to the current calorie target
    #[must_use]
    pub fn adjust_calories(current_calories: i32, analysis: &ProgressAnalysis) -> i32 {
        current_calories + analysis.recommended_adjustment_kcal
    }
}
