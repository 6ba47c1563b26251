// ABOUTME: Derives trend, confidence, recovery risk, plateau and recomposition from check-ins
// ABOUTME: Every threshold, weight and lookup table comes from the rule pack
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Signal Interpreter
//!
//! Consumes the most recent `window_size` check-ins in chronological order.
//! Waist trend is computed only when every check-in in the window carries a
//! waist measurement. Recovery risk is scored from the latest check-in.

use crate::config::rule_pack::SignalsConfig;
use crate::config::RulePack;
use crate::numeric::{round2, round3};
use cadence_core::constants::ratings::MAX_RATING;
use cadence_core::errors::{AppError, AppResult};
use cadence_core::models::{
    CheckIn, ConfidenceBreakdown, DerivedSignals, MetricTrend, RecoveryRisk, RiskFactors,
    RiskLevel, TrendDirection,
};

const SECONDS_PER_WEEK: f64 = 604_800.0;

/// Check-ins ordered by time, then week number
#[must_use]
pub fn chronological(checkins: &[CheckIn]) -> Vec<&CheckIn> {
    let mut ordered: Vec<&CheckIn> = checkins.iter().collect();
    ordered.sort_by(|a, b| {
        a.recorded_at
            .cmp(&b.recorded_at)
            .then(a.week_number.cmp(&b.week_number))
    });
    ordered
}

/// Weeks between two check-ins
///
/// Uses timestamps, falling back to week numbers when both were recorded at
/// the same instant. `None` when neither distinguishes them.
#[must_use]
pub fn elapsed_weeks(earlier: &CheckIn, later: &CheckIn) -> Option<f64> {
    let seconds = (later.recorded_at - earlier.recorded_at).num_seconds();
    if seconds > 0 {
        return Some(seconds as f64 / SECONDS_PER_WEEK);
    }
    let weeks = i64::from(later.week_number) - i64::from(earlier.week_number);
    (weeks > 0).then_some(weeks as f64)
}

/// Turns a check-in window into derived signals
pub struct SignalInterpreter;

impl SignalInterpreter {
    /// The most recent `window_size` check-ins, oldest first
    #[must_use]
    pub fn window<'a>(checkins: &'a [CheckIn], pack: &RulePack) -> Vec<&'a CheckIn> {
        let ordered = chronological(checkins);
        let skip = ordered.len().saturating_sub(pack.signals.window_size);
        ordered.into_iter().skip(skip).collect()
    }

    /// Derive all signals from `checkins`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when `checkins` is empty
    pub fn interpret(checkins: &[CheckIn], pack: &RulePack) -> AppResult<DerivedSignals> {
        let window = Self::window(checkins, pack);
        let Some(latest) = window.last().copied() else {
            return Err(AppError::invalid_input(
                "signal interpretation needs at least one check-in",
            ));
        };
        let cfg = &pack.signals;

        let weight_trend = Self::trend(
            &window,
            |c| Some(c.weight_kg),
            cfg.weight_stable_threshold_kg,
        )
        .unwrap_or(MetricTrend {
            direction: TrendDirection::Stable,
            total_change: 0.0,
            rate_per_week: 0.0,
        });
        let waist_trend = Self::trend(&window, |c| c.waist_cm, cfg.waist_stable_threshold_cm);
        let confidence = Self::confidence(&window, cfg);
        let recovery_risk = Self::recovery_risk(latest, cfg);

        let plateau = window.len() >= cfg.window_size
            && weight_trend.direction == TrendDirection::Stable
            && confidence.adherence >= cfg.plateau_min_adherence;

        let recomposition = weight_trend.direction == TrendDirection::Stable
            && waist_trend
                .is_some_and(|waist| waist.total_change <= -cfg.recomposition_min_waist_drop_cm);

        Ok(DerivedSignals {
            window_len: window.len(),
            weight_trend,
            waist_trend,
            confidence,
            recovery_risk,
            plateau,
            recomposition,
        })
    }

    /// First-to-last trend of a metric; `None` if any entry lacks it or the window is empty
    fn trend(
        window: &[&CheckIn],
        metric: impl Fn(&CheckIn) -> Option<f64>,
        stable_threshold: f64,
    ) -> Option<MetricTrend> {
        let values: Vec<f64> = window
            .iter()
            .map(|c| metric(c))
            .collect::<Option<Vec<_>>>()?;
        let (first_value, last_value) = (values.first()?, values.last()?);
        let total_change = round2(last_value - first_value);

        let direction = if total_change.abs() <= stable_threshold {
            TrendDirection::Stable
        } else if total_change > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        };

        let rate_per_week = match (window.first(), window.last()) {
            (Some(first), Some(last)) => {
                elapsed_weeks(first, last).map_or(0.0, |weeks| round2(total_change / weeks))
            }
            _ => 0.0,
        };

        Some(MetricTrend {
            direction,
            total_change,
            rate_per_week,
        })
    }

    /// Weighted confidence from adherence, data quality and event impact
    #[must_use]
    pub fn confidence(window: &[&CheckIn], cfg: &SignalsConfig) -> ConfidenceBreakdown {
        if window.is_empty() {
            return ConfidenceBreakdown {
                score: 0.0,
                adherence: 0.0,
                data_quality: 0.0,
                event_impact: 1.0,
            };
        }

        let adherence = window
            .iter()
            .map(|c| cfg.adherence_scores.score(c.adherence))
            .sum::<f64>()
            / window.len() as f64;

        let data_quality = (window.len() as f64 / cfg.window_size as f64).min(1.0);

        let total_impact: f64 = window
            .iter()
            .flat_map(|c| c.events.iter())
            .map(|event| cfg.event_impacts.impact(*event))
            .sum();
        let event_impact = (1.0 - total_impact).max(0.0);

        let w = &cfg.confidence_weights;
        let score = w
            .adherence
            .mul_add(adherence, w.data_quality.mul_add(data_quality, w.event_impact * event_impact))
            .clamp(0.0, 1.0);

        ConfidenceBreakdown {
            score: round3(score),
            adherence: round3(adherence),
            data_quality: round3(data_quality),
            event_impact: round3(event_impact),
        }
    }

    /// Recovery risk from one check-in's ratings
    #[must_use]
    pub fn recovery_risk(checkin: &CheckIn, cfg: &SignalsConfig) -> RecoveryRisk {
        let risk = &cfg.risk;
        let max = f64::from(MAX_RATING);
        let score = round2(
            risk.weights.low_energy.mul_add(
                max - f64::from(checkin.energy),
                risk.weights.hunger.mul_add(
                    f64::from(checkin.hunger),
                    risk.weights.poor_sleep.mul_add(
                        max - f64::from(checkin.sleep),
                        risk.weights.stress * f64::from(checkin.stress),
                    ),
                ),
            ),
        );

        let level = if score >= risk.thresholds.critical {
            RiskLevel::Critical
        } else if score >= risk.thresholds.high {
            RiskLevel::High
        } else if score >= risk.thresholds.moderate {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        };

        let cutoffs = &risk.factor_cutoffs;
        RecoveryRisk {
            score,
            level,
            recommended_action: risk.actions.for_level(level).to_owned(),
            factors: RiskFactors {
                low_energy: checkin.energy <= cutoffs.low_energy_max,
                high_hunger: checkin.hunger >= cutoffs.high_hunger_min,
                poor_sleep: checkin.sleep <= cutoffs.poor_sleep_max,
                high_stress: checkin.stress >= cutoffs.high_stress_min,
            },
        }
    }
}
