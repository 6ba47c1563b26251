// ABOUTME: Human-readable explanations of committed decision records
// ABOUTME: Runs after the numbers are final and never feeds back into the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use cadence_core::models::{
    DecisionOutcome, DecisionRecord, GuardrailSeverity, ProgressPattern, RiskLevel,
    TrendDirection, TriggerType,
};
use std::fmt::Write;

/// Turns a committed decision into text
pub trait Explainer: Send + Sync {
    /// Explain `record`. Must not fail and must not depend on anything but the record.
    fn explain(&self, record: &DecisionRecord) -> String;
}

/// Deterministic sentence templates
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateExplainer;

impl TemplateExplainer {
    const fn trend_phrase(direction: TrendDirection) -> &'static str {
        match direction {
            TrendDirection::Increasing => "trending up",
            TrendDirection::Stable => "holding steady",
            TrendDirection::Decreasing => "trending down",
        }
    }

    const fn pattern_phrase(pattern: ProgressPattern) -> &'static str {
        match pattern {
            ProgressPattern::OnTrack => "on track",
            ProgressPattern::TooFast => "moving faster than planned",
            ProgressPattern::TooSlow => "moving slower than planned",
            ProgressPattern::Stalled => "stalled",
            ProgressPattern::Reversed => "moving away from your goal",
        }
    }

    const fn risk_phrase(level: RiskLevel) -> &'static str {
        match level {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    fn describe_change(record: &DecisionRecord, out: &mut String) {
        let actions = &record.actions;
        match record.outcome {
            DecisionOutcome::Baseline => {
                let _ = write!(
                    out,
                    " This first check-in is your baseline; targets stay at {} kcal.",
                    actions.calorie_target
                );
            }
            DecisionOutcome::NoChange => {
                let _ = write!(
                    out,
                    " No change this week; targets stay at {} kcal.",
                    actions.calorie_target
                );
            }
            DecisionOutcome::Applied if actions.calorie_delta_kcal == 0 => {
                let _ = write!(out, " Daily target: {} kcal.", actions.calorie_target);
            }
            DecisionOutcome::Applied => {
                let verb = if actions.calorie_delta_kcal > 0 {
                    "Raising"
                } else {
                    "Lowering"
                };
                let _ = write!(
                    out,
                    " {verb} calories by {} to {} kcal.",
                    actions.calorie_delta_kcal.abs(),
                    actions.calorie_target
                );
            }
            DecisionOutcome::Blocked => {
                let _ = write!(
                    out,
                    " A change was considered but blocked by a safety limit; the previous plan \
                     ({} kcal) stays active.",
                    actions.calorie_target
                );
            }
        }
    }
}

impl Explainer for TemplateExplainer {
    fn explain(&self, record: &DecisionRecord) -> String {
        let mut out = String::new();
        match record.trigger {
            TriggerType::Onboarding => out.push_str("Plan created from your profile."),
            TriggerType::Checkin => {
                let week = record
                    .inputs
                    .checkins
                    .iter()
                    .map(|c| c.week_number)
                    .max()
                    .unwrap_or_default();
                let _ = write!(out, "Week {week} check-in.");
            }
        }

        if let Some(signals) = &record.signals {
            let _ = write!(
                out,
                " Weight is {} ({:+.2} kg/week); confidence {:.0}%; recovery risk {}.",
                Self::trend_phrase(signals.weight_trend.direction),
                signals.weight_trend.rate_per_week,
                signals.confidence.score * 100.0,
                Self::risk_phrase(signals.recovery_risk.level),
            );
            if signals.recomposition {
                out.push_str(" Your waist is shrinking while weight holds: recomposition.");
            } else if signals.plateau {
                out.push_str(" Weight has plateaued despite good adherence.");
            }
        }
        if let Some(progress) = &record.progress {
            let _ = write!(
                out,
                " Progress is {}.",
                Self::pattern_phrase(progress.pattern)
            );
        }

        Self::describe_change(record, &mut out);

        if record.actions.deload {
            out.push_str(" This week is a deload: lighter volume and loads.");
        } else if record.actions.volume_change_fraction.abs() > f64::EPSILON {
            let _ = write!(
                out,
                " Training volume {} by {:.0}%.",
                if record.actions.volume_change_fraction > 0.0 {
                    "increases"
                } else {
                    "decreases"
                },
                record.actions.volume_change_fraction.abs() * 100.0
            );
        }

        for event in &record.guardrails {
            if matches!(
                event.severity,
                GuardrailSeverity::Violation | GuardrailSeverity::Warning
            ) {
                let _ = write!(out, " Note: {}.", event.message);
            }
        }
        out
    }
}
