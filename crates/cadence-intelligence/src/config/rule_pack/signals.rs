// ABOUTME: Signal interpretation configuration: trend window, confidence weights, recovery risk
// ABOUTME: Lookup tables for adherence buckets and contextual-event impacts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use cadence_core::models::{AdherenceBucket, ContextEvent, RiskLevel};
use serde::{Deserialize, Serialize};

/// Settings for the signal interpreter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalsConfig {
    /// Number of most recent check-ins analysed: 4
    pub window_size: usize,
    /// Weight change treated as stable (kg): 0.2
    pub weight_stable_threshold_kg: f64,
    /// Waist change treated as stable (cm): 0.5
    pub waist_stable_threshold_cm: f64,
    /// Adherence bucket scores
    pub adherence_scores: AdherenceScores,
    /// Confidence sub-score weights
    pub confidence_weights: ConfidenceWeights,
    /// Confidence impact of each contextual event
    pub event_impacts: EventImpacts,
    /// Recovery risk model
    pub risk: RiskConfig,
    /// Minimum mean adherence for a plateau: 0.7
    pub plateau_min_adherence: f64,
    /// Minimum waist reduction for recomposition (cm): 1.0
    pub recomposition_min_waist_drop_cm: f64,
}

/// Score assigned to each adherence bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdherenceScores {
    /// Full: 1.0
    pub full: f64,
    /// Mostly: 0.75
    pub mostly: f64,
    /// Partial: 0.5
    pub partial: f64,
    /// Minimal: 0.2
    pub minimal: f64,
}

impl AdherenceScores {
    /// Score for `bucket`
    #[must_use]
    pub const fn score(&self, bucket: AdherenceBucket) -> f64 {
        match bucket {
            AdherenceBucket::Full => self.full,
            AdherenceBucket::Mostly => self.mostly,
            AdherenceBucket::Partial => self.partial,
            AdherenceBucket::Minimal => self.minimal,
        }
    }
}

/// Weights of the confidence sub-scores; must sum to 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfidenceWeights {
    /// Adherence: 0.5
    pub adherence: f64,
    /// Data quality: 0.3
    pub data_quality: f64,
    /// Event impact: 0.2
    pub event_impact: f64,
}

/// Confidence penalty per contextual event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventImpacts {
    /// Illness: 0.3
    pub illness: f64,
    /// Injury: 0.25
    pub injury: f64,
    /// Travel: 0.15
    pub travel: f64,
    /// Holiday: 0.2
    pub holiday: f64,
    /// Social event: 0.1
    pub social_event: f64,
    /// Menstrual cycle: 0.1
    pub menstrual_cycle: f64,
    /// Schedule change: 0.1
    pub schedule_change: f64,
}

impl EventImpacts {
    /// Impact of `event`
    #[must_use]
    pub const fn impact(&self, event: ContextEvent) -> f64 {
        match event {
            ContextEvent::Illness => self.illness,
            ContextEvent::Injury => self.injury,
            ContextEvent::Travel => self.travel,
            ContextEvent::Holiday => self.holiday,
            ContextEvent::SocialEvent => self.social_event,
            ContextEvent::MenstrualCycle => self.menstrual_cycle,
            ContextEvent::ScheduleChange => self.schedule_change,
        }
    }

    fn all(&self) -> [f64; 7] {
        [
            self.illness,
            self.injury,
            self.travel,
            self.holiday,
            self.social_event,
            self.menstrual_cycle,
            self.schedule_change,
        ]
    }

    /// Whether every impact lies in [0, 1]
    #[must_use]
    pub fn all_within_unit_range(&self) -> bool {
        self.all().iter().all(|v| (0.0..=1.0).contains(v))
    }
}

/// Recovery risk model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskConfig {
    /// Weights over (10-energy), hunger, (10-sleep), stress
    pub weights: RiskWeights,
    /// Ascending level thresholds
    pub thresholds: RiskThresholds,
    /// Recommended action per level
    pub actions: RiskActions,
    /// Rating cutoffs for the boolean factor flags
    pub factor_cutoffs: RiskFactorCutoffs,
}

/// Risk score weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskWeights {
    /// Weight of (10 - energy): 0.25
    pub low_energy: f64,
    /// Weight of hunger: 0.25
    pub hunger: f64,
    /// Weight of (10 - sleep): 0.25
    pub poor_sleep: f64,
    /// Weight of stress: 0.25
    pub stress: f64,
}

/// Scores at which each risk level begins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskThresholds {
    /// Moderate: 3.0
    pub moderate: f64,
    /// High: 5.0
    pub high: f64,
    /// Critical: 7.0
    pub critical: f64,
}

/// Recommended action text per risk level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskActions {
    /// Low risk
    pub low: String,
    /// Moderate risk
    pub moderate: String,
    /// High risk
    pub high: String,
    /// Critical risk
    pub critical: String,
}

impl RiskActions {
    /// Action for `level`
    #[must_use]
    pub fn for_level(&self, level: RiskLevel) -> &str {
        match level {
            RiskLevel::Low => &self.low,
            RiskLevel::Moderate => &self.moderate,
            RiskLevel::High => &self.high,
            RiskLevel::Critical => &self.critical,
        }
    }
}

/// Ratings that flip the individual risk factors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskFactorCutoffs {
    /// Energy at or below: 3
    pub low_energy_max: u8,
    /// Hunger at or above: 8
    pub high_hunger_min: u8,
    /// Sleep at or below: 4
    pub poor_sleep_max: u8,
    /// Stress at or above: 8
    pub high_stress_min: u8,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            window_size: 4,
            weight_stable_threshold_kg: 0.2,
            waist_stable_threshold_cm: 0.5,
            adherence_scores: AdherenceScores {
                full: 1.0,
                mostly: 0.75,
                partial: 0.5,
                minimal: 0.2,
            },
            confidence_weights: ConfidenceWeights {
                adherence: 0.5,
                data_quality: 0.3,
                event_impact: 0.2,
            },
            event_impacts: EventImpacts {
                illness: 0.3,
                injury: 0.25,
                travel: 0.15,
                holiday: 0.2,
                social_event: 0.1,
                menstrual_cycle: 0.1,
                schedule_change: 0.1,
            },
            risk: RiskConfig {
                weights: RiskWeights {
                    low_energy: 0.25,
                    hunger: 0.25,
                    poor_sleep: 0.25,
                    stress: 0.25,
                },
                thresholds: RiskThresholds {
                    moderate: 3.0,
                    high: 5.0,
                    critical: 7.0,
                },
                actions: RiskActions {
                    low: "continue current plan".into(),
                    moderate: "monitor recovery and prioritise sleep".into(),
                    high: "hold deficit and reduce training stress".into(),
                    critical: "raise calories and deload training".into(),
                },
                factor_cutoffs: RiskFactorCutoffs {
                    low_energy_max: 3,
                    high_hunger_min: 8,
                    poor_sleep_max: 4,
                    high_stress_min: 8,
                },
            },
            plateau_min_adherence: 0.7,
            recomposition_min_waist_drop_cm: 1.0,
        }
    }
}
