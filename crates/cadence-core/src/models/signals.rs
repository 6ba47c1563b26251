// ABOUTME: Derived signal types computed from check-in history for each decision
// ABOUTME: Trends, confidence breakdown, recovery risk, and progress classification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

/// Direction of a metric across the analysis window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Change exceeded the stability threshold upwards
    Increasing,
    /// Change within the stability threshold
    Stable,
    /// Change exceeded the stability threshold downwards
    Decreasing,
}

/// Trend of one body metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricTrend {
    /// Direction
    pub direction: TrendDirection,
    /// Last minus first value in the window
    pub total_change: f64,
    /// Change per week across the window
    pub rate_per_week: f64,
}

/// Confidence score and the sub-scores it was weighted from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// Weighted total, clamped to [0, 1]
    pub score: f64,
    /// Mean adherence score across the window
    pub adherence: f64,
    /// Check-ins present relative to the expected window, capped at 1
    pub data_quality: f64,
    /// 1 minus the summed impact of contextual events, floored at 0
    pub event_impact: f64,
}

/// Recovery risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Below the moderate threshold
    Low,
    /// At or above the moderate threshold
    Moderate,
    /// At or above the high threshold
    High,
    /// At or above the critical threshold
    Critical,
}

/// Individual recovery risk factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskFactors {
    /// Energy rating at or below the low-energy cutoff
    pub low_energy: bool,
    /// Hunger rating at or above the high-hunger cutoff
    pub high_hunger: bool,
    /// Sleep rating at or below the poor-sleep cutoff
    pub poor_sleep: bool,
    /// Stress rating at or above the high-stress cutoff
    pub high_stress: bool,
}

/// Recovery risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryRisk {
    /// Weighted score
    pub score: f64,
    /// Bucketed level
    pub level: RiskLevel,
    /// Recommended action for the level, from the rule pack
    pub recommended_action: String,
    /// Contributing factors
    pub factors: RiskFactors,
}

/// Everything the signal interpreter derives from a check-in window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSignals {
    /// Number of check-ins in the window
    pub window_len: usize,
    /// Weight trend
    pub weight_trend: MetricTrend,
    /// Waist trend; absent when any check-in in the window lacks a waist measurement
    pub waist_trend: Option<MetricTrend>,
    /// Confidence
    pub confidence: ConfidenceBreakdown,
    /// Recovery risk
    pub recovery_risk: RecoveryRisk,
    /// Stable weight over a full window despite adherence
    pub plateau: bool,
    /// Stable weight with a shrinking waist
    pub recomposition: bool,
}

/// Classification of actual versus expected weekly change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPattern {
    /// Within tolerance of the expected rate
    OnTrack,
    /// Moving toward the goal faster than planned
    TooFast,
    /// Moving toward the goal slower than planned
    TooSlow,
    /// Outside tolerance but not enough to act, with flat recent weights
    Stalled,
    /// Moving away from the goal
    Reversed,
}

/// Output of the progress analyzer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressAnalysis {
    /// Actual weekly change between the two most recent check-ins (kg/week)
    pub weekly_change_kg: f64,
    /// Expected weekly change (kg/week)
    pub expected_change_kg: f64,
    /// Actual minus expected (kg/week)
    pub difference_kg: f64,
    /// Pattern
    pub pattern: ProgressPattern,
    /// Recommended calorie adjustment (kcal/day), before guardrails
    pub recommended_adjustment_kcal: i32,
    /// Recent weights span less than the stall range
    pub stalled: bool,
}
