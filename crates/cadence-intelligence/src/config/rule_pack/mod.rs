// ABOUTME: Versioned, immutable rule pack driving every engine decision
// ABOUTME: Loads from YAML or JSON, requires every key, and validates ranges and weights
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Rule Pack Configuration
//!
//! A rule pack bundles every threshold, ratio, weight and lock duration the
//! engine uses. It is passed explicitly to each component; there is no global
//! instance. A pack is validated once when loaded and never mutated after.
//!
//! Every key is required. A document with a missing key fails to parse, and a
//! document whose values are inconsistent fails [`RulePack::validate`].

/// Action selection settings
pub mod actions;
/// Energy expenditure settings
pub mod energy;
/// Configuration error types
pub mod error;
/// Per-goal defaults
pub mod goals;
/// Progress analysis settings
pub mod progress;
/// Safety guardrails
pub mod safety;
/// Signal interpretation settings
pub mod signals;
/// Training settings
pub mod training;

pub use actions::ActionsConfig;
pub use energy::{ActivityMultipliers, EnergyConfig};
pub use error::ConfigError;
pub use goals::{GoalDefaults, GoalsConfig, RangePoint, RatioRange};
pub use progress::ProgressConfig;
pub use safety::SafetyConfig;
pub use signals::{
    AdherenceScores, ConfidenceWeights, EventImpacts, RiskActions, RiskConfig,
    RiskFactorCutoffs, RiskThresholds, RiskWeights, SignalsConfig,
};
pub use training::{AgeAdjustment, DeloadConfig, TrainingConfig};

use cadence_core::constants::ratings::MAX_RATING;
use cadence_core::models::{ActivityLevel, BiologicalSex};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version string of the built-in rule pack
pub const BASELINE_VERSION: &str = "2025.1";

/// Tolerance when checking that weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Complete rule pack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulePack {
    /// Version identifier recorded on every decision
    pub version: String,
    /// Free-text description
    pub description: String,
    /// Energy expenditure
    pub energy: EnergyConfig,
    /// Safety guardrails
    pub safety: SafetyConfig,
    /// Per-goal defaults
    pub goals: GoalsConfig,
    /// Signal interpretation
    pub signals: SignalsConfig,
    /// Progress analysis
    pub progress: ProgressConfig,
    /// Action selection
    pub actions: ActionsConfig,
    /// Training
    pub training: TrainingConfig,
}

impl RulePack {
    /// The built-in baseline pack
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            version: BASELINE_VERSION.to_owned(),
            description: "Baseline evidence-based defaults".to_owned(),
            energy: EnergyConfig::default(),
            safety: SafetyConfig::default(),
            goals: GoalsConfig::default(),
            signals: SignalsConfig::default(),
            progress: ProgressConfig::default(),
            actions: ActionsConfig::default(),
            training: TrainingConfig::default(),
        }
    }

    /// Parse and validate a YAML document
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed YAML or a missing key, or a
    /// validation error from [`Self::validate`]
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let pack: Self = serde_yaml::from_str(source)?;
        pack.validate()?;
        Ok(pack)
    }

    /// Parse and validate a JSON document
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed JSON or a missing key, or a
    /// validation error from [`Self::validate`]
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let pack: Self = serde_json::from_str(source)?;
        pack.validate()?;
        Ok(pack)
    }

    /// Load a pack from disk; `.json` files are parsed as JSON, anything else as YAML
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// parse and validation errors of the matching `from_*_str`
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if serialization fails
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// TDEE multiplier for `level`
    #[must_use]
    pub const fn activity_multiplier(&self, level: ActivityLevel) -> f64 {
        let m = &self.energy.activity_multipliers;
        match level {
            ActivityLevel::Sedentary => m.sedentary,
            ActivityLevel::Light => m.light,
            ActivityLevel::Moderate => m.moderate,
            ActivityLevel::Active => m.active,
            ActivityLevel::VeryActive => m.very_active,
        }
    }

    /// Minimum daily calories for `sex`
    #[must_use]
    pub const fn calorie_floor(&self, sex: BiologicalSex) -> i32 {
        match sex {
            BiologicalSex::Male => self.safety.calorie_floor_male,
            BiologicalSex::Female => self.safety.calorie_floor_female,
        }
    }

    /// Validate internal consistency
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::MissingField("version"));
        }
        self.validate_energy()?;
        self.validate_safety()?;
        self.validate_goals()?;
        self.validate_signals()?;
        self.validate_progress()?;
        self.validate_actions()?;
        self.validate_training()
    }

    fn validate_energy(&self) -> Result<(), ConfigError> {
        if self.energy.kcal_per_kg_tissue <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "kcal_per_kg_tissue must be positive",
            ));
        }
        let m = &self.energy.activity_multipliers;
        if m.sedentary < 1.0 || m.very_active > 2.5 {
            return Err(ConfigError::ValueOutOfRange(
                "Activity multipliers must be between 1.0 and 2.5",
            ));
        }
        if m.sedentary >= m.light
            || m.light >= m.moderate
            || m.moderate >= m.active
            || m.active >= m.very_active
        {
            return Err(ConfigError::InvalidRange(
                "Activity multipliers must be in ascending order",
            ));
        }
        Ok(())
    }

    fn validate_safety(&self) -> Result<(), ConfigError> {
        let s = &self.safety;
        if s.calorie_floor_male <= 0 || s.calorie_floor_female <= 0 {
            return Err(ConfigError::ValueOutOfRange("Calorie floors must be positive"));
        }
        if s.max_deficit_kcal <= 0 || s.max_surplus_kcal <= 0 {
            return Err(ConfigError::ValueOutOfRange(
                "Deficit and surplus caps must be positive",
            ));
        }
        if s.protein_floor_g_per_kg <= 0.0 {
            return Err(ConfigError::ValueOutOfRange("protein_floor must be positive"));
        }
        if s.protein_floor_g_per_kg >= s.protein_warning_g_per_kg {
            return Err(ConfigError::InvalidRange(
                "protein_floor must be < protein_warning",
            ));
        }
        if s.max_weekly_loss_percent <= 0.0 || s.max_weekly_loss_percent > 5.0 {
            return Err(ConfigError::ValueOutOfRange(
                "max_weekly_loss_percent must be between 0 and 5",
            ));
        }
        if s.fallback_step_kcal <= 0 || s.warn_step_kcal <= 0 {
            return Err(ConfigError::ValueOutOfRange("Step sizes must be positive"));
        }
        if s.fallback_step_kcal > s.max_step_kcal || s.warn_step_kcal > s.max_step_kcal {
            return Err(ConfigError::InvalidRange(
                "fallback_step and warn_step must be <= max_step",
            ));
        }
        if !(0.0..1.0).contains(&s.max_deficit_fraction_of_tdee)
            || !(0.0..1.0).contains(&s.max_surplus_fraction_of_tdee)
        {
            return Err(ConfigError::ValueOutOfRange(
                "TDEE fractions must be between 0 and 1",
            ));
        }
        if s.macro_tolerance_fraction <= 0.0 || s.macro_tolerance_fraction > 0.5 {
            return Err(ConfigError::ValueOutOfRange(
                "macro_tolerance_fraction must be between 0 and 0.5",
            ));
        }
        Ok(())
    }

    fn validate_goals(&self) -> Result<(), ConfigError> {
        let g = &self.goals;
        for defaults in [&g.weight_loss, &g.maintenance, &g.muscle_gain] {
            let protein = defaults.protein_g_per_kg;
            let fat = defaults.fat_g_per_kg;
            if protein.min <= 0.0 || fat.min <= 0.0 {
                return Err(ConfigError::ValueOutOfRange(
                    "Macro ratios must be positive",
                ));
            }
            if protein.min > protein.max || fat.min > fat.max {
                return Err(ConfigError::InvalidRange("Macro ratio min must be <= max"));
            }
            if !(-0.5..=0.5).contains(&defaults.energy_fraction) {
                return Err(ConfigError::ValueOutOfRange(
                    "energy_fraction must be between -0.5 and 0.5",
                ));
            }
        }
        if g.weight_loss.energy_fraction > 0.0 {
            return Err(ConfigError::InvalidRange(
                "weight_loss energy_fraction must not be positive",
            ));
        }
        if g.muscle_gain.energy_fraction < 0.0 {
            return Err(ConfigError::InvalidRange(
                "muscle_gain energy_fraction must not be negative",
            ));
        }
        Ok(())
    }

    fn validate_signals(&self) -> Result<(), ConfigError> {
        let s = &self.signals;
        if s.window_size < 2 {
            return Err(ConfigError::ValueOutOfRange("window_size must be at least 2"));
        }
        if s.weight_stable_threshold_kg < 0.0 || s.waist_stable_threshold_cm < 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "Stability thresholds must not be negative",
            ));
        }
        let a = &s.adherence_scores;
        if [a.full, a.mostly, a.partial, a.minimal]
            .iter()
            .any(|v| !(0.0..=1.0).contains(v))
        {
            return Err(ConfigError::ValueOutOfRange(
                "Adherence scores must be between 0 and 1",
            ));
        }
        if a.minimal > a.partial || a.partial > a.mostly || a.mostly > a.full {
            return Err(ConfigError::InvalidRange(
                "Adherence scores must be ordered minimal <= partial <= mostly <= full",
            ));
        }
        let w = &s.confidence_weights;
        if [w.adherence, w.data_quality, w.event_impact].iter().any(|v| *v < 0.0) {
            return Err(ConfigError::InvalidWeights(
                "Confidence weights must not be negative",
            ));
        }
        if (w.adherence + w.data_quality + w.event_impact - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeights(
                "Confidence weights must sum to 1.0",
            ));
        }
        if !s.event_impacts.all_within_unit_range() {
            return Err(ConfigError::ValueOutOfRange(
                "Event impacts must be between 0 and 1",
            ));
        }
        let r = &s.risk;
        if [
            r.weights.low_energy,
            r.weights.hunger,
            r.weights.poor_sleep,
            r.weights.stress,
        ]
        .iter()
        .any(|v| *v < 0.0)
        {
            return Err(ConfigError::InvalidWeights("Risk weights must not be negative"));
        }
        if r.thresholds.moderate <= 0.0
            || r.thresholds.moderate >= r.thresholds.high
            || r.thresholds.high >= r.thresholds.critical
        {
            return Err(ConfigError::InvalidRange(
                "Risk thresholds must be positive and ascending",
            ));
        }
        let c = &r.factor_cutoffs;
        if [c.low_energy_max, c.high_hunger_min, c.poor_sleep_max, c.high_stress_min]
            .iter()
            .any(|v| *v > MAX_RATING)
        {
            return Err(ConfigError::ValueOutOfRange(
                "Risk factor cutoffs must be valid ratings",
            ));
        }
        if !(0.0..=1.0).contains(&s.plateau_min_adherence) {
            return Err(ConfigError::ValueOutOfRange(
                "plateau_min_adherence must be between 0 and 1",
            ));
        }
        if s.recomposition_min_waist_drop_cm <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "recomposition_min_waist_drop_cm must be positive",
            ));
        }
        Ok(())
    }

    fn validate_progress(&self) -> Result<(), ConfigError> {
        let p = &self.progress;
        if p.tolerance_kg <= 0.0 || p.maintenance_tolerance_kg <= 0.0 {
            return Err(ConfigError::ValueOutOfRange("Tolerances must be positive"));
        }
        if p.action_threshold_kg < p.tolerance_kg {
            return Err(ConfigError::InvalidRange(
                "action_threshold_kg must be >= tolerance_kg",
            ));
        }
        if p.kcal_per_kg_delta <= 0.0 || p.max_adjustment_kcal <= 0 {
            return Err(ConfigError::ValueOutOfRange(
                "Proportional adjustment settings must be positive",
            ));
        }
        if p.reversed_cut_kcal >= 0 || p.gain_too_fast_kcal >= 0 {
            return Err(ConfigError::InvalidRange(
                "Cut reversal and fast-gain corrections must reduce calories",
            ));
        }
        if p.gain_too_slow_kcal <= 0 || p.reversed_gain_kcal <= 0 || p.maintenance_correction_kcal <= 0
        {
            return Err(ConfigError::InvalidRange(
                "Slow-gain, gain reversal and maintenance corrections must be positive",
            ));
        }
        if p.stall_window < 2 || p.stall_range_kg <= 0.0 {
            return Err(ConfigError::ValueOutOfRange(
                "Stall detection needs a window of at least 2 and a positive range",
            ));
        }
        Ok(())
    }

    fn validate_actions(&self) -> Result<(), ConfigError> {
        let a = &self.actions;
        if !(0.0..=1.0).contains(&a.min_confidence) {
            return Err(ConfigError::ValueOutOfRange(
                "min_confidence must be between 0 and 1",
            ));
        }
        if a.critical_increase_kcal <= 0 || a.high_risk_increase_kcal <= 0 {
            return Err(ConfigError::ValueOutOfRange(
                "Risk override increases must be positive",
            ));
        }
        if a.cut_plateau_kcal >= 0 || a.cut_reversal_kcal >= 0 {
            return Err(ConfigError::InvalidRange("Cut responses must reduce calories"));
        }
        if a.gain_plateau_kcal <= 0 || a.gain_reversal_kcal <= 0 {
            return Err(ConfigError::InvalidRange(
                "Gain responses must increase calories",
            ));
        }
        if a.anti_reversal_lock_days < 0 || a.calorie_band_kcal < 0 {
            return Err(ConfigError::ValueOutOfRange(
                "Lock duration and calorie band must not be negative",
            ));
        }
        Ok(())
    }

    fn validate_training(&self) -> Result<(), ConfigError> {
        let t = &self.training;
        let factor_ok = |v: f64| v > 0.0 && v <= 1.0;
        if t.min_volume <= 0.0 || t.min_volume >= t.max_volume {
            return Err(ConfigError::InvalidRange(
                "min_volume must be positive and < max_volume",
            ));
        }
        if t.regress_volume_step >= 0.0 || t.stall_volume_step <= 0.0 {
            return Err(ConfigError::InvalidRange(
                "Regression must reduce volume and stalls must add it",
            ));
        }
        let d = &t.deload;
        if d.min_frequency_weeks == 0 || d.min_frequency_weeks > d.max_frequency_weeks {
            return Err(ConfigError::InvalidRange(
                "Deload frequency bounds must be positive and ascending",
            ));
        }
        if !(d.min_frequency_weeks..=d.max_frequency_weeks).contains(&d.frequency_weeks) {
            return Err(ConfigError::ValueOutOfRange(
                "Deload frequency must lie within its bounds",
            ));
        }
        if !factor_ok(d.volume_multiplier) || !factor_ok(d.intensity_multiplier) {
            return Err(ConfigError::ValueOutOfRange(
                "Deload multipliers must be in (0, 1]",
            ));
        }
        if t.program_lock_days < 0 || t.plan_validity_days <= 0 {
            return Err(ConfigError::ValueOutOfRange(
                "program_lock_days must not be negative and plan_validity_days must be positive",
            ));
        }
        if t.age_adjustments
            .windows(2)
            .any(|pair| pair[0].min_age >= pair[1].min_age)
        {
            return Err(ConfigError::InvalidRange(
                "Age adjustments must be ascending by min_age",
            ));
        }
        if !t
            .age_adjustments
            .iter()
            .all(|adj| factor_ok(adj.volume_multiplier) && factor_ok(adj.intensity_multiplier))
            || !factor_ok(t.injury_volume_factor)
            || !factor_ok(t.injury_intensity_factor)
            || !factor_ok(t.multiplier_floor)
        {
            return Err(ConfigError::ValueOutOfRange(
                "Age, injury and floor multipliers must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

impl Default for RulePack {
    fn default() -> Self {
        Self::baseline()
    }
}
