// ABOUTME: Core data models for the Cadence engine
// ABOUTME: Profiles, check-ins, engine state, plan versions, derived signals, decision records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Plain data shared by the pure engine and the persistence layer. Nested
//! structures are typed records here; encoding to storage columns happens only
//! at the storage boundary.

/// Weekly check-in ledger
pub mod checkin;
/// Append-only decision record with content hashing
pub mod decision;
/// Per-user engine state machine
pub mod engine_state;
/// Versioned nutrition and training plans
pub mod plan;
/// Onboarding profile
pub mod profile;
/// Derived signals and progress classification
pub mod signals;

pub use checkin::{AdherenceBucket, CheckIn, ContextEvent, NewCheckIn, TrainingPerformance};
pub use decision::{
    ActionSet, DecisionInputs, DecisionOutcome, DecisionRecord, GuardrailEvent,
    GuardrailSeverity, TriggerType,
};
pub use engine_state::{EngineState, ModeFamily, NutritionMode, TrainingMode};
pub use plan::{ActivePlanPointer, MacroTargets, NutritionPlan, TrainingPlan};
pub use profile::{
    ActivityLevel, AnthropometricProfile, BiologicalSex, Equipment, Experience, Goal,
    TrainingProfile,
};
pub use signals::{
    ConfidenceBreakdown, DerivedSignals, MetricTrend, ProgressAnalysis, ProgressPattern,
    RecoveryRisk, RiskFactors, RiskLevel, TrendDirection,
};
