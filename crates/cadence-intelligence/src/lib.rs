// ABOUTME: Deterministic, rule-pack driven decision engine for nutrition and training targets
// ABOUTME: Pure components from energy estimation to the per-cycle plan engine; no I/O
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Cadence Intelligence
//!
//! The decision engine. Every component is a pure, synchronous function of
//! its explicit inputs and an immutable [`config::RulePack`]:
//!
//! - [`energy`]: BMR/TDEE estimation and initial energy balance
//! - [`macros`]: protein, fat and carbohydrate allocation
//! - [`safety_validator`]: plan and step guardrails
//! - [`signal_interpreter`]: trends, confidence, recovery risk, plateau, recomposition
//! - [`progress_analyzer`]: actual versus expected rate, stall detection
//! - [`action_selector`]: ordered calorie rule table and training rules
//! - [`training_planner`]: program lookup and training plan versions
//! - [`plan_engine`]: one full onboarding or check-in cycle, and replay

/// Nutrition and training state machine
pub mod action_selector;
/// Rule pack configuration
pub mod config;
/// Energy estimation and balance selection
pub mod energy;
/// Macronutrient allocation
pub mod macros;
/// Fixed-precision rounding helpers
pub mod numeric;
/// Per-cycle decision function
pub mod plan_engine;
/// Rate-of-change analysis
pub mod progress_analyzer;
/// Guardrail checks
pub mod safety_validator;
/// Derived signals
pub mod signal_interpreter;
/// Training program selection and versioning
pub mod training_planner;

pub use action_selector::{ActionContext, ActionDecision, ActionSelector, TrainingDecision};
pub use config::{ConfigError, RulePack};
pub use energy::{EnergyBalance, EnergyBalanceSelector, EnergyEstimate, EnergyEstimator};
pub use macros::MacroAllocator;
pub use plan_engine::{CycleOutcome, PlanEngine, RecordStamp, ReplayReport};
pub use progress_analyzer::ProgressAnalyzer;
pub use safety_validator::{PlanProposal, SafetyReport, SafetyValidator};
pub use signal_interpreter::SignalInterpreter;
pub use training_planner::TrainingPlanner;
