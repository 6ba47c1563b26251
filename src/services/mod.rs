// ABOUTME: Service layer wrapping the pure engine with persistence and explanation
// ABOUTME: Entry points shared by the CLI and any future transport
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer

/// Human-readable decision explanations
pub mod explanation;

/// Orchestrator: onboarding, check-ins, history, verification, replay
pub mod plan_generator;

pub use explanation::{Explainer, TemplateExplainer};
pub use plan_generator::{
    ActivePlans, CycleReport, IntegrityReport, PlanGenerator, ProfileSubmission,
};
