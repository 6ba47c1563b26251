// ABOUTME: Configuration module for the decision engine
// ABOUTME: Re-exports the rule pack and its section types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Versioned rule pack
pub mod rule_pack;

pub use rule_pack::{ConfigError, RulePack, BASELINE_VERSION};
