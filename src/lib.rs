// ABOUTME: Main library entry point for the Cadence adjustment engine
// ABOUTME: Persistence, orchestration, configuration, and logging around the pure engine crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Cadence
//!
//! Deterministic, rule-pack driven adjustment of nutrition and training
//! targets from weekly check-ins.
//!
//! ## Architecture
//!
//! - **`cadence-core`**: errors, constants and data models
//! - **`cadence-intelligence`**: the pure engine and rule pack configuration
//! - **this crate**: the side-effecting shell
//!   - [`services::PlanGenerator`]: onboarding and check-in cycles, history,
//!     integrity verification and replay
//!   - [`database`]: SQLite storage with append-only ledgers and atomic cycle commits
//!   - [`rule_packs`]: versioned rule pack registry
//!   - [`config`] and [`logging`]: environment configuration and tracing setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use cadence::database::Database;
//! use cadence::errors::AppResult;
//! use cadence::rule_packs::RulePackRegistry;
//! use cadence::services::PlanGenerator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let database = Database::new("sqlite::memory:").await?;
//!     let generator = PlanGenerator::new(database, Arc::new(RulePackRegistry::with_baseline()));
//!     println!("active rule pack: {}", generator.rule_packs().active_version());
//!     Ok(())
//! }
//! ```

/// Environment configuration
pub mod config;

/// SQLite persistence
pub mod database;

/// Storage abstraction used by the service layer
pub mod database_plugins;

/// Structured logging setup and decision events
pub mod logging;

/// Rule pack registry
pub mod rule_packs;

/// Orchestration and explanation services
pub mod services;

pub use cadence_core::{constants, errors, models};
pub use cadence_intelligence as engine;
