// ABOUTME: Process configuration for the Cadence engine loaded from environment variables
// ABOUTME: Database location, rule pack directory, active rule pack, and retry policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | `sqlite:./data/cadence.db` |
//! | `RULE_PACK_DIR` | unset (built-in baseline only) |
//! | `ACTIVE_RULE_PACK` | newest loaded version |
//! | `CHECKIN_MAX_RETRIES` | `3` |
//! | `ENVIRONMENT` | `development` |

use cadence_core::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// Default database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/cadence.db";

/// Default number of attempts for a cycle that loses an optimistic-concurrency race
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Process-level engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// sqlx connection URL
    pub database_url: String,
    /// Directory scanned for `*.yaml` / `*.yml` / `*.json` rule packs
    pub rule_pack_dir: Option<PathBuf>,
    /// Rule pack version to activate
    pub active_rule_pack: Option<String>,
    /// Attempts for a check-in or onboarding cycle before giving up
    pub max_retries: u32,
    /// Deployment environment
    pub environment: Environment,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            rule_pack_dir: None,
            active_rule_pack: None,
            max_retries: DEFAULT_MAX_RETRIES,
            environment: Environment::Development,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_INVALID` when `CHECKIN_MAX_RETRIES` is not a positive integer
    pub fn from_env() -> AppResult<Self> {
        let max_retries = match env::var("CHECKIN_MAX_RETRIES") {
            Ok(raw) => parse_retries(&raw)?,
            Err(_) => DEFAULT_MAX_RETRIES,
        };

        let config = Self {
            database_url: env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            rule_pack_dir: non_empty_var("RULE_PACK_DIR").map(PathBuf::from),
            active_rule_pack: non_empty_var("ACTIVE_RULE_PACK"),
            max_retries,
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
        };

        info!(
            database_url = %config.database_url,
            rule_pack_dir = ?config.rule_pack_dir,
            active_rule_pack = ?config.active_rule_pack,
            max_retries = config.max_retries,
            environment = %config.environment,
            "Engine configuration loaded"
        );
        Ok(config)
    }
}

fn parse_retries(raw: &str) -> AppResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(AppError::config(format!(
            "CHECKIN_MAX_RETRIES must be a positive integer, got '{raw}'"
        ))),
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
