// ABOUTME: Logging configuration and structured logging setup for the Cadence engine
// ABOUTME: Configures log levels, formatters, and emits structured events for decision cycles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging configuration

use crate::constants::service_names;
use anyhow::Result;
use cadence_core::models::{DecisionRecord, GuardrailEvent};
use serde_json::json;
use std::env;
use std::io;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include thread information
    pub include_thread: bool,
    /// Include span information for tracing
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for terminal use
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: service_names::CADENCE.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") => LogFormat::Pretty,
            _ => LogFormat::Compact,
        };

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        Self {
            level,
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: is_production || env::var("LOG_INCLUDE_THREAD").is_ok(),
            include_spans: env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service_names::CADENCE.into()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_owned()),
            environment,
        }
    }

    /// Build the filter: `RUST_LOG` or the configured level, with sqlx kept quiet
    fn env_filter(&self) -> EnvFilter {
        env::var("RUST_LOG")
            .map_or_else(|_| EnvFilter::new(&self.level), EnvFilter::new)
            .add_directive(
                "sqlx=warn"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            )
            .add_directive(
                format!("cadence={}", self.level)
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::INFO.into()),
            )
    }

    /// Initialize the global tracing subscriber. Output goes to stderr so
    /// command output on stdout stays machine-readable.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let span_events = if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = fmt::layer()
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_thread_ids(self.include_thread)
            .with_thread_names(self.include_thread)
            .with_writer(io::stderr)
            .with_span_events(span_events);
        let registry = tracing_subscriber::registry().with(self.env_filter());

        match self.format {
            LogFormat::Json => registry.with(layer.with_target(true).json()).try_init()?,
            LogFormat::Pretty => registry.with(layer.with_target(true).pretty()).try_init()?,
            LogFormat::Compact => registry.with(layer.with_target(false).compact()).try_init()?,
        }

        self.log_startup_info();
        Ok(())
    }

    fn log_startup_info(&self) {
        let features = json!({
            "location": self.include_location,
            "thread": self.include_thread,
            "spans": self.include_spans,
        });
        debug!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Logging configured: {features}"
        );
    }
}

/// Structured events for the decision cycle
pub struct DecisionLogger;

impl DecisionLogger {
    /// A decision record was committed
    pub fn log_committed(record: &DecisionRecord) {
        info!(
            user.id = %record.user_id,
            decision.id = %record.id,
            decision.trigger = record.trigger.as_str(),
            decision.outcome = ?record.outcome,
            rule_pack.version = %record.rule_pack_version,
            plan.calorie_target = record.actions.calorie_target,
            plan.calorie_delta = record.actions.calorie_delta_kcal,
            plan.nutrition_version = ?record.actions.nutrition_version,
            plan.training_version = ?record.actions.training_version,
            "Decision committed"
        );
        debug!(
            decision.id = %record.id,
            rules = ?record.rules_fired,
            "Rules fired"
        );
    }

    /// Guardrails fired during a cycle
    pub fn log_guardrails(user_id: Uuid, guardrails: &[GuardrailEvent]) {
        for event in guardrails {
            if event.is_violation() {
                warn!(
                    user.id = %user_id,
                    guardrail.code = %event.code,
                    guardrail.proposed = ?event.proposed,
                    "Guardrail blocked change: {}",
                    event.message
                );
            } else {
                debug!(
                    user.id = %user_id,
                    guardrail.code = %event.code,
                    guardrail.severity = ?event.severity,
                    guardrail.proposed = ?event.proposed,
                    guardrail.applied = ?event.applied,
                    "{}",
                    event.message
                );
            }
        }
    }

    /// Lost an optimistic-concurrency race and will retry
    pub fn log_retry(user_id: Uuid, attempt: u32, max_retries: u32, backoff_ms: u64) {
        warn!(
            user.id = %user_id,
            attempt = attempt,
            max_retries = max_retries,
            backoff_ms = backoff_ms,
            "Engine state advanced concurrently, retrying cycle"
        );
    }

    /// A stored decision record failed its integrity check
    pub fn log_tampered(user_id: Uuid, record_id: Uuid) {
        warn!(
            user.id = %user_id,
            decision.id = %record_id,
            "Decision record failed integrity check"
        );
    }
}
