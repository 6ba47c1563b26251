// ABOUTME: Cadence CLI - command-line front end for the adjustment engine
// ABOUTME: Rule pack validation, onboarding, check-ins, plan lookup, audit verification, and replay
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Validate a rule pack document
//! cadence-cli rule-pack validate rule_packs/baseline-2025.1.yaml
//!
//! # Onboard a user from a profile document (prints the new user id)
//! cadence-cli onboard profile.json
//!
//! # Submit a weekly check-in
//! cadence-cli checkin 6f1c... checkin.json
//!
//! # Show the active plan, the decision log, or verify and replay it
//! cadence-cli plan 6f1c...
//! cadence-cli history 6f1c...
//! cadence-cli verify 6f1c...
//! cadence-cli replay 6f1c...
//! ```

use anyhow::{bail, Context, Result};
use cadence::config::EngineConfig;
use cadence::database::Database;
use cadence::engine::config::RulePack;
use cadence::logging::LoggingConfig;
use cadence::models::NewCheckIn;
use cadence::rule_packs::RulePackRegistry;
use cadence::services::{PlanGenerator, ProfileSubmission};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "cadence-cli",
    about = "Cadence nutrition and training adjustment engine",
    long_about = "Deterministic, rule-pack driven nutrition and training adjustments from weekly check-ins."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Rule pack directory override
    #[arg(long, global = true)]
    rule_pack_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Rule pack operations
    RulePack {
        #[command(subcommand)]
        action: RulePackCommand,
    },

    /// Onboard a user (or resubmit a profile) from a JSON document
    Onboard {
        /// Profile JSON file
        profile: PathBuf,
    },

    /// Submit a weekly check-in from a JSON document
    Checkin {
        /// User ID
        user_id: Uuid,
        /// Check-in JSON file
        checkin: PathBuf,
    },

    /// Show the engine state and active plan versions
    Plan {
        /// User ID
        user_id: Uuid,
    },

    /// Print the decision log
    History {
        /// User ID
        user_id: Uuid,
    },

    /// Verify the content hash of every decision record
    Verify {
        /// User ID
        user_id: Uuid,
    },

    /// Re-run stored decisions and compare the outcomes
    Replay {
        /// User ID
        user_id: Uuid,

        /// Replay a single record instead of the whole log
        #[arg(long)]
        record: Option<Uuid>,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum RulePackCommand {
    /// Parse and validate a rule pack file
    Validate {
        /// YAML or JSON rule pack
        file: PathBuf,
    },

    /// List loaded rule pack versions
    List,

    /// Print a loaded rule pack as YAML
    Show {
        /// Version (defaults to the active pack)
        version: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let mut config = EngineConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if let Some(dir) = cli.rule_pack_dir {
        config.rule_pack_dir = Some(dir);
    }

    let registry = RulePackRegistry::from_config(&config)?;

    match cli.command {
        Command::RulePack { action } => rule_pack_command(&registry, action),
        command => {
            ensure_database_dir(&config.database_url).await?;
            info!("Connecting to database: {}", config.database_url);
            let database = Database::new(&config.database_url).await?;
            let generator = PlanGenerator::new(database, Arc::new(registry))
                .with_max_retries(config.max_retries);
            engine_command(&generator, command).await
        }
    }
}

fn rule_pack_command(registry: &RulePackRegistry, action: RulePackCommand) -> Result<()> {
    match action {
        RulePackCommand::Validate { file } => {
            let pack = RulePack::from_path(&file)
                .with_context(|| format!("rule pack {} is invalid", file.display()))?;
            println!("{}: rule pack {} is valid", file.display(), pack.version);
        }
        RulePackCommand::List => {
            for version in registry.versions() {
                let marker = if version == registry.active_version() {
                    " (active)"
                } else {
                    ""
                };
                println!("{version}{marker}");
            }
        }
        RulePackCommand::Show { version } => {
            let pack = match version {
                Some(v) => registry
                    .get(&v)
                    .with_context(|| format!("rule pack {v} is not loaded"))?,
                None => registry.active()?,
            };
            print!("{}", pack.to_yaml_string()?);
        }
    }
    Ok(())
}

async fn engine_command(generator: &PlanGenerator<Database>, command: Command) -> Result<()> {
    match command {
        Command::Onboard { profile } => {
            let submission: ProfileSubmission = read_json(&profile).await?;
            print_json(&generator.onboard(submission).await?)?;
        }
        Command::Checkin { user_id, checkin } => {
            let checkin: NewCheckIn = read_json(&checkin).await?;
            print_json(&generator.submit_checkin(user_id, checkin).await?)?;
        }
        Command::Plan { user_id } => print_json(&generator.current_plan(user_id).await?)?,
        Command::History { user_id } => print_json(&generator.history(user_id).await?)?,
        Command::Verify { user_id } => {
            let report = generator.verify_history(user_id).await?;
            print_json(&report)?;
            if !report.is_clean() {
                bail!(
                    "{} of {} decision records failed verification",
                    report.tampered.len(),
                    report.checked
                );
            }
        }
        Command::Replay { user_id, record } => {
            let reports = match record {
                Some(id) => vec![generator.replay(id).await?],
                None => generator.replay_history(user_id).await?,
            };
            print_json(&reports)?;
            let mismatched = reports.iter().filter(|r| !r.matches).count();
            if mismatched > 0 {
                bail!("{mismatched} decision(s) did not reproduce");
            }
        }
        Command::RulePack { .. } => bail!("rule pack commands do not open the database"),
    }
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Create the parent directory of a file-backed SQLite URL
async fn ensure_database_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = path.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    Ok(())
}
