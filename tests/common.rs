// ABOUTME: Shared test utilities and fixtures for the integration tests
// ABOUTME: Quiet logging, fixed clocks, profile and check-in builders, in-memory generator setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `cadence`

use anyhow::Result;
use cadence::database::Database;
use cadence::models::{
    ActivityLevel, AdherenceBucket, AnthropometricProfile, BiologicalSex, CheckIn, ContextEvent,
    Equipment, Experience, Goal, NewCheckIn, TrainingPerformance, TrainingProfile,
};
use cadence::rule_packs::RulePackRegistry;
use cadence::services::{PlanGenerator, ProfileSubmission};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeSet;
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Fixed onboarding instant
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 7, 0, 0).unwrap()
}

/// `n` weeks after onboarding
pub fn week(n: i64) -> DateTime<Utc> {
    t0() + Duration::weeks(n)
}

/// 30-year-old male, 180 cm, 90 kg, moderate activity, cutting.
/// BMR 1880, TDEE 2914, initial target 2414 (deficit capped at 500).
pub fn cut_training() -> TrainingProfile {
    TrainingProfile {
        experience: Experience::Intermediate,
        days_per_week: 4,
        equipment: Equipment::FullGym,
        injuries: Vec::new(),
    }
}

pub fn cut_profile(user_id: Uuid) -> AnthropometricProfile {
    AnthropometricProfile {
        user_id,
        revision: 1,
        age_years: 30,
        sex: BiologicalSex::Male,
        height_cm: 180.0,
        weight_kg: 90.0,
        activity_level: ActivityLevel::Moderate,
        goal: Goal::WeightLoss,
        training: cut_training(),
        submitted_at: t0(),
    }
}

pub fn cut_submission(user_id: Option<Uuid>) -> ProfileSubmission {
    ProfileSubmission {
        user_id,
        age_years: 30,
        sex: BiologicalSex::Male,
        height_cm: 180.0,
        weight_kg: 90.0,
        activity_level: ActivityLevel::Moderate,
        goal: Goal::WeightLoss,
        training: cut_training(),
    }
}

/// Check-in with low-risk ratings and full adherence
pub fn checkin(user_id: Uuid, week_number: u32, weight_kg: f64) -> CheckIn {
    CheckIn {
        id: Uuid::new_v4(),
        user_id,
        week_number,
        weight_kg,
        waist_cm: None,
        energy: 8,
        hunger: 3,
        sleep: 8,
        stress: 2,
        adherence: AdherenceBucket::Full,
        events: BTreeSet::new(),
        training_performance: None,
        note: String::new(),
        recorded_at: week(i64::from(week_number)),
    }
}

/// Check-in with the given ratings (energy, hunger, sleep, stress)
pub fn rated_checkin(
    user_id: Uuid,
    week_number: u32,
    weight_kg: f64,
    ratings: (u8, u8, u8, u8),
) -> CheckIn {
    let (energy, hunger, sleep, stress) = ratings;
    CheckIn {
        energy,
        hunger,
        sleep,
        stress,
        ..checkin(user_id, week_number, weight_kg)
    }
}

pub fn with_events(mut checkin: CheckIn, events: &[ContextEvent]) -> CheckIn {
    checkin.events = events.iter().copied().collect();
    checkin
}

/// Submission with low-risk ratings, recorded at submission time
pub fn new_checkin(weight_kg: f64) -> NewCheckIn {
    NewCheckIn {
        weight_kg,
        waist_cm: None,
        energy: 8,
        hunger: 3,
        sleep: 8,
        stress: 2,
        adherence: AdherenceBucket::Full,
        events: BTreeSet::new(),
        training_performance: None,
        note: String::new(),
        recorded_at: None,
    }
}

/// Ratings scoring 8.75: critical recovery risk
pub fn exhausted_checkin(weight_kg: f64) -> NewCheckIn {
    NewCheckIn {
        energy: 1,
        hunger: 9,
        sleep: 2,
        stress: 9,
        ..new_checkin(weight_kg)
    }
}

pub fn performing(mut checkin: NewCheckIn, performance: TrainingPerformance) -> NewCheckIn {
    checkin.training_performance = Some(performance);
    checkin
}

/// Empty in-memory database
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:").await?)
}

/// Generator over an in-memory database with the baseline rule pack
pub async fn create_test_generator() -> Result<PlanGenerator<Database>> {
    let database = create_test_database().await?;
    Ok(PlanGenerator::new(
        database,
        Arc::new(RulePackRegistry::with_baseline()),
    ))
}
