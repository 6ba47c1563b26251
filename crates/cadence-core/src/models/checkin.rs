// ABOUTME: Weekly check-in model, the engine's append-only raw-signal ledger
// ABOUTME: Body metrics, subjective ratings, adherence bucket, and contextual event tags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::ratings::{MAX_RATING, MIN_RATING};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Self-reported plan adherence for the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdherenceBucket {
    /// Followed the plan essentially every day (>= 90%)
    Full,
    /// Most days (70-89%)
    Mostly,
    /// About half the days (40-69%)
    Partial,
    /// Rarely (< 40%)
    Minimal,
}

/// Contextual events that make the week's signal less trustworthy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextEvent {
    /// Acute illness
    Illness,
    /// New or aggravated injury
    Injury,
    /// Travel disrupting routine
    Travel,
    /// Holiday or vacation
    Holiday,
    /// Social events with unplanned eating
    SocialEvent,
    /// Menstrual-cycle related water retention
    MenstrualCycle,
    /// Work or schedule upheaval
    ScheduleChange,
}

/// Self-reported direction of training performance over the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingPerformance {
    /// Loads or reps going up
    Progressing,
    /// No change in loads or reps
    Stalling,
    /// Loads or reps going down
    Regressing,
}

/// A check-in as submitted by the user, before it is sequenced and stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCheckIn {
    /// Morning body weight (kg)
    pub weight_kg: f64,
    /// Waist circumference at the navel (cm)
    #[serde(default)]
    pub waist_cm: Option<f64>,
    /// Energy rating 0-10 (10 = great)
    pub energy: u8,
    /// Hunger rating 0-10 (10 = starving)
    pub hunger: u8,
    /// Sleep quality rating 0-10 (10 = great)
    pub sleep: u8,
    /// Stress rating 0-10 (10 = overwhelmed)
    pub stress: u8,
    /// Adherence bucket
    pub adherence: AdherenceBucket,
    /// Contextual events during the week
    #[serde(default)]
    pub events: BTreeSet<ContextEvent>,
    /// Training performance trend, when reported
    #[serde(default)]
    pub training_performance: Option<TrainingPerformance>,
    /// Free-text note
    #[serde(default)]
    pub note: String,
    /// Measurement time; defaults to submission time
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl NewCheckIn {
    /// Validate ratings and body metrics.
    ///
    /// # Errors
    ///
    /// Returns `VALUE_OUT_OF_RANGE` for non-positive metrics or ratings above 10
    pub fn validate(&self) -> AppResult<()> {
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(AppError::out_of_range("weight_kg must be positive"));
        }
        if let Some(waist) = self.waist_cm {
            if !waist.is_finite() || waist <= 0.0 {
                return Err(AppError::out_of_range("waist_cm must be positive"));
            }
        }
        for (name, value) in [
            ("energy", self.energy),
            ("hunger", self.hunger),
            ("sleep", self.sleep),
            ("stress", self.stress),
        ] {
            if !(MIN_RATING..=MAX_RATING).contains(&value) {
                return Err(AppError::out_of_range(format!(
                    "{name} rating must be between {MIN_RATING} and {MAX_RATING}"
                )));
            }
        }
        Ok(())
    }

    /// Sequence the submission into a stored check-in
    #[must_use]
    pub fn into_checkin(self, user_id: Uuid, week_number: u32, now: DateTime<Utc>) -> CheckIn {
        CheckIn {
            id: Uuid::new_v4(),
            user_id,
            week_number,
            weight_kg: self.weight_kg,
            waist_cm: self.waist_cm,
            energy: self.energy,
            hunger: self.hunger,
            sleep: self.sleep,
            stress: self.stress,
            adherence: self.adherence,
            events: self.events,
            training_performance: self.training_performance,
            note: self.note,
            recorded_at: self.recorded_at.unwrap_or(now),
        }
    }
}

/// A stored check-in. Never edited or deleted after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Unique identifier
    pub id: Uuid,
    /// Owner
    pub user_id: Uuid,
    /// Sequential week number, starting at 1
    pub week_number: u32,
    /// Morning body weight (kg)
    pub weight_kg: f64,
    /// Waist circumference (cm)
    pub waist_cm: Option<f64>,
    /// Energy rating 0-10
    pub energy: u8,
    /// Hunger rating 0-10
    pub hunger: u8,
    /// Sleep quality rating 0-10
    pub sleep: u8,
    /// Stress rating 0-10
    pub stress: u8,
    /// Adherence bucket
    pub adherence: AdherenceBucket,
    /// Contextual events
    pub events: BTreeSet<ContextEvent>,
    /// Training performance trend
    pub training_performance: Option<TrainingPerformance>,
    /// Free-text note
    pub note: String,
    /// Measurement time
    pub recorded_at: DateTime<Utc>,
}
