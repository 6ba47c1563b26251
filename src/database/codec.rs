// ABOUTME: Column encoding helpers shared by the table modules
// ABOUTME: Enum text, RFC3339 timestamps, UUID text, integer width checks, JSON columns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use cadence_core::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Serde string form of a unit enum (`"weight_loss"`, `"CUT_ACTIVE"`, ...)
pub(super) fn enum_to_text<T: Serialize>(value: &T) -> AppResult<String> {
    match serde_json::to_value(value)? {
        Value::String(text) => Ok(text),
        other => Err(AppError::serialization(format!(
            "expected a string-encoded enum, got {other}"
        ))),
    }
}

pub(super) fn enum_from_text<T: DeserializeOwned>(text: &str, column: &str) -> AppResult<T> {
    serde_json::from_value(Value::String(text.to_owned()))
        .map_err(|e| AppError::database(format!("Invalid {column} value '{text}': {e}")))
}

pub(super) fn opt_enum_to_text<T: Serialize>(value: Option<&T>) -> AppResult<Option<String>> {
    value.map(enum_to_text).transpose()
}

pub(super) fn opt_enum_from_text<T: DeserializeOwned>(
    text: Option<&str>,
    column: &str,
) -> AppResult<Option<T>> {
    text.map(|t| enum_from_text(t, column)).transpose()
}

pub(super) fn timestamp_to_text(value: &DateTime<Utc>) -> String {
    value.to_rfc3339()
}

pub(super) fn timestamp_from_text(text: &str, column: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Failed to parse {column}: {e}")))
}

pub(super) fn opt_timestamp_from_text(
    text: Option<&str>,
    column: &str,
) -> AppResult<Option<DateTime<Utc>>> {
    text.map(|t| timestamp_from_text(t, column)).transpose()
}

pub(super) fn uuid_from_text(text: &str, column: &str) -> AppResult<Uuid> {
    Uuid::parse_str(text).map_err(|e| AppError::internal(format!("Invalid {column} UUID: {e}")))
}

pub(super) fn u32_from_column(value: i64, column: &str) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::database(format!("{column} value {value} out of range")))
}

pub(super) fn u8_from_column(value: i64, column: &str) -> AppResult<u8> {
    u8::try_from(value)
        .map_err(|_| AppError::database(format!("{column} value {value} out of range")))
}

pub(super) fn revision_to_column(revision: u64) -> AppResult<i64> {
    i64::try_from(revision)
        .map_err(|_| AppError::database(format!("revision {revision} exceeds storage range")))
}

pub(super) fn revision_from_column(value: i64) -> AppResult<u64> {
    u64::try_from(value)
        .map_err(|_| AppError::database(format!("revision value {value} out of range")))
}

pub(super) fn json_to_text<T: Serialize>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string(value)?)
}

pub(super) fn json_from_text<T: DeserializeOwned>(text: &str, column: &str) -> AppResult<T> {
    serde_json::from_str(text)
        .map_err(|e| AppError::database(format!("Invalid {column} JSON: {e}")))
}

/// Map a failed insert, turning key collisions into `CONCURRENT_MODIFICATION`
pub(super) fn write_error(error: &sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(db_error) = error {
        if db_error.is_unique_violation() {
            return AppError::conflict(format!(
                "{what} was already written by a concurrent cycle"
            ));
        }
    }
    AppError::database(format!("Failed to write {what}: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::models::{Goal, NutritionMode};

    #[test]
    fn test_enum_text_uses_serde_names() {
        assert_eq!(enum_to_text(&Goal::WeightLoss).unwrap(), "weight_loss");
        assert_eq!(enum_to_text(&NutritionMode::CutHold).unwrap(), "CUT_HOLD");
        let mode: NutritionMode = enum_from_text("GAIN_ACTIVE", "nutrition_mode").unwrap();
        assert_eq!(mode, NutritionMode::GainActive);
        assert!(enum_from_text::<Goal>("bulk", "goal").is_err());
    }

    #[test]
    fn test_timestamp_keeps_subsecond_precision() {
        let now = Utc::now();
        let parsed = timestamp_from_text(&timestamp_to_text(&now), "created_at").unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn test_negative_counter_rejected() {
        assert!(u32_from_column(-1, "week_number").is_err());
        assert_eq!(u32_from_column(12, "week_number").unwrap(), 12);
    }
}
