// ABOUTME: Tests for decision record sealing and integrity verification
// ABOUTME: Hash stability across serialization and detection of tampered fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use cadence::engine::config::RulePack;
use cadence::engine::plan_engine::{PlanEngine, RecordStamp};
use cadence::errors::ErrorCode;
use cadence::models::{DecisionInputs, DecisionRecord, NutritionMode};
use common::{cut_profile, t0};
use uuid::Uuid;

mod common;

fn sealed_record() -> DecisionRecord {
    let inputs = DecisionInputs {
        profile: cut_profile(Uuid::new_v4()),
        checkins: Vec::new(),
        prior_state: None,
        prior_nutrition: None,
        prior_training: None,
        evaluated_at: t0(),
    };
    PlanEngine::onboard(inputs, &RulePack::baseline(), RecordStamp::new(t0()))
        .unwrap()
        .record
}

#[test]
fn test_sealed_record_verifies() {
    let record = sealed_record();
    assert_eq!(record.content_hash.len(), 64);
    assert_eq!(record.compute_hash().unwrap(), record.content_hash);
    record.verify_integrity().unwrap();
}

#[test]
fn test_hash_survives_json_storage() {
    let record = sealed_record();
    let stored = serde_json::to_string(&record).unwrap();
    let loaded: DecisionRecord = serde_json::from_str(&stored).unwrap();

    assert_eq!(loaded, record);
    loaded.verify_integrity().unwrap();
}

#[test]
fn test_tampered_action_detected() {
    let mut record = sealed_record();
    record.actions.calorie_target += 100;

    let err = record.verify_integrity().unwrap_err();
    assert_eq!(err.code, ErrorCode::IntegrityError);
    assert_eq!(err.user_id, Some(record.user_id));
}

#[test]
fn test_tampered_state_and_rules_detected() {
    let mut record = sealed_record();
    record.post_state.nutrition_mode = NutritionMode::Maintain;
    assert!(record.verify_integrity().is_err());

    let mut record = sealed_record();
    record.rules_fired.push("manual_override".to_owned());
    assert!(record.verify_integrity().is_err());
}

#[test]
fn test_resealing_restores_integrity() {
    let mut record = sealed_record();
    record.actions.calorie_target += 100;
    let original = record.content_hash.clone();

    let resealed = record.seal().unwrap();
    assert_ne!(resealed.content_hash, original);
    resealed.verify_integrity().unwrap();
}
