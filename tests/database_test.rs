// ABOUTME: Tests for SQLite storage of profiles, check-ins, plans, state and decisions
// ABOUTME: Atomic cycle commits, append-only enforcement, revision compare-and-swap, ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use cadence::database::{CycleCommit, Database};
use cadence::engine::config::RulePack;
use cadence::engine::plan_engine::{CycleOutcome, PlanEngine, RecordStamp};
use cadence::errors::ErrorCode;
use cadence::models::{AnthropometricProfile, CheckIn, DecisionInputs};
use common::{checkin, create_test_database, cut_profile, t0, week};
use uuid::Uuid;

fn onboarding(profile: &AnthropometricProfile) -> CycleOutcome {
    let inputs = DecisionInputs {
        profile: profile.clone(),
        checkins: Vec::new(),
        prior_state: None,
        prior_nutrition: None,
        prior_training: None,
        evaluated_at: t0(),
    };
    PlanEngine::onboard(inputs, &RulePack::baseline(), RecordStamp::new(t0())).unwrap()
}

async fn onboard(db: &Database, profile: &AnthropometricProfile) -> Result<CycleOutcome> {
    let outcome = onboarding(profile);
    db.commit_cycle(&CycleCommit {
        expected_revision: None,
        profile: Some(profile.clone()),
        checkin: None,
        outcome: outcome.clone(),
    })
    .await?;
    Ok(outcome)
}

/// Run and build the commit for one check-in against what is stored
async fn checkin_commit(
    db: &Database,
    profile: &AnthropometricProfile,
    new: CheckIn,
) -> Result<CycleCommit> {
    let user_id = profile.user_id;
    let state = db.engine_state(user_id).await?.unwrap();
    let pointer = db.active_pointer(user_id).await?.unwrap();
    let mut checkins = db.recent_checkins(user_id, 3).await?;
    checkins.push(new.clone());

    let inputs = DecisionInputs {
        profile: profile.clone(),
        checkins,
        prior_state: Some(state.clone()),
        prior_nutrition: db.nutrition_plan(user_id, pointer.nutrition_version).await?,
        prior_training: db.training_plan(user_id, pointer.training_version).await?,
        evaluated_at: new.recorded_at,
    };
    let outcome =
        PlanEngine::checkin(inputs, &RulePack::baseline(), RecordStamp::new(new.recorded_at))?;
    Ok(CycleCommit {
        expected_revision: Some(state.revision),
        profile: None,
        checkin: Some(new),
        outcome,
    })
}

// ============================================================================
// CYCLE COMMITS
// ============================================================================

#[tokio::test]
async fn test_onboarding_commit_persists_everything() -> Result<()> {
    let db = create_test_database().await?;
    let profile = cut_profile(Uuid::new_v4());
    let user_id = profile.user_id;
    let outcome = onboard(&db, &profile).await?;

    assert_eq!(db.latest_profile(user_id).await?, Some(profile));
    assert_eq!(db.engine_state(user_id).await?.as_ref(), Some(outcome.post_state()));

    let pointer = db.active_pointer(user_id).await?.unwrap();
    assert_eq!(pointer.nutrition_version, 1);
    assert_eq!(pointer.training_version, 1);
    assert_eq!(db.nutrition_plan(user_id, 1).await?, outcome.nutrition_plan);
    assert_eq!(db.training_plan(user_id, 1).await?, outcome.training_plan);

    let records = db.decision_records(user_id).await?;
    assert_eq!(records, vec![outcome.record.clone()]);
    records[0].verify_integrity()?;
    assert_eq!(db.decision_record(outcome.record.id).await?, Some(outcome.record));
    Ok(())
}

#[tokio::test]
async fn test_unknown_user_reads_empty() -> Result<()> {
    let db = create_test_database().await?;
    let user_id = Uuid::new_v4();

    assert!(db.latest_profile(user_id).await?.is_none());
    assert!(db.engine_state(user_id).await?.is_none());
    assert!(db.active_pointer(user_id).await?.is_none());
    assert!(db.recent_checkins(user_id, 4).await?.is_empty());
    assert_eq!(db.latest_week_number(user_id).await?, 0);
    assert!(db.decision_records(user_id).await?.is_empty());
    assert!(db.decision_record(Uuid::new_v4()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_checkins_returned_oldest_first() -> Result<()> {
    let db = create_test_database().await?;
    let profile = cut_profile(Uuid::new_v4());
    let user_id = profile.user_id;
    onboard(&db, &profile).await?;

    for (week_number, weight) in [(1, 90.0), (2, 89.6), (3, 89.1), (4, 88.7), (5, 88.2)] {
        let commit = checkin_commit(&db, &profile, checkin(user_id, week_number, weight)).await?;
        db.commit_cycle(&commit).await?;
    }

    let recent = db.recent_checkins(user_id, 3).await?;
    let weeks: Vec<u32> = recent.iter().map(|c| c.week_number).collect();
    assert_eq!(weeks, vec![3, 4, 5]);
    assert_eq!(recent[2].recorded_at, week(5));
    assert_eq!(db.latest_week_number(user_id).await?, 5);
    assert_eq!(db.decision_records(user_id).await?.len(), 6);
    assert_eq!(db.engine_state(user_id).await?.unwrap().revision, 6);
    Ok(())
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[tokio::test]
async fn test_stale_revision_rejected_atomically() -> Result<()> {
    let db = create_test_database().await?;
    let profile = cut_profile(Uuid::new_v4());
    let user_id = profile.user_id;
    onboard(&db, &profile).await?;

    // Two cycles computed from the same state
    let first = checkin_commit(&db, &profile, checkin(user_id, 1, 90.0)).await?;
    let mut second = checkin_commit(&db, &profile, checkin(user_id, 1, 89.8)).await?;
    second.checkin.as_mut().unwrap().week_number = 2;

    db.commit_cycle(&first).await?;
    let err = db.commit_cycle(&second).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ConcurrentModification);
    assert!(err.is_retryable());

    // Nothing from the losing cycle landed
    assert_eq!(db.recent_checkins(user_id, 10).await?.len(), 1);
    assert_eq!(db.decision_records(user_id).await?.len(), 2);
    assert_eq!(db.engine_state(user_id).await?.unwrap().revision, 2);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_first_onboarding_rejected() -> Result<()> {
    let db = create_test_database().await?;
    let profile = cut_profile(Uuid::new_v4());
    onboard(&db, &profile).await?;

    let err = onboard(&db, &profile).await.unwrap_err();
    let err = err.downcast::<cadence::errors::AppError>()?;
    assert_eq!(err.code, ErrorCode::ConcurrentModification);
    assert_eq!(db.decision_records(profile.user_id).await?.len(), 1);
    Ok(())
}

// ============================================================================
// APPEND-ONLY LEDGERS
// ============================================================================

#[tokio::test]
async fn test_ledgers_reject_update_and_delete() -> Result<()> {
    let db = create_test_database().await?;
    let profile = cut_profile(Uuid::new_v4());
    let user_id = profile.user_id;
    onboard(&db, &profile).await?;
    let commit = checkin_commit(&db, &profile, checkin(user_id, 1, 90.0)).await?;
    db.commit_cycle(&commit).await?;

    let statements = [
        "UPDATE decision_records SET outcome = 'applied'",
        "DELETE FROM decision_records",
        "UPDATE checkins SET weight_kg = 80.0",
        "DELETE FROM checkins",
        "UPDATE nutrition_plans SET calorie_target = 3000",
        "DELETE FROM training_plans",
        "UPDATE profiles SET weight_kg = 80.0",
    ];
    for statement in statements {
        let result = sqlx::query(statement).execute(db.pool()).await;
        assert!(result.is_err(), "{statement} should be rejected");
    }

    let stored = &db.recent_checkins(user_id, 4).await?[0];
    assert!((stored.weight_kg - 90.0).abs() < 1e-9);
    assert_eq!(db.decision_records(user_id).await?.len(), 2);
    Ok(())
}
