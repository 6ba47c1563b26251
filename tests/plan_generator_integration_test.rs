// ABOUTME: Integration tests for the plan generator over an in-memory SQLite store
// ABOUTME: Full cycles, error surfaces, per-user serialization, tamper detection and replay
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use anyhow::Result;
use cadence::errors::ErrorCode;
use cadence::models::{
    ActivityLevel, BiologicalSex, DecisionOutcome, DecisionRecord, TriggerType,
};
use cadence::services::{Explainer, ProfileSubmission};
use common::{create_test_generator, cut_submission, new_checkin, t0, week};
use std::sync::Arc;
use uuid::Uuid;

fn unsafe_submission() -> ProfileSubmission {
    ProfileSubmission {
        age_years: 20,
        sex: BiologicalSex::Female,
        weight_kg: 40.0,
        activity_level: ActivityLevel::VeryActive,
        ..cut_submission(None)
    }
}

// ============================================================================
// FULL CYCLES
// ============================================================================

#[tokio::test]
async fn test_onboarding_then_weekly_cycles() -> Result<()> {
    let generator = create_test_generator().await?;

    let onboarded = generator.onboard_at(cut_submission(None), t0()).await?;
    let user_id = onboarded.record.user_id;
    assert_eq!(onboarded.record.trigger, TriggerType::Onboarding);
    assert_eq!(onboarded.nutrition_plan.as_ref().unwrap().calorie_target, 2414);
    assert_eq!(onboarded.training_plan.as_ref().unwrap().version, 1);
    assert!(!onboarded.explanation.is_empty());

    let baseline = generator
        .submit_checkin_at(user_id, new_checkin(90.0), week(1))
        .await?;
    assert_eq!(baseline.record.outcome, DecisionOutcome::Baseline);
    assert_eq!(baseline.record.inputs.checkins.len(), 1);
    assert_eq!(baseline.nutrition_plan.as_ref().unwrap().version, 1);

    let applied = generator
        .submit_checkin_at(user_id, new_checkin(88.5), week(2))
        .await?;
    assert_eq!(applied.record.outcome, DecisionOutcome::Applied);
    assert_eq!(applied.record.inputs.checkins.len(), 2);
    let nutrition = applied.nutrition_plan.as_ref().unwrap();
    assert_eq!(nutrition.version, 2);
    assert_eq!(nutrition.calorie_target, 2614);

    let current = generator.current_plan(user_id).await?;
    assert_eq!(&current.nutrition, nutrition);
    assert_eq!(current.state.revision, 3);

    let history = generator.history(user_id).await?;
    let ids: Vec<Uuid> = history.iter().map(|r| r.id).collect();
    assert_eq!(
        ids,
        vec![onboarded.record.id, baseline.record.id, applied.record.id]
    );
    Ok(())
}

#[tokio::test]
async fn test_profile_resubmission_adds_revision() -> Result<()> {
    let generator = create_test_generator().await?;
    let first = generator.onboard_at(cut_submission(None), t0()).await?;
    let user_id = first.record.user_id;

    let resubmitted = ProfileSubmission {
        weight_kg: 88.0,
        ..cut_submission(Some(user_id))
    };
    let second = generator.onboard_at(resubmitted, week(1)).await?;

    assert_eq!(second.record.user_id, user_id);
    assert_eq!(second.record.inputs.profile.revision, 2);
    assert!(second.record.pre_state.is_some());
    assert_eq!(generator.store().profile_revisions(user_id).await?.len(), 2);
    assert_eq!(generator.history(user_id).await?.len(), 2);
    Ok(())
}

// ============================================================================
// ERROR SURFACES
// ============================================================================

#[tokio::test]
async fn test_checkin_for_unknown_user() -> Result<()> {
    let generator = create_test_generator().await?;
    let user_id = Uuid::new_v4();

    let err = generator
        .submit_checkin_at(user_id, new_checkin(90.0), week(1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    assert_eq!(err.user_id, Some(user_id));

    let err = generator.current_plan(user_id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    Ok(())
}

#[tokio::test]
async fn test_blocked_onboarding_leaves_no_plan() -> Result<()> {
    let generator = create_test_generator().await?;

    let report = generator.onboard_at(unsafe_submission(), t0()).await?;
    let user_id = report.record.user_id;
    assert_eq!(report.record.outcome, DecisionOutcome::Blocked);
    assert!(report.nutrition_plan.is_none());
    assert!(report.training_plan.is_none());

    let err = generator
        .submit_checkin_at(user_id, new_checkin(40.0), week(1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);

    let err = generator.current_plan(user_id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    // The blocked decision is still on the record
    assert_eq!(generator.history(user_id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_out_of_range_checkin_rejected() -> Result<()> {
    let generator = create_test_generator().await?;
    let user_id = generator
        .onboard_at(cut_submission(None), t0())
        .await?
        .record
        .user_id;

    let mut submission = new_checkin(90.0);
    submission.stress = 11;
    let err = generator
        .submit_checkin_at(user_id, submission, week(1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    assert_eq!(generator.history(user_id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_checkin_recorded_before_previous_rejected() -> Result<()> {
    let generator = create_test_generator().await?;
    let user_id = generator
        .onboard_at(cut_submission(None), t0())
        .await?
        .record
        .user_id;
    generator
        .submit_checkin_at(user_id, new_checkin(90.0), week(2))
        .await?;

    let mut late = new_checkin(89.5);
    late.recorded_at = Some(week(1));
    let err = generator
        .submit_checkin_at(user_id, late, week(3))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    assert_eq!(generator.store().checkins(user_id).await?.len(), 1);
    assert_eq!(generator.current_plan(user_id).await?.state.revision, 2);
    Ok(())
}

// ============================================================================
// SERIALIZATION
// ============================================================================

#[tokio::test]
async fn test_concurrent_checkins_get_sequential_weeks() -> Result<()> {
    const SUBMISSIONS: u32 = 6;

    let generator = create_test_generator().await?;
    let user_id = generator
        .onboard_at(cut_submission(None), t0())
        .await?
        .record
        .user_id;

    let mut handles = Vec::new();
    for i in 0..SUBMISSIONS {
        let generator = generator.clone();
        let weight = 90.0 - f64::from(i) * 0.2;
        handles.push(tokio::spawn(async move {
            generator
                .submit_checkin_at(user_id, new_checkin(weight), week(1))
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let weeks: Vec<u32> = generator
        .store()
        .checkins(user_id)
        .await?
        .iter()
        .map(|c| c.week_number)
        .collect();
    assert_eq!(weeks, (1..=SUBMISSIONS).collect::<Vec<_>>());

    let current = generator.current_plan(user_id).await?;
    assert_eq!(current.state.revision, u64::from(SUBMISSIONS) + 1);
    assert_eq!(
        generator.history(user_id).await?.len(),
        SUBMISSIONS as usize + 1
    );
    Ok(())
}

// ============================================================================
// INTEGRITY AND REPLAY
// ============================================================================

#[tokio::test]
async fn test_verify_history_flags_tampered_record() -> Result<()> {
    let generator = create_test_generator().await?;
    let onboarded = generator.onboard_at(cut_submission(None), t0()).await?;
    let user_id = onboarded.record.user_id;
    generator
        .submit_checkin_at(user_id, new_checkin(90.0), week(1))
        .await?;

    let clean = generator.verify_history(user_id).await?;
    assert!(clean.is_clean());
    assert_eq!(clean.checked, 2);

    let pool = generator.store().pool();
    sqlx::query("DROP TRIGGER decision_records_no_update")
        .execute(pool)
        .await?;
    sqlx::query(
        "UPDATE decision_records SET record = json_set(record, '$.actions.calorie_target', 3200) WHERE id = $1",
    )
    .bind(onboarded.record.id.to_string())
    .execute(pool)
    .await?;

    let report = generator.verify_history(user_id).await?;
    assert!(!report.is_clean());
    assert_eq!(report.checked, 2);
    assert_eq!(report.tampered, vec![onboarded.record.id]);
    Ok(())
}

#[tokio::test]
async fn test_replay_history_matches() -> Result<()> {
    let generator = create_test_generator().await?;
    let user_id = generator
        .onboard_at(cut_submission(None), t0())
        .await?
        .record
        .user_id;
    for (n, weight) in [(1, 90.0), (2, 88.5), (3, 88.2)] {
        generator
            .submit_checkin_at(user_id, new_checkin(weight), week(n))
            .await?;
    }

    let reports = generator.replay_history(user_id).await?;
    assert_eq!(reports.len(), 4);
    for report in &reports {
        assert!(report.matches, "{:?}", report.differences);
        assert_eq!(report.stored_hash, report.recomputed_hash);
    }

    let first = generator.replay(reports[0].record_id).await?;
    assert!(first.matches);
    Ok(())
}

#[tokio::test]
async fn test_replay_unknown_record() -> Result<()> {
    let generator = create_test_generator().await?;
    let err = generator.replay(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
    Ok(())
}

// ============================================================================
// EXPLANATION
// ============================================================================

struct OutcomeExplainer;

impl Explainer for OutcomeExplainer {
    fn explain(&self, record: &DecisionRecord) -> String {
        format!("{:?}/{:?}", record.trigger, record.outcome)
    }
}

#[tokio::test]
async fn test_custom_explainer() -> Result<()> {
    let generator = create_test_generator()
        .await?
        .with_explainer(Arc::new(OutcomeExplainer));

    let report = generator.onboard_at(cut_submission(None), t0()).await?;
    assert_eq!(report.explanation, "Onboarding/Applied");
    // Explanation is not part of the sealed record
    report.record.verify_integrity()?;
    Ok(())
}

#[tokio::test]
async fn test_template_explanation_mentions_checkin_week() -> Result<()> {
    let generator = create_test_generator().await?;
    let user_id = generator
        .onboard_at(cut_submission(None), t0())
        .await?
        .record
        .user_id;
    let report = generator
        .submit_checkin_at(user_id, new_checkin(90.0), week(1))
        .await?;

    assert!(report.explanation.contains("Week 1"), "{}", report.explanation);
    Ok(())
}
