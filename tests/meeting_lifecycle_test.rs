//! Meeting lifecycle tests: create, start, reset-code, end.
//!
//! Covers:
//! - Legal transitions and the timestamps they stamp
//! - Illegal transitions report the current status
//! - Concurrent starts admit exactly one winner
//! - The plaintext code is never persisted

mod common;

use meeting_records::errors::AppError;
use meeting_records::models::attendance;
use meeting_records::models::meeting::{self, MeetingStatus, code};
use common::*;

#[tokio::test]
async fn test_create_starts_not_started_without_code() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let id = create_meeting(pool, "Kickoff", false).await;
    let m = meeting::find_by_id(pool, id).await.expect("Query failed").expect("Meeting not found");

    assert_eq!(m.status, MeetingStatus::NotStarted);
    assert!(m.code_hash.is_none());
    assert!(m.event_start.is_none());
    assert!(m.event_end.is_none());
    assert_eq!(m.host, format!("{ADMIN_USER} - {ORGANIZATION}"));
}

#[tokio::test]
async fn test_start_activates_and_enrolls_initiator() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let admin = create_admin(pool, ADMIN_USER).await;

    let id = create_meeting(pool, "Kickoff", false).await;
    let plaintext = meeting::start(pool, id, &admin).await.expect("Start failed");

    let m = meeting::find_by_id(pool, id).await.unwrap().unwrap();
    assert_eq!(m.status, MeetingStatus::Active);
    assert!(m.event_start.is_some());

    let stored = m.code_hash.expect("Active meeting should have a code hash");
    assert_ne!(stored, plaintext);
    assert!(code::verify(&plaintext, &stored));

    let attendees = attendance::find_by_meeting(pool, id).await.unwrap();
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0].username, ADMIN_USER);
}

#[tokio::test]
async fn test_second_start_is_invalid_transition() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let admin = create_admin(pool, ADMIN_USER).await;
    let (id, _) = started_meeting(pool, &admin, false).await;

    let err = meeting::start(pool, id, &admin).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition { current: MeetingStatus::Active, .. }
    ));
    assert_eq!(err.to_string(), "Meeting could not be started because it is currently active.");
}

#[tokio::test]
async fn test_concurrent_starts_have_one_winner() {
    let db = setup_test_db().await;
    let pool = db.pool().clone();
    let admin = create_admin(&pool, ADMIN_USER).await;
    let id = create_meeting(&pool, "Race", false).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        let admin = admin.clone();
        handles.push(tokio::spawn(async move { meeting::start(&pool, id, &admin).await }));
    }

    let mut codes = Vec::new();
    let mut conflicts = 0;
    for h in handles {
        match h.await.expect("Task panicked") {
            Ok(code) => codes.push(code),
            Err(AppError::InvalidTransition { .. }) => conflicts += 1,
            Err(other) => panic!("Unexpected error: {other}"),
        }
    }

    assert_eq!(codes.len(), 1);
    assert_eq!(conflicts, 7);

    let m = meeting::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(code::verify(&codes[0], m.code_hash.as_deref().unwrap()));
    assert_eq!(attendance::find_by_meeting(&pool, id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reset_code_replaces_hash_keeps_attendance() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let admin = create_admin(pool, ADMIN_USER).await;
    let member = create_user(pool, MEMBER_USER).await;
    let (id, old_code) = started_meeting(pool, &admin, false).await;
    attendance::check_in(pool, id, &member, &old_code).await.expect("Check-in failed");

    let new_code = meeting::reset_code(pool, id, &admin).await.expect("Reset failed");

    let m = meeting::find_by_id(pool, id).await.unwrap().unwrap();
    let stored = m.code_hash.unwrap();
    assert!(code::verify(&new_code, &stored));
    assert!(!code::verify(&old_code, &stored) || old_code == new_code);
    assert_eq!(m.status, MeetingStatus::Active);
    assert_eq!(attendance::find_by_meeting(pool, id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_reset_code_requires_active() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let admin = create_admin(pool, ADMIN_USER).await;
    let id = create_meeting(pool, "Not yet", false).await;

    let err = meeting::reset_code(pool, id, &admin).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition { current: MeetingStatus::NotStarted, .. }
    ));
}

#[tokio::test]
async fn test_end_before_start_leaves_event_end_unset() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let admin = create_admin(pool, ADMIN_USER).await;
    let id = create_meeting(pool, "Never started", false).await;

    let err = meeting::end(pool, id, &admin).await.unwrap_err();
    assert_eq!(err.to_string(), "Meeting could not be ended because it is currently not started.");

    let m = meeting::find_by_id(pool, id).await.unwrap().unwrap();
    assert_eq!(m.status, MeetingStatus::NotStarted);
    assert!(m.event_end.is_none());
}

#[tokio::test]
async fn test_end_stamps_event_end_after_start() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let admin = create_admin(pool, ADMIN_USER).await;
    let (id, _) = started_meeting(pool, &admin, false).await;

    meeting::end(pool, id, &admin).await.expect("End failed");

    let m = meeting::find_by_id(pool, id).await.unwrap().unwrap();
    assert_eq!(m.status, MeetingStatus::Ended);
    let start = m.event_start.expect("event_start should be set");
    let end = m.event_end.expect("event_end should be set");
    assert!(end >= start);
    assert!(m.code_hash.is_none());

    let err = meeting::end(pool, id, &admin).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { current: MeetingStatus::Ended, .. }));
}

#[tokio::test]
async fn test_transitions_on_missing_meeting_are_not_found() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let admin = create_admin(pool, ADMIN_USER).await;

    assert!(matches!(meeting::start(pool, 999, &admin).await, Err(AppError::NotFound)));
    assert!(matches!(meeting::reset_code(pool, 999, &admin).await, Err(AppError::NotFound)));
    assert!(matches!(meeting::end(pool, 999, &admin).await, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_list_hides_admin_only_for_non_admins() {
    let db = setup_test_db().await;
    let pool = db.pool();
    create_meeting(pool, "Public", false).await;
    create_meeting(pool, "Officers", true).await;

    let public = meeting::list(pool, false, None).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].title, "Public");

    let all = meeting::list(pool, true, None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "Officers", "newest first");
}
