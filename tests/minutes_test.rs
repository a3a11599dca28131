//! Minutes ledger tests: new entries, amendments and contributor tracking.

mod common;

use meeting_records::errors::AppError;
use meeting_records::models::minutes::{self, Contributors};
use common::*;

#[tokio::test]
async fn test_submit_creates_entry_with_author() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let id = create_meeting(pool, "Board", false).await;

    let entry_id = minutes::submit(pool, id, "alice", "Opened at 7pm.", None)
        .await
        .expect("Submit failed");

    let entry = minutes::find_by_id(pool, id, entry_id).await.unwrap().expect("Entry not found");
    assert_eq!(entry.notes, "Opened at 7pm.");
    assert_eq!(entry.contributors, "alice");
    assert_eq!(entry.meeting_id, id);
}

#[tokio::test]
async fn test_submit_to_missing_meeting() {
    let db = setup_test_db().await;
    let pool = db.pool();

    let err = minutes::submit(pool, 77, "alice", "notes", None).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn test_amend_overwrites_and_appends_contributor() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let id = create_meeting(pool, "Board", false).await;
    let entry_id = minutes::submit(pool, id, "alice", "Draft", None).await.unwrap();

    let same = minutes::submit(pool, id, "bob", "Final", Some(entry_id)).await.unwrap();
    assert_eq!(same, entry_id);
    minutes::submit(pool, id, "alice", "Final, edited", Some(entry_id)).await.unwrap();

    let entry = minutes::find_by_id(pool, id, entry_id).await.unwrap().unwrap();
    assert_eq!(entry.notes, "Final, edited");
    assert_eq!(Contributors::parse(&entry.contributors).names().to_vec(), vec!["alice", "bob"]);
}

#[tokio::test]
async fn test_prefix_colliding_contributor_is_recorded() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let id = create_meeting(pool, "Board", false).await;
    let entry_id = minutes::submit(pool, id, "joanne", "Draft", None).await.unwrap();

    minutes::submit(pool, id, "ann", "Draft 2", Some(entry_id)).await.unwrap();

    let entry = minutes::find_by_id(pool, id, entry_id).await.unwrap().unwrap();
    assert_eq!(entry.contributors, "joanne, ann");
}

#[tokio::test]
async fn test_amend_entry_of_other_meeting_is_not_found() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let first = create_meeting(pool, "First", false).await;
    let second = create_meeting(pool, "Second", false).await;
    let entry_id = minutes::submit(pool, first, "alice", "Notes", None).await.unwrap();

    let err = minutes::submit(pool, second, "alice", "Hijack", Some(entry_id)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let entry = minutes::find_by_id(pool, first, entry_id).await.unwrap().unwrap();
    assert_eq!(entry.notes, "Notes");
}
