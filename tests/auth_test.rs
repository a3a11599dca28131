//! Identity store tests: password hashing, user rows, role resolution and
//! bootstrap admin seeding.

mod common;

use meeting_records::auth::gate::{self, Denied, Identity, Role};
use meeting_records::auth::password::{hash_password, verify_password};
use meeting_records::db::seed_bootstrap_admin;
use meeting_records::models::user;
use common::*;

#[test]
fn test_password_hash_and_verify() {
    let hash = hash_password(TEST_PASS).expect("Hash failed");
    assert_ne!(hash, TEST_PASS);
    assert!(verify_password(TEST_PASS, &hash).expect("Verify failed"));
    assert!(!verify_password("wrong-password", &hash).expect("Verify failed"));
}

#[tokio::test]
async fn test_created_user_defaults() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let created = create_user(pool, MEMBER_USER).await;

    let u = user::find_by_username(pool, MEMBER_USER).await.unwrap().expect("User not found");
    assert_eq!(u.id, created.id);
    assert_eq!(u.role(), Role::User);
    assert_eq!(u.joined, "");
    assert_eq!(u.graduated, "");
    assert!(!u.totp_active);
    assert!(verify_password(TEST_PASS, &u.password).unwrap());
}

#[tokio::test]
async fn test_username_is_unique() {
    let db = setup_test_db().await;
    let pool = db.pool();
    create_user(pool, MEMBER_USER).await;

    assert!(user::username_exists(pool, MEMBER_USER).await.unwrap());
    let dup = user::create(
        pool,
        &user::NewUser {
            username: MEMBER_USER.to_string(),
            password: "x".to_string(),
            role: Role::User,
        },
    )
    .await;
    assert!(dup.expect_err("duplicate username should fail").is_unique_violation());
}

#[tokio::test]
async fn test_account_fields_update() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let created = create_user(pool, MEMBER_USER).await;

    user::update_joined(pool, created.id, "FA 2024").await.unwrap();
    user::update_graduated(pool, created.id, "SP 2028").await.unwrap();
    user::set_totp(pool, created.id, "JBSWY3DPEHPK3PXP", true).await.unwrap();

    let u = user::find_by_id(pool, created.id).await.unwrap().unwrap();
    assert_eq!(u.joined, "FA 2024");
    assert_eq!(u.graduated, "SP 2028");
    assert!(u.totp_active);
    assert_eq!(u.totp_secret.as_deref(), Some("JBSWY3DPEHPK3PXP"));
}

#[tokio::test]
async fn test_gate_follows_stored_role() {
    let db = setup_test_db().await;
    let pool = db.pool();
    let created = create_user(pool, MEMBER_USER).await;

    let identity = Identity::User(created.clone());
    assert_eq!(gate::admin_gate(&identity).unwrap_err(), Denied::Forbidden);

    user::set_role(pool, created.id, Role::Admin).await.unwrap();
    let u = user::find_by_id(pool, created.id).await.unwrap().unwrap();
    let admin = gate::admin_gate(&Identity::User(u.to_session_user())).expect("Should be admin");
    assert_eq!(admin.username(), MEMBER_USER);
}

#[tokio::test]
async fn test_bootstrap_admin_creates_then_promotes() {
    let db = setup_test_db().await;
    let pool = db.pool();

    seed_bootstrap_admin(pool, "root", TEST_PASS).await.expect("Seed failed");
    let root = user::find_by_username(pool, "root").await.unwrap().unwrap();
    assert_eq!(root.role(), Role::Admin);

    create_user(pool, MEMBER_USER).await;
    seed_bootstrap_admin(pool, MEMBER_USER, "ignored").await.expect("Seed failed");
    let promoted = user::find_by_username(pool, MEMBER_USER).await.unwrap().unwrap();
    assert_eq!(promoted.role(), Role::Admin);
    assert!(verify_password(TEST_PASS, &promoted.password).unwrap(), "password untouched");
}
