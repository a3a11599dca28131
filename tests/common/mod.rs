//! Shared test infrastructure for model and HTTP tests.
//!
//! # Test Database Setup
//! - `setup_test_db()` - temp-dir SQLite database with migrations applied
//! - `create_user()` / `create_admin()` - identity rows with hashed passwords
//! - `create_meeting()` / `started_meeting()` - meetings in a given state

#![allow(dead_code)]

use sqlx::SqlitePool;
use tempfile::TempDir;

use meeting_records::auth::gate::{self, AdminUser, Identity, Role, SessionUser};
use meeting_records::auth::password;
use meeting_records::db;
use meeting_records::models::meeting::{self, NewMeeting};
use meeting_records::models::user::{self, NewUser};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_USER: &str = "officer";
pub const MEMBER_USER: &str = "member";
pub const TEST_PASS: &str = "correct-horse-battery";
pub const ORGANIZATION: &str = "ACM Test Chapter";

// ============================================================================
// DATABASE SETUP
// ============================================================================

/// Owns the temp dir so the database file outlives the pool.
pub struct TestDb {
    _dir: TempDir,
    pool: SqlitePool,
}

impl TestDb {
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn upload_dir(&self) -> std::path::PathBuf {
        self._dir.path().join("uploads")
    }
}

/// Setup a test database with the full schema.
pub async fn setup_test_db() -> TestDb {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::create_dir_all(dir.path().join("uploads")).expect("Failed to create upload dir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());

    let pool = db::init_pool(&url).await.expect("Failed to open test DB");
    db::run_migrations(&pool).await.expect("Failed to run migrations");

    TestDb { _dir: dir, pool }
}

// ============================================================================
// IDENTITIES
// ============================================================================

pub async fn create_user_with_role(pool: &SqlitePool, username: &str, role: Role) -> SessionUser {
    let hash = password::hash_password(TEST_PASS).expect("Failed to hash password");
    let id = user::create(
        pool,
        &NewUser {
            username: username.to_string(),
            password: hash,
            role,
        },
    )
    .await
    .expect("Failed to create user");
    SessionUser {
        id,
        username: username.to_string(),
        role,
    }
}

pub async fn create_user(pool: &SqlitePool, username: &str) -> SessionUser {
    create_user_with_role(pool, username, Role::User).await
}

/// Create an admin and pass it through the gate.
pub async fn create_admin(pool: &SqlitePool, username: &str) -> AdminUser {
    let u = create_user_with_role(pool, username, Role::Admin).await;
    admin_of(&u)
}

pub fn admin_of(u: &SessionUser) -> AdminUser {
    gate::admin_gate(&Identity::User(u.clone())).expect("Expected an admin identity")
}

// ============================================================================
// MEETINGS
// ============================================================================

pub async fn create_meeting(pool: &SqlitePool, title: &str, admin_only: bool) -> i64 {
    let new = NewMeeting {
        title: title.to_string(),
        description: format!("{title} description"),
        admin_only,
    };
    let host = meeting::host_label(ADMIN_USER, ORGANIZATION);
    meeting::create(pool, &new, &host)
        .await
        .expect("Failed to create meeting")
}

/// Create and start a meeting; returns `(meeting_id, plaintext_code)`.
pub async fn started_meeting(pool: &SqlitePool, admin: &AdminUser, admin_only: bool) -> (i64, String) {
    let id = create_meeting(pool, "Weekly Meeting", admin_only).await;
    let code = meeting::start(pool, id, admin)
        .await
        .expect("Failed to start meeting");
    (id, code)
}
