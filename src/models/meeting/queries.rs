use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::auth::gate::AdminUser;
use crate::errors::AppError;

use super::code;
use super::types::*;

const MEETING_SELECT: &str = "\
SELECT id, status, title, description, host, event_start, event_end, code_hash, admin_only \
FROM meetings";

/// Host label recorded on meetings created by `username`.
pub fn host_label(username: &str, organization: &str) -> String {
    format!("{username} - {organization}")
}

/// Insert a meeting in `not started` with no code and no timestamps.
pub async fn create(
    pool: &SqlitePool,
    new: &NewMeeting,
    host: &str,
) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO meetings (status, title, description, host, code_hash, admin_only) \
         VALUES ('not started', ?1, ?2, ?3, NULL, ?4) RETURNING id",
    )
    .bind(new.title.trim())
    .bind(new.description.trim())
    .bind(host)
    .bind(new.admin_only)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Meeting>, AppError> {
    let sql = format!("{MEETING_SELECT} WHERE id = ?1");
    let row = sqlx::query_as::<_, MeetingRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Meeting::try_from).transpose()?)
}

/// Meetings newest first. Non-admin viewers only see meetings whose
/// admin-only flag is clear.
pub async fn list(
    pool: &SqlitePool,
    include_admin_only: bool,
    limit: Option<i64>,
) -> Result<Vec<Meeting>, AppError> {
    let sql = format!(
        "{MEETING_SELECT} WHERE (?1 OR admin_only = 0) ORDER BY id DESC LIMIT ?2"
    );
    let rows = sqlx::query_as::<_, MeetingRow>(&sql)
        .bind(include_admin_only)
        .bind(limit.unwrap_or(-1))
        .fetch_all(pool)
        .await?;
    rows.into_iter()
        .map(|row| Meeting::try_from(row).map_err(AppError::from))
        .collect()
}

/// Current status, or `NotFound` when the meeting does not exist.
async fn current_status(
    conn: &mut SqliteConnection,
    meeting_id: i64,
) -> Result<MeetingStatus, AppError> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM meetings WHERE id = ?1")
        .bind(meeting_id)
        .fetch_optional(&mut *conn)
        .await?;
    let status = status.ok_or(AppError::NotFound)?;
    status
        .parse::<MeetingStatus>()
        .map_err(|e| AppError::Db(sqlx::Error::Decode(Box::new(e))))
}

/// `not started -> active`.
///
/// The status check and the write are one conditional `UPDATE`; the initiator
/// is enrolled as an attendee in the same transaction. Returns the plaintext
/// join code, which is not stored anywhere.
pub async fn start(
    pool: &SqlitePool,
    meeting_id: i64,
    admin: &AdminUser,
) -> Result<String, AppError> {
    let issued = code::issue();
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE meetings SET status = 'active', code_hash = ?1, event_start = ?2 \
         WHERE id = ?3 AND status = 'not started'",
    )
    .bind(&issued.hash)
    .bind(Utc::now())
    .bind(meeting_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        let current = current_status(&mut *tx, meeting_id).await?;
        tx.rollback().await?;
        return Err(AppError::InvalidTransition {
            action: "started",
            current,
        });
    }

    sqlx::query(
        "INSERT INTO attendees (username, meeting_id) VALUES (?1, ?2) \
         ON CONFLICT (username, meeting_id) DO NOTHING",
    )
    .bind(admin.username())
    .bind(meeting_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    log::info!("Meeting {} started by {}", meeting_id, admin.username());
    Ok(issued.plaintext)
}

/// `active -> active`: replace the join code. Attendance is untouched.
pub async fn reset_code(
    pool: &SqlitePool,
    meeting_id: i64,
    admin: &AdminUser,
) -> Result<String, AppError> {
    let issued = code::issue();
    let updated = sqlx::query(
        "UPDATE meetings SET code_hash = ?1 WHERE id = ?2 AND status = 'active'",
    )
    .bind(&issued.hash)
    .bind(meeting_id)
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        let mut conn = pool.acquire().await?;
        let current = current_status(&mut *conn, meeting_id).await?;
        return Err(AppError::InvalidTransition {
            action: "reset",
            current,
        });
    }

    log::info!("Join code for meeting {} reset by {}", meeting_id, admin.username());
    Ok(issued.plaintext)
}

/// `active -> ended`. Clears the join code hash.
pub async fn end(pool: &SqlitePool, meeting_id: i64, admin: &AdminUser) -> Result<(), AppError> {
    let updated = sqlx::query(
        "UPDATE meetings SET status = 'ended', event_end = ?1, code_hash = NULL \
         WHERE id = ?2 AND status = 'active'",
    )
    .bind(Utc::now())
    .bind(meeting_id)
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        let mut conn = pool.acquire().await?;
        let current = current_status(&mut *conn, meeting_id).await?;
        return Err(AppError::InvalidTransition {
            action: "ended",
            current,
        });
    }

    log::info!("Meeting {} ended by {}", meeting_id, admin.username());
    Ok(())
}
