use sqlx::SqlitePool;

use crate::auth::gate::{self, AdminUser, SessionUser};
use crate::errors::AppError;
use crate::models::meeting::{self, MeetingStatus, code};
use crate::models::user;

use super::types::*;

pub async fn find_by_meeting(pool: &SqlitePool, meeting_id: i64) -> Result<Vec<Attendee>, AppError> {
    let rows = sqlx::query_as::<_, Attendee>(
        "SELECT id, username, meeting_id FROM attendees WHERE meeting_id = ?1 ORDER BY id ASC",
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn is_attendee(pool: &SqlitePool, meeting_id: i64, username: &str) -> Result<bool, AppError> {
    let found: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM attendees WHERE meeting_id = ?1 AND username = ?2)",
    )
    .bind(meeting_id)
    .bind(username)
    .fetch_one(pool)
    .await?;
    Ok(found)
}

/// Check `user` into `meeting_id` with a candidate join code.
///
/// Checks run in a fixed order: existence, state, duplicate, code, role.
/// The insert itself re-asserts that the meeting is still active with the
/// same code hash and relies on the `(username, meeting_id)` unique key, so
/// a concurrent `end`, `reset-code` or duplicate check-in cannot slip
/// between the checks and the write.
pub async fn check_in(
    pool: &SqlitePool,
    meeting_id: i64,
    user: &SessionUser,
    candidate_code: &str,
) -> Result<(), AppError> {
    let meeting = meeting::find_by_id(pool, meeting_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if meeting.status != MeetingStatus::Active {
        return Err(AppError::InvalidState(meeting.status));
    }

    if is_attendee(pool, meeting_id, &user.username).await? {
        return Err(AppError::AlreadyCheckedIn(user.username.clone()));
    }

    let stored_hash = meeting.code_hash.as_deref().unwrap_or_default();
    if stored_hash.is_empty() || !code::verify(candidate_code.trim(), stored_hash) {
        return Err(AppError::InvalidCode);
    }

    if !gate::may_check_in(user, meeting.admin_only) {
        return Err(AppError::PermissionDenied(
            "this meeting is restricted to administrators".to_string(),
        ));
    }

    let inserted = sqlx::query(
        "INSERT INTO attendees (username, meeting_id) \
         SELECT ?1, ?2 WHERE EXISTS ( \
             SELECT 1 FROM meetings WHERE id = ?2 AND status = 'active' AND code_hash = ?3 \
         ) \
         ON CONFLICT (username, meeting_id) DO NOTHING",
    )
    .bind(&user.username)
    .bind(meeting_id)
    .bind(stored_hash)
    .execute(pool)
    .await?
    .rows_affected();

    if inserted == 0 {
        if is_attendee(pool, meeting_id, &user.username).await? {
            return Err(AppError::AlreadyCheckedIn(user.username.clone()));
        }
        let current = meeting::find_by_id(pool, meeting_id)
            .await?
            .ok_or(AppError::NotFound)?;
        return Err(if current.status == MeetingStatus::Active {
            AppError::InvalidCode
        } else {
            AppError::InvalidState(current.status)
        });
    }

    log::info!("{} checked in to meeting {}", user.username, meeting_id);
    Ok(())
}

/// Administrator path: add `target_username` without a join code.
pub async fn manual_add(
    pool: &SqlitePool,
    meeting_id: i64,
    admin: &AdminUser,
    target_username: &str,
) -> Result<(), AppError> {
    let target_username = target_username.trim();
    if meeting::find_by_id(pool, meeting_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    if !user::username_exists(pool, target_username).await? {
        return Err(AppError::UnknownUser(target_username.to_string()));
    }

    let inserted = sqlx::query(
        "INSERT INTO attendees (username, meeting_id) VALUES (?1, ?2) \
         ON CONFLICT (username, meeting_id) DO NOTHING",
    )
    .bind(target_username)
    .bind(meeting_id)
    .execute(pool)
    .await?
    .rows_affected();

    if inserted == 0 {
        return Err(AppError::AlreadyCheckedIn(target_username.to_string()));
    }

    log::info!(
        "{} manually added {} to meeting {}",
        admin.username(),
        target_username,
        meeting_id
    );
    Ok(())
}
