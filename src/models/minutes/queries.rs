use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::meeting;

use super::types::*;

pub async fn find_by_meeting(pool: &SqlitePool, meeting_id: i64) -> Result<Vec<MinutesEntry>, AppError> {
    let rows = sqlx::query_as::<_, MinutesEntry>(
        "SELECT id, notes, contributors, meeting_id FROM minutes \
         WHERE meeting_id = ?1 ORDER BY id ASC",
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    meeting_id: i64,
    entry_id: i64,
) -> Result<Option<MinutesEntry>, AppError> {
    let row = sqlx::query_as::<_, MinutesEntry>(
        "SELECT id, notes, contributors, meeting_id FROM minutes \
         WHERE id = ?1 AND meeting_id = ?2",
    )
    .bind(entry_id)
    .bind(meeting_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Create or amend a minutes entry.
///
/// Without `existing_entry_id` a new entry is created for an existing
/// meeting. With it, the entry (which must belong to `meeting_id`) has its
/// notes overwritten and `author` appended to its contributors if absent.
/// The amend path writes first inside its transaction so concurrent editors
/// serialize on the row and no contributor append is lost.
pub async fn submit(
    pool: &SqlitePool,
    meeting_id: i64,
    author: &str,
    text: &str,
    existing_entry_id: Option<i64>,
) -> Result<i64, AppError> {
    let Some(entry_id) = existing_entry_id else {
        if meeting::find_by_id(pool, meeting_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO minutes (notes, contributors, meeting_id) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(text)
        .bind(author.trim())
        .bind(meeting_id)
        .fetch_one(pool)
        .await?;
        log::info!("Minutes entry {} created for meeting {} by {}", id, meeting_id, author);
        return Ok(id);
    };

    let mut tx = pool.begin().await?;

    let updated = sqlx::query("UPDATE minutes SET notes = ?1 WHERE id = ?2 AND meeting_id = ?3")
        .bind(text)
        .bind(entry_id)
        .bind(meeting_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if updated == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound);
    }

    let stored: String = sqlx::query_scalar("SELECT contributors FROM minutes WHERE id = ?1")
        .bind(entry_id)
        .fetch_one(&mut *tx)
        .await?;
    let mut contributors = Contributors::parse(&stored);
    if contributors.push(author) {
        sqlx::query("UPDATE minutes SET contributors = ?1 WHERE id = ?2")
            .bind(contributors.to_string())
            .bind(entry_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    log::info!("Minutes entry {} amended for meeting {} by {}", entry_id, meeting_id, author);
    Ok(entry_id)
}
