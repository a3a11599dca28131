use std::path::Path;

use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::meeting;

use super::types::*;

pub async fn find_by_meeting(pool: &SqlitePool, meeting_id: i64) -> Result<Vec<Attachment>, AppError> {
    let rows = sqlx::query_as::<_, Attachment>(
        "SELECT id, filename, filepath, meeting_id FROM attachments \
         WHERE meeting_id = ?1 ORDER BY id ASC",
    )
    .bind(meeting_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// A bare file name: no separators, not empty, not a dot entry.
pub fn is_bare_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

/// Record a file that already sits in `upload_dir` against a meeting.
pub async fn record(
    pool: &SqlitePool,
    meeting_id: i64,
    upload_dir: &Path,
    filename: &str,
) -> Result<i64, AppError> {
    let filename = filename.trim();
    if meeting::find_by_id(pool, meeting_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    if !is_bare_filename(filename) {
        return Err(AppError::Validation(format!("Invalid attachment name {filename:?}.")));
    }
    let path = upload_dir.join(filename);
    if !path.is_file() {
        return Err(AppError::Validation(format!(
            "Attachment {filename} is not in the upload folder."
        )));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO attachments (filename, filepath, meeting_id) VALUES (?1, ?2, ?3) RETURNING id",
    )
    .bind(filename)
    .bind(path.to_string_lossy().into_owned())
    .bind(meeting_id)
    .fetch_one(pool)
    .await?;
    log::info!("Attachment {} recorded for meeting {}", filename, meeting_id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::is_bare_filename;

    #[test]
    fn rejects_paths_and_dot_entries() {
        assert!(is_bare_filename("agenda.pdf"));
        assert!(!is_bare_filename(""));
        assert!(!is_bare_filename(".."));
        assert!(!is_bare_filename("../secret"));
        assert!(!is_bare_filename("a\\b"));
    }
}
