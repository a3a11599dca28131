//! Read-only projections for pages and the JSON API.
//!
//! List projections never fail on a missing meeting; they return an empty
//! sequence. Only the single-meeting state and detail projections report
//! `NotFound`.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::auth::gate::{self, Identity};
use crate::errors::AppError;
use crate::models::attachment::{self, Attachment};
use crate::models::attendance::{self, Attendee};
use crate::models::meeting::{self, Meeting, MeetingStatus};
use crate::models::minutes::{self, MinutesEntry};

pub async fn state(pool: &SqlitePool, meeting_id: i64) -> Result<MeetingStatus, AppError> {
    meeting::find_by_id(pool, meeting_id)
        .await?
        .map(|m| m.status)
        .ok_or(AppError::NotFound)
}

pub async fn attendees(pool: &SqlitePool, meeting_id: i64) -> Result<Vec<Attendee>, AppError> {
    attendance::find_by_meeting(pool, meeting_id).await
}

pub async fn minutes(pool: &SqlitePool, meeting_id: i64) -> Result<Vec<MinutesEntry>, AppError> {
    minutes::find_by_meeting(pool, meeting_id).await
}

pub async fn attachments(pool: &SqlitePool, meeting_id: i64) -> Result<Vec<Attachment>, AppError> {
    attachment::find_by_meeting(pool, meeting_id).await
}

/// Everything the meeting detail pages show.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingView {
    pub meeting: Meeting,
    pub attendees: Vec<Attendee>,
    pub minutes: Vec<MinutesEntry>,
    pub attachments: Vec<Attachment>,
}

pub async fn detail(pool: &SqlitePool, meeting_id: i64) -> Result<MeetingView, AppError> {
    let meeting = meeting::find_by_id(pool, meeting_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let (attendee_list, minutes_list, attachment_list) = tokio::try_join!(
        attendees(pool, meeting_id),
        minutes(pool, meeting_id),
        attachments(pool, meeting_id),
    )?;
    Ok(MeetingView {
        meeting,
        attendees: attendee_list,
        minutes: minutes_list,
        attachments: attachment_list,
    })
}

/// Meetings `identity` may see in listings, newest first.
pub async fn visible_meetings(
    pool: &SqlitePool,
    identity: &Identity,
    limit: Option<i64>,
) -> Result<Vec<Meeting>, AppError> {
    let include_admin_only = gate::can_view(identity, true);
    meeting::list(pool, include_admin_only, limit).await
}
