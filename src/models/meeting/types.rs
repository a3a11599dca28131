use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a meeting. Transitions are linear:
/// `NotStarted -> Active -> Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum MeetingStatus {
    NotStarted,
    Active,
    Ended,
}

impl MeetingStatus {
    /// Value stored in `meetings.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            MeetingStatus::NotStarted => "not started",
            MeetingStatus::Active => "active",
            MeetingStatus::Ended => "ended",
        }
    }

    /// Title-cased label for pages and the state endpoint.
    pub fn label(&self) -> &'static str {
        match self {
            MeetingStatus::NotStarted => "Not Started",
            MeetingStatus::Active => "Active",
            MeetingStatus::Ended => "Ended",
        }
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MeetingStatus> for String {
    fn from(status: MeetingStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown meeting status {:?}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for MeetingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "not started" => Ok(MeetingStatus::NotStarted),
            "active" => Ok(MeetingStatus::Active),
            "ended" => Ok(MeetingStatus::Ended),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Raw `meetings` row as read by sqlx.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MeetingRow {
    pub id: i64,
    pub status: String,
    pub title: String,
    pub description: String,
    pub host: String,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    pub code_hash: Option<String>,
    pub admin_only: bool,
}

/// A meeting with its lifecycle fields. `code_hash` is never serialized.
#[derive(Debug, Clone, Serialize)]
pub struct Meeting {
    pub id: i64,
    pub status: MeetingStatus,
    pub title: String,
    pub description: String,
    pub host: String,
    pub event_start: Option<DateTime<Utc>>,
    pub event_end: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub code_hash: Option<String>,
    pub admin_only: bool,
}

impl TryFrom<MeetingRow> for Meeting {
    type Error = sqlx::Error;

    fn try_from(row: MeetingRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<MeetingStatus>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Meeting {
            id: row.id,
            status,
            title: row.title,
            description: row.description,
            host: row.host,
            event_start: row.event_start,
            event_end: row.event_end,
            code_hash: row.code_hash,
            admin_only: row.admin_only,
        })
    }
}

const DISPLAY_FORMAT: &str = "%d/%m/%Y %I:%M %p";

impl Meeting {
    pub fn is_active(&self) -> bool {
        self.status == MeetingStatus::Active
    }

    pub fn started_display(&self) -> String {
        format_timestamp(self.event_start)
    }

    pub fn ended_display(&self) -> String {
        format_timestamp(self.event_end)
    }
}

/// Format an optional timestamp for pages; empty when unset.
pub fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

/// Input for creating a meeting.
#[derive(Debug, Clone)]
pub struct NewMeeting {
    pub title: String,
    pub description: String,
    pub admin_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_round_trips_through_storage_text() {
        for status in [
            MeetingStatus::NotStarted,
            MeetingStatus::Active,
            MeetingStatus::Ended,
        ] {
            assert_eq!(status.as_str().parse::<MeetingStatus>(), Ok(status));
        }
        assert!("paused".parse::<MeetingStatus>().is_err());
    }

    #[test]
    fn label_is_title_cased() {
        assert_eq!(MeetingStatus::NotStarted.label(), "Not Started");
        assert_eq!(MeetingStatus::Ended.to_string(), "ended");
    }

    #[test]
    fn timestamp_formatting() {
        let ts = Utc.with_ymd_and_hms(2025, 10, 7, 18, 30, 0).unwrap();
        assert_eq!(format_timestamp(Some(ts)), "07/10/2025 06:30 PM");
        assert_eq!(format_timestamp(None), "");
    }
}
