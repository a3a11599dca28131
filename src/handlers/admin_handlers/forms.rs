/// Form structures and JSON replies for the admin handlers.
use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, ErrorKind};

#[derive(Deserialize)]
pub struct CreateMeetingForm {
    pub csrf_token: String,
    pub meeting_title: String,
    #[serde(default)]
    pub meeting_description: String,
    /// Checkbox: present (`"on"`) when ticked, absent otherwise.
    pub meeting_admin_only: Option<String>,
}

impl CreateMeetingForm {
    pub fn admin_only(&self) -> bool {
        matches!(self.meeting_admin_only.as_deref(), Some("on" | "true"))
    }
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct AttendeeForm {
    pub csrf_token: String,
    pub attendee_username: String,
}

#[derive(Deserialize)]
pub struct MinutesForm {
    pub csrf_token: String,
    pub meeting_minutes: String,
}

#[derive(Deserialize)]
pub struct AttachmentForm {
    pub csrf_token: String,
    pub filename: String,
}

/// `{success, meeting_id, message, ...}` reply of the admin form posts.
#[derive(Debug, Serialize)]
pub struct AdminReply {
    pub success: bool,
    pub meeting_id: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_id: Option<i64>,
}

impl AdminReply {
    pub fn ok(meeting_id: i64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            meeting_id,
            message: message.into(),
            meeting_code: None,
            minutes_id: None,
            attachment_id: None,
        }
    }

    pub fn respond(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

/// Turn a domain failure into a `success: false` reply carrying the meeting
/// id. Internal and authorization failures keep their own handling.
pub fn failure(meeting_id: i64, err: AppError) -> Result<HttpResponse, AppError> {
    match err.kind() {
        ErrorKind::StateConflict | ErrorKind::NotFound => {
            let status = actix_web::ResponseError::status_code(&err);
            Ok(AdminReply {
                success: false,
                ..AdminReply::ok(meeting_id, err.to_string())
            }
            .respond(status))
        }
        ErrorKind::Authorization | ErrorKind::Internal => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::meeting::MeetingStatus;

    #[test]
    fn checkbox_values() {
        let mut form = CreateMeetingForm {
            csrf_token: String::new(),
            meeting_title: "t".into(),
            meeting_description: String::new(),
            meeting_admin_only: None,
        };
        assert!(!form.admin_only());
        form.meeting_admin_only = Some("on".into());
        assert!(form.admin_only());
    }

    #[test]
    fn state_conflicts_become_json_replies() {
        let err = AppError::InvalidTransition { action: "ended", current: MeetingStatus::NotStarted };
        let resp = failure(3, err).unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = failure(3, AppError::NotFound).unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        assert!(failure(3, AppError::Hash("x".into())).is_err());
    }
}
