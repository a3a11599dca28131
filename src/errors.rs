use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use serde::Serialize;
use std::fmt;

use crate::models::meeting::MeetingStatus;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Migrate(sqlx::migrate::MigrateError),
    Template(askama::Error),
    Url(url::ParseError),
    Hash(String),
    Session(String),
    NotFound,
    Unauthenticated,
    PermissionDenied(String),
    Csrf,
    /// Lifecycle action attempted from the wrong state.
    InvalidTransition {
        action: &'static str,
        current: MeetingStatus,
    },
    /// Check-in attempted on a meeting that is not active.
    InvalidState(MeetingStatus),
    AlreadyCheckedIn(String),
    InvalidCode,
    UnknownUser(String),
    Validation(String),
}

/// Coarse classification used to pick the HTTP status and log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StateConflict,
    NotFound,
    Authorization,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Db(_)
            | AppError::Migrate(_)
            | AppError::Template(_)
            | AppError::Url(_)
            | AppError::Hash(_)
            | AppError::Session(_) => ErrorKind::Internal,
            AppError::NotFound => ErrorKind::NotFound,
            AppError::Unauthenticated | AppError::PermissionDenied(_) | AppError::Csrf => {
                ErrorKind::Authorization
            }
            AppError::InvalidTransition { .. }
            | AppError::InvalidState(_)
            | AppError::AlreadyCheckedIn(_)
            | AppError::InvalidCode
            | AppError::UnknownUser(_)
            | AppError::Validation(_) => ErrorKind::StateConflict,
        }
    }

    /// A write rejected by a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, AppError::Db(sqlx::Error::Database(e)) if e.is_unique_violation())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Migrate(e) => write!(f, "Migration error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Url(e) => write!(f, "URL error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::NotFound => write!(f, "Specified record does not exist."),
            AppError::Unauthenticated => write!(f, "Requests to this page require authentication."),
            AppError::PermissionDenied(what) => {
                write!(f, "Request forbidden due to insufficient authorization: {what}.")
            }
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::InvalidTransition { action, current } => write!(
                f,
                "Meeting could not be {action} because it is currently {current}."
            ),
            AppError::InvalidState(_) => write!(f, "Specified meeting is inactive."),
            AppError::AlreadyCheckedIn(username) => {
                write!(f, "Attendee {username} is already checked in.")
            }
            AppError::InvalidCode => write!(f, "Meeting code is invalid."),
            AppError::UnknownUser(username) => write!(f, "Attendee {username} does not exist."),
            AppError::Validation(msg) => write!(f, "{msg}"),
        }
    }
}

/// Failure body shared by the admin form-POST flows and the JSON API.
#[derive(Serialize)]
struct FailureBody {
    success: bool,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::StateConflict => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Authorization if matches!(self, AppError::Unauthenticated) => {
                StatusCode::SEE_OTHER
            }
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self.kind() {
            ErrorKind::Internal => {
                log::error!("{self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
            ErrorKind::Authorization if matches!(self, AppError::Unauthenticated) => {
                HttpResponse::SeeOther()
                    .insert_header(("Location", "/"))
                    .finish()
            }
            _ => HttpResponse::build(self.status_code()).json(FailureBody {
                success: false,
                message: self.to_string(),
            }),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::Migrate(e)
    }
}

impl From<url::ParseError> for AppError {
    fn from(e: url::ParseError) -> Self {
        AppError::Url(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

/// Render an askama template into a 200 HTML response.
pub fn render<T: Template>(tmpl: T) -> Result<HttpResponse, AppError> {
    let html = tmpl.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_message_reports_current_state() {
        let err = AppError::InvalidTransition {
            action: "started",
            current: MeetingStatus::Active,
        };
        assert_eq!(
            err.to_string(),
            "Meeting could not be started because it is currently active."
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn kinds_map_to_http_statuses() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::PermissionDenied("admin".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(AppError::InvalidCode.kind(), ErrorKind::StateConflict);
        assert_eq!(AppError::Hash("x".into()).kind(), ErrorKind::Internal);
    }
}
