use actix_session::Session;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::csrf;
use crate::auth::gate::SessionUser;
use crate::auth::session::{resolve_identity, set_flash};
use crate::config::AppConfig;
use crate::errors::{AppError, ErrorKind, render};
use crate::models::{attendance, read_model};
use crate::templates_structs::{EventTemplate, EventsTemplate, IndexTemplate, PageContext};

const HOME_MEETING_COUNT: i64 = 4;

#[derive(Deserialize)]
pub struct CheckInForm {
    pub meeting_code: String,
    pub csrf_token: String,
}

/// GET /: most recent visible meetings, newest one featured.
pub async fn home(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let identity = resolve_identity(&session, &pool).await?;
    let mut recent =
        read_model::visible_meetings(&pool, &identity, Some(HOME_MEETING_COUNT)).await?;
    let featured = if recent.is_empty() { None } else { Some(recent.remove(0)) };

    let ctx = PageContext::with_identity(&session, &config, identity);
    render(IndexTemplate { ctx, featured, recent })
}

/// GET /events/
pub async fn events(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let identity = resolve_identity(&session, &pool).await?;
    let meetings = read_model::visible_meetings(&pool, &identity, None).await?;
    let ctx = PageContext::with_identity(&session, &config, identity);
    render(EventsTemplate { ctx, meetings })
}

/// GET /event/{id}/
pub async fn event_detail(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let meeting_id = path.into_inner();
    let view = read_model::detail(&pool, meeting_id).await?;
    let identity = resolve_identity(&session, &pool).await?;
    let checked_in = identity
        .user()
        .is_some_and(|u| view.attendees.iter().any(|a| a.username == u.username));

    let ctx = PageContext::with_identity(&session, &config, identity);
    render(EventTemplate { ctx, view, checked_in })
}

/// Notice shown after a check-in attempt. `None` for failures that are not
/// the caller's to fix.
fn check_in_notice(result: &Result<(), AppError>) -> Option<String> {
    let reason = match result {
        Ok(()) => return Some("Check-in succeeded. Attendance updated successfully.".to_string()),
        Err(AppError::NotFound) => "Specified meeting does not exist.",
        Err(AppError::InvalidState(_)) => "Specified meeting is inactive.",
        Err(AppError::AlreadyCheckedIn(_)) => "You are already marked as an attendee.",
        Err(AppError::InvalidCode) => "Meeting code is invalid.",
        Err(AppError::PermissionDenied(_)) => {
            "This meeting is restricted to administrators only."
        }
        Err(e) if e.kind() == ErrorKind::Internal => return None,
        Err(e) => return Some(format!("Check-in failed. {e}")),
    };
    Some(format!("Check-in failed. {reason}"))
}

/// POST /event/check-in/{id}/: flash the outcome and return home.
pub async fn check_in(
    pool: web::Data<SqlitePool>,
    session: Session,
    user: web::ReqData<SessionUser>,
    path: web::Path<i64>,
    form: web::Form<CheckInForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let meeting_id = path.into_inner();

    let result = attendance::check_in(&pool, meeting_id, &user, &form.meeting_code).await;
    match check_in_notice(&result) {
        Some(notice) => set_flash(&session, notice),
        None => result?,
    }

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .finish())
}
