use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

use crate::auth::gate::AdminUser;
use crate::auth::{csrf, validate};
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{attachment, attendance, minutes};

use super::forms::{AdminReply, AttachmentForm, AttendeeForm, MinutesForm, failure};

/// POST /admin/attendees/{id}/: add an attendee without a join code.
pub async fn add_attendee(
    pool: web::Data<SqlitePool>,
    session: Session,
    admin: web::ReqData<AdminUser>,
    path: web::Path<i64>,
    form: web::Form<AttendeeForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let meeting_id = path.into_inner();
    let target = form.attendee_username.trim();

    match attendance::manual_add(&pool, meeting_id, &admin, target).await {
        Ok(()) => Ok(AdminReply::ok(
            meeting_id,
            format!("Attendee {target} checked in successfully."),
        )
        .respond(StatusCode::CREATED)),
        Err(e) => failure(meeting_id, e),
    }
}

async fn save_minutes(
    pool: &SqlitePool,
    session: &Session,
    admin: &AdminUser,
    meeting_id: i64,
    entry_id: Option<i64>,
    form: &MinutesForm,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(session, &form.csrf_token)?;

    if let Some(err) = validate::validate_optional(&form.meeting_minutes, "Minutes", 100_000) {
        return failure(meeting_id, AppError::Validation(err));
    }

    match minutes::submit(pool, meeting_id, admin.username(), &form.meeting_minutes, entry_id).await {
        Ok(id) => Ok(AdminReply {
            minutes_id: Some(id),
            ..AdminReply::ok(meeting_id, "Meeting minutes saved successfully.")
        }
        .respond(StatusCode::CREATED)),
        Err(e) => failure(meeting_id, e),
    }
}

/// POST /admin/minutes/{id}/: new entry.
pub async fn submit_minutes(
    pool: web::Data<SqlitePool>,
    session: Session,
    admin: web::ReqData<AdminUser>,
    path: web::Path<i64>,
    form: web::Form<MinutesForm>,
) -> Result<HttpResponse, AppError> {
    save_minutes(&pool, &session, &admin, path.into_inner(), None, &form).await
}

/// POST /admin/minutes/{id}/{entry}/: amend an existing entry.
pub async fn amend_minutes(
    pool: web::Data<SqlitePool>,
    session: Session,
    admin: web::ReqData<AdminUser>,
    path: web::Path<(i64, i64)>,
    form: web::Form<MinutesForm>,
) -> Result<HttpResponse, AppError> {
    let (meeting_id, entry_id) = path.into_inner();
    save_minutes(&pool, &session, &admin, meeting_id, Some(entry_id), &form).await
}

/// POST /admin/attachments/{id}/: link a file already in the upload folder.
pub async fn record_attachment(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    _admin: web::ReqData<AdminUser>,
    path: web::Path<i64>,
    form: web::Form<AttachmentForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let meeting_id = path.into_inner();

    match attachment::record(&pool, meeting_id, &config.upload_dir, &form.filename).await {
        Ok(id) => Ok(AdminReply {
            attachment_id: Some(id),
            ..AdminReply::ok(meeting_id, "Attachment recorded successfully.")
        }
        .respond(StatusCode::CREATED)),
        Err(e) => failure(meeting_id, e),
    }
}
