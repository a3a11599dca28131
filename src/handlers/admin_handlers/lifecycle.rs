use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

use crate::auth::csrf;
use crate::auth::gate::{AdminUser, Identity};
use crate::auth::session::set_flash;
use crate::config::AppConfig;
use crate::errors::{AppError, ErrorKind, render};
use crate::models::meeting;
use crate::templates_structs::{CodeTemplate, PageContext};

use super::forms::{AdminReply, CsrfOnly, failure};

/// POST /admin/start/{id}/: replies with the plaintext join code.
pub async fn start(
    pool: web::Data<SqlitePool>,
    session: Session,
    admin: web::ReqData<AdminUser>,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let meeting_id = path.into_inner();

    match meeting::start(&pool, meeting_id, &admin).await {
        Ok(code) => Ok(AdminReply {
            meeting_code: Some(code),
            ..AdminReply::ok(meeting_id, "Meeting started successfully.")
        }
        .respond(StatusCode::OK)),
        Err(e) => failure(meeting_id, e),
    }
}

/// POST /admin/reset-code/{id}/: shows the new code on its own page.
pub async fn reset_code(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    admin: web::ReqData<AdminUser>,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let meeting_id = path.into_inner();

    let code = match meeting::reset_code(&pool, meeting_id, &admin).await {
        Ok(code) => code,
        Err(e) if e.kind() == ErrorKind::StateConflict => {
            set_flash(&session, e.to_string());
            return Ok(HttpResponse::SeeOther()
                .insert_header(("Location", format!("/admin/dashboard/{meeting_id}/")))
                .finish());
        }
        Err(e) => return Err(e),
    };

    let found = meeting::find_by_id(&pool, meeting_id).await?;
    let meeting = found.ok_or(AppError::NotFound)?;
    let ctx = PageContext::with_identity(&session, &config, Identity::User(admin.user().clone()));
    render(CodeTemplate { ctx, meeting, code })
}

/// POST /admin/end/{id}/
pub async fn end(
    pool: web::Data<SqlitePool>,
    session: Session,
    admin: web::ReqData<AdminUser>,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let meeting_id = path.into_inner();

    match meeting::end(&pool, meeting_id, &admin).await {
        Ok(()) => Ok(AdminReply::ok(meeting_id, "Meeting ended successfully.").respond(StatusCode::OK)),
        Err(e) => failure(meeting_id, e),
    }
}
