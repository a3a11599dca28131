use actix_session::Session;
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

use crate::auth::gate::{AdminUser, Identity};
use crate::auth::session::set_flash;
use crate::auth::{csrf, validate};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::meeting::{self, NewMeeting};
use crate::models::read_model;
use crate::templates_structs::{DashboardTemplate, PageContext};

use super::forms::CreateMeetingForm;

/// GET /admin/dashboard/{id}/
pub async fn dashboard(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    admin: web::ReqData<AdminUser>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let view = read_model::detail(&pool, path.into_inner()).await?;
    let ctx = PageContext::with_identity(&session, &config, Identity::User(admin.user().clone()));
    render(DashboardTemplate { ctx, view })
}

/// POST /admin/create/: then continue on the new meeting's dashboard.
pub async fn create(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    admin: web::ReqData<AdminUser>,
    form: web::Form<CreateMeetingForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_optional(&form.meeting_title, "Title", 200));
    errors.extend(validate::validate_optional(&form.meeting_description, "Description", 5000));
    if !errors.is_empty() {
        set_flash(&session, format!("Meeting creation failed. {}", errors.join(". ")));
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/events/"))
            .finish());
    }

    let new = NewMeeting {
        title: form.meeting_title.clone(),
        description: form.meeting_description.clone(),
        admin_only: form.admin_only(),
    };
    let host = meeting::host_label(admin.username(), &config.site.organization);
    let id = meeting::create(&pool, &new, &host).await?;
    log::info!("Meeting {} created by {}", id, admin.username());

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", format!("/admin/dashboard/{id}/")))
        .finish())
}
