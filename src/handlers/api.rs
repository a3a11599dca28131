/// Read-only JSON API over meeting state and ledgers.
///
/// List endpoints answer `[]` for unknown meetings; only the state
/// endpoint reports 404.
use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::read_model;

/// GET /api/event/state/{id}/: e.g. `"Not Started"`.
pub async fn state(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let status = read_model::state(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(status.label()))
}

/// GET /api/event/attendees/{id}/
pub async fn attendees(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let list = read_model::attendees(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/event/notes/{id}/
pub async fn notes(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let list = read_model::minutes(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// GET /api/event/attachments/{id}/
pub async fn attachments(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let list = read_model::attachments(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(list))
}
