use actix_session::SessionExt;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};
use sqlx::SqlitePool;

use crate::auth::gate::{self, Denied, Identity};
use crate::auth::session::resolve_identity;

async fn identity_for(req: &ServiceRequest) -> Result<Identity, Error> {
    let session = req.get_session();
    let pool = req
        .app_data::<web::Data<SqlitePool>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("database pool missing"))?;
    Ok(resolve_identity(&session, pool).await?)
}

/// Require any authenticated identity; anonymous requests go to the login
/// page. The resolved `SessionUser` is placed in request extensions.
pub async fn require_login(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let identity = identity_for(&req).await?;

    let Ok(user) = gate::require_authenticated(&identity) else {
        let response = HttpResponse::SeeOther()
            .insert_header(("Location", "/login/"))
            .finish();
        return Ok(req.into_response(response).map_into_right_body());
    };

    req.extensions_mut().insert(user.clone());
    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Administrator scope guard: unauthenticated -> 303 to `/`, non-admin ->
/// 403, admin -> continue with an `AdminUser` in request extensions.
pub async fn require_admin(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let identity = identity_for(&req).await?;

    match gate::admin_gate(&identity) {
        Ok(admin) => {
            req.extensions_mut().insert(admin);
            next.call(req).await.map(|res| res.map_into_left_body())
        }
        Err(Denied::Unauthenticated) => {
            let response = HttpResponse::SeeOther()
                .insert_header(("Location", "/"))
                .finish();
            Ok(req.into_response(response).map_into_right_body())
        }
        Err(Denied::Forbidden) => {
            log::warn!(
                "Admin access denied for {} on {}",
                identity.user().map(|u| u.username.as_str()).unwrap_or("?"),
                req.path()
            );
            let response = HttpResponse::Forbidden()
                .body("Request forbidden due to insufficient authorization.");
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
