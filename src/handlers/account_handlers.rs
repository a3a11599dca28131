use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use sqlx::SqlitePool;

use crate::auth::gate::{Identity, SessionUser};
use crate::auth::pending::{PendingLogins, Purpose};
use crate::auth::session::{clear_pending_token, get_pending_token, set_flash, set_pending_token};
use crate::auth::{csrf, password, totp, validate};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::user::{self, AccountForm};
use crate::templates_structs::{AccountTemplate, PageContext, TotpSetupTemplate};

use super::auth_handlers::{CodeForm, CsrfOnly};

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

async fn account_page(
    pool: &SqlitePool,
    config: &AppConfig,
    session: &Session,
    current: &SessionUser,
    errors: Vec<String>,
) -> Result<HttpResponse, AppError> {
    let u = user::find_by_id(pool, current.id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    let ctx = PageContext::with_identity(session, config, Identity::User(u.to_session_user()));
    render(AccountTemplate {
        ctx,
        joined: u.joined,
        graduated: u.graduated,
        totp_active: u.totp_active,
        errors,
    })
}

/// GET /my-account/
pub async fn my_account(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    current: web::ReqData<SessionUser>,
) -> Result<HttpResponse, AppError> {
    account_page(&pool, &config, &session, &current, vec![]).await
}

/// POST /update-account/: each field is applied independently; an invalid
/// field is reported and left unchanged.
pub async fn update_account(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    current: web::ReqData<SessionUser>,
    form: web::Form<AccountForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let new_password = form.password.trim();
    let start = form.start_semester.trim().to_uppercase();
    let grad = form.grad_semester.trim().to_uppercase();
    log::info!(
        "Account update attempt: {} from IP {} - start semester {:?}, end semester {:?}",
        current.username,
        req.peer_addr().map(|a| a.ip().to_string()).unwrap_or_default(),
        start,
        grad
    );

    let mut errors: Vec<String> = vec![];

    if !new_password.is_empty() {
        match validate::validate_password(new_password) {
            Some(err) => errors.push(err),
            None => {
                let hash = password::hash_password_off_thread(new_password.to_string()).await?;
                user::update_password(&pool, current.id, &hash).await?;
            }
        }
    }

    match validate::validate_semester(&start, "Start Semester") {
        Some(err) => errors.push(err),
        None => user::update_joined(&pool, current.id, &start).await?,
    }

    match validate::validate_semester(&grad, "Graduation Semester") {
        Some(err) => errors.push(err),
        None => user::update_graduated(&pool, current.id, &grad).await?,
    }

    if !errors.is_empty() {
        return account_page(&pool, &config, &session, &current, errors).await;
    }

    set_flash(&session, "Account updated successfully.");
    Ok(see_other("/my-account/"))
}

fn render_setup(
    session: &Session,
    config: &AppConfig,
    current: &SessionUser,
    secret: String,
    error: Option<String>,
) -> Result<HttpResponse, AppError> {
    let provisioning_uri = totp::provisioning_uri(&secret, &current.username, &config.totp_issuer)?;
    let ctx = PageContext::with_identity(session, config, Identity::User(current.clone()));
    render(TotpSetupTemplate { ctx, secret, provisioning_uri, error })
}

/// GET /setup-2fa/: issue a fresh secret held in an enrollment token.
pub async fn setup_2fa(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    pending: web::Data<PendingLogins>,
    session: Session,
    current: web::ReqData<SessionUser>,
) -> Result<HttpResponse, AppError> {
    let u = user::find_by_id(&pool, current.id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    if u.totp_active {
        set_flash(&session, "Two-Factor Authentication is already enabled.");
        return Ok(see_other("/my-account/"));
    }

    if let Some(old) = get_pending_token(&session) {
        pending.revoke(&old);
    }
    let secret = totp::generate_secret();
    let token = pending.issue(current.id, Purpose::EnrollTotp { secret: secret.clone() });
    set_pending_token(&session, &token);

    render_setup(&session, &config, &current, secret, None)
}

/// POST /verify-setup/
pub async fn verify_setup(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    pending: web::Data<PendingLogins>,
    session: Session,
    current: web::ReqData<SessionUser>,
    form: web::Form<CodeForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let enrollment = get_pending_token(&session).and_then(|token| match pending.peek(&token) {
        Ok((user_id, Purpose::EnrollTotp { secret })) if user_id == current.id => {
            Some((token, secret))
        }
        _ => None,
    });
    let Some((token, secret)) = enrollment else {
        clear_pending_token(&session);
        set_flash(&session, "2FA setup session expired. Start over.");
        return Ok(see_other("/setup-2fa/"));
    };

    if totp::verify(&secret, &form.code) && pending.consume(&token, current.id).is_ok() {
        clear_pending_token(&session);
        user::set_totp(&pool, current.id, &secret, true).await?;
        log::info!("Two-factor authentication enabled for {}", current.username);
        set_flash(&session, "Two-Factor Authentication successfully enabled!");
        return Ok(see_other("/my-account/"));
    }

    if pending.record_failure(&token) == 0 {
        clear_pending_token(&session);
        set_flash(&session, "2FA setup session expired. Start over.");
        return Ok(see_other("/setup-2fa/"));
    }

    render_setup(
        &session,
        &config,
        &current,
        secret,
        Some("Invalid code. Please try scanning and verifying again.".to_string()),
    )
}

/// POST /disable-2fa/: deactivate and rotate the stored secret.
pub async fn disable_2fa(
    pool: web::Data<SqlitePool>,
    session: Session,
    current: web::ReqData<SessionUser>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    user::set_totp(&pool, current.id, &totp::generate_secret(), false).await?;
    log::info!("Two-factor authentication disabled for {}", current.username);
    set_flash(&session, "Two-Factor Authentication has been disabled.");
    Ok(see_other("/my-account/"))
}
