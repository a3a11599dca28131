use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::gate::Role;
use crate::auth::pending::{PendingLogins, Purpose};
use crate::auth::session::{
    clear_pending_token, get_pending_token, get_user_id, log_in, set_flash, set_pending_token,
};
use crate::auth::{csrf, password, totp, validate};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::user::{self, NewUser, SignUpForm};
use crate::templates_structs::{LoginTemplate, PageContext, SignUpTemplate, VerifyTwoFactorTemplate};

const LOGIN_FAILED: &str = "Login attempt failed. Please try again or contact \
                            the system administrator to reset your credentials.";
const USERNAME_TAKEN: &str = "User creation failed. Username already registered. \
                              Try logging in instead or contact an administrator.";

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CodeForm {
    pub code: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

fn peer(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn login_page(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if get_user_id(&session).is_some() {
        return Ok(see_other("/"));
    }
    let ctx = PageContext::build(&session, &pool, &config).await?;
    render(LoginTemplate { ctx, error: None })
}

pub async fn login_submit(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    pending: web::Data<PendingLogins>,
    session: Session,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let username = form.username.trim();

    let verified = match user::find_by_username(&pool, username).await? {
        Some(u) => {
            let ok = password::verify_password_off_thread(form.password.clone(), u.password.clone())
                .await?;
            ok.then_some(u)
        }
        None => None,
    };

    let Some(u) = verified else {
        log::warn!("Login attempt as {} from IP {} - failed", username, peer(&req));
        let ctx = PageContext::build(&session, &pool, &config).await?;
        return render(LoginTemplate { ctx, error: Some(LOGIN_FAILED.to_string()) });
    };

    if u.totp_active {
        let token = pending.issue(u.id, Purpose::Login);
        set_pending_token(&session, &token);
        log::info!("Login attempt as {} from IP {} - awaiting 2FA", u.username, peer(&req));
        return Ok(see_other("/verify-2fa/"));
    }

    log_in(&session, &u)?;
    log::info!("Login attempt as {} from IP {} - success", u.username, peer(&req));
    Ok(see_other("/"))
}

/// The live `Login` token bound to this browser, if any.
fn pending_login(session: &Session, pending: &PendingLogins) -> Option<(String, i64)> {
    let token = get_pending_token(session)?;
    match pending.peek(&token) {
        Ok((user_id, Purpose::Login)) => Some((token, user_id)),
        _ => {
            clear_pending_token(session);
            None
        }
    }
}

pub async fn verify_2fa_page(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    pending: web::Data<PendingLogins>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    if pending_login(&session, &pending).is_none() {
        set_flash(&session, "You must log in before using 2FA.");
        return Ok(see_other("/login/"));
    }
    let ctx = PageContext::build(&session, &pool, &config).await?;
    render(VerifyTwoFactorTemplate { ctx, error: None })
}

pub async fn verify_2fa_submit(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    pending: web::Data<PendingLogins>,
    session: Session,
    form: web::Form<CodeForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let Some((token, user_id)) = pending_login(&session, &pending) else {
        set_flash(&session, "You must log in before using 2FA.");
        return Ok(see_other("/login/"));
    };

    let found = user::find_by_id(&pool, user_id).await?;
    let Some(u) = found.filter(|u| u.totp_active) else {
        pending.revoke(&token);
        clear_pending_token(&session);
        set_flash(&session, "2FA not required or user not found.");
        return Ok(see_other("/login/"));
    };

    let secret = u.totp_secret.clone().unwrap_or_default();
    if totp::verify(&secret, &form.code) && pending.consume(&token, u.id).is_ok() {
        clear_pending_token(&session);
        log_in(&session, &u)?;
        log::info!("Login as {} from IP {} - 2FA verified", u.username, peer(&req));
        return Ok(see_other("/"));
    }

    log::warn!("Invalid 2FA code for {} from IP {}", u.username, peer(&req));
    if pending.record_failure(&token) == 0 {
        clear_pending_token(&session);
        set_flash(&session, "Too many invalid codes. Please log in again.");
        return Ok(see_other("/login/"));
    }

    let ctx = PageContext::build(&session, &pool, &config).await?;
    render(VerifyTwoFactorTemplate { ctx, error: Some("Invalid 2FA code.".to_string()) })
}

pub async fn sign_up_page(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &pool, &config).await?;
    render(SignUpTemplate { ctx, errors: vec![], username: String::new() })
}

pub async fn sign_up_submit(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<SignUpForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let username = form.username.trim().to_string();

    let mut errors: Vec<String> = vec![];
    errors.extend(validate::validate_username(&username));
    if errors.is_empty() && user::username_exists(&pool, &username).await? {
        errors.push(USERNAME_TAKEN.to_string());
    }
    errors.extend(config.usernames.check(&username));
    errors.extend(validate::validate_password_confirmation(&form.password, &form.confirm_password));
    errors.extend(validate::validate_password(&form.password));

    if !errors.is_empty() {
        let ctx = PageContext::build(&session, &pool, &config).await?;
        return render(SignUpTemplate { ctx, errors, username });
    }

    let hash = password::hash_password_off_thread(form.password.clone()).await?;
    let created =
        user::create(&pool, &NewUser { username: username.clone(), password: hash, role: Role::User })
            .await;
    match created {
        Ok(_) => {}
        // Lost a race with a concurrent sign-up for the same name.
        Err(e) if e.is_unique_violation() => {
            let ctx = PageContext::build(&session, &pool, &config).await?;
            return render(SignUpTemplate { ctx, errors: vec![USERNAME_TAKEN.to_string()], username });
        }
        Err(e) => return Err(e),
    }
    log::info!("New user {} from IP {}", username, peer(&req));

    // A sign-up while logged in ends the old session.
    if get_user_id(&session).is_some() {
        session.purge();
    }
    set_flash(&session, "User creation succeeded. You can now log into your new account.");
    Ok(see_other("/login/"))
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(see_other("/"))
}
