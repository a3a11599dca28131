use actix_session::Session;
use sqlx::SqlitePool;

use crate::auth::gate::Identity;
use crate::errors::AppError;
use crate::models::user::{self, User};

const USER_ID_KEY: &str = "user_id";
const FLASH_KEY: &str = "flash";
const PENDING_KEY: &str = "pending_auth";

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>(USER_ID_KEY).unwrap_or(None)
}

/// Establish an authenticated session for `user`.
pub fn log_in(session: &Session, user: &User) -> Result<(), AppError> {
    session.renew();
    session
        .insert(USER_ID_KEY, user.id)
        .map_err(|e| AppError::Session(e.to_string()))
}

/// Resolve the acting identity. The role is read from the user row on every
/// request so out-of-band role changes apply immediately; a session whose
/// user no longer exists is treated as anonymous.
pub async fn resolve_identity(session: &Session, pool: &SqlitePool) -> Result<Identity, AppError> {
    let Some(user_id) = get_user_id(session) else {
        return Ok(Identity::Anonymous);
    };
    match user::find_by_id(pool, user_id).await? {
        Some(u) => Ok(Identity::User(u.to_session_user())),
        None => {
            session.remove(USER_ID_KEY);
            Ok(Identity::Anonymous)
        }
    }
}

pub fn set_flash(session: &Session, message: impl Into<String>) {
    let _ = session.insert(FLASH_KEY, message.into());
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>(FLASH_KEY).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH_KEY);
    }
    flash
}

/// The browser only holds the opaque pending-authentication token; the
/// binding to a user and purpose lives server-side.
pub fn set_pending_token(session: &Session, token: &str) {
    let _ = session.insert(PENDING_KEY, token);
}

pub fn get_pending_token(session: &Session) -> Option<String> {
    session.get::<String>(PENDING_KEY).unwrap_or(None)
}

pub fn clear_pending_token(session: &Session) {
    session.remove(PENDING_KEY);
}
