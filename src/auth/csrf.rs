use actix_session::Session;
use rand::Rng;
use subtle::ConstantTimeEq;

use crate::errors::AppError;

const CSRF_KEY: &str = "csrf_token";

/// Get the CSRF token from the session, or generate a new one.
pub fn get_or_create_token(session: &Session) -> String {
    if let Ok(Some(token)) = session.get::<String>(CSRF_KEY) {
        return token;
    }
    let token = generate_token();
    let _ = session.insert(CSRF_KEY, &token);
    token
}

/// Validate a submitted token against the session's token.
pub fn validate_csrf(session: &Session, submitted: &str) -> Result<(), AppError> {
    let stored = session
        .get::<String>(CSRF_KEY)
        .unwrap_or(None)
        .unwrap_or_default();
    if stored.is_empty() || !bool::from(stored.as_bytes().ct_eq(submitted.as_bytes())) {
        return Err(AppError::Csrf);
    }
    Ok(())
}

/// Random 32-byte hex token.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}
