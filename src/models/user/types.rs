use serde::Deserialize;

use crate::auth::gate::{Role, SessionUser};

/// Internal user struct for authentication, includes password hash and
/// two-factor secret.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
    pub joined: String,
    pub graduated: String,
    pub totp_secret: Option<String>,
    pub totp_active: bool,
}

impl User {
    /// Unknown role text degrades to the least-privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::User)
    }

    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            username: self.username.clone(),
            role: self.role(),
        }
    }
}

/// New user data for creation. `password` is already hashed.
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Sign-up form.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

/// Account update form. Empty password leaves it unchanged.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub start_semester: String,
    #[serde(default)]
    pub grad_semester: String,
    pub csrf_token: String,
}
