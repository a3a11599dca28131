//! Authorization gate.
//!
//! Two independent checks, composed but never merged:
//!
//! 1. [`require_authenticated`]: is there an identity at all?
//! 2. [`require_admin`]: does that identity hold the admin role?
//!
//! [`admin_gate`] composes them: unauthenticated requests are redirected to
//! the landing page, authenticated non-admins are forbidden, admins proceed
//! with an [`AdminUser`] value. Lifecycle operations take `&AdminUser`, so
//! they cannot be reached without passing the gate.
//!
//! Listing visibility is a third rule, [`can_view`], applied separately.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

/// The acting identity resolved for an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(SessionUser),
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::User(_))
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Identity::User(u) => Some(u),
            Identity::Anonymous => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(SessionUser::is_admin)
    }
}

/// Proof that the gate admitted an administrator. Only constructible here.
#[derive(Debug, Clone)]
pub struct AdminUser(SessionUser);

impl AdminUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }

    pub fn user(&self) -> &SessionUser {
        &self.0
    }
}

/// Why the gate refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    /// No identity: redirect to the landing page.
    Unauthenticated,
    /// Identity present but role insufficient: reject, no redirect.
    Forbidden,
}

impl From<Denied> for AppError {
    fn from(d: Denied) -> Self {
        match d {
            Denied::Unauthenticated => AppError::Unauthenticated,
            Denied::Forbidden => AppError::PermissionDenied("admin role required".to_string()),
        }
    }
}

pub fn require_authenticated(identity: &Identity) -> Result<&SessionUser, Denied> {
    identity.user().ok_or(Denied::Unauthenticated)
}

pub fn require_admin(user: &SessionUser) -> Result<AdminUser, Denied> {
    if user.is_admin() {
        Ok(AdminUser(user.clone()))
    } else {
        Err(Denied::Forbidden)
    }
}

pub fn admin_gate(identity: &Identity) -> Result<AdminUser, Denied> {
    require_authenticated(identity).and_then(require_admin)
}

/// Listing rule: admin-only meetings are hidden from everyone but admins.
pub fn can_view(identity: &Identity, admin_only: bool) -> bool {
    !admin_only || identity.is_admin()
}

/// Check-in rule: admin-only meetings accept admin check-ins only.
pub fn may_check_in(user: &SessionUser, admin_only: bool) -> bool {
    !admin_only || user.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> Identity {
        Identity::User(SessionUser {
            id: 1,
            username: "jdoe".into(),
            role,
        })
    }

    #[test]
    fn anonymous_is_redirected() {
        assert_eq!(admin_gate(&Identity::Anonymous).unwrap_err(), Denied::Unauthenticated);
    }

    #[test]
    fn plain_user_is_forbidden() {
        assert_eq!(admin_gate(&user(Role::User)).unwrap_err(), Denied::Forbidden);
    }

    #[test]
    fn admin_proceeds() {
        let admin = admin_gate(&user(Role::Admin)).unwrap();
        assert_eq!(admin.username(), "jdoe");
    }

    #[test]
    fn visibility_hides_admin_only_from_non_admins() {
        assert!(can_view(&Identity::Anonymous, false));
        assert!(!can_view(&Identity::Anonymous, true));
        assert!(!can_view(&user(Role::User), true));
        assert!(can_view(&user(Role::Admin), true));
    }

    #[test]
    fn denied_maps_to_app_errors() {
        assert!(matches!(AppError::from(Denied::Unauthenticated), AppError::Unauthenticated));
        assert!(matches!(AppError::from(Denied::Forbidden), AppError::PermissionDenied(_)));
    }
}
