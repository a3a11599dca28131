// Template context structures for Askama templates, organized by page area.

use actix_session::Session;
use sqlx::SqlitePool;

use crate::auth::csrf;
use crate::auth::gate::{Identity, SessionUser};
use crate::auth::session::{resolve_identity, take_flash};
use crate::config::{AppConfig, SiteInfo};
use crate::errors::AppError;

/// Common context shared by all pages.
/// Templates access these as `ctx.site`, `ctx.flash`, etc.
pub struct PageContext {
    pub site: SiteInfo,
    pub identity: Identity,
    pub flash: Option<String>,
    pub csrf_token: String,
}

impl PageContext {
    pub async fn build(
        session: &Session,
        pool: &SqlitePool,
        config: &AppConfig,
    ) -> Result<Self, AppError> {
        let identity = resolve_identity(session, pool).await?;
        Ok(Self::with_identity(session, config, identity))
    }

    /// For handlers that already resolved the identity.
    pub fn with_identity(session: &Session, config: &AppConfig, identity: Identity) -> Self {
        Self {
            site: config.site.clone(),
            identity,
            flash: take_flash(session),
            csrf_token: csrf::get_or_create_token(session),
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.identity.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.identity.is_admin()
    }

    pub fn username(&self) -> &str {
        self.user().map(|u| u.username.as_str()).unwrap_or("")
    }
}

mod account;
mod meeting;

pub use self::account::{
    AccountTemplate, LoginTemplate, SignUpTemplate, TotpSetupTemplate, VerifyTwoFactorTemplate,
};
pub use self::meeting::{
    CodeTemplate, DashboardTemplate, EventTemplate, EventsTemplate, IndexTemplate,
};
