use askama::Template;

use super::PageContext;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "sign_up.html")]
pub struct SignUpTemplate {
    pub ctx: PageContext,
    pub errors: Vec<String>,
    pub username: String,
}

#[derive(Template)]
#[template(path = "verify_2fa.html")]
pub struct VerifyTwoFactorTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub ctx: PageContext,
    pub joined: String,
    pub graduated: String,
    pub totp_active: bool,
    pub errors: Vec<String>,
}

/// Enrollment page; QR rendering is left to the authenticator app.
#[derive(Template)]
#[template(path = "totp_setup.html")]
pub struct TotpSetupTemplate {
    pub ctx: PageContext,
    pub secret: String,
    pub provisioning_uri: String,
    pub error: Option<String>,
}
