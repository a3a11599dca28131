//! Process configuration, read once from the environment at startup.
//!
//! `main` calls [`AppConfig::from_env`] after loading `.env` and shares the
//! result as `web::Data<AppConfig>`. Handlers receive it by injection and
//! never consult `std::env` themselves.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value for {key}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Organization details shown in page footers.
#[derive(Debug, Clone, Default)]
pub struct SiteInfo {
    pub organization: String,
    pub contact_email: String,
    pub meeting_location: String,
    pub source_url: String,
}

/// Sign-up username policy.
#[derive(Debug, Clone, Default)]
pub struct UsernamePolicy {
    pub enforce: bool,
    pub email_domain: String,
}

impl UsernamePolicy {
    /// Returns an error message when `username` violates the policy.
    pub fn check(&self, username: &str) -> Option<String> {
        if self.enforce && !username.ends_with(&self.email_domain) {
            return Some(format!(
                "User creation failed. Username must end with {}.",
                self.email_domain
            ));
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub session_key: Option<String>,
    pub upload_dir: PathBuf,
    pub site: SiteInfo,
    pub usernames: UsernamePolicy,
    pub totp_issuer: String,
    pub pending_ttl: Duration,
    pub bootstrap_admin: Option<(String, String)>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let organization = "Meeting Records".to_string();
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_url: "sqlite://data/app.db".to_string(),
            session_key: None,
            upload_dir: PathBuf::from("data/uploads"),
            totp_issuer: format!("Meeting Records - {organization}"),
            site: SiteInfo {
                organization,
                ..SiteInfo::default()
            },
            usernames: UsernamePolicy::default(),
            pending_ttl: Duration::from_secs(300),
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let organization = get("ORGANIZATION_NAME").unwrap_or(defaults.site.organization);
        let totp_issuer = get("TOTP_ISSUER_NAME")
            .unwrap_or_else(|| format!("Meeting Records - {organization}"));

        let pending_ttl = match get("PENDING_2FA_TTL_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    key: "PENDING_2FA_TTL_SECS",
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.pending_ttl,
        };

        let enforce = match get("ENFORCE_USERNAMES") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "ENFORCE_USERNAMES",
                        value: raw,
                    });
                }
            },
            None => false,
        };

        let bootstrap_admin = match (
            get("BOOTSTRAP_ADMIN_USERNAME"),
            get("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            session_key: get("SESSION_KEY"),
            upload_dir: get("UPLOAD_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            site: SiteInfo {
                organization,
                contact_email: get("CONTACT_EMAIL").unwrap_or_default(),
                meeting_location: get("MEETING_LOCATION").unwrap_or_default(),
                source_url: get("GITHUB_SOURCE").unwrap_or_default(),
            },
            usernames: UsernamePolicy {
                enforce,
                email_domain: get("USERNAME_EMAIL_DOMAIN").unwrap_or_default(),
            },
            totp_issuer,
            pending_ttl,
            bootstrap_admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.pending_ttl, Duration::from_secs(300));
        assert!(!cfg.usernames.enforce);
        assert!(cfg.bootstrap_admin.is_none());
        assert_eq!(cfg.totp_issuer, "Meeting Records - Meeting Records");
    }

    #[test]
    fn reads_organization_and_policy() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("ORGANIZATION_NAME", "ACM at UDayton"),
            ("ENFORCE_USERNAMES", "True"),
            ("USERNAME_EMAIL_DOMAIN", "@udayton.edu"),
        ]))
        .unwrap();
        assert_eq!(cfg.totp_issuer, "Meeting Records - ACM at UDayton");
        assert!(cfg.usernames.check("jdoe@udayton.edu").is_none());
        assert!(cfg.usernames.check("jdoe@gmail.com").is_some());
    }

    #[test]
    fn rejects_malformed_ttl() {
        let err = AppConfig::from_lookup(lookup(&[("PENDING_2FA_TTL_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("PENDING_2FA_TTL_SECS"));
    }
}
