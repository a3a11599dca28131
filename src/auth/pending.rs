//! Server-held pending-authentication tokens.
//!
//! A token is bound to one user and one purpose, expires after a fixed TTL,
//! tolerates a bounded number of wrong codes and is consumed exactly once.
//! The session only carries the opaque token string.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::distr::{Alphanumeric, SampleString};

const TOKEN_LENGTH: usize = 48;
pub const MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Purpose {
    /// Password verified; waiting for the second factor.
    Login,
    /// Enrolling a new TOTP secret; waiting for a first valid code.
    EnrollTotp { secret: String },
}

#[derive(Debug, Clone)]
struct Pending {
    user_id: i64,
    purpose: Purpose,
    expires_at: Instant,
    attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingError {
    /// Unknown, expired, exhausted, or issued to someone else.
    Invalid,
}

#[derive(Clone)]
pub struct PendingLogins {
    entries: Arc<Mutex<HashMap<String, Pending>>>,
    ttl: Duration,
}

impl PendingLogins {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Issue a token. Expired entries are swept on the way.
    pub fn issue(&self, user_id: i64, purpose: Purpose) -> String {
        let token = Alphanumeric.sample_string(&mut rand::rng(), TOKEN_LENGTH);
        let now = Instant::now();
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        map.retain(|_, p| p.expires_at > now);
        map.insert(
            token.clone(),
            Pending {
                user_id,
                purpose,
                expires_at: now + self.ttl,
                attempts: 0,
            },
        );
        token
    }

    /// Look up a live token without consuming it.
    pub fn peek(&self, token: &str) -> Result<(i64, Purpose), PendingError> {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match map.get(token) {
            Some(p) if p.expires_at > Instant::now() && p.attempts < MAX_ATTEMPTS => {
                Ok((p.user_id, p.purpose.clone()))
            }
            Some(_) => {
                map.remove(token);
                Err(PendingError::Invalid)
            }
            None => Err(PendingError::Invalid),
        }
    }

    /// Consume a token after its code verified. A second call fails.
    pub fn consume(&self, token: &str, user_id: i64) -> Result<Purpose, PendingError> {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match map.remove(token) {
            Some(p)
                if p.user_id == user_id
                    && p.expires_at > Instant::now()
                    && p.attempts < MAX_ATTEMPTS =>
            {
                Ok(p.purpose)
            }
            _ => Err(PendingError::Invalid),
        }
    }

    /// Record a wrong code. Returns the attempts left; the token is dropped
    /// once they run out.
    pub fn record_failure(&self, token: &str) -> u32 {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let Some(p) = map.get_mut(token) else {
            return 0;
        };
        p.attempts += 1;
        let left = MAX_ATTEMPTS.saturating_sub(p.attempts);
        if left == 0 {
            map.remove(token);
        }
        left
    }

    pub fn revoke(&self, token: &str) {
        let mut map = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(token);
    }
}
