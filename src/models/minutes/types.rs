use serde::Serialize;
use std::fmt;

/// Ordered, duplicate-free list of usernames that have edited an entry.
///
/// Stored as a `", "`-joined string. Membership is exact per name, so
/// `"ann"` is not considered present in `"joanne"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contributors(Vec<String>);

impl Contributors {
    pub fn parse(stored: &str) -> Self {
        let mut list = Contributors::default();
        for name in stored.split(',') {
            list.push(name);
        }
        list
    }

    pub fn contains(&self, username: &str) -> bool {
        self.0.iter().any(|n| n == username.trim())
    }

    /// Append `username` unless it is already a member. Returns whether it
    /// was appended.
    pub fn push(&mut self, username: &str) -> bool {
        let name = username.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.0.push(name.to_string());
        true
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Contributors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// One minutes entry for a meeting.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MinutesEntry {
    pub id: i64,
    pub notes: String,
    #[serde(rename = "username_by")]
    pub contributors: String,
    #[serde(rename = "meeting")]
    pub meeting_id: i64,
}
