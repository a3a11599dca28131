use serde::Serialize;

/// One check-in. `(username, meeting_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Attendee {
    pub id: i64,
    pub username: String,
    #[serde(rename = "meeting")]
    pub meeting_id: i64,
}
