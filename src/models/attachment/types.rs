use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Attachment {
    pub id: i64,
    pub filename: String,
    pub filepath: String,
    #[serde(rename = "meeting")]
    pub meeting_id: i64,
}
