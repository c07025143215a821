use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Registration --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

// -- Current user --

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub user_id: i64,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageEntry {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub messages: Vec<MessageEntry>,
}
