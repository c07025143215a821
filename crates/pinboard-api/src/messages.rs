use axum::{Json, extract::State, response::IntoResponse};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::json;
use tracing::{error, warn};

use pinboard_db::{StoreError, queries};
use pinboard_types::api::{MessageEntry, MessageListResponse, PostMessageRequest};

use crate::auth::{AppState, AuthenticatedUser};
use crate::error::ApiError;

pub async fn post_message(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(req): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Run the blocking DB insert off the async runtime
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = store.connect()?;
        queries::insert_message(&mut conn, user.id, &req.content)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Connection
    })?
    .map_err(|e| match e {
        StoreError::Connection(e) => {
            error!("database connection failed: {}", e);
            ApiError::Connection
        }
        other => {
            error!("message insert failed: {}", other);
            ApiError::MessagePost
        }
    })?;

    Ok(Json(json!({ "message": "Message posted successfully" })))
}

/// Public feed; the read side deliberately takes no credentials.
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let store = state.store.clone();
    let rows = tokio::task::spawn_blocking(move || {
        let conn = store.connect()?;
        queries::list_messages(&conn)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Connection
    })?
    .map_err(|e| match e {
        StoreError::Connection(e) => {
            error!("database connection failed: {}", e);
            ApiError::Connection
        }
        other => {
            error!("feed query failed: {}", other);
            ApiError::MessageFetch
        }
    })?;

    let messages = rows
        .into_iter()
        .map(|row| MessageEntry {
            id: row.id,
            created_at: row
                .created_at
                .parse::<DateTime<Utc>>()
                .or_else(|_| {
                    // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
                    // timezone. Parse as naive UTC and convert.
                    NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
                        .map(|ndt| ndt.and_utc())
                })
                .unwrap_or_else(|e| {
                    warn!("Corrupt created_at '{}' on message {}: {}", row.created_at, row.id, e);
                    DateTime::default()
                }),
            content: row.content,
            username: row.username,
        })
        .collect();

    Ok(Json(MessageListResponse { messages }))
}
