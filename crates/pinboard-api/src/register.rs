use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::{error, info};

use pinboard_db::{StoreError, queries};
use pinboard_types::api::RegisterRequest;

use crate::auth::AppState;
use crate::error::ApiError;

/// Uniqueness is left entirely to the storage constraint, so there is
/// no check-then-insert race.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let username = req.username.clone();

    tokio::task::spawn_blocking(move || {
        let mut conn = store.connect()?;
        queries::create_user(&mut conn, &req.username, &req.password)
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
        StoreError::DuplicateUsername => ApiError::DuplicateUser,
        StoreError::Query(e) => {
            error!("registration failed: {}", e);
            ApiError::Registration
        }
    })?;

    info!("registered user {}", username);
    Ok(Json(json!({ "message": "User registered successfully" })))
}
