use std::sync::Arc;

use axum::{Json, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use tracing::error;

use pinboard_db::{Store, queries};
use pinboard_types::api::MeResponse;
use pinboard_types::models::User;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Store,
}

/// Compared against when the username doesn't exist, so unknown users
/// cost the same as wrong passwords.
const DUMMY_PASSWORD: &[u8] = b"pinboard-missing-user-filler";

/// The current user, resolved from Basic credentials. Evaluated fresh
/// on every request a protected handler names it in; never cached.
pub struct AuthenticatedUser(pub User);

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let TypedHeader(Authorization(creds)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Authentication)?;

        // Run the blocking lookup off the async runtime
        let store = state.store.clone();
        let username = creds.username().to_owned();
        let row = tokio::task::spawn_blocking(move || {
            let conn = store.connect()?;
            queries::user_by_username(&conn, &username)
        })
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Connection
        })?
        .map_err(|e| {
            // A storage failure here is not a credential problem.
            error!("credential lookup failed: {}", e);
            ApiError::Connection
        })?;

        match row {
            Some(user) if constant_time_eq(creds.password().as_bytes(), user.password.as_bytes()) => {
                Ok(AuthenticatedUser(User {
                    id: user.id,
                    username: user.username,
                }))
            }
            Some(_) => Err(ApiError::Authentication),
            None => {
                let _ = constant_time_eq(creds.password().as_bytes(), DUMMY_PASSWORD);
                Err(ApiError::Authentication)
            }
        }
    }
}

/// Pure read of the identity the verifier already resolved.
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse {
        username: user.username,
        user_id: user.id,
    })
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
