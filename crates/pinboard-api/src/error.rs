use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Every failure a handler can surface, mapped one-to-one onto a
/// client-facing status and detail string. Underlying storage errors
/// are logged at the classification site and never reach the wire.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database connection failed")]
    Connection,
    #[error("username already exists")]
    DuplicateUser,
    #[error("registration failed")]
    Registration,
    #[error("incorrect username or password")]
    Authentication,
    #[error("failed to post message")]
    MessagePost,
    #[error("failed to fetch messages")]
    MessageFetch,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateUser => StatusCode::BAD_REQUEST,
            ApiError::Authentication => StatusCode::UNAUTHORIZED,
            ApiError::Connection
            | ApiError::Registration
            | ApiError::MessagePost
            | ApiError::MessageFetch => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> &'static str {
        match self {
            ApiError::Connection => "Database connection failed",
            ApiError::DuplicateUser => "Username already exists",
            ApiError::Registration => "Registration failed",
            ApiError::Authentication => "Incorrect username or password",
            ApiError::MessagePost => "Failed to post message",
            ApiError::MessageFetch => "Failed to fetch messages",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "detail": self.detail() }));

        let mut response = (status, body).into_response();
        if matches!(self, ApiError::Authentication) {
            // Challenge the client to re-send Basic credentials.
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"));
        }
        response
    }
}
