pub mod auth;
pub mod error;
pub mod messages;
pub mod register;

use axum::{
    Router,
    response::Html,
    routing::{get, post},
};

pub use auth::{AppState, AppStateInner, AuthenticatedUser};
pub use error::ApiError;

/// The full HTTP surface. Authentication is a precondition expressed in
/// the protected handlers' signatures (the `AuthenticatedUser`
/// extractor), not a router-wide layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/register", post(register::register))
        .route("/me", get(auth::me))
        .route("/messages", post(messages::post_message))
        .route("/messages", get(messages::list_messages))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
