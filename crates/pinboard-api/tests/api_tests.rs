//! End-to-end tests for the board API.
//!
//! Each test drives the real router with tower's `oneshot` against its
//! own temp-file store, so nothing is shared between tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use serde_json::{Value, json};
use tower::ServiceExt;

use pinboard_api::{AppStateInner, router};
use pinboard_db::{Store, StoreConfig};

fn test_app() -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(StoreConfig {
        path: dir.path().join("board.db"),
    })
    .unwrap();
    let app = router(Arc::new(AppStateInner { store }));
    (dir, app)
}

fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", B64.encode(format!("{}:{}", username, password)))
}

async fn register(app: &Router, username: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "username": username, "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn register_twice_rejects_duplicate() {
    let (_dir, app) = test_app();

    let first = register(&app, "alice", "hunter2").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(
        body_json(first).await["message"],
        "User registered successfully"
    );

    // Same username, different password: still a duplicate.
    let second = register(&app, "alice", "something-else").await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(second).await["detail"], "Username already exists");
}

#[tokio::test]
async fn post_then_list_includes_author() {
    let (_dir, app) = test_app();
    register(&app, "alice", "hunter2").await;

    let posted = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/messages")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, basic_auth("alice", "hunter2"))
                .body(Body::from(json!({ "content": "hello board" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(posted.status(), StatusCode::OK);
    assert_eq!(
        body_json(posted).await["message"],
        "Message posted successfully"
    );

    // The feed is public, so no credentials on the read.
    let listed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/messages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);

    let feed = body_json(listed).await;
    let messages = feed["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["username"], "alice");
    assert_eq!(messages[0]["content"], "hello board");
}

#[tokio::test]
async fn bad_credentials_all_look_the_same() {
    let (_dir, app) = test_app();
    register(&app, "alice", "hunter2").await;

    let me = |auth: String| {
        let app = app.clone();
        async move {
            app.oneshot(
                Request::builder()
                    .uri("/me")
                    .header(header::AUTHORIZATION, auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        }
    };

    let wrong_password = me(basic_auth("alice", "wrong")).await;
    let unknown_user = me(basic_auth("mallory", "hunter2")).await;

    for response in [wrong_password, unknown_user] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic"
        );
        assert_eq!(
            body_json(response).await["detail"],
            "Incorrect username or password"
        );
    }
}

#[tokio::test]
async fn me_returns_stored_identity() {
    let (_dir, app) = test_app();
    register(&app, "alice", "hunter2").await;
    register(&app, "bob", "swordfish").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::AUTHORIZATION, basic_auth("bob", "swordfish"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["username"], "bob");
    // Second registered user on a fresh database.
    assert_eq!(body["user_id"], 2);
}

#[tokio::test]
async fn feed_and_index_need_no_credentials() {
    let (_dir, app) = test_app();

    let feed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/messages")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(feed.status(), StatusCode::OK);
    assert_eq!(body_json(feed).await["messages"], json!([]));

    let index = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    let content_type = index.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
}

#[tokio::test]
async fn posting_without_credentials_is_unauthorized() {
    let (_dir, app) = test_app();
    register(&app, "alice", "hunter2").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/messages")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "content": "anonymous" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic"
    );
}
