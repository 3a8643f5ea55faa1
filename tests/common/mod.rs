use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bostad::{build_app, db::MemoryStore, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// App over an in-process store and a two-listing feed.
#[allow(dead_code)]
pub fn test_app() -> (Router, Arc<MemoryStore>) {
    let listings = json!([
        { "AnnonsId": 101, "Gatuadress": "Hornsgatan 1" },
        { "AnnonsId": 102, "Gatuadress": "Götgatan 2" }
    ]);
    let (state, store) = AppState::fake(listings).expect("fake state");
    (build_app(state), store)
}

/// Sends one request and returns status plus parsed JSON body (`Null` when empty).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, token);
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Registers a user and returns `(userId, accessToken)`.
#[allow(dead_code)]
pub async fn signup(app: &Router, username: &str, email: &str, password: &str) -> (String, String) {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        None,
        Some(json!({ "username": username, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    (
        body["userId"].as_str().unwrap().to_string(),
        body["accessToken"].as_str().unwrap().to_string(),
    )
}
