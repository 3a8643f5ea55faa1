//! Connectivity gate, the listings proxy and the outer app layers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use bostad::{
    app::ENDPOINTS,
    build_app,
    config::AppConfig,
    error::AppError,
    listings::client::{ListingsFeed, StaticListingsFeed},
    AppState,
};
use serde_json::{json, Value};

mod common;
use common::{send, signup, test_app};

#[tokio::test]
async fn store_down_answers_503_on_public_and_protected_routes() {
    let (app, store) = test_app();
    let (user_id, token) = signup(&app, "alice", "a@example.com", "secret").await;
    store.set_ready(false);

    let requests: Vec<(Method, String, Option<&str>, Option<Value>)> = vec![
        (Method::GET, "/".into(), None, None),
        (Method::GET, "/list".into(), None, None),
        (
            Method::POST,
            "/users".into(),
            None,
            Some(json!({ "username": "bob", "email": "b@example.com", "password": "secret" })),
        ),
        (Method::POST, "/sessions".into(), None, Some(json!({ "email": "a@example.com", "password": "secret" }))),
        (Method::GET, format!("/users/{user_id}"), Some(&token), None),
        // an invalid token must still see 503, not loggedOut
        (Method::GET, "/getData".into(), Some("bogus"), None),
        (Method::POST, "/saveData".into(), None, Some(json!({ "annonsId": 1 }))),
    ];

    for (method, uri, token, body) in requests {
        let (status, resp) = send(&app, method.clone(), &uri, token, body).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{method} {uri}");
        assert_eq!(resp["error"], "Service unavailable");
        assert!(resp.get("loggedOut").is_none());
    }

    store.set_ready(true);
    let (status, _) = send(&app, Method::GET, "/getData", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_is_ok_while_store_is_ready() {
    let (app, _) = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn list_proxies_feed_array() {
    let (app, _) = test_app();
    let (status, body) = send(&app, Method::GET, "/list", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["AnnonsId"], 101);
}

#[tokio::test]
async fn list_passes_upstream_failure_through() {
    let (state, _) = AppState::fake(json!([])).unwrap();
    let state = AppState {
        listings: Arc::new(StaticListingsFeed::failing(StatusCode::SERVICE_UNAVAILABLE)),
        ..state
    };
    let app = build_app(state);
    let (status, body) = send(&app, Method::GET, "/list", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "upstream");
}

#[tokio::test]
async fn malformed_feed_is_a_bad_gateway() {
    let (state, _) = AppState::fake(json!({ "not": "an array" })).unwrap();
    let app = build_app(state);
    let (status, body) = send(&app, Method::GET, "/list", None, None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "upstream");
}

/// Feed that answers long after any sane request timeout.
struct SlowFeed;

#[async_trait]
impl ListingsFeed for SlowFeed {
    async fn fetch_all(&self) -> Result<Vec<Value>, AppError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn timed_out_request_gets_json_error() {
    let (state, _) = AppState::fake(json!([])).unwrap();
    let config = AppConfig {
        request_timeout_secs: 1,
        ..(*state.config).clone()
    };
    let state = AppState {
        listings: Arc::new(SlowFeed),
        config: Arc::new(config),
        ..state
    };
    let app = build_app(state);

    let (status, body) = send(&app, Method::GET, "/list", None, None).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["kind"], "timeout");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn every_listed_endpoint_is_routed() {
    let (app, _) = test_app();
    let (user_id, token) = signup(&app, "alice", "a@example.com", "secret").await;

    for endpoint in ENDPOINTS {
        for name in endpoint.methods {
            let method: Method = name.parse().unwrap();
            let uri = endpoint
                .path
                .replace(":id", &user_id)
                .replace(":annonsId", "7");
            let body = match (*name, endpoint.path) {
                ("POST", "/users") => Some(
                    json!({ "username": "bob", "email": "b@example.com", "password": "secret" }),
                ),
                ("POST", "/sessions") => {
                    Some(json!({ "email": "a@example.com", "password": "secret" }))
                }
                ("POST", "/saveData") => Some(json!({ "annonsId": 8 })),
                _ => None,
            };
            let (status, resp) = send(&app, method, &uri, Some(&token), body).await;
            assert!(
                status.is_success(),
                "{name} {} answered {status}: {resp}",
                endpoint.path
            );
        }
    }
}
