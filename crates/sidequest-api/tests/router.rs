use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sidequest_api::{build_router, config::Config, state::AppState};
use sidequest_bus::spawn_context;
use sidequest_capture::{MemoryPage, Observer};
use sidequest_persist::PersistClient;
use std::sync::Arc;
use tower::ServiceExt;

async fn test_state() -> Arc<AppState> {
    let persist = PersistClient::builder().memory().build().await.unwrap();
    Arc::new(AppState::new(Config::default(), persist))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn bookmark(app: &Router, question: &str, answer: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/requests",
        Some(json!({"type": "bookmark", "provider": "gemini", "question": question, "answer": answer})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    body["threadId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = build_router(test_state().await);
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["storage"], "available");
    assert_eq!(body["services"]["observers"], "0");
}

#[tokio::test]
async fn test_capture_without_observer_is_unavailable() {
    let app = build_router(test_state().await);
    let (status, body) = send(&app, Method::POST, "/capture-latest", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "no-active-target");
}

#[tokio::test]
async fn test_capture_through_attached_observer() {
    let state = test_state().await;
    let mut page = MemoryPage::new("https://chatgpt.com/c/1");
    page.push_exchange("What is 2+2?", "4");
    let observer = Observer::new(page, state.service.handle());
    let context = spawn_context("tab-1", Arc::new(observer), &state.bus);
    state.service.observers().attach("tab-1", context.handle()).await;

    let app = build_router(state);
    let (status, body) = send(&app, Method::POST, "/capture-latest", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["via"], "bubble");
    let id = body["threadId"].as_str().unwrap().to_string();

    let (status, thread) = send(&app, Method::GET, &format!("/threads/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["title"], "What is 2+2?");
    assert_eq!(thread["provider"], "chatgpt");

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active_observer"], "tab-1");
}

#[tokio::test]
async fn test_thread_lifecycle() {
    let app = build_router(test_state().await);
    let first = bookmark(&app, "first question", "first answer").await;
    let second = bookmark(&app, "second question", "second answer").await;

    let (status, body) = send(&app, Method::GET, "/threads", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"], json!([second.clone(), first.clone()]));

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/threads/{first}"),
        Some(json!({"title": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/threads/{first}/messages"),
        Some(json!({"role": "assistant", "content": "more"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, thread) = send(&app, Method::GET, &format!("/threads/{first}"), None).await;
    assert_eq!(thread["title"], "Renamed");
    assert_eq!(thread["messages"].as_array().unwrap().len(), 3);

    let (status, _) = send(&app, Method::DELETE, &format!("/threads/{second}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::GET, &format!("/threads/{second}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&second));

    let (status, _) = send(&app, Method::DELETE, "/threads", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, Method::GET, "/threads", None).await;
    assert_eq!(body["order"], json!([]));
}

#[tokio::test]
async fn test_invalid_requests_are_rejected() {
    let app = build_router(test_state().await);
    let id = bookmark(&app, "q", "a").await;

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/threads/{id}"),
        Some(json!({"title": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/threads/{id}/followup"),
        Some(json!({"text": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "empty-text");

    let (status, body) = send(&app, Method::POST, "/jump", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not-found");

    let (status, _) = send(&app, Method::GET, "/page-info", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_bookmark_envelope_fails_in_band() {
    let app = build_router(test_state().await);
    let (status, body) = send(
        &app,
        Method::POST,
        "/requests",
        Some(json!({"type": "bookmark", "question": "", "answer": ""})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": false, "error": "no-bubble"}));
}

#[tokio::test]
async fn test_preferences() {
    let app = build_router(test_state().await);

    let (status, prefs) = send(&app, Method::PUT, "/preferences/panel-width", Some(json!({"width": 100}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["panelWidth"], 280);

    let (status, prefs) = send(&app, Method::PUT, "/preferences/theme", Some(json!({"theme": "dark"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["theme"], "dark");

    // stored even though no page is attached
    let (status, _) = send(&app, Method::POST, "/sidebar/minimize", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, prefs) = send(&app, Method::GET, "/preferences", None).await;
    assert_eq!(prefs["sidebarMinimized"], true);
    assert_eq!(prefs["theme"], "dark");
}
