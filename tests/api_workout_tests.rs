// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout timer routes, driven through the full router.
//!
//! The database is offline, so saves that reach the store fail; the session
//! must survive those failures intact.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use nutrifit_tracker::config::Config;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

mod common;
use common::{bearer_for, create_test_app, create_test_app_with_config, run_for};

async fn send(
    app: &Router,
    user: &str,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer_for(user));
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn test_no_session_is_idle() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, "user-1", Method::GET, "/api/workout", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "idle");
    assert_eq!(body["activity"], Value::Null);
    assert_eq!(body["display"], "00:00");
}

#[tokio::test]
async fn test_select_opens_session() {
    let (app, state) = create_test_app();

    let (status, body) = send(
        &app,
        "user-1",
        Method::POST,
        "/api/workout/select",
        Some(json!({ "activity": "cycling" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "selected");
    assert_eq!(body["activity"], "cycling");
    assert_eq!(body["elapsed_seconds"], 0);
    assert_eq!(state.sessions.len(), 1);
}

#[tokio::test]
async fn test_unknown_activity_rejected() {
    let (app, state) = create_test_app();

    let (status, _) = send(
        &app,
        "user-1",
        Method::POST,
        "/api/workout/select",
        Some(json!({ "activity": "skydiving" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(state.sessions.is_empty());
}

#[tokio::test]
async fn test_toggle_without_session() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, "user-1", Method::POST, "/api/workout/toggle", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_save_zero_duration_is_validation_error() {
    let (app, _) = create_test_app();
    send(
        &app,
        "user-1",
        Method::POST,
        "/api/workout/select",
        Some(json!({ "activity": "run" })),
    )
    .await;

    let (status, body) = send(&app, "user-1", Method::POST, "/api/workout/save", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"], "zero duration");
}

#[tokio::test(start_paused = true)]
async fn test_timer_runs_pauses_and_resets() {
    let (app, _) = create_test_app();
    send(
        &app,
        "user-1",
        Method::POST,
        "/api/workout/select",
        Some(json!({ "activity": "yoga" })),
    )
    .await;

    let (_, body) = send(&app, "user-1", Method::POST, "/api/workout/toggle", None).await;
    assert_eq!(body["state"], "running");
    assert_eq!(body["running"], true);

    run_for(75).await;

    let (_, body) = send(&app, "user-1", Method::POST, "/api/workout/toggle", None).await;
    assert_eq!(body["state"], "paused");
    assert_eq!(body["elapsed_seconds"], 75);
    assert_eq!(body["display"], "01:15");

    let (_, body) = send(&app, "user-1", Method::POST, "/api/workout/reset", None).await;
    assert_eq!(body["state"], "selected");
    assert_eq!(body["activity"], "yoga");
    assert_eq!(body["elapsed_seconds"], 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_save_keeps_session() {
    let (app, state) = create_test_app();
    send(
        &app,
        "user-1",
        Method::POST,
        "/api/workout/select",
        Some(json!({ "activity": "walk" })),
    )
    .await;
    send(&app, "user-1", Method::POST, "/api/workout/toggle", None).await;
    run_for(3).await;
    send(&app, "user-1", Method::POST, "/api/workout/toggle", None).await;

    let (status, body) = send(&app, "user-1", Method::POST, "/api/workout/save", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");

    let (_, body) = send(&app, "user-1", Method::GET, "/api/workout", None).await;
    assert_eq!(body["state"], "paused");
    assert_eq!(body["activity"], "walk");
    assert_eq!(body["elapsed_seconds"], 3);
    assert_eq!(state.sessions.len(), 1);
}

#[tokio::test]
async fn test_sessions_are_per_user() {
    let (app, _) = create_test_app();
    send(
        &app,
        "alice",
        Method::POST,
        "/api/workout/select",
        Some(json!({ "activity": "swimming" })),
    )
    .await;

    let (_, body) = send(&app, "bob", Method::GET, "/api/workout", None).await;
    assert_eq!(body["state"], "idle");

    let (status, _) = send(&app, "bob", Method::POST, "/api/workout/toggle", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "alice", Method::GET, "/api/workout", None).await;
    assert_eq!(body["activity"], "swimming");
}

#[tokio::test]
async fn test_dismiss_discards_session() {
    let (app, state) = create_test_app();
    send(
        &app,
        "user-1",
        Method::POST,
        "/api/workout/select",
        Some(json!({ "activity": "strength" })),
    )
    .await;

    let (status, _) = send(&app, "user-1", Method::DELETE, "/api/workout", None).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(state.sessions.is_empty());
    let (_, body) = send(&app, "user-1", Method::GET, "/api/workout", None).await;
    assert_eq!(body["state"], "idle");
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_sessions_are_swept() {
    let mut config = Config::test_default();
    config.session_idle_ttl = Duration::from_secs(600);
    let (app, state) = create_test_app_with_config(config);
    let sweeper = state.spawn_session_sweeper();

    for i in 0..50 {
        let user = format!("user-{i}");
        send(
            &app,
            &user,
            Method::POST,
            "/api/workout/select",
            Some(json!({ "activity": "cycling" })),
        )
        .await;
        let (status, _) = send(&app, &user, Method::POST, "/api/workout/toggle", None).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(state.sessions.len(), 50);

    // Nobody comes back; the running timers must not pin their sessions
    run_for(700).await;

    assert!(state.sessions.is_empty());
    let (_, body) = send(&app, "user-0", Method::GET, "/api/workout", None).await;
    assert_eq!(body["state"], "idle");
    assert_eq!(body["elapsed_seconds"], 0);

    sweeper.abort();
}

#[tokio::test(start_paused = true)]
async fn test_active_session_survives_sweep() {
    let mut config = Config::test_default();
    config.session_idle_ttl = Duration::from_secs(600);
    let (app, state) = create_test_app_with_config(config);
    let sweeper = state.spawn_session_sweeper();

    send(
        &app,
        "user-1",
        Method::POST,
        "/api/workout/select",
        Some(json!({ "activity": "walk" })),
    )
    .await;
    send(&app, "user-1", Method::POST, "/api/workout/toggle", None).await;

    // Polled every five minutes, so never idle for the TTL
    for _ in 0..3 {
        run_for(300).await;
        let (_, body) = send(&app, "user-1", Method::GET, "/api/workout", None).await;
        assert_eq!(body["state"], "running");
    }
    assert_eq!(state.sessions.len(), 1);

    sweeper.abort();
}

#[tokio::test]
async fn test_activity_catalog() {
    let (app, _) = create_test_app();

    let (status, body) = send(&app, "user-1", Method::GET, "/api/workout/activities", None).await;

    assert_eq!(status, StatusCode::OK);
    let activities = body.as_array().unwrap();
    assert_eq!(activities.len(), 6);

    let run = activities
        .iter()
        .find(|a| a["activity"] == "run")
        .unwrap();
    assert_eq!(run["goal_names"], json!(["run", "treadmill"]));
    assert_eq!(run["pace_kmh"], 8.0);
    assert_eq!(run["unit"], "km");

    let yoga = activities
        .iter()
        .find(|a| a["activity"] == "yoga")
        .unwrap();
    assert_eq!(yoga["goal_names"], json!(["yoga", "stretch", "meditate"]));
    assert_eq!(yoga["pace_kmh"], Value::Null);
    assert_eq!(yoga["unit"], "min");
}
