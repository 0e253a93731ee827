// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use nutrifit_tracker::error::AppError;
use nutrifit_tracker::models::GoalName;
use nutrifit_tracker::services::{TrackerError, ValidationError};
use serde_json::Value;

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED, "unauthorized"),
        (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "not_found"),
        (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "bad_request"),
        (AppError::Validation("x".into()), StatusCode::BAD_REQUEST, "validation_error"),
        (AppError::Conflict("x".into()), StatusCode::CONFLICT, "conflict"),
        (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
    ];

    for (err, status, code) in cases {
        let (actual, body) = render(err).await;
        assert_eq!(actual, status);
        assert_eq!(body["error"], code);
    }
}

#[tokio::test]
async fn test_database_details_not_leaked() {
    let (_, body) = render(AppError::Database("connection string secret".into())).await;
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_validation_error_maps_to_bad_request() {
    let err: AppError = TrackerError::from(ValidationError::NoActiveSession).into();
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "no active session");
}

#[tokio::test]
async fn test_no_matching_goal_lists_candidates() {
    let err: AppError = TrackerError::NoMatchingGoal {
        goal_names: vec![GoalName::Yoga, GoalName::Stretch, GoalName::Meditate],
    }
    .into();
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "goal_required");
    assert_eq!(body["details"], "Create one of: Yoga, Stretch, Meditate");
}

#[tokio::test]
async fn test_persistence_failure_is_database_error() {
    let err: AppError = TrackerError::Persistence("commit failed".into()).into();
    assert!(matches!(err, AppError::Database(ref msg) if msg == "commit failed"));

    let (status, _) = render(err).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
