// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: profile, goals and daily diary.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::diary::{today_key, MAX_NUTRIENT_ENTRY_G, MAX_WATER_ENTRY_ML};
use crate::models::{DailyLog, Goal, GoalName, UserProfile};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/profile",
            get(get_profile).post(register_profile).put(update_profile),
        )
        .route("/api/goals", get(list_goals).post(create_goal))
        .route("/api/goals/catalog", get(goal_catalog))
        .route("/api/goals/{goal_id}", delete(delete_goal))
        .route("/api/diary/today", get(get_today))
        .route("/api/diary/water", post(add_water))
        .route("/api/diary/nutrients", post(add_nutrients))
        .route("/api/diary/nutrients/remove", post(remove_nutrients))
}

// ─── Profile ─────────────────────────────────────────────────

fn not_blank(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Registration form, sent once after sign-up at the identity provider.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(max = 50), custom(function = "not_blank"))]
    pub login: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 20), custom(function = "not_blank"))]
    pub birth_date: String,
    #[validate(url)]
    pub profile_picture_url: Option<String>,
}

/// Editable profile fields.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
    #[validate(length(max = 20), custom(function = "not_blank"))]
    pub birth_date: String,
    #[validate(url)]
    pub profile_picture_url: Option<String>,
}

/// Current user profile response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/lib/generated/")
)]
pub struct ProfileResponse {
    pub user_id: String,
    pub name: String,
    pub login: String,
    pub email: String,
    pub birth_date: String,
    pub profile_picture_url: Option<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            user_id: profile.user_id,
            name: profile.name,
            login: profile.login,
            email: profile.email,
            birth_date: profile.birth_date,
            profile_picture_url: profile.profile_picture_url,
        }
    }
}

/// Get current user profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.user_id)))?;

    Ok(Json(profile.into()))
}

/// Create the profile for a newly signed-up user.
async fn register_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>)> {
    req.validate()?;

    if state.db.get_profile(&user.user_id).await?.is_some() {
        return Err(AppError::Conflict("Profile already registered".to_string()));
    }

    let profile = UserProfile {
        user_id: user.user_id.clone(),
        name: req.name.trim().to_string(),
        login: req.login.trim().to_string(),
        email: req.email.trim().to_string(),
        birth_date: req.birth_date.trim().to_string(),
        profile_picture_url: req.profile_picture_url,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    state.db.upsert_profile(&profile).await?;

    tracing::info!(user_id = %user.user_id, "Profile registered");
    Ok((StatusCode::CREATED, Json(profile.into())))
}

/// Update name, birth date and picture.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    req.validate()?;

    // Fetch-modify-write to preserve the other fields
    let mut profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.user_id)))?;

    profile.name = req.name.trim().to_string();
    profile.birth_date = req.birth_date.trim().to_string();
    profile.profile_picture_url = req.profile_picture_url;
    state.db.upsert_profile(&profile).await?;

    tracing::debug!(user_id = %user.user_id, "Profile updated");
    Ok(Json(profile.into()))
}

// ─── Goals ───────────────────────────────────────────────────

/// Goal as shown to the user.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/lib/generated/")
)]
pub struct GoalResponse {
    pub id: String,
    pub goal_name: GoalName,
    pub label: String,
    pub progress: f64,
    pub target: f64,
    pub unit: String,
    /// Fraction of the target reached (0.0 - 1.0)
    pub completion: f64,
}

impl GoalResponse {
    /// Build the view; the water goal reports today's intake instead of
    /// its stored progress.
    fn from_goal(mut goal: Goal, today: &DailyLog) -> Self {
        if goal.goal_name == GoalName::DrinkWater {
            goal.progress = today.water_litres();
        }
        let completion = goal.completion();
        Self {
            id: goal.id,
            label: goal.goal_name.to_string(),
            goal_name: goal.goal_name,
            progress: goal.progress,
            target: goal.target,
            unit: goal.unit,
            completion,
        }
    }
}

/// List the user's goals.
async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<GoalResponse>>> {
    let date = today_key();
    let (goals, today) = futures_util::future::try_join(
        state.db.list_goals(&user.user_id),
        state.db.get_daily_log(&user.user_id, &date),
    )
    .await?;
    let today = today.unwrap_or_default();

    tracing::debug!(user_id = %user.user_id, count = goals.len(), "Fetched goals");

    Ok(Json(
        goals
            .into_iter()
            .map(|g| GoalResponse::from_goal(g, &today))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub goal_name: GoalName,
}

/// Add a goal from the catalog with its default target.
async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<GoalResponse>)> {
    let goal_id = Goal::document_id(&user.user_id, req.goal_name);
    if state.db.get_goal(&goal_id).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Goal {} already exists",
            req.goal_name
        )));
    }

    let goal = Goal::new(&user.user_id, req.goal_name, &chrono::Utc::now().to_rfc3339());
    state.db.create_goal(&goal).await?;

    tracing::info!(user_id = %user.user_id, goal = %req.goal_name, "Goal created");
    Ok((
        StatusCode::CREATED,
        Json(GoalResponse::from_goal(goal, &DailyLog::default())),
    ))
}

/// Remove one of the user's goals.
async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(goal_id): Path<String>,
) -> Result<StatusCode> {
    let owned = state
        .db
        .get_goal(&goal_id)
        .await?
        .is_some_and(|g| g.user_id == user.user_id);
    if !owned {
        return Err(AppError::NotFound(format!("Goal {} not found", goal_id)));
    }

    state.db.delete_goal(&goal_id).await?;

    tracing::info!(user_id = %user.user_id, goal_id = %goal_id, "Goal deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Catalog entry with creation defaults.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/lib/generated/")
)]
pub struct CatalogEntry {
    pub goal_name: GoalName,
    pub label: String,
    pub target: f64,
    pub unit: String,
}

async fn goal_catalog() -> Json<Vec<CatalogEntry>> {
    Json(
        GoalName::ALL
            .iter()
            .map(|&goal_name| {
                let (target, unit) = goal_name.default_target();
                CatalogEntry {
                    goal_name,
                    label: goal_name.to_string(),
                    target,
                    unit: unit.to_string(),
                }
            })
            .collect(),
    )
}

// ─── Diary ───────────────────────────────────────────────────

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/lib/generated/")
)]
pub struct DiaryResponse {
    /// Day (`YYYY-MM-DD`, UTC)
    pub date: String,
    pub water_ml: f64,
    pub water_litres: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
}

impl DiaryResponse {
    fn new(date: String, log: &DailyLog) -> Self {
        Self {
            date,
            water_ml: log.water_ml,
            water_litres: log.water_litres(),
            protein_g: log.protein_g,
            carbs_g: log.carbs_g,
        }
    }
}

/// Get today's diary.
async fn get_today(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DiaryResponse>> {
    let date = today_key();
    let log = state
        .db
        .get_daily_log(&user.user_id, &date)
        .await?
        .unwrap_or_default();

    Ok(Json(DiaryResponse::new(date, &log)))
}

#[derive(Debug, Deserialize)]
pub struct AddWaterRequest {
    /// Amount drunk, in millilitres
    pub ml: f64,
}

/// Reject non-positive, non-finite or implausibly large entries.
fn validate_water_ml(ml: f64) -> Result<()> {
    if ml > 0.0 && ml <= MAX_WATER_ENTRY_ML {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "ml must be greater than 0 and at most {}",
            MAX_WATER_ENTRY_ML
        )))
    }
}

/// Log water drunk today.
async fn add_water(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AddWaterRequest>,
) -> Result<Json<DiaryResponse>> {
    validate_water_ml(req.ml)?;

    let date = today_key();
    let log = state.db.add_water(&user.user_id, &date, req.ml).await?;

    Ok(Json(DiaryResponse::new(date, &log)))
}

/// Grams of protein and carbohydrates in one diary entry.
#[derive(Debug, Deserialize, Validate)]
pub struct NutrientsRequest {
    #[validate(range(min = 0.0, max = MAX_NUTRIENT_ENTRY_G))]
    #[serde(default)]
    pub protein_g: f64,
    #[validate(range(min = 0.0, max = MAX_NUTRIENT_ENTRY_G))]
    #[serde(default)]
    pub carbs_g: f64,
}

impl NutrientsRequest {
    fn validated(self) -> Result<Self> {
        self.validate()?;
        if self.protein_g == 0.0 && self.carbs_g == 0.0 {
            return Err(AppError::Validation(
                "protein_g or carbs_g must be greater than 0".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Log protein and carbohydrates eaten today.
async fn add_nutrients(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<NutrientsRequest>,
) -> Result<Json<DiaryResponse>> {
    let req = req.validated()?;

    let date = today_key();
    let log = state
        .db
        .adjust_nutrients(&user.user_id, &date, req.protein_g, req.carbs_g)
        .await?;

    Ok(Json(DiaryResponse::new(date, &log)))
}

/// Take back nutrients logged today; totals stop at zero.
async fn remove_nutrients(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<NutrientsRequest>,
) -> Result<Json<DiaryResponse>> {
    let req = req.validated()?;

    let date = today_key();
    let log = state
        .db
        .adjust_nutrients(&user.user_id, &date, -req.protein_g, -req.carbs_g)
        .await?;

    Ok(Json(DiaryResponse::new(date, &log)))
}
