// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Goals (per-user targets and progress)
//! - Daily logs (water, protein and carbohydrates per day)

use crate::db::{collections, GoalStore};
use crate::error::AppError;
use crate::models::{DailyLog, Goal, GoalName, UserProfile};
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator accepts any token, so skip loading real credentials.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a user profile by user ID.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user profile.
    pub async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Goal Operations ─────────────────────────────────────────

    /// Get all goals for a user, in catalog order.
    pub async fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>, AppError> {
        let user_id = user_id.to_string();
        let mut goals: Vec<Goal> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::GOALS)
            .filter(move |q| q.field("user_id").eq(user_id.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        goals.sort_by_key(|g| GoalName::ALL.iter().position(|n| *n == g.goal_name));
        Ok(goals)
    }

    /// Get a goal by document ID.
    pub async fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GOALS)
            .obj()
            .one(goal_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new goal. Fails with `Conflict` if the document already exists.
    pub async fn create_goal(&self, goal: &Goal) -> Result<(), AppError> {
        let _: Goal = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::GOALS)
            .document_id(&goal.id)
            .object(goal)
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataConflictError(_) => {
                    AppError::Conflict(format!("Goal {} already exists", goal.goal_name))
                }
                other => AppError::Database(other.to_string()),
            })?;
        Ok(())
    }

    /// Delete a goal document.
    pub async fn delete_goal(&self, goal_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::GOALS)
            .document_id(goal_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Daily Log Operations ────────────────────────────────────

    /// Get the diary document for a user and day (`YYYY-MM-DD`).
    pub async fn get_daily_log(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Option<DailyLog>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DAILY_LOGS)
            .obj()
            .one(&DailyLog::document_id(user_id, date))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Atomically add water to a day's log, creating it if needed.
    ///
    /// Returns the log as read back after the commit, so it may include
    /// concurrent entries.
    pub async fn add_water(
        &self,
        user_id: &str,
        date: &str,
        water_ml: f64,
    ) -> Result<DailyLog, AppError> {
        let client = self.get_client()?;
        let doc_id = DailyLog::document_id(user_id, date);

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::DAILY_LOGS)
            .document_id(&doc_id)
            .transforms(|t| t.fields([t.field("water_ml").increment(water_ml)]))
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(e.to_string()))?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        let log = self
            .get_daily_log(user_id, date)
            .await?
            .unwrap_or_default();

        tracing::debug!(user_id, date, water_ml, total_ml = log.water_ml, "Water logged");
        Ok(log)
    }

    /// Add (positive) or remove (negative) protein and carbohydrates for a
    /// day. Totals are floored at zero.
    ///
    /// Only the nutrient fields are written, so concurrent water entries are
    /// kept. Two concurrent nutrient edits are last-write-wins.
    pub async fn adjust_nutrients(
        &self,
        user_id: &str,
        date: &str,
        protein_g: f64,
        carbs_g: f64,
    ) -> Result<DailyLog, AppError> {
        let client = self.get_client()?;
        let doc_id = DailyLog::document_id(user_id, date);

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let mut log = self
            .get_daily_log(user_id, date)
            .await?
            .unwrap_or_default();
        log.adjust_nutrients(protein_g, carbs_g);

        client
            .fluent()
            .update()
            .fields(["protein_g", "carbs_g"])
            .in_col(collections::DAILY_LOGS)
            .document_id(&doc_id)
            .object(&log)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add nutrients to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(
            user_id,
            date,
            protein_g = log.protein_g,
            carbs_g = log.carbs_g,
            "Nutrients updated"
        );
        Ok(log)
    }
}

impl GoalStore for FirestoreDb {
    async fn find_goals(&self, user_id: &str, names: &[GoalName]) -> Result<Vec<Goal>, AppError> {
        let user_id = user_id.to_string();
        let keys: Vec<String> = names.iter().map(|n| n.as_key().to_string()).collect();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::GOALS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("goal_name").is_in(keys.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply the increments in a single transaction.
    ///
    /// Each write is a server-side `increment` transform guarded by an
    /// exists precondition, so a goal deleted since the lookup fails the
    /// whole commit instead of being recreated.
    async fn increment_progress(
        &self,
        user_id: &str,
        goal_ids: &[String],
        delta: f64,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for goal_id in goal_ids {
            client
                .fluent()
                .update()
                .in_col(collections::GOALS)
                .precondition(FirestoreWritePrecondition::Exists(true))
                .document_id(goal_id)
                .transforms(|t| t.fields([t.field("progress").increment(delta)]))
                .only_transform()
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add goal {} to transaction: {}",
                        goal_id, e
                    ))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id,
            goals_count = goal_ids.len(),
            delta,
            "Goal progress incremented atomically"
        );

        Ok(())
    }
}
