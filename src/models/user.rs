// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Auth provider user ID (also used as document ID)
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Login handle
    pub login: String,
    /// Email address
    pub email: String,
    /// Birth date as entered by the user
    pub birth_date: String,
    /// Profile picture URL
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    /// When the profile was registered (ISO 8601)
    pub created_at: String,
}
