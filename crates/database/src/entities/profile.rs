//! Profile extension entity definitions

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Joined account and profile row returned to the profile owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    pub id: i64,
    pub user_id: i64,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub social_links: Option<Value>,
    pub preferences: Option<Value>,
    pub created_at: String,
    pub updated_at: String,
    pub full_name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: String,
    pub is_verified: bool,
}

/// Reduced view shown to anonymous visitors. Omits email and preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfileView {
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub social_links: Option<Value>,
    pub created_at: Option<String>,
    pub full_name: String,
    pub avatar: Option<String>,
    pub user_created_at: String,
}

/// Partial profile update.
///
/// The outer `Option` tells whether a field was supplied at all; the inner one
/// carries the new value, where `None` clears the column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub bio: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub social_links: Option<Option<Value>>,
    pub preferences: Option<Option<Value>>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.bio.is_none()
            && self.location.is_none()
            && self.website.is_none()
            && self.social_links.is_none()
            && self.preferences.is_none()
    }
}
