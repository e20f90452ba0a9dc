//! Inputs accepted by the profile store.

use serde_json::Value;

/// Raw partial update as received from a client.
///
/// `None` leaves a field untouched, `Some(None)` clears it. The JSON fields
/// may hold any value here; anything but an object is rejected during
/// validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub bio: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub social_links: Option<Option<Value>>,
    pub preferences: Option<Option<Value>>,
}
