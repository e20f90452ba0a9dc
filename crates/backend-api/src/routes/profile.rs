use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use nexa_users::{ProfileUpdate, ProfileView, PublicProfileView};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::{routes::auth::MessageResponse, ApiError, AppState};

/// Keeps an explicit `null` apart from an omitted field.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<Object>)]
    pub social_links: Option<Option<Value>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<Option<Value>>,
}

impl UpdateProfileRequest {
    fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            bio: self.bio,
            location: self.location,
            website: self.website,
            social_links: self.social_links,
            preferences: self.preferences,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    #[schema(value_type = Object)]
    pub profile: ProfileView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdatedProfileResponse {
    pub message: String,
    #[schema(value_type = Object)]
    pub profile: ProfileView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicProfileResponse {
    #[schema(value_type = Object)]
    pub profile: PublicProfileView,
}

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Profile of the caller", body = ProfileResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state.authenticate_headers(&headers).await?;
    let profile = state
        .profiles()
        .get_profile(user.id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ProfileResponse { profile }))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UpdatedProfileResponse),
        (status = 400, description = "Invalid profile payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UpdatedProfileResponse>, ApiError> {
    let user = state.authenticate_headers(&headers).await?;
    let Json(payload) = payload?;

    let profile = state
        .profiles()
        .update_profile(user.id, payload.into_update())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UpdatedProfileResponse {
        message: "Profile updated successfully".to_string(),
        profile,
    }))
}

#[utoipa::path(
    get,
    path = "/api/profile/{user_id}",
    tag = "Profile",
    params(("user_id" = String, Path, description = "Account identifier")),
    responses(
        (status = 200, description = "Public profile", body = PublicProfileResponse),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_public_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<PublicProfileResponse>, ApiError> {
    let user_id: i64 = user_id
        .parse()
        .map_err(|_| ApiError::not_found("Profile not found"))?;

    let profile = state
        .profiles()
        .get_public_profile(user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(PublicProfileResponse { profile }))
}

#[utoipa::path(
    delete,
    path = "/api/profile",
    tag = "Profile",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Profile fields cleared", body = MessageResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn reset_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = state.authenticate_headers(&headers).await?;
    state
        .profiles()
        .reset_profile(user.id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MessageResponse {
        message: "Profile reset successfully".to_string(),
    }))
}
