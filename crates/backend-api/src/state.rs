use axum::http::HeaderMap;
use nexa_auth::Authenticator;
use nexa_database::User;
use nexa_users::ProfileService;

use crate::{util::require_bearer, ApiError};

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    profiles: ProfileService,
}

impl AppState {
    pub fn new(authenticator: Authenticator, profiles: ProfileService) -> Self {
        Self {
            authenticator,
            profiles,
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn profiles(&self) -> &ProfileService {
        &self.profiles
    }

    pub async fn authenticate(&self, token: &str) -> Result<User, ApiError> {
        self.authenticator
            .resolve_identity(token)
            .await
            .map_err(ApiError::from)
    }

    /// Resolve the caller of a protected endpoint from its bearer header.
    pub async fn authenticate_headers(&self, headers: &HeaderMap) -> Result<User, ApiError> {
        let token = require_bearer(headers)?;
        self.authenticate(&token).await
    }
}
