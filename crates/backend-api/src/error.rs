use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nexa_auth::AuthError;
use nexa_database::{FieldError, ValidationErrors};
use nexa_users::ProfileError;
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldErrorResponse>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldErrorResponse {
    pub field: String,
    pub message: String,
}

impl From<FieldError> for FieldErrorResponse {
    fn from(value: FieldError) -> Self {
        Self {
            field: value.field,
            message: value.message,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// The cause is logged here and never reaches the client.
    pub fn internal(cause: &dyn std::fmt::Debug) -> Self {
        error!(error = ?cause, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation failed".to_string(),
            details: Some(errors.into_inner()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self
                .details
                .map(|details| details.into_iter().map(Into::into).collect()),
        });
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(errors) => Self::validation(errors),
            AuthError::UserExists => Self::bad_request("User with this email already exists"),
            AuthError::InvalidCredentials => Self::unauthorized("Invalid credentials"),
            AuthError::TokenExpired => {
                debug!("expired bearer token");
                Self::unauthorized("Token expired")
            }
            AuthError::InvalidToken => Self::unauthorized("Invalid token"),
            AuthError::UserNotFound => Self::not_found("User not found"),
            other => Self::internal(&other),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(error: ProfileError) -> Self {
        match error {
            ProfileError::Validation(errors) => Self::validation(errors),
            ProfileError::NotFound => Self::not_found("Profile not found"),
            other => Self::internal(&other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection.body_text(), "rejected request body");
        Self::bad_request("Invalid request body")
    }
}
