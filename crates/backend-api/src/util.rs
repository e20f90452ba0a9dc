use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::ApiError;

const TOKEN_REQUIRED: &str = "Access token required";

pub fn require_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized(TOKEN_REQUIRED))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized(TOKEN_REQUIRED));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized(TOKEN_REQUIRED));
    }

    Ok(token.to_string())
}
