//! Signed bearer tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use nexa_config::AuthConfig;
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Lifetimes beyond a century are clamped.
const MAX_TOKEN_LIFETIME_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    token_duration: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            audience: audience.into(),
            token_duration: Duration::days(7),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let secret = config
            .jwt_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(AuthError::MissingSigningSecret)?;

        let seconds = i64::try_from(config.token_ttl_seconds)
            .unwrap_or(MAX_TOKEN_LIFETIME_SECONDS)
            .min(MAX_TOKEN_LIFETIME_SECONDS);
        let duration = Duration::seconds(seconds);

        Ok(Self::new(secret, config.issuer.clone(), config.audience.clone()).with_duration(duration))
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.token_duration = duration;
        self
    }

    pub fn token_duration(&self) -> Duration {
        self.token_duration
    }

    pub fn generate_token(&self, user_id: i64) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.token_duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::TokenEncoding)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature, issuer, audience and expiry.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|error| match error.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new("unit-test-secret", "nexa", "nexa-users")
    }

    #[test]
    fn issued_token_round_trips_subject() {
        let jwt = manager();
        let issued = jwt.generate_token(42).unwrap();

        let claims = jwt.validate_token(&issued.token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.iss, "nexa");
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn tokens_issued_back_to_back_differ() {
        let jwt = manager();
        let first = jwt.generate_token(1).unwrap();
        let second = jwt.generate_token(1).unwrap();

        assert_ne!(first.token, second.token);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let jwt = manager();
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: "7".into(),
            exp: past.timestamp(),
            iat: past.timestamp() - 60,
            nbf: past.timestamp() - 60,
            iss: "nexa".into(),
            aud: "nexa-users".into(),
            jti: "expired".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        assert!(matches!(jwt.validate_token(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = JwtManager::new("another-secret", "nexa", "nexa-users");
        let issued = other.generate_token(3).unwrap();

        assert!(matches!(
            manager().validate_token(&issued.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let foreign = JwtManager::new("unit-test-secret", "nexa", "someone-else");
        let issued = foreign.generate_token(3).unwrap();

        assert!(matches!(
            manager().validate_token(&issued.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn from_config_requires_secret() {
        let config = AuthConfig::default();
        assert!(matches!(
            JwtManager::from_config(&config),
            Err(AuthError::MissingSigningSecret)
        ));
    }

    #[test]
    fn from_config_uses_configured_lifetime() {
        let config = AuthConfig {
            jwt_secret: Some("configured".into()),
            token_ttl_seconds: 90,
            ..AuthConfig::default()
        };

        let jwt = JwtManager::from_config(&config).unwrap();
        assert_eq!(jwt.token_duration(), Duration::seconds(90));
    }
}
