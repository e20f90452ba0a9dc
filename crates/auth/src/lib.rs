use chrono::{DateTime, Utc};
use nexa_config::AuthConfig;
use nexa_database::{
    DatabaseError, NewUser, NotificationRepository, User, UserRepository, ValidationErrors,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod jwt;
mod notifications;
pub mod password;
pub mod validation;

pub use jwt::{Claims, IssuedToken, JwtManager};
pub use password::PasswordManager;
pub use validation::{normalize_email, Credentials, Registration};

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    users: UserRepository,
    notifications: NotificationRepository,
    jwt: JwtManager,
    passwords: PasswordManager,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("user with this email already exists")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("invalid token")]
    InvalidToken,
    #[error("user not found")]
    UserNotFound,
    #[error("jwt signing secret is not configured")]
    MissingSigningSecret,
    #[error("token encoding failed: {0}")]
    TokenEncoding(jsonwebtoken::errors::Error),
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("invalid password hashing parameters: {0}")]
    HashParameters(argon2::Error),
}

impl From<sqlx::Error> for AuthError {
    fn from(error: sqlx::Error) -> Self {
        AuthError::Database(DatabaseError::Query(error))
    }
}

/// A freshly issued bearer token together with the account it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    fn new(user: User, issued: IssuedToken) -> Self {
        Self {
            user,
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

impl Authenticator {
    /// Fails when no signing secret is configured or the hashing cost is invalid.
    pub fn new(pool: SqlitePool, config: AuthConfig) -> Result<Self, AuthError> {
        let jwt = JwtManager::from_config(&config)?;
        let passwords = PasswordManager::from_config(&config.password)?;

        Ok(Self {
            users: UserRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            pool,
            jwt,
            passwords,
        })
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    pub async fn register(&self, input: &Registration) -> Result<AuthSession, AuthError> {
        let registration = validation::validate_registration(input)?;
        let password_hash = self.passwords.hash(&registration.password)?;

        // Single autocommit statements only; the UNIQUE index settles races.
        let mut conn = self.pool.acquire().await?;

        if UserRepository::email_exists(&mut conn, &registration.email).await? {
            debug!(email = %registration.email, "registration rejected, email taken");
            return Err(AuthError::UserExists);
        }

        let new_user = NewUser {
            full_name: registration.full_name,
            email: registration.email,
            password_hash,
        };

        let user_id = UserRepository::insert(&mut conn, &new_user)
            .await
            .map_err(|error| match error {
                DatabaseError::Duplicate(_) => {
                    debug!(email = %new_user.email, "registration lost race for email");
                    AuthError::UserExists
                }
                other => AuthError::Database(other),
            })?;
        drop(conn);

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        notifications::deliver(&self.notifications, notifications::welcome_batch(&user)).await;

        let issued = self.jwt.generate_token(user.id)?;
        info!(account_id = user.id, email = %user.email, "account registered");

        Ok(AuthSession::new(user, issued))
    }

    /// Unknown email and wrong password both yield
    /// [`AuthError::InvalidCredentials`] after one hash verification.
    pub async fn authenticate(&self, input: &Credentials) -> Result<AuthSession, AuthError> {
        let credentials = validation::validate_credentials(input)?;

        let Some(record) = self.users.find_record_by_email(&credentials.email).await? else {
            self.passwords.verify_decoy(&credentials.password)?;
            debug!("login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .passwords
            .verify(&credentials.password, &record.password_hash)?
        {
            warn!(account_id = record.user.id, "login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let user = User::from(record);
        notifications::deliver(&self.notifications, notifications::login_batch(&user)).await;

        let issued = self.jwt.generate_token(user.id)?;
        info!(account_id = user.id, "login succeeded");

        Ok(AuthSession::new(user, issued))
    }

    /// Tokens are stateless, so there is nothing to revoke server-side.
    pub fn logout(&self, user: &User) {
        info!(account_id = user.id, "logout requested");
    }

    pub async fn resolve_identity(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.jwt.validate_token(token).map_err(|error| {
            debug!(%error, "bearer token rejected");
            error
        })?;

        let user_id: i64 = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// New token for an identity that has already been resolved.
    pub fn refresh_token(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let issued = self.jwt.generate_token(user.id)?;
        debug!(account_id = user.id, "token refreshed");
        Ok(issued)
    }
}
