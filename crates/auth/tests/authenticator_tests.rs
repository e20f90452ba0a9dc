use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::{encode, EncodingKey, Header};
use nexa_auth::{AuthError, Authenticator, Claims, Credentials, Registration};
use nexa_config::{AuthConfig, PasswordHashConfig};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Row, SqlitePool,
};
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

const TEST_SECRET: &str = "authenticator-test-secret";

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(TEST_SECRET.into()),
        token_ttl_seconds: 3_600,
        password: PasswordHashConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
        ..AuthConfig::default()
    }
}

struct TestContext {
    pool: SqlitePool,
    authenticator: Authenticator,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("auth.sqlite");
        let db_url = format!("sqlite://{}", db_path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        let authenticator = Authenticator::new(pool.clone(), test_auth_config())?;

        Ok(Self {
            pool,
            authenticator,
            _temp_dir: temp_dir,
        })
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    async fn register_jane(&self) -> Result<nexa_auth::AuthSession, AuthError> {
        self.authenticator
            .register(&registration("Jane Doe", "jane@x.com", "secret1"))
            .await
    }

    async fn notification_titles(&self, user_id: i64) -> TestResult<Vec<String>> {
        let rows = sqlx::query("SELECT title FROM notifications WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(self.pool())
            .await?;
        Ok(rows.iter().map(|row| row.get::<String, _>("title")).collect())
    }
}

fn registration(full_name: &str, email: &str, password: &str) -> Registration {
    Registration {
        full_name: full_name.into(),
        email: email.into(),
        password: password.into(),
    }
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn register_persists_hashed_account_and_issues_token() -> TestResult {
    let ctx = TestContext::new().await?;

    let session = ctx.register_jane().await?;

    assert_eq!(session.user.full_name, "Jane Doe");
    assert_eq!(session.user.email, "jane@x.com");

    let stored_hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
        .bind(session.user.id)
        .fetch_one(ctx.pool())
        .await?;
    assert!(stored_hash.starts_with("$argon2id$"), "secret must be an argon2 hash");
    assert_ne!(stored_hash, "secret1");

    let claims = ctx.authenticator().jwt().validate_token(&session.token)?;
    assert_eq!(claims.sub, session.user.id.to_string());

    Ok(())
}

#[tokio::test]
async fn register_emits_welcome_notifications() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx.register_jane().await?;

    let titles = ctx.notification_titles(session.user.id).await?;
    assert_eq!(
        titles,
        vec!["Welcome to NexaUI!", "Complete Your Profile", "Security Setup"]
    );

    Ok(())
}

#[tokio::test]
async fn register_rejects_email_differing_only_in_case_and_whitespace() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.register_jane().await?;

    let error = ctx
        .authenticator()
        .register(&registration("Jane Again", "  JANE@x.com ", "secret2"))
        .await
        .expect_err("duplicate email must be rejected");
    assert!(matches!(error, AuthError::UserExists));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(count, 1);

    Ok(())
}

#[tokio::test]
async fn register_reports_all_validation_failures() -> TestResult {
    let ctx = TestContext::new().await?;

    let error = ctx
        .authenticator()
        .register(&registration("J", "nope", "123"))
        .await
        .expect_err("invalid input must be rejected");

    let AuthError::Validation(errors) = error else {
        panic!("expected validation error, got {error:?}");
    };
    assert_eq!(errors.fields().len(), 3);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(count, 0);

    Ok(())
}

#[tokio::test]
async fn authenticate_accepts_correct_password_with_normalized_email() -> TestResult {
    let ctx = TestContext::new().await?;
    let registered = ctx.register_jane().await?;

    let session = ctx
        .authenticator()
        .authenticate(&credentials(" Jane@X.com", "secret1"))
        .await?;

    assert_eq!(session.user.id, registered.user.id);

    let titles = ctx.notification_titles(registered.user.id).await?;
    assert!(titles.contains(&"Login Successful".to_string()));
    assert!(titles.contains(&"Account Activity".to_string()));

    Ok(())
}

#[tokio::test]
async fn authenticate_failures_are_indistinguishable() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.register_jane().await?;

    let wrong_password = ctx
        .authenticator()
        .authenticate(&credentials("jane@x.com", "not-the-password"))
        .await
        .expect_err("wrong password must fail");
    let unknown_email = ctx
        .authenticator()
        .authenticate(&credentials("nobody@x.com", "secret1"))
        .await
        .expect_err("unknown email must fail");

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());

    Ok(())
}

#[tokio::test]
async fn authenticate_requires_password() -> TestResult {
    let ctx = TestContext::new().await?;

    let error = ctx
        .authenticator()
        .authenticate(&credentials("jane@x.com", ""))
        .await
        .expect_err("empty password must fail validation");

    assert!(matches!(error, AuthError::Validation(ref errors) if errors.has_field("password")));
    Ok(())
}

#[tokio::test]
async fn resolve_identity_returns_account_for_issued_token() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx.register_jane().await?;

    let user = ctx.authenticator().resolve_identity(&session.token).await?;
    assert_eq!(user.id, session.user.id);
    assert_eq!(user.email, "jane@x.com");

    Ok(())
}

#[tokio::test]
async fn resolve_identity_rejects_garbage_and_expired_tokens() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx.register_jane().await?;

    let garbage = ctx
        .authenticator()
        .resolve_identity("definitely.not.a-jwt")
        .await
        .expect_err("garbage must be rejected");
    assert!(matches!(garbage, AuthError::InvalidToken));

    let past = chrono::Utc::now().timestamp() - 7_200;
    let expired = encode(
        &Header::default(),
        &Claims {
            sub: session.user.id.to_string(),
            exp: past,
            iat: past - 60,
            nbf: past - 60,
            iss: "nexa".into(),
            aud: "nexa-users".into(),
            jti: "expired".into(),
        },
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )?;

    let error = ctx
        .authenticator()
        .resolve_identity(&expired)
        .await
        .expect_err("expired token must be rejected");
    assert!(matches!(error, AuthError::TokenExpired));

    Ok(())
}

#[tokio::test]
async fn resolve_identity_reports_deleted_account_as_not_found() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx.register_jane().await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(session.user.id)
        .execute(ctx.pool())
        .await?;

    let error = ctx
        .authenticator()
        .resolve_identity(&session.token)
        .await
        .expect_err("deleted account must not resolve");
    assert!(matches!(error, AuthError::UserNotFound));

    Ok(())
}

#[tokio::test]
async fn refresh_token_issues_new_token_for_same_account() -> TestResult {
    let ctx = TestContext::new().await?;
    let session = ctx.register_jane().await?;

    let refreshed = ctx.authenticator().refresh_token(&session.user)?;
    assert_ne!(refreshed.token, session.token);

    let user = ctx.authenticator().resolve_identity(&refreshed.token).await?;
    assert_eq!(user.id, session.user.id);

    Ok(())
}

#[tokio::test]
async fn notification_failures_do_not_fail_login() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.register_jane().await?;

    sqlx::query("DROP TABLE notifications")
        .execute(ctx.pool())
        .await?;

    let session = ctx
        .authenticator()
        .authenticate(&credentials("jane@x.com", "secret1"))
        .await?;
    assert_eq!(session.user.email, "jane@x.com");

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_signups_with_distinct_emails_all_succeed() -> TestResult {
    let ctx = TestContext::new().await?;

    let handles: Vec<_> = (0..20)
        .map(|n| {
            let authenticator = ctx.authenticator().clone();
            tokio::spawn(async move {
                authenticator
                    .register(&registration(
                        "Parallel User",
                        &format!("parallel{n}@x.com"),
                        "secret1",
                    ))
                    .await
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let session = handle.await??;
        ids.insert(session.user.id);
    }
    assert_eq!(ids.len(), 20);

    let accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(accounts, 20);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_signups_for_one_email_admit_exactly_one() -> TestResult {
    let ctx = TestContext::new().await?;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let authenticator = ctx.authenticator().clone();
            tokio::spawn(async move {
                authenticator
                    .register(&registration("Jane Doe", "jane@x.com", "secret1"))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => created += 1,
            Err(AuthError::UserExists) => rejected += 1,
            Err(other) => panic!("unexpected signup failure: {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(rejected, 9);

    let accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind("jane@x.com")
        .fetch_one(ctx.pool())
        .await?;
    assert_eq!(accounts, 1);

    Ok(())
}

#[tokio::test]
async fn authenticator_requires_signing_secret() -> TestResult {
    let temp_dir = TempDir::new()?;
    let db_url = format!("sqlite://{}", temp_dir.path().join("nosecret.sqlite").display());
    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    let result = Authenticator::new(pool, AuthConfig::default());
    assert!(matches!(result, Err(AuthError::MissingSigningSecret)));

    Ok(())
}
