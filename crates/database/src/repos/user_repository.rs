//! Account repository for database operations.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::entities::{NewUser, User, UserRecord, UserRole};
use crate::types::{DatabaseError, DatabaseResult};

const USER_COLUMNS: &str =
    "id, full_name, email, password_hash, role, is_verified, avatar, created_at, updated_at";

/// Repository for account database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| map_record(&row).map(User::from))
            .transpose()
            .map_err(DatabaseError::from)
    }

    /// Look up an account together with its password hash.
    pub async fn find_record_by_email(&self, email: &str) -> DatabaseResult<Option<UserRecord>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| map_record(&row))
            .transpose()
            .map_err(DatabaseError::from)
    }

    pub async fn email_exists(conn: &mut SqliteConnection, email: &str) -> DatabaseResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(found.is_some())
    }

    /// Insert an account and return its id. A UNIQUE violation on the email
    /// column surfaces as [`DatabaseError::Duplicate`].
    pub async fn insert(conn: &mut SqliteConnection, new_user: &NewUser) -> DatabaseResult<i64> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (full_name, email, password_hash, role, is_verified, created_at, updated_at) VALUES (?, ?, ?, ?, FALSE, ?, ?)",
        )
        .bind(&new_user.full_name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(UserRole::User.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut *conn)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "user"))?;

        Ok(result.last_insert_rowid())
    }
}

fn map_record(row: &SqliteRow) -> Result<UserRecord, sqlx::Error> {
    let role: String = row.try_get("role")?;

    Ok(UserRecord {
        user: User {
            id: row.try_get("id")?,
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            role: UserRole::from(role.as_str()),
            is_verified: row.try_get("is_verified")?,
            avatar: row.try_get("avatar")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        },
        password_hash: row.try_get("password_hash")?,
    })
}
