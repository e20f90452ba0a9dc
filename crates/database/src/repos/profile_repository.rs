//! Profile extension repository.

use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::entities::{ProfileChanges, ProfileView, PublicProfileView};
use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an empty profile row for an existing account. A no-op when the
    /// row already exists or the account is missing.
    pub async fn ensure_exists(conn: &mut SqliteConnection, user_id: i64) -> DatabaseResult<bool> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, created_at, updated_at)
            SELECT ?, ?, ? WHERE EXISTS (SELECT 1 FROM users WHERE id = ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_view(&self, user_id: i64) -> DatabaseResult<Option<ProfileView>> {
        let row = sqlx::query(
            r#"
            SELECT
                up.id, up.user_id, up.bio, up.location, up.website, up.social_links,
                up.preferences, up.created_at, up.updated_at,
                u.full_name, u.email, u.avatar, u.role, u.is_verified
            FROM user_profiles up
            INNER JOIN users u ON up.user_id = u.id
            WHERE u.id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_view(&row)).transpose()
    }

    /// Public view of any account. Profile columns are null when the account
    /// never created a profile.
    pub async fn find_public(&self, user_id: i64) -> DatabaseResult<Option<PublicProfileView>> {
        let row = sqlx::query(
            r#"
            SELECT
                up.bio, up.location, up.website, up.social_links, up.created_at,
                u.full_name, u.avatar, u.created_at AS user_created_at
            FROM users u
            LEFT JOIN user_profiles up ON up.user_id = u.id
            WHERE u.id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(PublicProfileView {
            bio: row.try_get("bio")?,
            location: row.try_get("location")?,
            website: row.try_get("website")?,
            social_links: decode_json(row.try_get("social_links")?)?,
            created_at: row.try_get("created_at")?,
            full_name: row.try_get("full_name")?,
            avatar: row.try_get("avatar")?,
            user_created_at: row.try_get("user_created_at")?,
        }))
    }

    /// Write only the supplied fields and stamp `updated_at`.
    pub async fn apply_changes(
        conn: &mut SqliteConnection,
        user_id: i64,
        changes: &ProfileChanges,
    ) -> DatabaseResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut query_parts = Vec::new();
        let mut values: Vec<Option<String>> = Vec::new();

        if let Some(bio) = &changes.bio {
            query_parts.push("bio = ?");
            values.push(bio.clone());
        }

        if let Some(location) = &changes.location {
            query_parts.push("location = ?");
            values.push(location.clone());
        }

        if let Some(website) = &changes.website {
            query_parts.push("website = ?");
            values.push(website.clone());
        }

        if let Some(social_links) = &changes.social_links {
            query_parts.push("social_links = ?");
            values.push(encode_json(social_links.as_ref())?);
        }

        if let Some(preferences) = &changes.preferences {
            query_parts.push("preferences = ?");
            values.push(encode_json(preferences.as_ref())?);
        }

        query_parts.push("updated_at = ?");
        values.push(Some(Utc::now().to_rfc3339()));

        let query_str = format!(
            "UPDATE user_profiles SET {} WHERE user_id = ?",
            query_parts.join(", ")
        );

        let mut query = sqlx::query(&query_str);
        for value in values {
            query = query.bind(value);
        }

        let result = query.bind(user_id).execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    /// Null every optional field. Returns the number of rows touched, which
    /// is zero when the account never had a profile.
    pub async fn reset(&self, user_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE user_profiles
            SET bio = NULL, location = NULL, website = NULL,
                social_links = NULL, preferences = NULL, updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn map_view(row: &SqliteRow) -> DatabaseResult<ProfileView> {
    Ok(ProfileView {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        bio: row.try_get("bio")?,
        location: row.try_get("location")?,
        website: row.try_get("website")?,
        social_links: decode_json(row.try_get("social_links")?)?,
        preferences: decode_json(row.try_get("preferences")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        avatar: row.try_get("avatar")?,
        role: row.try_get("role")?,
        is_verified: row.try_get("is_verified")?,
    })
}

fn decode_json(raw: Option<String>) -> DatabaseResult<Option<Value>> {
    raw.map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(DatabaseError::from)
}

fn encode_json(value: Option<&Value>) -> DatabaseResult<Option<String>> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(DatabaseError::from)
}
