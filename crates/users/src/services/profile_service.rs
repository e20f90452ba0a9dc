//! Profile store service.

use nexa_database::{ProfileRepository, ProfileView, PublicProfileView};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::types::{ProfileError, ProfileResult, ProfileUpdate};
use crate::utils::validate_update;

#[derive(Clone)]
pub struct ProfileService {
    pool: SqlitePool,
    profiles: ProfileRepository,
}

impl ProfileService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            profiles: ProfileRepository::new(pool.clone()),
            pool,
        }
    }

    /// Joined account and profile view. Creates an empty profile the first
    /// time an account asks for it.
    pub async fn get_profile(&self, user_id: i64) -> ProfileResult<ProfileView> {
        let created = {
            let mut conn = self.pool.acquire().await?;
            ProfileRepository::ensure_exists(&mut conn, user_id).await?
        };

        if created {
            debug!(account_id = user_id, "created empty profile");
        }

        self.profiles
            .find_view(user_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    /// Apply only the supplied fields and return the updated view.
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> ProfileResult<ProfileView> {
        let changes = validate_update(update)?;

        let mut tx = self.pool.begin().await?;
        ProfileRepository::ensure_exists(&mut tx, user_id).await?;
        let touched = ProfileRepository::apply_changes(&mut tx, user_id, &changes).await?;
        tx.commit().await?;

        info!(account_id = user_id, touched, "profile updated");

        self.profiles
            .find_view(user_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    /// Read-only view for anonymous visitors. Never creates a profile row.
    pub async fn get_public_profile(&self, user_id: i64) -> ProfileResult<PublicProfileView> {
        self.profiles
            .find_public(user_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    /// Clear every optional field. Idempotent, and a missing profile is fine.
    pub async fn reset_profile(&self, user_id: i64) -> ProfileResult<()> {
        let touched = self.profiles.reset(user_id).await?;
        info!(account_id = user_id, touched, "profile reset");
        Ok(())
    }
}
