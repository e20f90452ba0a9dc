//! Argon2id password hashing.

use std::sync::Arc;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use nexa_config::PasswordHashConfig;
use once_cell::sync::OnceCell;

use crate::AuthError;

/// Plaintext hashed once per manager and verified against when a login names
/// an unknown email, so both failure paths cost one verification.
const DECOY_PASSWORD: &str = "nexa-decoy-password";

#[derive(Clone)]
pub struct PasswordManager {
    argon2: Argon2<'static>,
    decoy_hash: Arc<OnceCell<String>>,
}

impl PasswordManager {
    pub fn from_config(config: &PasswordHashConfig) -> Result<Self, AuthError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(AuthError::HashParameters)?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            decoy_hash: Arc::new(OnceCell::new()),
        })
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` on mismatch. A stored hash that cannot be parsed is an error.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored_hash)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AuthError::PasswordHash(error)),
        }
    }

    /// Burn one verification for a login whose email is unknown.
    pub fn verify_decoy(&self, password: &str) -> Result<(), AuthError> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hash(DECOY_PASSWORD))?;
        self.verify(password, decoy)?;
        Ok(())
    }
}
