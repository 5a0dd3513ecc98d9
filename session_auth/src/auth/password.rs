//! Salted one-way password hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use super::errors::{AuthError, AuthResult};

/// Default Argon2 iteration count
pub const DEFAULT_HASH_COST: u32 = Params::DEFAULT_T_COST;

/// One-way hash with verify.
///
/// A wrong password is `false`, never an error.
pub trait PasswordHasher: Send + Sync {
    /// Hash `plaintext` with a fresh random salt.
    fn hash(&self, plaintext: &str) -> AuthResult<String>;

    /// Check `plaintext` against a digest produced by [`PasswordHasher::hash`].
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Argon2id hasher with a configurable iteration count
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a hasher whose cost is the Argon2 iteration count.
    ///
    /// # Errors
    ///
    /// * `AuthError::HashingFailed` - cost rejected by Argon2 (zero)
    pub fn new(cost: u32) -> AuthResult<Self> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| {
            log::error!("Rejected Argon2 cost {}: {}", cost, e);
            AuthError::HashingFailed
        })?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        // Parameters come from the digest itself, so hashes made under an
        // older cost still verify.
        let Ok(parsed) = PasswordHash::new(digest) else {
            log::warn!("Stored password digest is not a valid PHC string");
            return false;
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}
