//! Salted password digests.
//!
//! Digests are Argon2id hashes in PHC string form
//! (`$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`), so the algorithm and its
//! cost parameters travel with each stored value.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Errors raised while deriving a digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordDigestError {
    message: String,
}

/// Stored password digest in its encoded form.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

impl PasswordDigest {
    /// Derive an Argon2id digest for `password` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordDigestError`] when the hasher rejects its input.
    pub fn derive(password: &str) -> Result<Self, PasswordDigestError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordDigestError {
                message: err.to_string(),
            })?;
        Ok(Self(hash.to_string()))
    }

    /// Wrap a digest read from storage.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded form for storage.
    pub fn as_encoded(&self) -> &str {
        self.0.as_str()
    }

    /// Check `password` against this digest. Malformed digests never match.
    pub fn verify(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
