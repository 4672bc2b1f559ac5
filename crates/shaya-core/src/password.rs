//! Password hashing.
//!
//! Passwords are truncated to their first [`MAX_PASSWORD_BYTES`] UTF-8 bytes
//! before hashing and before verification. This is a documented limitation of
//! the login contract: two passwords sharing a 72-byte prefix are the same
//! password.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Error, Result};

pub const MAX_PASSWORD_BYTES: usize = 72;

fn truncated(password: &str) -> &[u8] {
  let bytes = password.as_bytes();
  &bytes[..bytes.len().min(MAX_PASSWORD_BYTES)]
}

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(truncated(password), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    tracing::warn!("stored password hash is not a valid PHC string");
    return false;
  };
  Argon2::default()
    .verify_password(truncated(password), &parsed)
    .is_ok()
}
