//! Argon2 hashing of the client-side password hash.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;

/// Hash for storage; returns the PHC string.
pub fn hash_password(client_hash: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(client_hash.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// A malformed stored hash never verifies.
pub fn verify_password(client_hash: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(client_hash.as_bytes(), &parsed)
        .is_ok()
}
