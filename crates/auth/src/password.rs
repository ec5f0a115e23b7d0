//! Argon2 hashing for the `password` identity provider.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

use crate::AuthError;

pub(crate) const PROVIDER: &str = "password";

pub(crate) fn hash(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Any mismatch, including an unparsable stored hash, reads as bad credentials.
pub(crate) fn verify(password: &str, stored: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let stored = hash("correct horse").unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(verify("correct horse", &stored).is_ok());
        assert!(matches!(
            verify("battery staple", &stored),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
