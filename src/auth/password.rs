use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{CoreError, CoreResult};

/// CPU-hard, salted, cost-tunable password hash (Argon2id).
pub fn hash_password(plaintext: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Other(anyhow::anyhow!("password hashing failed: {e}")))
}

pub fn verify_password(plaintext: &str, hash: &str) -> CoreResult<()> {
    let parsed = PasswordHash::new(hash).map_err(|e| CoreError::Other(anyhow::anyhow!("corrupt password hash: {e}")))?;
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .map_err(|_| CoreError::WrongPassword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(verify_password("correct horse battery staple", &hash).is_ok());
    }

    #[test]
    fn rejects_wrong_password() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(matches!(verify_password("wrong", &hash), Err(CoreError::WrongPassword)));
    }
}
