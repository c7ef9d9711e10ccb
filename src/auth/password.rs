//! Password hashing with Argon2id.
//!
//! The configured password salt acts as a pepper (Argon2 secret); each
//! hash still gets its own random salt from the OS.

use argon2::{
    password_hash::{
        PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2, Params,
};
use rand::rngs::OsRng;

#[derive(Debug, Clone)]
pub struct PasswordService {
    pepper: String,
    memory_cost_log2: u32,
}

impl PasswordService {
    pub fn new(pepper: impl Into<String>, memory_cost_log2: u32) -> Self {
        Self {
            pepper: pepper.into(),
            memory_cost_log2,
        }
    }

    fn context(&self) -> Result<Argon2<'_>, argon2::password_hash::Error> {
        let m_cost = 1u32 << self.memory_cost_log2.min(22); // Cap at 4GB

        let params =
            Params::new(m_cost, 3, 1, None).map_err(|_| argon2::password_hash::Error::Algorithm)?;

        Argon2::new_with_secret(
            self.pepper.as_bytes(),
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        )
        .map_err(|_| argon2::password_hash::Error::Algorithm)
    }

    pub fn hash(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.context()?.hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    pub fn verify(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, argon2::password_hash::Error> {
        let parsed_hash = PasswordHash::new(password_hash)?;
        match self
            .context()?
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> PasswordService {
        PasswordService::new("test-pepper", 4)
    }

    #[test]
    fn test_hash_and_verify_password() {
        let service = test_service();
        let hash = service.hash("admin").expect("Hashing should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(service
            .verify("admin", &hash)
            .expect("Verification should succeed"));
    }

    #[test]
    fn test_wrong_password_fails() {
        let service = test_service();
        let hash = service
            .hash("correct_password")
            .expect("Hashing should succeed");

        assert!(!service
            .verify("wrong_password", &hash)
            .expect("Verification should succeed"));
    }

    #[test]
    fn test_unique_salts() {
        let service = test_service();
        let hash1 = service.hash("same_password").expect("Hashing should succeed");
        let hash2 = service.hash("same_password").expect("Hashing should succeed");

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_pepper_mismatch_fails_verification() {
        let hash = test_service().hash("admin").expect("Hashing should succeed");

        let other = PasswordService::new("different-pepper", 4);
        assert!(!other
            .verify("admin", &hash)
            .expect("Verification should succeed"));
    }
}
