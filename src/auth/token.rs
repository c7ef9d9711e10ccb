//! Session token generation and verification.
//!
//! Tokens are HS256 JWTs keyed by the configured secret; the subject is
//! the user identifier, with the email carried as a custom claim.

use jwt_simple::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    key: HS256Key,
    pub access_token_expiry: i64,
}

impl TokenSigner {
    pub fn new(secret_key: &str, access_token_expiry: i64) -> Self {
        Self {
            key: HS256Key::from_bytes(secret_key.as_bytes()),
            access_token_expiry,
        }
    }

    pub fn generate_access_token(
        &self,
        user_id: i32,
        email: &str,
    ) -> Result<String, jwt_simple::Error> {
        let custom_claims = SessionClaims {
            email: email.to_string(),
        };

        let claims = jwt_simple::claims::Claims::with_custom_claims(
            custom_claims,
            Duration::from_secs(self.access_token_expiry as u64),
        )
        .with_subject(user_id.to_string());

        self.key.authenticate(claims)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, jwt_simple::Error> {
        let token_data = self.key.verify_token::<SessionClaims>(token, None)?;

        Ok(Claims {
            sub: token_data.subject.unwrap_or_default(),
            email: token_data.custom.email,
            exp: token_data
                .expires_at
                .map(|t| t.as_secs() as i64)
                .unwrap_or(0),
            iat: token_data
                .issued_at
                .map(|t| t.as_secs() as i64)
                .unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_signer() -> TokenSigner {
        TokenSigner::new("test-secret-key", 3600)
    }

    #[test]
    fn test_generate_and_verify_access_token() {
        let signer = test_signer();

        let token = signer
            .generate_access_token(42, "admin")
            .expect("Token generation should succeed");

        let claims = signer
            .verify_access_token(&token)
            .expect("Token verification should succeed");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_token_fails_verification() {
        let signer = test_signer();
        assert!(signer.verify_access_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret_fails_verification() {
        let signer = test_signer();
        let other = TokenSigner::new("a-different-secret", 3600);

        let token = signer
            .generate_access_token(1, "user@example.com")
            .expect("Token generation should succeed");

        assert!(other.verify_access_token(&token).is_err());
    }
}
