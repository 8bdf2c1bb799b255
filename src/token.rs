//! Token verification for the Pressroom server.
//!
//! Credentials are HS256 JSON Web Tokens signed with a shared secret from
//! configuration. The verifier decodes and validates a token and yields the
//! [`AuthClaims`] identifying the acting user; issuance is out of scope and
//! belongs to the identity system that provisions users.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::types::AuthClaims;

/// Errors that can occur while verifying a token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,

    /// The token is malformed, has a bad signature, or carries claims that
    /// do not decode into [`AuthClaims`].
    #[error("invalid token")]
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid,
        }
    }
}

/// Verifies bearer tokens against the configured shared secret.
///
/// Cheap to clone behind an `Arc`; the decoding key is derived once at
/// construction.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Creates a verifier for HS256 tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verifies a raw token string and returns its claims.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Expired`] when the `exp` claim has passed
    /// - [`TokenError::Invalid`] for any other verification failure
    pub fn verify(&self, token: &str) -> Result<AuthClaims, TokenError> {
        let data = decode::<AuthClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}
