//! Authentication gate for inbound requests.
//!
//! Every operation on the articles collection, reads included, passes
//! through this gate before any resource access occurs. The credential is
//! carried in the `x-access-token` header; a missing header is rejected
//! before the verifier is even consulted, and a failed verification is
//! surfaced with the verifier's own message. On success the decoded
//! [`AuthClaims`] are handed to the rest of the pipeline and nothing else
//! happens - the gate has no other observable side effect.

use axum::http::HeaderMap;
use tracing::debug;

use crate::error::ApiError;
use crate::token::TokenVerifier;
use crate::types::AuthClaims;

/// Header carrying the bearer token.
pub const HEADER_ACCESS_TOKEN: &str = "x-access-token";

/// Extracts and verifies the request credential.
///
/// # Errors
///
/// - `Unauthorized("No token provided")` when the header is absent or empty
/// - `Unauthorized` with the verifier's message when the token is invalid
///   or expired
pub fn authenticate(headers: &HeaderMap, verifier: &TokenVerifier) -> Result<AuthClaims, ApiError> {
    let token = match headers
        .get(HEADER_ACCESS_TOKEN)
        .and_then(|v| v.to_str().ok())
    {
        Some(token) if !token.is_empty() => token,
        _ => {
            debug!("Missing or empty x-access-token header");
            return Err(ApiError::unauthorized("No token provided"));
        }
    };

    verifier.verify(token).map_err(|err| {
        debug!(error = %err, "Token verification failed");
        ApiError::unauthorized(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "gate-test-secret";

    fn token_for(user_id: Uuid) -> String {
        let claims = AuthClaims {
            user_id,
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn authenticate_attaches_claims_for_a_valid_token() {
        let verifier = TokenVerifier::new(SECRET);
        let user_id = Uuid::new_v4();

        let mut headers = HeaderMap::new();
        headers.insert(HEADER_ACCESS_TOKEN, token_for(user_id).parse().unwrap());

        let claims = authenticate(&headers, &verifier).unwrap();
        assert_eq!(claims.user_id, user_id);
    }

    #[test]
    fn authenticate_rejects_a_missing_header() {
        let verifier = TokenVerifier::new(SECRET);
        let headers = HeaderMap::new();

        let err = authenticate(&headers, &verifier).unwrap_err();
        assert_eq!(err, ApiError::unauthorized("No token provided"));
    }

    #[test]
    fn authenticate_rejects_an_empty_header() {
        let verifier = TokenVerifier::new(SECRET);
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_ACCESS_TOKEN, "".parse().unwrap());

        let err = authenticate(&headers, &verifier).unwrap_err();
        assert_eq!(err, ApiError::unauthorized("No token provided"));
    }

    #[test]
    fn authenticate_rejects_a_malformed_token() {
        let verifier = TokenVerifier::new(SECRET);
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_ACCESS_TOKEN, "garbage".parse().unwrap());

        let err = authenticate(&headers, &verifier).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.to_string(), "invalid token");
    }

    #[test]
    fn authenticate_rejects_an_expired_token() {
        let verifier = TokenVerifier::new(SECRET);
        let claims = AuthClaims {
            user_id: Uuid::new_v4(),
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(HEADER_ACCESS_TOKEN, token.parse().unwrap());

        let err = authenticate(&headers, &verifier).unwrap_err();
        assert_eq!(err.to_string(), "token expired");
    }
}
