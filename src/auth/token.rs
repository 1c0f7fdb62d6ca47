//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying the user ID as `sub` and an absolute
//! `exp`. Nothing is stored server-side: a token stays valid until it
//! expires, even after the cookie has been cleared on logout.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::Clock;
use crate::db::User;
use crate::{RecipeBoxError, Result};

/// Outcome of a failed resolve.
///
/// Bad signatures, expired tokens, missing claims and garbage input all
/// collapse into the same variant.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid session token")]
    Invalid,
}

impl From<TokenError> for RecipeBoxError {
    fn from(_: TokenError) -> Self {
        RecipeBoxError::Unauthenticated
    }
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID, stringified).
    pub sub: String,
    /// Issued at (seconds since the epoch).
    pub iat: i64,
    /// Expiration (seconds since the epoch).
    pub exp: i64,
}

/// Issues and resolves session tokens.
#[derive(Clone)]
pub struct SessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionCodec {
    /// Create a codec signing with `secret`; sessions last `ttl`.
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock in `resolve`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            clock,
        }
    }

    /// Configured session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token for `subject_id` expiring `ttl` from now.
    pub fn issue(&self, subject_id: i64, ttl: Duration) -> Result<String> {
        let iat = self.clock.now().timestamp();
        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| RecipeBoxError::Token("token lifetime out of range".to_string()))?;
        let claims = SessionClaims {
            sub: subject_id.to_string(),
            iat,
            exp: iat.saturating_add(ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| RecipeBoxError::Token(e.to_string()))
    }

    /// Sign a token for `user` with the configured lifetime.
    pub fn issue_session(&self, user: &User) -> Result<String> {
        self.issue(user.id, self.ttl)
    }

    /// Resolve a token to the user ID it was issued for.
    ///
    /// A leading `Bearer ` is ignored. The token is expired from the
    /// second named by `exp` onwards.
    pub fn resolve(&self, token: &str) -> std::result::Result<i64, TokenError> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        let data =
            decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("Session token rejected: {}", e);
                TokenError::Invalid
            })?;

        if self.clock.now().timestamp() >= data.claims.exp {
            tracing::debug!("Session token expired");
            return Err(TokenError::Invalid);
        }

        data.claims.sub.parse().map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    const SECRET: &str = "test-secret";

    fn setup(ttl_secs: u64) -> (Arc<ManualClock>, SessionCodec) {
        let clock = Arc::new(ManualClock::new(
            chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let codec = SessionCodec::new(SECRET, Duration::from_secs(ttl_secs), clock.clone());
        (clock, codec)
    }

    fn sign_raw(claims: &serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_resolve() {
        let (_clock, codec) = setup(3600);
        let token = codec.issue(42, Duration::from_secs(60)).unwrap();
        assert_eq!(codec.resolve(&token), Ok(42));
    }

    #[test]
    fn test_issue_session_uses_configured_ttl() {
        let (clock, codec) = setup(3600);
        let user = User {
            id: 7,
            username: "alice".to_string(),
            password_hash: String::new(),
            role: Default::default(),
            created_at: String::new(),
        };
        let token = codec.issue_session(&user).unwrap();

        clock.advance(chrono::Duration::seconds(3599));
        assert_eq!(codec.resolve(&token), Ok(7));
        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(codec.resolve(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expiry_boundary() {
        let (clock, codec) = setup(3600);
        let token = codec.issue(1, Duration::from_secs(60)).unwrap();

        clock.advance(chrono::Duration::seconds(59));
        assert_eq!(codec.resolve(&token), Ok(1));

        // Exactly at expires_at
        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(codec.resolve(&token), Err(TokenError::Invalid));

        clock.advance(chrono::Duration::days(1));
        assert_eq!(codec.resolve(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_bearer_prefix_is_stripped() {
        let (_clock, codec) = setup(3600);
        let token = codec.issue(5, Duration::from_secs(60)).unwrap();
        assert_eq!(codec.resolve(&format!("Bearer {token}")), Ok(5));
    }

    #[test]
    fn test_any_single_character_change_is_rejected() {
        let (_clock, codec) = setup(3600);
        let token = codec.issue(9, Duration::from_secs(60)).unwrap();

        for (i, c) in token.char_indices() {
            if c == '.' {
                continue;
            }
            let replacement = if c == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(i..i + 1, &replacement.to_string());
            assert_eq!(
                codec.resolve(&tampered),
                Err(TokenError::Invalid),
                "tampered position {i} accepted"
            );
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (clock, codec) = setup(3600);
        let other = SessionCodec::new("other-secret", Duration::from_secs(3600), clock);
        let token = other.issue(1, Duration::from_secs(60)).unwrap();
        assert_eq!(codec.resolve(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_missing_subject_rejected() {
        let (clock, codec) = setup(3600);
        let exp = clock.now().timestamp() + 600;
        let token = sign_raw(&serde_json::json!({ "exp": exp }), SECRET);
        assert_eq!(codec.resolve(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_missing_expiry_rejected() {
        let (_clock, codec) = setup(3600);
        let token = sign_raw(&serde_json::json!({ "sub": "1", "iat": 0 }), SECRET);
        assert_eq!(codec.resolve(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let (clock, codec) = setup(3600);
        let exp = clock.now().timestamp() + 600;
        let token = sign_raw(
            &serde_json::json!({ "sub": "alice", "iat": 0, "exp": exp }),
            SECRET,
        );
        assert_eq!(codec.resolve(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_rejected() {
        let (_clock, codec) = setup(3600);
        assert_eq!(codec.resolve(""), Err(TokenError::Invalid));
        assert_eq!(codec.resolve("not.a.token"), Err(TokenError::Invalid));
        assert_eq!(codec.resolve("Bearer "), Err(TokenError::Invalid));
    }

    #[test]
    fn test_token_error_maps_to_unauthenticated() {
        let err: RecipeBoxError = TokenError::Invalid.into();
        assert!(matches!(err, RecipeBoxError::Unauthenticated));
    }
}
