/// Authentication extractors and access-token utilities
///
/// An access token is a short-lived HS256 JWT carrying the session id.
/// Verification is a pure function; whether the session is still live is a
/// separate stateful check, so server-side revocation always wins over a
/// structurally valid credential.
use crate::{
    api::middleware::extract_bearer_token,
    context::AppContext,
    db::models::SessionRecord,
    db::now_ts,
    error::{ConsoleError, ConsoleResult},
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Access-token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id
    pub sub: String,
    /// Session id
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign an access token for a session.
pub fn sign_access_token(
    user_id: &str,
    session_id: &str,
    jwt_secret: &str,
    ttl_secs: i64,
) -> ConsoleResult<String> {
    let now = now_ts();
    let claims = AccessClaims {
        sub: user_id.to_string(),
        sid: session_id.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| ConsoleError::Internal(format!("Token signing failed: {}", e)))
}

/// Verify an access token and return its claims. Pure: no store access.
pub fn verify_access_token(token: &str, jwt_secret: &str) -> ConsoleResult<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("access token rejected: {}", e);
        ConsoleError::invalid_credentials()
    })
}

/// Authenticated context: extracts the bearer token, verifies it, then
/// checks session liveness (which also records activity).
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub session: SessionRecord,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = ConsoleError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(ConsoleError::invalid_credentials)?;

        // Step 1: structural verification (pure)
        let claims = verify_access_token(&token, &state.config.authentication.jwt_secret)?;

        // Step 2: liveness lookup; a revoked session fails even with a
        // valid signature
        let session = state.session_manager.authenticate(&claims.sid).await?;

        Ok(AuthContext {
            user_id: claims.sub,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    #[test]
    fn sign_then_verify_round_trips_claims() {
        let token = sign_access_token("user_1", "sess_1", SECRET, 60).unwrap();
        let claims = verify_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "user_1");
        assert_eq!(claims.sid, "sess_1");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_access_token("user_1", "sess_1", SECRET, 60).unwrap();
        assert!(verify_access_token(&token, "another-secret-another-secret!!!").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = sign_access_token("user_1", "sess_1", SECRET, -60).unwrap();
        assert!(verify_access_token(&token, SECRET).is_err());
    }
}
