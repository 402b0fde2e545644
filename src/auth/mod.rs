use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authenticated caller, established by token verification and immutable
/// for the rest of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, email: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            user_id,
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Validate signature and expiry, returning the caller's identity
pub fn verify_token(token: &str, secret: &str) -> Result<Identity, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(Identity { user_id: token_data.claims.user_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trips_identity() {
        let token = generate_token(&Claims::new(42, Some("a@b.c".into()), 1), SECRET).unwrap();
        assert_eq!(verify_token(&token, SECRET).unwrap(), Identity { user_id: 42 });
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = generate_token(&Claims::new(42, None, 1), SECRET).unwrap();
        assert!(matches!(verify_token(&token, "other"), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let mut claims = Claims::new(42, None, 1);
        claims.exp = Utc::now().timestamp() - 3600;
        claims.iat = claims.exp - 3600;
        let token = generate_token(&claims, SECRET).unwrap();
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn requires_secret() {
        assert!(matches!(generate_token(&Claims::new(1, None, 1), ""), Err(JwtError::InvalidSecret)));
        assert!(matches!(verify_token("abc", ""), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(verify_token("not-a-jwt", SECRET).is_err());
    }
}
