pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{self, SecurityConfig};

pub use password::{hash_password, hash_password_async, verify_password, verify_password_async, PasswordError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn lifetime(&self, security: &SecurityConfig) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(security.access_token_minutes),
            TokenKind::Refresh => Duration::days(security.refresh_token_days),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub token_type: TokenKind,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, kind: TokenKind, security: &SecurityConfig) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            token_type: kind,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + kind.lifetime(security)).timestamp(),
        }
    }

    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::Invalid("subject is not a user id".to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    Invalid(String),

    #[error("Expected {expected:?} token")]
    WrongTokenType { expected: TokenKind },
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, expected: TokenKind, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::Invalid(e.to_string()))?;

    if token_data.claims.token_type != expected {
        return Err(JwtError::WrongTokenType { expected });
    }
    Ok(token_data.claims)
}

/// Signs a token for the user with the configured secret and lifetime
pub fn issue_token(user_id: i64, kind: TokenKind) -> Result<String, JwtError> {
    let security = &config::config().security;
    generate_jwt(&Claims::new(user_id, kind, security), &security.jwt_secret)
}

pub fn issue_token_pair(user_id: i64) -> Result<TokenPair, JwtError> {
    Ok(TokenPair {
        access_token: issue_token(user_id, TokenKind::Access)?,
        refresh_token: issue_token(user_id, TokenKind::Refresh)?,
        token_type: "Bearer",
        expires_in: config::config().security.access_token_minutes * 60,
    })
}

pub fn decode_token(token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
    validate_jwt(token, expected, &config::config().security.jwt_secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security() -> SecurityConfig {
        SecurityConfig {
            cors_origins: vec![],
            jwt_secret: "unit-secret".into(),
            access_token_minutes: 60,
            refresh_token_days: 7,
            allow_registration: true,
        }
    }

    #[test]
    fn round_trips_access_token() {
        let security = security();
        let claims = Claims::new(42, TokenKind::Access, &security);
        assert_eq!(claims.exp - claims.iat, 3600);

        let token = generate_jwt(&claims, &security.jwt_secret).unwrap();
        let decoded = validate_jwt(&token, TokenKind::Access, &security.jwt_secret).unwrap();
        assert_eq!(decoded.user_id().unwrap(), 42);
        assert_eq!(decoded.jti, claims.jti);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let security = security();
        let claims = Claims::new(1, TokenKind::Refresh, &security);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
        let token = generate_jwt(&claims, &security.jwt_secret).unwrap();
        assert!(matches!(
            validate_jwt(&token, TokenKind::Access, &security.jwt_secret),
            Err(JwtError::WrongTokenType { expected: TokenKind::Access })
        ));
    }

    #[test]
    fn wrong_secret_and_empty_secret_fail() {
        let security = security();
        let token = generate_jwt(&Claims::new(1, TokenKind::Access, &security), "a").unwrap();
        assert!(matches!(validate_jwt(&token, TokenKind::Access, "b"), Err(JwtError::Invalid(_))));
        assert!(matches!(validate_jwt(&token, TokenKind::Access, ""), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(1, TokenKind::Access, &security());
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = generate_jwt(&claims, "s").unwrap();
        assert!(validate_jwt(&token, TokenKind::Access, "s").is_err());
    }
}
