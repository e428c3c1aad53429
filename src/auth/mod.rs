use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// The authenticated identity behind a request.
///
/// Only an [`Authenticator`] produces one, from verified credentials. Handlers
/// receive it from the session middleware and never from request input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: Uuid,
}

impl Principal {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Transport-level credentials pulled off a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Cookie(String),
}

impl Credentials {
    /// Bearer header wins over the session cookie when both are present.
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Result<Self, AuthError> {
        if let Some(value) = headers.get(header::AUTHORIZATION) {
            let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
            let token = value
                .strip_prefix("Bearer ")
                .ok_or(AuthError::MalformedHeader)?
                .trim();
            if token.is_empty() {
                return Err(AuthError::MalformedHeader);
            }
            return Ok(Credentials::Bearer(token.to_string()));
        }

        for value in headers.get_all(header::COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            for pair in value.split(';') {
                if let Some((name, token)) = pair.trim().split_once('=') {
                    if name == cookie_name && !token.is_empty() {
                        return Ok(Credentials::Cookie(token.to_string()));
                    }
                }
            }
        }

        Err(AuthError::MissingCredentials)
    }

    pub fn token(&self) -> &str {
        match self {
            Credentials::Bearer(token) | Credentials::Cookie(token) => token,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Session has expired")]
    Expired,

    #[error("Authentication provider unavailable: {0}")]
    Unavailable(String),

    #[error("Token lifetime of {0} hours is out of range")]
    InvalidExpiry(u64),
}

/// Resolves request credentials into a [`Principal`].
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(
        user_id: Uuid,
        email: impl Into<String>,
        audience: impl Into<String>,
        expiry_hours: u64,
    ) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(AuthError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            sub: user_id,
            email: email.into(),
            aud: audience.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

/// HS256 session tokens signed with a shared secret.
pub struct JwtAuthenticator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &str, audience: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Unavailable("JWT secret not configured".to_string()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        validation.leeway = 0;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(&security.jwt_secret, &security.jwt_audience)
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        let data = decode::<Claims>(credentials.token(), &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(Principal::new(data.claims.sub))
    }
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Unavailable("JWT secret not configured".to_string()));
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::InvalidToken(format!("JWT generation error: {}", e)))
}
