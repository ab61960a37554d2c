use actix_web::{HttpResponse, ResponseError};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

use crate::api::validation::ErrorResponse;

/// Issuer stamped into every token this service signs
pub const TOKEN_ISSUER: &str = "job-tracker";

/// Identity of an authenticated caller
///
/// Only ever produced by an [`AuthGateway`]; request payloads never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authentication failures, all surfaced to the caller as 401
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is required")]
    MissingCredentials,

    #[error("Authorization header must be 'Bearer <token>'")]
    MalformedCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AuthError::Signing(msg) => {
                error!("Token signing failed: {}", msg);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to process request".to_string(),
                    fields: serde_json::json!({"message": "Internal error"}),
                })
            }
            _ => {
                warn!("Rejected request: {}", self);
                HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "Unauthorized".to_string(),
                    fields: serde_json::json!({"message": self.to_string()}),
                })
            }
        }
    }
}

/// Credential issuing and resolution, consumed by the HTTP layer
pub trait AuthGateway: Send + Sync {
    /// Issue a bearer token for `user`
    fn issue_token(&self, user: &UserId) -> Result<String, AuthError>;

    /// Resolve a bearer token back to the identity it was issued for
    fn resolve_token(&self, token: &str) -> Result<UserId, AuthError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iss: String,
    iat: i64,
    exp: i64,
}

/// HS256 JWT implementation of [`AuthGateway`]
pub struct JwtAuthGateway {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// `None` when the configured hours do not fit a `Duration`
    expiry: Option<Duration>,
}

impl JwtAuthGateway {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::try_hours(expiry_hours),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }
}

impl AuthGateway for JwtAuthGateway {
    fn issue_token(&self, user: &UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = self
            .expiry
            .and_then(|expiry| now.checked_add_signed(expiry))
            .ok_or_else(|| AuthError::Signing("token expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: user.as_str().to_string(),
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    fn resolve_token(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Self::validation()).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            },
        )?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(UserId::new(data.claims.sub))
    }
}
