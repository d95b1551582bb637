pub mod jwks;

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::config::AuthConfig;
use jwks::JwksCache;

/// Claims decoded from a verified bearer token.
///
/// Standard claims (aud, iss, exp) are validated by the verification step;
/// only the fields the handlers consume are kept here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub exp: i64,
    pub permissions: Option<Vec<String>>,
}

/// Authorization failure with an HTTP status and a machine-readable
/// code/description pair.
#[derive(Debug, Error)]
#[error("{code}: {description}")]
pub struct AuthError {
    pub status: StatusCode,
    pub code: &'static str,
    pub description: String,
}

impl AuthError {
    pub fn header_missing() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "authorization_header_missing",
            description: "Authorization header is expected.".to_string(),
        }
    }

    pub fn invalid_header(description: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "invalid_header",
            description: description.into(),
        }
    }

    pub fn token_expired() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "token_expired",
            description: "Token expired.".to_string(),
        }
    }

    pub fn invalid_claims(description: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "invalid_claims",
            description: description.into(),
        }
    }

    /// Token verified fine but carries no `permissions` claim at all. That is
    /// a misconfigured token source, not a client mistake, hence 400.
    pub fn missing_permissions() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_claims",
            description: "Permissions not included in JWT.".to_string(),
        }
    }

    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "unauthorized",
            description: "Permission not found.".to_string(),
        }
    }

    pub fn verification_failed() -> Self {
        Self::invalid_header("Unable to verify authentication token.")
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.status.as_u16(),
            "code": self.code,
            "description": self.description,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Extract the token from the `Authorization` header.
///
/// The header must be exactly two space-separated parts with a `Bearer`
/// prefix (case-insensitive).
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(AuthError::header_missing)?;

    let value = header
        .to_str()
        .map_err(|_| AuthError::invalid_header("Authorization header is not valid text."))?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(AuthError::invalid_header(
            "Authorization header must be a bearer token.",
        ));
    }
    if !parts[0].eq_ignore_ascii_case("bearer") {
        return Err(AuthError::invalid_header(
            "Authorization header must start with Bearer.",
        ));
    }
    Ok(parts[1])
}

/// Check that the required permission string is a member of the token's
/// permission set.
pub fn check_permission(claims: &Claims, required: &str) -> Result<(), AuthError> {
    let permissions = claims
        .permissions
        .as_ref()
        .ok_or_else(AuthError::missing_permissions)?;

    if permissions.iter().any(|p| p == required) {
        Ok(())
    } else {
        Err(AuthError::forbidden())
    }
}

#[derive(Debug, Error)]
pub enum VerifierConfigError {
    #[error("unsupported verification algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("AUTH_SECRET is required for HS256 verification")]
    MissingSecret,
}

enum KeySource {
    /// Public keys fetched from the issuer's JWKS endpoint, resolved by kid.
    Jwks(JwksCache),
    /// Shared-secret deployments (HS256).
    Secret(DecodingKey),
}

/// Verifies bearer tokens against the configured issuer and audience and
/// gates handlers on a required permission string.
pub struct TokenVerifier {
    config: AuthConfig,
    algorithm: Algorithm,
    keys: KeySource,
}

impl TokenVerifier {
    pub fn new(config: AuthConfig) -> Result<Self, VerifierConfigError> {
        let algorithm: Algorithm = config
            .algorithm
            .parse()
            .map_err(|_| VerifierConfigError::UnsupportedAlgorithm(config.algorithm.clone()))?;

        let keys = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                let secret = config
                    .secret
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or(VerifierConfigError::MissingSecret)?;
                KeySource::Secret(DecodingKey::from_secret(secret.as_bytes()))
            }
            _ => KeySource::Jwks(JwksCache::new(config.jwks_url())),
        };

        Ok(Self { config, algorithm, keys })
    }

    /// Authorize a request: extract the bearer token, verify it, and check
    /// the required permission. Returns the decoded claims on success.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        permission: &str,
    ) -> Result<Claims, AuthError> {
        let token = extract_bearer(headers)?;
        let claims = self.verify(token).await?;
        check_permission(&claims, permission)?;
        Ok(claims)
    }

    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)
            .map_err(|_| AuthError::invalid_header("Unable to parse authentication token."))?;

        let key = match &self.keys {
            KeySource::Jwks(cache) => {
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| AuthError::invalid_header("Authorization malformed."))?;
                cache.decoding_key(kid).await?
            }
            KeySource::Secret(key) => key.clone(),
        };

        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.set_issuer(&[self.config.issuer()]);

        let data = decode::<Claims>(token, &key, &validation).map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::token_expired(),
            ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::invalid_claims(
                "Incorrect claims. Please, check the audience and issuer.",
            ),
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => {
                AuthError::invalid_header("Unable to parse authentication token.")
            }
            _ => AuthError::verification_failed(),
        })?;

        Ok(data.claims)
    }
}
