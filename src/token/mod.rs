//! Stateless HS256 identity tokens carrying an organization id.
//!
//! Tokens are never stored server side. Expiry is the only way a token
//! stops working.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

/// Issuer tag written into every token
pub const ISSUER: &str = "slim-site";

/// Authorization scheme prefix (case-sensitive, single space)
pub const BEARER_PREFIX: &str = "Bearer ";

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Organization id
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration time (Unix seconds)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Why a presented token was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unauthenticated {
    /// Header absent or not using the `Bearer ` scheme
    #[error("missing bearer token")]
    Missing,

    #[error("token expired")]
    Expired,

    /// Bad signature, malformed token or missing required claims
    #[error("invalid token")]
    Invalid,
}

#[derive(Debug, Error)]
pub enum TokenIssueError {
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Issue time plus TTL is not a representable timestamp
    #[error("token expiry out of range")]
    ExpiryOutOfRange,
}

/// Issues and validates identity tokens with a shared HMAC secret.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenAuthority {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` valid from now for the configured TTL.
    pub fn issue(&self, subject: &str) -> Result<String, TokenIssueError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenIssueError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or(TokenIssueError::ExpiryOutOfRange)?;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: Some(ISSUER.to_string()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        debug!(sub = %subject, exp = claims.exp, "Token issued");
        Ok(token)
    }

    /// Validate an `Authorization` header value, returning the subject.
    pub fn validate(&self, authorization: Option<&str>) -> Result<String, Unauthenticated> {
        self.validate_at(authorization, Utc::now())
    }

    /// Validate as if the current time were `now`.
    ///
    /// A token is accepted only when `iat <= now < exp` and `sub` is non-empty.
    pub fn validate_at(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, Unauthenticated> {
        let token = parse_bearer(authorization)?;
        let claims = self.decode_claims(token)?;

        let now = now.timestamp();
        if claims.sub.is_empty() {
            warn!("Token rejected: empty subject");
            return Err(Unauthenticated::Invalid);
        }
        if claims.iat > now {
            warn!(sub = %claims.sub, iat = claims.iat, "Token rejected: issued in the future");
            return Err(Unauthenticated::Invalid);
        }
        if now >= claims.exp {
            debug!(sub = %claims.sub, exp = claims.exp, "Token rejected: expired");
            return Err(Unauthenticated::Expired);
        }

        Ok(claims.sub)
    }

    /// Verify the signature and required claims. Time checks are done by the caller
    /// against its own clock.
    fn decode_claims(&self, token: &str) -> Result<Claims, Unauthenticated> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => Unauthenticated::Expired,
                _ => {
                    warn!(error = %e, "Token rejected");
                    Unauthenticated::Invalid
                }
            })
    }
}

/// Extract the token from a `Bearer <token>` header value.
pub fn parse_bearer(authorization: Option<&str>) -> Result<&str, Unauthenticated> {
    let header = authorization.ok_or(Unauthenticated::Missing)?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(Unauthenticated::Missing)?
        .trim();

    if token.is_empty() {
        return Err(Unauthenticated::Invalid);
    }

    Ok(token)
}
