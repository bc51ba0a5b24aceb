use crate::credentials::{CredentialVerifier, Verdict};
use crate::directory::{Organization, OrganizationDirectory};
use crate::token::{TokenAuthority, TokenIssueError, Unauthenticated};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[cfg(test)]
mod tests;

/// Raw `Authorization` header value, if present and valid UTF-8.
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION)?.to_str().ok()
}

/// Successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub token: String,
    pub org_id: String,
    pub org_name: String,
    pub business_number: String,
}

/// Login failures.
///
/// Messages differ per variant; status codes do not distinguish an unknown
/// business number from a wrong password.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("business number and password are required")]
    MissingCredentials,

    #[error("business number is not registered")]
    UnknownBusiness,

    #[error("password verification failed (salt)")]
    SaltMismatch,

    #[error("password does not match")]
    PasswordMismatch,

    #[error(transparent)]
    TokenIssue(#[from] TokenIssueError),
}

/// Failures resolving the organization behind a presented token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Unauthenticated(#[from] Unauthenticated),

    #[error("invalid token")]
    UnknownOrganization,
}

/// Login and request authentication for organizations.
///
/// Holds only read-only state after construction, so one instance is
/// shared by every request.
pub struct Authenticator {
    directory: Arc<dyn OrganizationDirectory>,
    verifier: CredentialVerifier,
    tokens: TokenAuthority,
    expected_salt: String,
}

impl Authenticator {
    pub fn new(
        directory: Arc<dyn OrganizationDirectory>,
        verifier: CredentialVerifier,
        tokens: TokenAuthority,
        expected_salt: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            verifier,
            tokens,
            expected_salt: expected_salt.into(),
        }
    }

    pub fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }

    /// Check a business number / password pair and issue a token.
    pub fn login(&self, business_number: &str, password: &str) -> Result<LoginSession, LoginError> {
        if business_number.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let org = self
            .directory
            .find_by_business_number(business_number)
            .ok_or_else(|| {
                warn!(%business_number, "Login rejected: unknown business number");
                LoginError::UnknownBusiness
            })?;

        let (format, verdict) = self.verifier.verify_detailed(
            &org.password_hash,
            password,
            &self.expected_salt,
        );
        match verdict {
            Verdict::Match => {}
            Verdict::SaltMismatch => {
                warn!(org_id = %org.org_id, "Login rejected: salt mismatch");
                return Err(LoginError::SaltMismatch);
            }
            Verdict::PasswordMismatch => {
                warn!(org_id = %org.org_id, ?format, "Login rejected: password mismatch");
                return Err(LoginError::PasswordMismatch);
            }
        }

        let token = self.tokens.issue(&org.org_id)?;
        info!(org_id = %org.org_id, ?format, "Login succeeded");

        Ok(LoginSession {
            token,
            org_id: org.org_id,
            org_name: org.org_name,
            business_number: org.business_number,
        })
    }

    /// Validate an `Authorization` header value and return the organization id.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<String, Unauthenticated> {
        self.tokens.validate(authorization)
    }

    /// Authenticate, then load the organization the token was issued for.
    pub fn current_organization(
        &self,
        authorization: Option<&str>,
    ) -> Result<Organization, SessionError> {
        let org_id = self.authenticate(authorization)?;
        self.directory.find_by_id(&org_id).ok_or_else(|| {
            warn!(org_id = %org_id, "Token subject no longer registered");
            SessionError::UnknownOrganization
        })
    }
}
