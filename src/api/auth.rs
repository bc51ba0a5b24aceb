use crate::api::ApiState;
use crate::auth::{authorization_header, LoginError, SessionError};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Login request body
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "businessNumber", default)]
    pub business_number: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Organization as returned to the client (no credential)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "orgId")]
    pub org_id: String,
    #[serde(rename = "orgName")]
    pub org_name: String,
    #[serde(rename = "businessNumber")]
    pub business_number: String,
}

/// Response for successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
    pub user: UserInfo,
}

/// Response for GET /auth/verify
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub ok: bool,
    pub user: UserInfo,
}

/// Plain status message, used for errors too
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub ok: bool,
    pub message: String,
}

/// Create authentication API router
pub fn create_auth_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/auth/verify", get(verify))
        .route("/auth/logout", post(logout))
        .with_state(Arc::new(state))
}

/// GET /health
async fn health() -> Json<MessageResponse> {
    Json(MessageResponse {
        ok: true,
        message: "healthy".to_string(),
    })
}

/// POST /login - Check business number + password, issue a token
async fn login(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    let request: LoginRequest = if body.iter().all(u8::is_ascii_whitespace) {
        LoginRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| ApiError::BadRequest("Request body must be a JSON object".to_string()))?
    };

    let business_number = request.business_number.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let session = state
        .authenticator
        .login(&business_number, &password)
        .map_err(ApiError::Login)?;

    Ok(Json(LoginResponse {
        ok: true,
        token: session.token,
        user: UserInfo {
            org_id: session.org_id,
            org_name: session.org_name,
            business_number: session.business_number,
        },
    }))
}

/// GET /auth/verify - Resolve the organization behind the bearer token
async fn verify(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<VerifyResponse>, ApiError> {
    let org = state
        .authenticator
        .current_organization(authorization_header(&headers))
        .map_err(ApiError::Session)?;

    Ok(Json(VerifyResponse {
        ok: true,
        user: UserInfo {
            org_id: org.org_id,
            org_name: org.org_name,
            business_number: org.business_number,
        },
    }))
}

/// POST /auth/logout - Tokens are stateless; the client discards its copy
async fn logout() -> Json<MessageResponse> {
    info!("Logout requested");
    Json(MessageResponse {
        ok: true,
        message: "logged out".to_string(),
    })
}

/// Authentication API error types
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Login(LoginError),
    Session(SessionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Login(LoginError::MissingCredentials) => (
                StatusCode::BAD_REQUEST,
                LoginError::MissingCredentials.to_string(),
            ),
            ApiError::Login(LoginError::TokenIssue(e)) => {
                error!(error = %e, "Token signing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Login could not be completed".to_string(),
                )
            }
            ApiError::Login(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            ApiError::Session(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
        };

        (
            status,
            Json(MessageResponse {
                ok: false,
                message,
            }),
        )
            .into_response()
    }
}
