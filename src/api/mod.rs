// HTTP API: organization login and token checks

pub mod auth;

use crate::auth::Authenticator;
use axum::{
    http::{header, HeaderName, Method},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

pub use auth::{
    create_auth_router, ApiError, LoginRequest, LoginResponse, MessageResponse, UserInfo,
    VerifyResponse,
};

/// Shared state for all API handlers
#[derive(Clone)]
pub struct ApiState {
    pub authenticator: Arc<Authenticator>,
}

/// Full application router with CORS applied
pub fn create_router(state: ApiState) -> Router {
    create_auth_router(state).layer(cors_layer())
}

/// Cross-origin policy for browser clients
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-amz-date"),
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-amz-security-token"),
        ])
        .max_age(Duration::from_secs(86400))
}
