// Stored credential decoding and verification
pub mod credentials;

// Signed identity tokens
pub mod token;

// Organization lookups
pub mod directory;

// Login and request authentication
pub mod auth;

// Environment configuration
pub mod config;

// HTTP API
pub mod api;
