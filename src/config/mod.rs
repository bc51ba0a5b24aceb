use chrono::Duration;
use std::path::PathBuf;
use thiserror::Error;

/// Database coordinates that must be present before the process starts
pub const REQUIRED_VARS: [&str; 4] = ["DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME"];

const DEFAULT_DB_PORT: u16 = 3306;
const DEFAULT_JWT_SECRET: &str = "change-me";
const DEFAULT_JWT_EXP_MIN: i64 = 60;
/// Longest accepted token lifetime: one year
pub const MAX_JWT_EXP_MIN: i64 = 60 * 24 * 365;
const DEFAULT_CIPHER_KEY: &str = "beautifulstore";
const DEFAULT_EXPECTED_SALT: &str = "basecamp";
const DEFAULT_PORT: u16 = 3000;

/// Startup configuration errors. The process must not start on any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: String, value: String },
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub token: TokenConfig,
    pub credentials: CredentialConfig,
    pub server: ServerConfig,
}

/// Database coordinates for the persistence layer
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    pub port: u16,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("port", &self.port)
            .finish()
    }
}

/// Identity token settings
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC signing secret (JWT_SECRET)
    pub secret: String,
    /// Token lifetime in minutes (JWT_EXP_MIN)
    pub ttl_minutes: i64,
}

impl TokenConfig {
    /// Token lifetime, clamped to `1..=MAX_JWT_EXP_MIN` minutes.
    pub fn ttl(&self) -> Duration {
        let minutes = self.ttl_minutes.clamp(1, MAX_JWT_EXP_MIN);
        Duration::try_minutes(minutes).unwrap_or_else(|| Duration::minutes(DEFAULT_JWT_EXP_MIN))
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

/// Stored credential settings
#[derive(Clone)]
pub struct CredentialConfig {
    /// Cipher secret (BCM_AES_KEY)
    pub cipher_key: String,
    /// Salt expected in decoded credentials (BCM_AES_SALT). Empty disables the check.
    pub expected_salt: String,
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("cipher_key", &"<redacted>")
            .field("expected_salt", &"<redacted>")
            .finish()
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// TOML seed for the in-memory organization directory
    pub organizations_file: Option<PathBuf>,
}

impl AppConfig {
    /// Build from process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .copied()
            .filter(|key| get(*key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let required = |key: &str| get(key).unwrap_or_default();

        let database = DatabaseConfig {
            host: required("DB_HOST"),
            user: required("DB_USER"),
            password: required("DB_PASSWORD"),
            name: required("DB_NAME"),
            port: parse_or("DB_PORT", get("DB_PORT"), DEFAULT_DB_PORT)?,
        };

        let ttl_minutes = parse_or("JWT_EXP_MIN", get("JWT_EXP_MIN"), DEFAULT_JWT_EXP_MIN)?;
        if !(1..=MAX_JWT_EXP_MIN).contains(&ttl_minutes)
            || Duration::try_minutes(ttl_minutes).is_none()
        {
            return Err(ConfigError::Invalid {
                key: "JWT_EXP_MIN".to_string(),
                value: ttl_minutes.to_string(),
            });
        }
        let token = TokenConfig {
            secret: get("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            ttl_minutes,
        };

        // An explicitly empty salt is meaningful, so read it without the empty filter
        let credentials = CredentialConfig {
            cipher_key: get("BCM_AES_KEY").unwrap_or_else(|| DEFAULT_CIPHER_KEY.to_string()),
            expected_salt: lookup("BCM_AES_SALT")
                .unwrap_or_else(|| DEFAULT_EXPECTED_SALT.to_string()),
        };

        let server = ServerConfig {
            port: parse_or("SLIMSITE_PORT", get("SLIMSITE_PORT"), DEFAULT_PORT)?,
            organizations_file: get("SLIMSITE_ORGANIZATIONS_FILE").map(PathBuf::from),
        };

        Ok(Self {
            database,
            token,
            credentials,
            server,
        })
    }

    /// Names of secrets still set to their built-in placeholder values.
    pub fn insecure_defaults(&self) -> Vec<&'static str> {
        let mut insecure = Vec::new();
        if self.token.secret == DEFAULT_JWT_SECRET {
            insecure.push("JWT_SECRET");
        }
        if self.credentials.cipher_key == DEFAULT_CIPHER_KEY {
            insecure.push("BCM_AES_KEY");
        }
        if self.credentials.expected_salt == DEFAULT_EXPECTED_SALT {
            insecure.push("BCM_AES_SALT");
        }
        insecure
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value: v,
        }),
    }
}
