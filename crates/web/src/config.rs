//! Lens configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LENS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `LENS_HMAC_KEY` - Remember-token HMAC key (min 32 chars, high entropy)
//! - `LENS_PASSWORD_PEPPER` - Password pepper (min 32 chars, high entropy)
//!
//! ## Optional
//! - `LENS_HOST` - Bind address (default: 127.0.0.1)
//! - `LENS_PORT` - Listen port (default: 3000)
//! - `LENS_ENV` - `development` or `production` (default: development)
//! - `LENS_COOKIE_NAME` - Remember-token cookie name (default: `remember_token`)
//! - `LENS_COOKIE_MAX_AGE_DAYS` - Cookie lifetime; unset means a browser-session cookie
//! - `LENS_ARGON2_MEMORY_KIB` - Argon2 memory cost (default: 19456)
//! - `LENS_ARGON2_ITERATIONS` - Argon2 time cost (default: 2)
//! - `LENS_ARGON2_PARALLELISM` - Argon2 lanes (default: 1)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//!
//! Rotating `LENS_HMAC_KEY` invalidates every outstanding remember token;
//! users simply log in again.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default remember-token cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "remember_token";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Lens application configuration.
///
/// Built once at startup and handed by reference to the services that need
/// it; nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct LensConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Secrets and cost parameters for the authentication core
    pub auth: AuthConfig,
    /// Remember-token cookie attributes
    pub cookie: CookieConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Secrets and parameters for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Key for the remember-token HMAC
    pub hmac_key: SecretString,
    /// Server-side secret mixed into every password hash
    pub pepper: SecretString,
    /// Argon2 cost parameters
    pub password: PasswordParams,
}

/// Argon2id cost parameters. A deployment tuning knob, not a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Attributes of the remember-token cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// Cookie name, read back by the identity middleware
    pub name: String,
    /// Send only over HTTPS
    pub secure: bool,
    /// Lifetime in days; `None` expires with the browser session
    pub max_age_days: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_owned(),
            secure: false,
            max_age_days: None,
        }
    }
}

impl LensConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (length, placeholder detection, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("LENS_DATABASE_URL")?;
        let host = parse_env_or_default::<IpAddr>("LENS_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("LENS_PORT", "3000")?;
        let environment = parse_env_or_default::<Environment>("LENS_ENV", "development")?;

        let auth = AuthConfig::from_env()?;
        let cookie = CookieConfig::from_env(environment)?;

        Ok(Self {
            database_url,
            host,
            port,
            environment,
            auth,
            cookie,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let hmac_key = get_validated_secret("LENS_HMAC_KEY")?;
        let pepper = get_validated_secret("LENS_PASSWORD_PEPPER")?;

        let defaults = PasswordParams::default();
        let password = PasswordParams {
            memory_kib: parse_env_or_default(
                "LENS_ARGON2_MEMORY_KIB",
                &defaults.memory_kib.to_string(),
            )?,
            iterations: parse_env_or_default(
                "LENS_ARGON2_ITERATIONS",
                &defaults.iterations.to_string(),
            )?,
            parallelism: parse_env_or_default(
                "LENS_ARGON2_PARALLELISM",
                &defaults.parallelism.to_string(),
            )?,
        };

        Ok(Self {
            hmac_key,
            pepper,
            password,
        })
    }
}

impl CookieConfig {
    fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        let name = get_env_or_default("LENS_COOKIE_NAME", DEFAULT_COOKIE_NAME);
        validate_cookie_name(&name, "LENS_COOKIE_NAME")?;

        let max_age_days = get_optional_env("LENS_COOKIE_MAX_AGE_DAYS")
            .map(|v| {
                v.parse::<i64>()
                    .ok()
                    .filter(|days| *days > 0)
                    .ok_or_else(|| {
                        ConfigError::InvalidEnvVar(
                            "LENS_COOKIE_MAX_AGE_DAYS".to_string(),
                            format!("expected a positive number of days, got '{v}'"),
                        )
                    })
            })
            .transpose()?;

        Ok(Self {
            name,
            secure: environment.is_production(),
            max_age_days,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Cookie names are RFC 6265 tokens.
fn validate_cookie_name(name: &str, var_name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("'{name}' is not a valid cookie name"),
        ))
    }
}

/// Validate that a secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    let secret = SecretString::from(value);
    validate_secret_length(&secret, key)?;
    Ok(secret)
}
