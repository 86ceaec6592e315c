//! Authentication and credential transport configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Secret shipped for local development only
pub const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_DEV_SECRET";

/// Longest lifetime a token may be configured with.
///
/// chrono durations count milliseconds in an `i64`.
pub const MAX_TOKEN_LIFETIME_SECONDS: i64 = i64::MAX / 1_000;

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Shared secret used to sign and verify every credential
    pub secret: String,

    /// HMAC algorithm name (HS256, HS384 or HS512)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Access token lifetime in minutes
    #[serde(default = "default_access_minutes")]
    pub access_token_expiry_minutes: i64,

    /// Refresh token lifetime in days
    #[serde(default = "default_refresh_days")]
    pub refresh_token_expiry_days: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            algorithm: default_algorithm(),
            access_token_expiry_minutes: default_access_minutes(),
            refresh_token_expiry_days: default_refresh_days(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry_minutes = minutes;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry_days = days;
        self
    }

    /// Access token lifetime in seconds
    pub fn access_token_expiry_seconds(&self) -> Result<i64, ConfigError> {
        lifetime_seconds("access", self.access_token_expiry_minutes, 60)
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_expiry_seconds(&self) -> Result<i64, ConfigError> {
        lifetime_seconds("refresh", self.refresh_token_expiry_days, 86_400)
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

fn lifetime_seconds(kind: &str, value: i64, unit_seconds: i64) -> Result<i64, ConfigError> {
    value
        .checked_mul(unit_seconds)
        .filter(|seconds| *seconds <= MAX_TOKEN_LIFETIME_SECONDS)
        .ok_or_else(|| ConfigError::Invalid(format!("{} token lifetime is too large", kind)))
}

/// How credentials travel between client and server.
///
/// Exactly one mode is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// HTTP-only cookies set by the server
    Cookie,
    /// `Authorization: Bearer` header and JSON bodies
    Bearer,
}

impl Default for TransportMode {
    fn default() -> Self {
        TransportMode::Cookie
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Cookie => write!(f, "cookie"),
            TransportMode::Bearer => write!(f, "bearer"),
        }
    }
}

impl std::str::FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cookie" => Ok(TransportMode::Cookie),
            "bearer" | "header" => Ok(TransportMode::Bearer),
            _ => Err(format!("Invalid transport mode: {}", s)),
        }
    }
}

/// Cookie attributes used in cookie transport mode
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    /// Name of the access token cookie
    #[serde(default = "default_access_cookie")]
    pub access_name: String,

    /// Name of the refresh token cookie
    #[serde(default = "default_refresh_cookie")]
    pub refresh_name: String,

    /// Cookie domain attribute
    #[serde(default)]
    pub domain: Option<String>,

    /// Cookie path attribute
    #[serde(default = "default_cookie_path")]
    pub path: String,

    /// Secure flag (HTTPS only)
    #[serde(default)]
    pub secure: bool,

    /// SameSite attribute (Strict, Lax or None)
    #[serde(default = "default_same_site")]
    pub same_site: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_name: default_access_cookie(),
            refresh_name: default_refresh_cookie(),
            domain: None,
            path: default_cookie_path(),
            secure: false,
            same_site: default_same_site(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Transport mode the token engine renders credentials for
    #[serde(default)]
    pub transport: TransportMode,

    /// Cookie attributes (cookie mode only)
    #[serde(default)]
    pub cookie: CookieConfig,
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_access_minutes() -> i64 {
    30
}

fn default_refresh_days() -> i64 {
    1
}

fn default_access_cookie() -> String {
    String::from("access_token")
}

fn default_refresh_cookie() -> String {
    String::from("refresh_token")
}

fn default_cookie_path() -> String {
    String::from("/")
}

fn default_same_site() -> String {
    String::from("Lax")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_expiry_conversions() {
        let config = JwtConfig::new("secret")
            .with_access_expiry_minutes(15)
            .with_refresh_expiry_days(7);

        assert_eq!(config.access_token_expiry_seconds().unwrap(), 900);
        assert_eq!(config.refresh_token_expiry_seconds().unwrap(), 604_800);
        assert!(!config.is_using_default_secret());
        assert!(JwtConfig::default().is_using_default_secret());
    }

    #[test]
    fn test_oversized_expiry_is_invalid() {
        let config = JwtConfig::new("secret")
            .with_access_expiry_minutes(i64::MAX / 2)
            .with_refresh_expiry_days(i64::MAX);

        assert!(matches!(
            config.access_token_expiry_seconds(),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            config.refresh_token_expiry_seconds(),
            Err(ConfigError::Invalid(_))
        ));

        // fits in i64 seconds but not in a chrono duration
        let config = JwtConfig::new("secret").with_refresh_expiry_days(i64::MAX / 86_400);
        assert!(config.refresh_token_expiry_seconds().is_err());
    }

    #[test]
    fn test_transport_mode_parsing() {
        assert_eq!("cookie".parse::<TransportMode>().unwrap(), TransportMode::Cookie);
        assert_eq!("BEARER".parse::<TransportMode>().unwrap(), TransportMode::Bearer);
        assert!("smoke-signal".parse::<TransportMode>().is_err());
        assert_eq!(TransportMode::Bearer.to_string(), "bearer");
    }

    #[test]
    fn test_cookie_defaults() {
        let cookie = CookieConfig::default();
        assert_eq!(cookie.access_name, "access_token");
        assert_eq!(cookie.refresh_name, "refresh_token");
        assert_eq!(cookie.same_site, "Lax");
        assert!(!cookie.secure);
    }
}
