//! Configuration for the token service

use chrono::Duration;
use jsonwebtoken::Algorithm;
use tk_shared::{AuthConfig, TransportMode};

use crate::domain::entities::token::TokenKind;
use crate::errors::DomainError;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Shared HMAC signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm, HMAC family only
    pub algorithm: Algorithm,
    /// Default access token lifetime
    pub access_ttl: Duration,
    /// Default refresh token lifetime
    pub refresh_ttl: Duration,
    /// Transport mode this engine renders credentials for
    pub transport: TransportMode,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            access_ttl: Duration::minutes(30),
            refresh_ttl: Duration::days(1),
            transport: TransportMode::Cookie,
        }
    }
}

impl TokenServiceConfig {
    /// Build from the `auth` configuration section
    pub fn from_auth_config(auth: &AuthConfig) -> Result<Self, DomainError> {
        let algorithm = parse_hmac_algorithm(&auth.jwt.algorithm)?;

        Ok(Self {
            jwt_secret: auth.jwt.secret.clone(),
            algorithm,
            access_ttl: Duration::seconds(auth.jwt.access_token_expiry_seconds()?),
            refresh_ttl: Duration::seconds(auth.jwt.refresh_token_expiry_seconds()?),
            transport: auth.transport,
        })
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    pub fn with_transport(mut self, transport: TransportMode) -> Self {
        self.transport = transport;
        self
    }

    /// Default lifetime for `kind`
    pub fn ttl_for(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Reject anything the engine cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(DomainError::configuration(format!(
                "Unsupported signing algorithm: {:?}",
                self.algorithm
            )));
        }
        if self.jwt_secret.is_empty() {
            return Err(DomainError::configuration("JWT secret must not be empty"));
        }
        if self.access_ttl <= Duration::zero() || self.access_ttl >= self.refresh_ttl {
            return Err(DomainError::configuration(
                "Access token lifetime must be positive and shorter than refresh token lifetime",
            ));
        }
        Ok(())
    }
}

fn parse_hmac_algorithm(name: &str) -> Result<Algorithm, DomainError> {
    match name.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(DomainError::configuration(format!(
            "Unsupported signing algorithm: {}",
            other
        ))),
    }
}
