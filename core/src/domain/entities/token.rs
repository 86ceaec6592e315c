//! Token entities for ledger-backed JWT credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Longest raw credential accepted from a client, in characters
pub const MAX_TOKEN_LENGTH: usize = 2048;

/// Kind of credential. Encoded in the `type` claim and the ledger `token_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TokenKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            other => Err(DomainError::BadRequest {
                message: format!("Unknown token kind: {}", other),
            }),
        }
    }
}

/// Claims structure for the JWT payload
///
/// `sub` and `type` are optional on the decoding side so that a credential
/// missing either one fails at its own verification stage instead of as a
/// decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Token kind name
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Random nonce, distinct for every credential
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    /// Creates claims for `owner_id` valid from `issued_at` until `expires_at`
    pub fn new(
        owner_id: Uuid,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: Some(owner_id.to_string()),
            token_type: Some(kind.as_str().to_string()),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Whether the `type` claim names `kind`
    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.token_type.as_deref() == Some(kind.as_str())
    }

    /// Gets the user ID from the claims, if present and well formed
    pub fn user_id(&self) -> Option<Uuid> {
        self.sub.as_deref().and_then(|sub| Uuid::parse_str(sub).ok())
    }
}

/// One row of the token ledger.
///
/// Created together with its credential; afterwards only `blacklisted` may
/// change, and only from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// The exact signed credential
    pub token: String,
    pub kind: TokenKind,
    pub blacklisted: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl LedgerRecord {
    pub fn new(
        owner_id: Uuid,
        token: String,
        kind: TokenKind,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            token,
            kind,
            blacklisted: false,
            created_at,
            expires_at,
        }
    }

    /// Not blacklisted and not yet expired at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.blacklisted && self.expires_at > now
    }
}

/// A freshly minted credential together with its lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
    /// Lifetime in whole seconds
    pub ttl_seconds: i64,
}

/// Access and refresh credentials issued together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

impl TokenPair {
    pub fn access_token(&self) -> &str {
        &self.access.token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh.token
    }
}

/// Named stages of credential verification, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationStage {
    Signature,
    Kind,
    Subject,
    LedgerLookup,
    LedgerValidity,
    Identity,
}

impl VerificationStage {
    /// The full pipeline. The first failing stage short-circuits the rest.
    pub const PIPELINE: [VerificationStage; 6] = [
        VerificationStage::Signature,
        VerificationStage::Kind,
        VerificationStage::Subject,
        VerificationStage::LedgerLookup,
        VerificationStage::LedgerValidity,
        VerificationStage::Identity,
    ];

    /// Stages that never touch a store
    pub fn is_pure(&self) -> bool {
        matches!(
            self,
            VerificationStage::Signature | VerificationStage::Kind | VerificationStage::Subject
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStage::Signature => "signature",
            VerificationStage::Kind => "kind",
            VerificationStage::Subject => "subject",
            VerificationStage::LedgerLookup => "ledger_lookup",
            VerificationStage::LedgerValidity => "ledger_validity",
            VerificationStage::Identity => "identity",
        }
    }
}

impl std::fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_token_kind_parsing() {
        assert_eq!("access".parse::<TokenKind>().unwrap(), TokenKind::Access);
        assert_eq!("refresh".parse::<TokenKind>().unwrap(), TokenKind::Refresh);

        let err = "session".parse::<TokenKind>().unwrap_err();
        assert!(matches!(err, DomainError::BadRequest { .. }));
    }

    #[test]
    fn test_claims_serialize_type_field() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let claims = Claims::new(owner, TokenKind::Refresh, now, now + Duration::days(1));

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "refresh");
        assert_eq!(json["sub"], owner.to_string());
        assert!(claims.is_kind(TokenKind::Refresh));
        assert!(!claims.is_kind(TokenKind::Access));
        assert_eq!(claims.user_id(), Some(owner));
    }

    #[test]
    fn test_claims_nonce_is_fresh() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let a = Claims::new(owner, TokenKind::Access, now, now + Duration::minutes(30));
        let b = Claims::new(owner, TokenKind::Access, now, now + Duration::minutes(30));
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_claims_without_subject() {
        let claims: Claims =
            serde_json::from_str(r#"{"type":"access","iat":1,"exp":2,"jti":"x"}"#).unwrap();
        assert_eq!(claims.sub, None);
        assert_eq!(claims.user_id(), None);

        let claims: Claims =
            serde_json::from_str(r#"{"sub":"not-a-uuid","iat":1,"exp":2}"#).unwrap();
        assert_eq!(claims.user_id(), None);
        assert!(!claims.is_kind(TokenKind::Access));
    }

    #[test]
    fn test_record_usability() {
        let now = Utc::now();
        let mut record = LedgerRecord::new(
            Uuid::new_v4(),
            "t".into(),
            TokenKind::Access,
            now,
            now + Duration::minutes(30),
        );

        assert!(record.is_usable_at(now));
        assert!(!record.is_usable_at(now + Duration::minutes(30)));

        record.blacklisted = true;
        assert!(!record.is_usable_at(now));
    }

    #[test]
    fn test_pipeline_order() {
        let pure: Vec<_> = VerificationStage::PIPELINE
            .iter()
            .take_while(|s| s.is_pure())
            .collect();
        assert_eq!(pure.len(), 3);
        assert_eq!(VerificationStage::PIPELINE[5], VerificationStage::Identity);
    }
}
