//! Bearer transport rendering

use serde::{Deserialize, Serialize};

use crate::domain::entities::token::TokenPair;
use crate::errors::DomainError;

/// The `tokens` object merged into bearer-mode response bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl BearerTokens {
    pub fn from_pair(pair: &TokenPair) -> Self {
        Self {
            access_token: pair.access.token.clone(),
            refresh_token: pair.refresh.token.clone(),
            token_type: "bearer".to_string(),
            expires_in: pair.access.ttl_seconds,
        }
    }
}

/// Add `tokens` to a serialized JSON object, keeping its other top-level fields.
///
/// Returns the new serialized body; its length is the response's content length.
pub fn merge_into_body(body: &[u8], tokens: &BearerTokens) -> Result<Vec<u8>, DomainError> {
    let mut value: serde_json::Value = if body.is_empty() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice(body).map_err(|e| DomainError::Internal {
            message: format!("Response body is not JSON: {}", e),
        })?
    };

    let object = value.as_object_mut().ok_or_else(|| DomainError::Internal {
        message: "Response body is not a JSON object".to_string(),
    })?;

    let tokens = serde_json::to_value(tokens).map_err(|e| DomainError::Internal {
        message: format!("Failed to serialize tokens: {}", e),
    })?;
    object.insert("tokens".to_string(), tokens);

    serde_json::to_vec(&value).map_err(|e| DomainError::Internal {
        message: format!("Failed to serialize response body: {}", e),
    })
}
