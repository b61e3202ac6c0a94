//! Authentication token
//!
//! Tokens are issued elsewhere (Keystone, TempAuth, ...). The client only
//! needs the identifier for `X-Auth-Token` and a way to tell whether the
//! token can still be used.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// An opaque Swift auth token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<Timestamp>,
}

impl Token {
    /// Create a token that never expires on the client side
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expires_at: None,
        }
    }

    /// Create a token with a known expiry
    pub fn with_expiry(id: impl Into<String>, expires_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Identifier sent in the `X-Auth-Token` header
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Whether the token is non-empty and not past its expiry
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Timestamp::now())
    }

    fn is_valid_at(&self, now: Timestamp) -> bool {
        !self.id.is_empty() && self.expires_at.is_none_or(|t| t > now)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("id", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::ToSpan;

    #[test]
    fn test_token_without_expiry_is_valid() {
        assert!(Token::new("AUTH_tk123").is_valid());
    }

    #[test]
    fn test_empty_token_is_invalid() {
        assert!(!Token::new("").is_valid());
    }

    #[test]
    fn test_token_expiry() {
        let now = Timestamp::now();
        let token = Token::with_expiry("AUTH_tk123", now + 1.hour());
        assert!(token.is_valid_at(now));
        assert!(!token.is_valid_at(now + 2.hours()));
    }

    #[test]
    fn test_debug_redacts_id() {
        let rendered = format!("{:?}", Token::new("secret-token"));
        assert!(!rendered.contains("secret-token"));
    }
}
