//! Client configuration

use crate::error::{FiberyError, FiberyResult};
use crate::identity::IdentityKeys;
use std::fmt;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoint, credentials and request policy
#[derive(Clone)]
pub struct ClientConfig {
    /// Commands endpoint, e.g. `https://acme.fibery.io/api/commands`
    pub base_url: String,
    /// API token sent as `Authorization: Token <token>`
    pub token: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Record attributes identity is derived from
    pub identity_keys: IdentityKeys,
}

impl ClientConfig {
    /// Create configuration with default timeout and identity keys
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
            identity_keys: IdentityKeys::default(),
        }
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// With identity attributes
    #[inline]
    #[must_use]
    pub fn with_identity_keys(mut self, keys: IdentityKeys) -> Self {
        self.identity_keys = keys;
        self
    }

    /// Reject configurations that cannot reach the API
    pub fn validate(&self) -> FiberyResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(FiberyError::InvalidConfig(
                "API_FIBERY_URL is required".to_string(),
            ));
        }
        if self.token.trim().is_empty() {
            return Err(FiberyError::InvalidConfig(
                "API_FIBERY_TOKEN is required".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(FiberyError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("identity_keys", &self.identity_keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_url_or_token() {
        assert!(matches!(
            ClientConfig::new("", "token").validate(),
            Err(FiberyError::InvalidConfig(_))
        ));
        assert!(matches!(
            ClientConfig::new("https://acme.fibery.io/api/commands", " ").validate(),
            Err(FiberyError::InvalidConfig(_))
        ));
        assert!(ClientConfig::new("https://acme.fibery.io/api/commands", "t")
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = ClientConfig::new("https://acme.fibery.io/api/commands", "t")
            .with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let config = ClientConfig::new("https://acme.fibery.io/api/commands", "s3cret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
