//! Credential seam for bearer-token authentication
//!
//! The connector never acquires tokens itself. Callers supply a
//! [`TokenCredential`] (typically backed by an external identity library or
//! agent) and the driver asks it for a fresh token before each new physical
//! connection is opened.

use crate::{KustoqlError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// The audience tokens must be issued for when talking to a Kusto cluster.
pub const KUSTO_TOKEN_RESOURCE: &str = "https://kusto.kusto.windows.net/";

/// A bearer token together with its expiry, if known
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    /// Expiry timestamp, if the issuer reported one
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Create a token without expiry information
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_on: None,
        }
    }

    /// Create a token with a known expiry
    pub fn with_expiry(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on: Some(expires_on),
        }
    }

    /// The raw bearer token
    pub fn secret(&self) -> &str {
        &self.token
    }
}

// The token itself never appears in Debug output or logs.
impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens for connection authentication
///
/// Implementations are expected to return a token valid for
/// [`KUSTO_TOKEN_RESOURCE`]. Failures propagate unchanged to the caller that
/// requested the connection; no retry is performed here.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Produce a bearer token
    async fn token(&self) -> Result<AccessToken>;
}

/// Credential wrapping a fixed, caller-provided token
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    /// Create a credential that always returns the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn token(&self) -> Result<AccessToken> {
        Ok(AccessToken::new(self.token.clone()))
    }
}

impl std::fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenCredential").finish_non_exhaustive()
    }
}

/// Credential reading a token from an environment variable on every request
///
/// Useful where an external agent keeps a token fresh in the process
/// environment (CI jobs, notebook kernels).
#[derive(Debug)]
pub struct EnvTokenCredential {
    var: String,
}

impl EnvTokenCredential {
    /// Create a credential backed by the named environment variable
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl TokenCredential for EnvTokenCredential {
    async fn token(&self) -> Result<AccessToken> {
        tracing::debug!(var = %self.var, "reading bearer token from environment");
        match std::env::var(&self.var) {
            Ok(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            Ok(_) => Err(KustoqlError::Credential(format!(
                "environment variable '{}' is empty",
                self.var
            ))),
            Err(_) => Err(KustoqlError::Credential(format!(
                "environment variable '{}' is not set",
                self.var
            ))),
        }
    }
}

/// Credential adapter over a caller-supplied callback
pub struct CallbackCredential<F> {
    callback: F,
}

impl<F> CallbackCredential<F>
where
    F: Fn() -> Result<AccessToken> + Send + Sync,
{
    /// Wrap a callback as a credential
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> TokenCredential for CallbackCredential<F>
where
    F: Fn() -> Result<AccessToken> + Send + Sync,
{
    async fn token(&self) -> Result<AccessToken> {
        (self.callback)()
    }
}

impl<F> std::fmt::Debug for CallbackCredential<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackCredential").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_credential_returns_token() {
        let cred = StaticTokenCredential::new("tok-123");
        let token = cred.token().await.unwrap();
        assert_eq!(token.secret(), "tok-123");
        assert!(token.expires_on.is_none());
    }

    #[tokio::test]
    async fn test_env_credential_missing_var() {
        let cred = EnvTokenCredential::new("KUSTOQL_TEST_TOKEN_THAT_DOES_NOT_EXIST");
        let err = cred.token().await.unwrap_err();
        assert!(matches!(err, KustoqlError::Credential(_)));
    }

    #[tokio::test]
    async fn test_callback_credential_propagates_failure() {
        let cred = CallbackCredential::new(|| {
            Err(KustoqlError::Credential("issuer unavailable".into()))
        });
        let err = cred.token().await.unwrap_err();
        assert!(err.to_string().contains("issuer unavailable"));
    }

    #[test]
    fn test_access_token_with_expiry() {
        let expires = chrono::Utc::now() + chrono::Duration::minutes(30);
        let token = AccessToken::with_expiry("tok", expires);
        assert_eq!(token.secret(), "tok");
        assert_eq!(token.expires_on, Some(expires));
    }

    #[test]
    fn test_access_token_debug_redacts_secret() {
        let token = AccessToken::new("very-secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("redacted"));
    }
}
