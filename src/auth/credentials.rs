//! Credential management for Bybit API authentication.
//!
//! A [`Credentials`] pair consists of the API key, which travels in the
//! clear (the `X-BAPI-API-KEY` header and the WebSocket auth frame), and
//! the API secret, which never leaves the process: it is only fed into the
//! HMAC signer. The secret is wrapped in [`SecretString`] and redacted from
//! `Debug` output.
//!
//! Keys are environment-specific: mainnet, testnet and demo-trading keys
//! are issued separately and are not interchangeable.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

const DEFAULT_KEY_VAR: &str = "BYBIT_API_KEY";
const DEFAULT_SECRET_VAR: &str = "BYBIT_API_SECRET";

/// An API key and its signing secret.
#[derive(Clone)]
pub struct Credentials {
    /// Public key identifier, sent with every signed request.
    pub api_key: String,
    api_secret: SecretString,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
        }
    }

    /// Grants the signer access to the raw secret. Call sites outside the
    /// signing path should not need this.
    pub fn expose_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// Source of API credentials.
///
/// The clients accept any provider, so credentials can come from a config
/// file, a secrets manager or a vault instead of the built-in static and
/// environment-backed implementations.
pub trait CredentialsProvider: Send + Sync {
    fn get_credentials(&self) -> &Credentials;
}

/// Provider for credentials known at construction time.
#[derive(Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(api_key, api_secret),
        }
    }
}

impl From<Credentials> for StaticCredentials {
    fn from(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialsProvider for StaticCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl CredentialsProvider for Arc<StaticCredentials> {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Provider that loads the key pair from the environment, by default from
/// `BYBIT_API_KEY` and `BYBIT_API_SECRET`.
pub struct EnvCredentials {
    credentials: Credentials,
}

impl EnvCredentials {
    /// Loads `BYBIT_API_KEY` and `BYBIT_API_SECRET`.
    ///
    /// # Panics
    ///
    /// Panics if either variable is unset. Use [`Self::try_from_env`] to
    /// handle missing credentials gracefully.
    pub fn from_env() -> Self {
        Self::from_env_vars(DEFAULT_KEY_VAR, DEFAULT_SECRET_VAR)
    }

    /// Loads the key pair from the named variables, panicking when either
    /// is unset.
    pub fn from_env_vars(key_var: &str, secret_var: &str) -> Self {
        Self::try_from_env_vars(key_var, secret_var)
            .unwrap_or_else(|| panic!("environment variables {key_var}/{secret_var} not set"))
    }

    /// Loads `BYBIT_API_KEY` and `BYBIT_API_SECRET`, or `None` when either
    /// is unset.
    pub fn try_from_env() -> Option<Self> {
        Self::try_from_env_vars(DEFAULT_KEY_VAR, DEFAULT_SECRET_VAR)
    }

    /// Loads the key pair from the named variables, or `None` when either
    /// is unset.
    pub fn try_from_env_vars(key_var: &str, secret_var: &str) -> Option<Self> {
        let api_key = std::env::var(key_var).ok()?;
        let api_secret = std::env::var(secret_var).ok()?;
        Some(Self {
            credentials: Credentials::new(api_key, api_secret),
        })
    }
}

impl CredentialsProvider for EnvCredentials {
    fn get_credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret_but_shows_key() {
        let creds = Credentials::new("public-key-id", "very-secret-value");
        let debug = format!("{creds:?}");
        assert!(debug.contains("public-key-id"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("very-secret-value"));
    }

    #[test]
    fn test_provider_returns_stored_pair() {
        let provider = StaticCredentials::new("key", "secret");
        let creds = provider.get_credentials();
        assert_eq!(creds.api_key, "key");
        assert_eq!(creds.expose_secret(), "secret");
    }

    #[test]
    fn test_provider_works_as_shared_trait_object() {
        let provider: Arc<dyn CredentialsProvider> =
            Arc::new(StaticCredentials::from(Credentials::new("key", "secret")));
        assert_eq!(provider.get_credentials().api_key, "key");
    }

    #[test]
    fn test_try_from_env_vars_is_none_when_unset() {
        assert!(
            EnvCredentials::try_from_env_vars(
                "BYBIT_TEST_UNSET_KEY_VAR",
                "BYBIT_TEST_UNSET_SECRET_VAR"
            )
            .is_none()
        );
    }
}
