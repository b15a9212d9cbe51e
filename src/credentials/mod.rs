use std::sync::Arc;

use crate::{LoadResult, LoaderError};

/// Environment variable consulted when no explicit API key is configured
pub const API_KEY_ENV_VAR: &str = "SUPADATA_API_KEY";

/// Source of configuration values such as environment variables
#[cfg_attr(test, mockall::automock)]
pub trait ConfigProvider: Send + Sync {
    /// Look up a value by name
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads values from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConfigProvider;

impl ConfigProvider for EnvConfigProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Resolves the Supadata API key for each load call
#[derive(Clone)]
pub struct CredentialResolver {
    provider: Arc<dyn ConfigProvider>,
}

impl CredentialResolver {
    pub fn new(provider: Arc<dyn ConfigProvider>) -> Self {
        Self { provider }
    }

    /// Return the explicit key if non-empty, else `SUPADATA_API_KEY` from the provider.
    pub fn resolve(&self, explicit: Option<&str>) -> LoadResult<String> {
        if let Some(key) = explicit.filter(|key| !key.is_empty()) {
            return Ok(key.to_string());
        }

        match self.provider.get(API_KEY_ENV_VAR) {
            Some(key) if !key.is_empty() => {
                tracing::debug!("Using API key from {}", API_KEY_ENV_VAR);
                Ok(key)
            }
            _ => Err(LoaderError::Configuration(format!(
                "Supadata API key not found. Pass an API key to the loader or set the {} environment variable.",
                API_KEY_ENV_VAR
            ))),
        }
    }
}
