//! Credential values injected into outgoing requests.
//!
//! # Design Decisions
//! - Read once from the process environment at start-up, after `.env` is loaded
//! - `Debug` never prints the value
//! - Memory is zeroed on drop

use std::collections::HashMap;
use std::sync::Arc;

use zeroize::Zeroizing;

/// A secret string. Cloning shares the same allocation.
#[derive(Clone)]
pub struct Secret(Arc<Zeroizing<String>>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Arc::new(Zeroizing::new(value.into())))
    }

    /// Access the raw value. Callers must not log it.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// Named secrets available to request transforms.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    values: HashMap<String, Secret>,
}

impl Secrets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read each key from the process environment. Unset or empty keys are
    /// skipped; the route table reports them when a transform needs them.
    pub fn from_env<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut secrets = Self::new();
        for key in keys {
            match std::env::var(key) {
                Ok(value) if !value.is_empty() => secrets.insert(key, value),
                _ => tracing::debug!(key = %key, "Secret not set in environment"),
            }
        }
        secrets
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), Secret::new(value));
    }

    pub fn get(&self, key: &str) -> Option<&Secret> {
        self.values.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_redacted() {
        let secret = Secret::new("hunter2");
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("hunter2"));

        let mut secrets = Secrets::new();
        secrets.insert("API_KEY", "hunter2");
        assert!(!format!("{:?}", secrets).contains("hunter2"));
        assert_eq!(secrets.get("API_KEY").map(Secret::expose), Some("hunter2"));
    }

    #[test]
    fn from_env_skips_unset_keys() {
        let secrets = Secrets::from_env(["API_GATEWAY_TEST_SURELY_UNSET_KEY"]);
        assert!(secrets.get("API_GATEWAY_TEST_SURELY_UNSET_KEY").is_none());
    }

    #[test]
    fn from_env_sees_dotenv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "API_GATEWAY_TEST_DOTENV_KEY=from-dotenv\nAPI_GATEWAY_TEST_DOTENV_EMPTY=\n",
        )
        .unwrap();

        dotenvy::from_path(&path).unwrap();
        let secrets = Secrets::from_env([
            "API_GATEWAY_TEST_DOTENV_KEY",
            "API_GATEWAY_TEST_DOTENV_EMPTY",
        ]);

        assert_eq!(
            secrets.get("API_GATEWAY_TEST_DOTENV_KEY").map(Secret::expose),
            Some("from-dotenv")
        );
        assert!(secrets.get("API_GATEWAY_TEST_DOTENV_EMPTY").is_none());
    }
}
