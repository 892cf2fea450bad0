//! Startup-time lookup of capabilities by symbolic key.
//!
//! Adapters and extensions are selected by type when a transaction is built.
//! Applications that pick them from configuration register the choices they
//! support here, once, and fetch them by the key their configuration names.

use indexmap::IndexMap;
use railway::ConfigurationError;
use tracing::debug;

/// Key to capability map, validated at registration.
#[derive(Debug, Clone)]
pub struct Registry<C> {
    kind: &'static str,
    entries: IndexMap<String, C>,
}

impl<C> Registry<C> {
    /// An empty registry; `kind` names what it holds in error messages.
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: IndexMap::new(),
        }
    }

    /// Register `capability` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateKey`] if `key` is already taken;
    /// the registered capability is kept.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        capability: C,
    ) -> Result<(), ConfigurationError> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(ConfigurationError::DuplicateKey {
                kind: self.kind,
                key,
            });
        }
        debug!(kind = self.kind, key = %key, "registered");
        self.entries.insert(key, capability);
        Ok(())
    }

    /// The capability registered under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownKey`] listing every registered key
    /// when `key` is not one of them.
    pub fn fetch(&self, key: &str) -> Result<&C, ConfigurationError> {
        self.entries
            .get(key)
            .ok_or_else(|| ConfigurationError::UnknownKey {
                kind: self.kind,
                key: key.to_string(),
                known: self.keys(),
            })
    }

    /// Registered keys in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapters() -> Registry<&'static str> {
        let mut registry = Registry::new("adapter");
        registry.register("canonical", "outcome").expect("fresh key");
        registry.register("result", "std result").expect("fresh key");
        registry
    }

    #[test]
    fn fetch_returns_the_registered_capability() -> Result<(), ConfigurationError> {
        let registry = adapters();

        assert_eq!(*registry.fetch("result")?, "std result");
        assert_eq!(registry.len(), 2);
        Ok(())
    }

    #[test]
    fn unknown_key_lists_what_is_known() {
        let error = adapters().fetch("maybe").expect_err("maybe is not registered");

        assert_eq!(
            error,
            ConfigurationError::UnknownKey {
                kind: "adapter",
                key: "maybe".to_string(),
                known: vec!["canonical".to_string(), "result".to_string()],
            }
        );
        assert_eq!(
            error.to_string(),
            "adapter 'maybe' is not known; known adapters are: canonical, result"
        );
    }

    #[test]
    fn duplicate_key_is_rejected_and_keeps_the_first() {
        let mut registry = adapters();

        let error = registry
            .register("result", "something else")
            .expect_err("result is taken");

        assert!(matches!(
            error,
            ConfigurationError::DuplicateKey { kind: "adapter", ref key } if key == "result"
        ));
        assert_eq!(registry.fetch("result").ok(), Some(&"std result"));
    }

    #[test]
    fn new_registry_is_empty() {
        let registry: Registry<u8> = Registry::new("extension");

        assert!(registry.is_empty());
        assert!(registry.keys().is_empty());
    }
}
