//! Opaque backend configuration
//!
//! A [`Config`] is a read-only option lookup handed to backend validators and
//! constructors. Only the backend that receives it interprets the keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Read-only option lookup passed to backends
///
/// `None` means the option is absent; `Some("")` means it is present but empty.
pub trait Config: Send + Sync {
    /// Look up a single option by name
    fn config(&self, name: &str) -> Option<String>;
}

/// In-memory [`Config`] backed by an ordered map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigMap(BTreeMap<String, String>);

impl ConfigMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace an option
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Number of options present
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no options are present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over options in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Config for ConfigMap {
    fn config(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
