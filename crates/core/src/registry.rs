//! Kind registry and location resolver
//!
//! Backends describe themselves with a [`Registration`]: a kind name that is
//! also their URL scheme, a constructor, a URL matcher and a config
//! validator. A [`Registry`] is built once at startup and then only read, so
//! resolution takes `&self` while registration needs `&mut self`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::traits::Location;

/// Builds a location from config
pub type MakeFn = for<'a> fn(&'a dyn Config) -> BoxFuture<'a, Result<Box<dyn Location>>>;

/// Checks config without performing I/O
pub type ValidateFn = fn(&dyn Config) -> Result<()>;

/// Decides whether a URL addresses this backend
pub type MatchFn = Arc<dyn Fn(&Url) -> bool + Send + Sync>;

/// Everything the registry knows about one backend
#[derive(Clone)]
pub struct Registration {
    kind: &'static str,
    make: MakeFn,
    matches: MatchFn,
    validate: ValidateFn,
}

impl Registration {
    /// Register `kind` with a matcher that accepts URLs whose scheme equals the kind
    pub fn new(kind: &'static str, make: MakeFn, validate: ValidateFn) -> Self {
        Self {
            kind,
            make,
            matches: Arc::new(move |url: &Url| url.scheme() == kind),
            validate,
        }
    }

    /// Replace the default scheme matcher
    pub fn with_matcher(mut self, matches: impl Fn(&Url) -> bool + Send + Sync + 'static) -> Self {
        self.matches = Arc::new(matches);
        self
    }

    /// Kind name
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Whether this backend claims the URL
    pub fn matches(&self, url: &Url) -> bool {
        (self.matches)(url)
    }

    /// Run the validator
    pub fn validate(&self, config: &dyn Config) -> Result<()> {
        (self.validate)(config)
    }

    /// Run the constructor without validating first
    pub async fn make(&self, config: &dyn Config) -> Result<Box<dyn Location>> {
        (self.make)(config).await
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Table of registered backends
#[derive(Debug, Default)]
pub struct Registry {
    kinds: BTreeMap<&'static str, Registration>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a backend
    ///
    /// A kind can only be registered once; a second registration fails with
    /// [`Error::KindExists`] and leaves the first one in place.
    pub fn register(&mut self, registration: Registration) -> Result<()> {
        let kind = registration.kind;
        if self.kinds.contains_key(kind) {
            return Err(Error::KindExists(kind.to_string()));
        }
        tracing::debug!(kind, "registered storage kind");
        self.kinds.insert(kind, registration);
        Ok(())
    }

    /// Find a backend by kind
    pub fn lookup(&self, kind: &str) -> Result<&Registration> {
        self.kinds
            .get(kind)
            .ok_or_else(|| Error::UnknownKind(kind.to_string()))
    }

    /// Find the single backend whose matcher accepts `url`
    pub fn match_url(&self, url: &Url) -> Result<&'static str> {
        let claimed: Vec<&'static str> = self
            .kinds
            .values()
            .filter(|r| r.matches(url))
            .map(|r| r.kind)
            .collect();

        match claimed.as_slice() {
            [] => Err(Error::UnknownKind(url.scheme().to_string())),
            [kind] => Ok(*kind),
            _ => Err(Error::AmbiguousKind {
                url: url.to_string(),
                kinds: claimed.iter().map(|k| k.to_string()).collect(),
            }),
        }
    }

    /// Registered kinds in sorted order
    pub fn kinds(&self) -> Vec<&'static str> {
        self.kinds.keys().copied().collect()
    }

    /// Validate config for a kind without constructing anything
    pub fn validate(&self, kind: &str, config: &dyn Config) -> Result<()> {
        self.lookup(kind)?.validate(config)
    }

    /// Validate config and then construct a location of the given kind
    pub async fn dial(&self, kind: &str, config: &dyn Config) -> Result<Box<dyn Location>> {
        let registration = self.lookup(kind)?;
        registration.validate(config)?;
        tracing::debug!(kind, "dialing location");
        registration.make(config).await
    }

    /// Pick the kind from the URL, then [`Registry::dial`] it
    pub async fn dial_url(&self, url: &Url, config: &dyn Config) -> Result<Box<dyn Location>> {
        let kind = self.match_url(url)?;
        self.dial(kind, config).await
    }
}
