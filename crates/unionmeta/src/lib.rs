//! sw-unionmeta: the `unionmeta` overlay backend
//!
//! Exposes an S3 location under the `unionmeta` kind. The same credentials
//! and buckets are used; only the URL scheme that items report changes.
//! Validation is the S3 validator and construction reuses the S3
//! constructor.

use futures::future::BoxFuture;
use sw_core::{Config, Error, Location, OverlayLocation, Registration, Registry, Result};

/// Kind name and URL scheme of this backend
pub const KIND: &str = "unionmeta";

/// Construct the wrapped S3 location and overlay it
pub fn make(config: &dyn Config) -> BoxFuture<'_, Result<Box<dyn Location>>> {
    Box::pin(async move {
        let inner = sw_s3::make(config).await.map_err(|e| match e {
            Error::InvalidConfig(_) => e,
            other => Error::construction("failed to initialize the underlying location", other),
        })?;

        tracing::debug!(kind = KIND, target = sw_s3::KIND, "overlaying location");
        Ok(Box::new(OverlayLocation::new(KIND, sw_s3::KIND, inner)) as Box<dyn Location>)
    })
}

/// Registration entry for the overlay
pub fn registration() -> Registration {
    Registration::new(KIND, make, sw_s3::validate)
}

/// Add the overlay to a registry
pub fn register(registry: &mut Registry) -> Result<()> {
    registry.register(registration())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_core::ConfigMap;
    use url::Url;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        sw_s3::register(&mut registry).unwrap();
        register(&mut registry).unwrap();
        registry
    }

    #[test]
    fn test_schemes_are_disjoint() {
        let registry = registry();
        let url = Url::parse("unionmeta://s3-eu-west-1.amazonaws.com/bucket1/obj.txt").unwrap();
        assert_eq!(registry.match_url(&url).unwrap(), KIND);

        let url = Url::parse("s3://s3-eu-west-1.amazonaws.com/bucket1/obj.txt").unwrap();
        assert_eq!(registry.match_url(&url).unwrap(), sw_s3::KIND);
    }

    #[test]
    fn test_shares_s3_validator() {
        let registry = registry();
        let config = ConfigMap::new().with("auth_type", "iam");
        assert!(registry.validate(KIND, &config).is_ok());

        let config = ConfigMap::new().with("access_key_id", "AKIDEXAMPLE");
        let err = registry.validate(KIND, &config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg == "missing secret_key"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = registry();
        assert!(matches!(
            register(&mut registry).unwrap_err(),
            Error::KindExists(kind) if kind == KIND
        ));
    }

    #[tokio::test]
    async fn test_make_without_validation_keeps_config_errors() {
        let err = make(&ConfigMap::new()).await.err().unwrap();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg == "missing access_key_id"));
    }

    #[tokio::test]
    async fn test_dial_url() {
        let registry = registry();
        let config = ConfigMap::new()
            .with("access_key_id", "AKIDEXAMPLE")
            .with("secret_key", "secret")
            .with("region", "eu-west-1");
        let url = Url::parse("unionmeta://s3-eu-west-1.amazonaws.com/bucket1/obj.txt").unwrap();
        assert!(registry.dial_url(&url, &config).await.is_ok());
    }
}
