//! sw-s3: S3 backend for stowage
//!
//! Implements the Location / Container / Item traits from sw-core on top of
//! aws-sdk-s3. It is the only crate that directly depends on the AWS SDK.
//!
//! Register it with [`register`]; the kind (and URL scheme) is [`KIND`].

pub mod config;
pub mod container;
pub mod item;
pub mod location;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use futures::future::BoxFuture;
use sw_core::{Config, Location, Registration, Registry, Result};

pub use config::{SessionSettings, validate};
pub use container::S3Container;
pub use item::{S3Item, object_url};
pub use location::S3Location;

/// Kind name and URL scheme of this backend
pub const KIND: &str = "s3";

/// Construct an S3 location from config
pub fn make(config: &dyn Config) -> BoxFuture<'_, Result<Box<dyn Location>>> {
    Box::pin(async move {
        let location = S3Location::new(config).await?;
        Ok(Box::new(location) as Box<dyn Location>)
    })
}

/// Registration entry for the S3 backend
pub fn registration() -> Registration {
    Registration::new(KIND, make, validate)
}

/// Add the S3 backend to a registry
pub fn register(registry: &mut Registry) -> Result<()> {
    registry.register(registration())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_core::{ConfigMap, Error};
    use url::Url;

    #[test]
    fn test_register_once() {
        let mut registry = Registry::new();
        register(&mut registry).unwrap();
        assert_eq!(registry.kinds(), vec!["s3"]);
        assert!(matches!(
            register(&mut registry).unwrap_err(),
            Error::KindExists(_)
        ));
    }

    #[test]
    fn test_matches_only_own_scheme() {
        let registration = registration();
        let url = Url::parse("s3://s3-eu-west-1.amazonaws.com/bucket1/obj.txt").unwrap();
        assert!(registration.matches(&url));

        let url = Url::parse("unionmeta://s3-eu-west-1.amazonaws.com/bucket1/obj.txt").unwrap();
        assert!(!registration.matches(&url));
    }

    #[tokio::test]
    async fn test_dial_validates_first() {
        let mut registry = Registry::new();
        register(&mut registry).unwrap();

        let config = ConfigMap::new().with("auth_type", "token");
        let err = registry.dial(KIND, &config).await.err().unwrap();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg.contains("invalid auth_type")));

        let config = ConfigMap::new()
            .with("access_key_id", "AKIDEXAMPLE")
            .with("secret_key", "secret");
        assert!(registry.dial(KIND, &config).await.is_ok());
    }
}
