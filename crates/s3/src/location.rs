//! S3 location
//!
//! A location owns one client plus the settings it was built from. Containers
//! in another region get their own region-pinned client.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use url::Url;

use sw_core::{Config, Container, Error, Item, ListOptions, Location, Page, Result};

use crate::config::{DEFAULT_REGION, SessionSettings};
use crate::container::S3Container;
use crate::session::{build_client, classify, new_client};

/// One configured S3 session
pub struct S3Location {
    client: aws_sdk_s3::Client,
    settings: SessionSettings,
}

impl S3Location {
    /// Build a location from config, using the config's region
    pub async fn new(config: &dyn Config) -> Result<Self> {
        Self::with_region(config, "").await
    }

    /// Build a location, preferring `region` over the config's region when non-empty
    pub async fn with_region(config: &dyn Config, region: &str) -> Result<Self> {
        let (client, settings) = new_client(config, region).await?;
        Ok(Self { client, settings })
    }

    /// Resolved region of the session
    pub fn region(&self) -> &str {
        &self.settings.region
    }

    /// Custom endpoint, if one was configured
    pub fn endpoint(&self) -> Option<&str> {
        self.settings.endpoint.as_deref()
    }

    /// Underlying SDK client
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }

    fn container_handle(&self, name: &str, region: String, client: aws_sdk_s3::Client) -> S3Container {
        S3Container {
            name: name.to_string(),
            region,
            client,
        }
    }

    /// Region a bucket lives in, as reported by `GetBucketLocation`
    async fn bucket_region(&self, bucket: &str) -> Result<String> {
        let response = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| classify(e, bucket))?;

        Ok(normalize_region(
            response.location_constraint().map(|c| c.as_str()),
        ))
    }

    /// Region of a bucket as reported by `ListBuckets`
    ///
    /// Custom endpoints serve every bucket from the session region; so do
    /// buckets the service did not report a region for.
    fn listed_region(&self, reported: Option<&str>) -> String {
        match reported.filter(|r| !r.is_empty()) {
            Some(region) if self.settings.endpoint.is_none() => region.to_string(),
            _ => self.settings.region.clone(),
        }
    }
}

/// Empty constraint means us-east-1; "EU" is the legacy name of eu-west-1
pub(crate) fn normalize_region(constraint: Option<&str>) -> String {
    match constraint {
        None | Some("") => DEFAULT_REGION.to_string(),
        Some("EU") => "eu-west-1".to_string(),
        Some(region) => region.to_string(),
    }
}

/// Split an item URL into (bucket, key)
///
/// The host only carries the region. The path is percent-decoded as a whole
/// and split at its first `/`: bucket names cannot contain one, while keys
/// may carry escaped slashes (see [`object_url`](crate::item::object_url)).
pub(crate) fn parse_item_url(url: &Url) -> Result<(String, String)> {
    let path = url.path().strip_prefix('/').unwrap_or(url.path());
    let decoded = urlencoding::decode(path)
        .map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;

    decoded
        .split_once('/')
        .filter(|(bucket, key)| !bucket.is_empty() && !key.is_empty())
        .map(|(bucket, key)| (bucket.to_string(), key.to_string()))
        .ok_or_else(|| Error::InvalidUrl(format!("{url} does not name a container and an item")))
}

#[async_trait]
impl Location for S3Location {
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn create_container(&self, name: &str) -> Result<Box<dyn Container>> {
        let mut request = self.client.create_bucket().bucket(name);
        if self.settings.endpoint.is_none() && self.settings.region != DEFAULT_REGION {
            let constraint = BucketLocationConstraint::from(self.settings.region.as_str());
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        request.send().await.map_err(|e| classify(e, name))?;

        tracing::debug!(container = name, region = %self.settings.region, "created container");
        Ok(Box::new(self.container_handle(
            name,
            self.settings.region.clone(),
            self.client.clone(),
        )))
    }

    async fn containers(&self, options: ListOptions) -> Result<Page<Box<dyn Container>>> {
        let prefix = options.prefix.clone().unwrap_or_default();
        let response = self
            .client
            .list_buckets()
            .set_prefix(options.prefix)
            .set_continuation_token(options.cursor)
            .set_max_buckets(options.count)
            .send()
            .await
            .map_err(|e| classify(e, "buckets"))?;

        let mut clients: HashMap<String, aws_sdk_s3::Client> = HashMap::new();
        let mut items: Vec<Box<dyn Container>> = Vec::new();

        // Not every S3-compatible store honours the prefix parameter
        for bucket in response.buckets() {
            let Some(name) = bucket.name().filter(|name| name.starts_with(&prefix)) else {
                continue;
            };

            let region = self.listed_region(bucket.bucket_region());
            let client = if region == self.settings.region {
                self.client.clone()
            } else if let Some(client) = clients.get(&region) {
                client.clone()
            } else {
                tracing::debug!(container = name, %region, "building region-pinned client");
                let client = build_client(&self.settings.with_region(region.clone())).await;
                clients.insert(region.clone(), client.clone());
                client
            };

            items.push(Box::new(self.container_handle(name, region, client)));
        }

        Ok(Page {
            items,
            next_cursor: response.continuation_token().map(str::to_string),
        })
    }

    async fn container(&self, id: &str) -> Result<Box<dyn Container>> {
        if self.settings.endpoint.is_some() {
            // Custom endpoints have a single region; just confirm the bucket exists
            self.client
                .head_bucket()
                .bucket(id)
                .send()
                .await
                .map_err(|e| classify(e, id))?;
            return Ok(Box::new(self.container_handle(
                id,
                self.settings.region.clone(),
                self.client.clone(),
            )));
        }

        let region = self.bucket_region(id).await?;
        let client = if region == self.settings.region {
            self.client.clone()
        } else {
            tracing::debug!(container = id, %region, "building region-pinned client");
            build_client(&self.settings.with_region(region.clone())).await
        };

        Ok(Box::new(self.container_handle(id, region, client)))
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(id)
            .send()
            .await
            .map_err(|e| classify(e, id))?;

        tracing::debug!(container = id, "removed container");
        Ok(())
    }

    async fn item_by_url(&self, url: &Url) -> Result<Box<dyn Item>> {
        let (bucket, key) = parse_item_url(url)?;
        self.container(&bucket).await?.item(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONFIG_AUTH_TYPE, CONFIG_ENDPOINT, CONFIG_REGION};
    use crate::item::object_url;
    use sw_core::ConfigMap;

    fn keys() -> ConfigMap {
        ConfigMap::new()
            .with("access_key_id", "AKIDEXAMPLE")
            .with("secret_key", "secret")
    }

    #[tokio::test]
    async fn test_default_region() {
        let location = S3Location::new(&keys()).await.unwrap();
        assert_eq!(location.region(), "us-east-1");
        assert!(location.endpoint().is_none());
    }

    #[tokio::test]
    async fn test_config_region_with_empty_argument() {
        let config = keys().with(CONFIG_REGION, "eu-west-1");
        let location = S3Location::with_region(&config, "").await.unwrap();
        assert_eq!(location.region(), "eu-west-1");
    }

    #[tokio::test]
    async fn test_custom_endpoint_reported_exactly() {
        let config = keys().with(CONFIG_ENDPOINT, "http://minio.local:9000");
        let location = S3Location::new(&config).await.unwrap();
        assert_eq!(location.endpoint(), Some("http://minio.local:9000"));
    }

    #[tokio::test]
    async fn test_iam_location() {
        let config = ConfigMap::new()
            .with(CONFIG_AUTH_TYPE, "iam")
            .with(CONFIG_REGION, "ap-south-1");
        let location = S3Location::new(&config).await.unwrap();
        assert_eq!(location.region(), "ap-south-1");
    }

    #[tokio::test]
    async fn test_constructor_does_not_trust_validation() {
        let err = S3Location::new(&ConfigMap::new()).await.err().unwrap();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg == "missing access_key_id"));
    }

    #[tokio::test]
    async fn test_listed_region() {
        let config = keys().with(CONFIG_REGION, "eu-west-1");
        let location = S3Location::new(&config).await.unwrap();
        assert_eq!(location.listed_region(Some("ap-northeast-1")), "ap-northeast-1");
        assert_eq!(location.listed_region(Some("")), "eu-west-1");
        assert_eq!(location.listed_region(None), "eu-west-1");

        // A custom endpoint has no per-bucket regions
        let config = config.with(CONFIG_ENDPOINT, "http://minio.local:9000");
        let location = S3Location::new(&config).await.unwrap();
        assert_eq!(location.listed_region(Some("ap-northeast-1")), "eu-west-1");
    }

    #[test]
    fn test_normalize_region() {
        assert_eq!(normalize_region(None), "us-east-1");
        assert_eq!(normalize_region(Some("")), "us-east-1");
        assert_eq!(normalize_region(Some("EU")), "eu-west-1");
        assert_eq!(normalize_region(Some("ap-northeast-1")), "ap-northeast-1");
    }

    #[test]
    fn test_parse_item_url() {
        let url = object_url("eu-west-1", "bucket1", "dir/obj name.txt");
        let (bucket, key) = parse_item_url(&url).unwrap();
        assert_eq!(bucket, "bucket1");
        assert_eq!(key, "dir/obj name.txt");
    }

    #[test]
    fn test_item_url_round_trips_key() {
        for key in [
            "report%20final.txt",
            "a/../b.txt",
            "a/./b.txt",
            "../up.txt",
            "..",
            ".",
            "dir/",
            "a//b",
            "100%.txt",
            "caf\u{e9}/men\u{fc} #1?.txt",
        ] {
            let url = object_url("eu-west-1", "bucket1", key);
            let (bucket, parsed) = parse_item_url(&url).unwrap();
            assert_eq!(bucket, "bucket1", "{url}");
            assert_eq!(parsed, key, "{url}");

            // The overlay only swaps the scheme, so the path must survive it
            let overlaid = sw_core::overlay::with_scheme(&url, "unionmeta").unwrap();
            let back = sw_core::overlay::with_scheme(&overlaid, "s3").unwrap();
            assert_eq!(parse_item_url(&back).unwrap().1, key, "{back}");
        }
    }

    #[test]
    fn test_parse_item_url_accepts_plain_paths() {
        let url = Url::parse("s3://s3-us-east-1.amazonaws.com/logs/2024/01/app.log").unwrap();
        let (bucket, key) = parse_item_url(&url).unwrap();
        assert_eq!(bucket, "logs");
        assert_eq!(key, "2024/01/app.log");
    }

    #[test]
    fn test_parse_item_url_requires_key() {
        for raw in [
            "s3://s3-eu-west-1.amazonaws.com/bucket1",
            "s3://s3-eu-west-1.amazonaws.com/bucket1/",
            "s3://s3-eu-west-1.amazonaws.com/",
        ] {
            let url = Url::parse(raw).unwrap();
            assert!(
                matches!(parse_item_url(&url), Err(Error::InvalidUrl(_))),
                "{raw}"
            );
        }
    }
}
