//! S3 container (bucket)

use std::collections::HashMap;

use async_trait::async_trait;
use aws_smithy_types::DateTime;
use aws_smithy_types::byte_stream::ByteStream;

use sw_core::{Container, Error, Item, ListOptions, Metadata, Page, Result};

use crate::item::S3Item;
use crate::session::classify;

/// A bucket bound to a client for the bucket's region
pub struct S3Container {
    pub(crate) name: String,
    pub(crate) region: String,
    pub(crate) client: aws_sdk_s3::Client,
}

impl S3Container {
    /// Region of the bucket
    pub fn region(&self) -> &str {
        &self.region
    }

    fn item_handle(&self, id: impl Into<String>) -> S3Item {
        S3Item {
            id: id.into(),
            container: self.name.clone(),
            region: self.region.clone(),
            client: self.client.clone(),
            etag: String::new(),
            last_modified: None,
            size: 0,
            metadata: Metadata::new(),
        }
    }

    fn path(&self, id: &str) -> String {
        format!("{}/{}", self.name, id)
    }
}

pub(crate) fn timestamp(value: Option<&DateTime>) -> Option<jiff::Timestamp> {
    value.and_then(|d| jiff::Timestamp::new(d.secs(), d.subsec_nanos() as i32).ok())
}

pub(crate) fn trim_etag(etag: Option<&str>) -> String {
    etag.unwrap_or_default().trim_matches('"').to_string()
}

/// S3 user metadata only holds strings
pub(crate) fn string_metadata(metadata: Metadata) -> Result<HashMap<String, String>> {
    metadata
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => Ok((key, s)),
            other => Err(Error::InvalidMetadata(format!(
                "value of key '{key}' must be a string, got {other}"
            ))),
        })
        .collect()
}

fn from_string_metadata(metadata: Option<&HashMap<String, String>>) -> Metadata {
    metadata
        .into_iter()
        .flatten()
        .map(|(k, v)| (k.to_lowercase(), serde_json::Value::String(v.clone())))
        .collect()
}

#[async_trait]
impl Container for S3Container {
    fn id(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn item(&self, id: &str) -> Result<Box<dyn Item>> {
        let response = self
            .client
            .head_object()
            .bucket(&self.name)
            .key(id)
            .send()
            .await
            .map_err(|e| classify(e, &self.path(id)))?;

        let mut item = self.item_handle(id);
        item.size = response.content_length().unwrap_or(0);
        item.etag = trim_etag(response.e_tag());
        item.last_modified = timestamp(response.last_modified());
        item.metadata = from_string_metadata(response.metadata());

        Ok(Box::new(item))
    }

    async fn items(&self, options: ListOptions) -> Result<Page<Box<dyn Item>>> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.name)
            .set_prefix(options.prefix)
            .set_continuation_token(options.cursor)
            .set_max_keys(options.count)
            .send()
            .await
            .map_err(|e| classify(e, &self.name))?;

        let items = response
            .contents()
            .iter()
            .map(|object| {
                let mut item = self.item_handle(object.key().unwrap_or_default());
                item.size = object.size().unwrap_or(0);
                item.etag = trim_etag(object.e_tag());
                item.last_modified = timestamp(object.last_modified());
                Box::new(item) as Box<dyn Item>
            })
            .collect();

        let next_cursor = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(Page { items, next_cursor })
    }

    async fn remove_item(&self, id: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.name)
            .key(id)
            .send()
            .await
            .map_err(|e| classify(e, &self.path(id)))?;

        tracing::debug!(container = %self.name, id, "removed item");
        Ok(())
    }

    async fn put(&self, name: &str, data: Vec<u8>, metadata: Metadata) -> Result<Box<dyn Item>> {
        let size = data.len() as i64;
        let user_metadata = string_metadata(metadata.clone())?;

        let response = self
            .client
            .put_object()
            .bucket(&self.name)
            .key(name)
            .set_metadata(Some(user_metadata))
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| classify(e, &self.path(name)))?;

        let mut item = self.item_handle(name);
        item.size = size;
        item.etag = trim_etag(response.e_tag());
        item.last_modified = Some(jiff::Timestamp::now());
        item.metadata = metadata;

        Ok(Box::new(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::offline_client;

    #[test]
    fn test_string_metadata() {
        let metadata = Metadata::from([("owner".to_string(), "ops".into())]);
        let converted = string_metadata(metadata).unwrap();
        assert_eq!(converted["owner"], "ops");
    }

    #[test]
    fn test_string_metadata_rejects_non_strings() {
        let metadata = Metadata::from([("retries".to_string(), 3.into())]);
        let err = string_metadata(metadata).unwrap_err();
        assert!(matches!(err, Error::InvalidMetadata(msg) if msg.contains("retries")));
    }

    #[test]
    fn test_from_string_metadata_lowercases_keys() {
        let raw = HashMap::from([("Owner".to_string(), "ops".to_string())]);
        let metadata = from_string_metadata(Some(&raw));
        assert_eq!(metadata["owner"], "ops");
        assert!(from_string_metadata(None).is_empty());
    }

    #[test]
    fn test_trim_etag() {
        assert_eq!(trim_etag(Some("\"abc\"")), "abc");
        assert_eq!(trim_etag(None), "");
    }

    #[test]
    fn test_timestamp() {
        let dt = DateTime::from_secs(1_700_000_000);
        assert_eq!(timestamp(Some(&dt)).unwrap().as_second(), 1_700_000_000);
        assert!(timestamp(None).is_none());

        let dt = DateTime::from_secs_and_nanos(1_700_000_000, 250_000_000);
        let ts = timestamp(Some(&dt)).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
        assert_eq!(ts.subsec_nanosecond(), 250_000_000);
    }

    #[test]
    fn test_item_handle_inherits_identity() {
        let container = S3Container {
            name: "bucket1".to_string(),
            region: "eu-west-1".to_string(),
            client: offline_client("eu-west-1"),
        };
        assert_eq!(container.id(), "bucket1");
        assert_eq!(container.region(), "eu-west-1");

        let item = container.item_handle("obj.txt");
        assert_eq!(
            item.url().as_str(),
            "s3://s3-eu-west-1.amazonaws.com/bucket1/obj.txt"
        );
    }

    #[tokio::test]
    async fn test_put_rejects_bad_metadata_before_io() {
        let container = S3Container {
            name: "bucket1".to_string(),
            region: "eu-west-1".to_string(),
            client: offline_client("eu-west-1"),
        };
        let metadata = Metadata::from([("flag".to_string(), true.into())]);
        let err = container.put("obj.txt", vec![1, 2, 3], metadata).await.err().unwrap();
        assert!(matches!(err, Error::InvalidMetadata(_)));
    }
}
