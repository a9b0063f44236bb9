//! S3 item

use async_trait::async_trait;
use jiff::Timestamp;
use url::Url;

use sw_core::{Error, Item, ItemReader, Metadata, Result, blank_url};

use crate::KIND;
use crate::session::classify;

/// Build the externally visible URL of an object
///
/// `s3://s3-<region>.amazonaws.com/<container>/<id>`, with every key segment
/// percent-encoded so `S3Location::item_by_url` recovers the key exactly.
pub fn object_url(region: &str, container: &str, id: &str) -> Url {
    match Url::parse(&format!("{KIND}://s3-{region}.amazonaws.com")) {
        Ok(mut url) => {
            url.set_path(&encode_object_path(container, id));
            url
        }
        Err(e) => {
            tracing::warn!(error = %e, region, "cannot build object URL");
            blank_url()
        }
    }
}

fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

/// `/<container>/<id>` with each segment escaped
///
/// URL parsers drop `.` and `..` segments (also in their `%2E` forms), so the
/// slashes around such a segment are escaped as `%2F` instead. Bucket names
/// never contain `/`, which keeps the first real slash the container boundary.
pub(crate) fn encode_object_path(container: &str, id: &str) -> String {
    let mut path = String::from("/");
    let mut previous: Option<&str> = None;
    for segment in std::iter::once(container).chain(id.split('/')) {
        if let Some(previous) = previous {
            if is_dot_segment(previous) || is_dot_segment(segment) {
                path.push_str("%2F");
            } else {
                path.push('/');
            }
        }
        path.push_str(&urlencoding::encode(segment));
        previous = Some(segment);
    }
    path
}

/// One object in a bucket, captured at fetch or list time
pub struct S3Item {
    pub(crate) id: String,
    pub(crate) container: String,
    pub(crate) region: String,
    pub(crate) client: aws_sdk_s3::Client,
    pub(crate) etag: String,
    pub(crate) last_modified: Option<Timestamp>,
    pub(crate) size: i64,
    pub(crate) metadata: Metadata,
}

impl S3Item {
    /// Bucket holding this item
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Region the item's bucket lives in
    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl Item for S3Item {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn url(&self) -> Url {
        object_url(&self.region, &self.container, &self.id)
    }

    fn size(&self) -> Result<i64> {
        Ok(self.size)
    }

    async fn open(&self) -> Result<ItemReader> {
        let response = self
            .client
            .get_object()
            .bucket(&self.container)
            .key(&self.id)
            .send()
            .await
            .map_err(|e| classify(e, &format!("{}/{}", self.container, self.id)))?;

        Ok(Box::pin(response.body.into_async_read()))
    }

    fn last_mod(&self) -> Result<Timestamp> {
        self.last_modified
            .ok_or_else(|| Error::NotFound(format!("last modified time of {}", self.id)))
    }

    fn etag(&self) -> Result<String> {
        Ok(self.etag.clone())
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(self.metadata.clone())
    }
}
