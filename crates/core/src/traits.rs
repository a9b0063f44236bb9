//! Location, Container and Item traits
//!
//! These traits define the uniform model every backend implements. A
//! [`Location`] is one configured session, a [`Container`] is a named bucket
//! inside it and an [`Item`] is one addressable object.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::LazyLock;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;
use url::Url;

use crate::error::{Error, Result};

/// Item metadata; values are opaque to this layer
pub type Metadata = HashMap<String, serde_json::Value>;

/// Byte stream returned by [`Item::open`]; the caller owns and drops it
pub type ItemReader = Pin<Box<dyn AsyncRead + Send>>;

static BLANK_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("about:blank").expect("static URL parses"));

/// URL reported by handles that do not point at anything
pub fn blank_url() -> Url {
    BLANK_URL.clone()
}

/// Options for container and item listings
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Only return entries whose name starts with this prefix
    pub prefix: Option<String>,

    /// Cursor returned by the previous page
    pub cursor: Option<String>,

    /// Maximum number of entries per page
    pub count: Option<i32>,
}

impl ListOptions {
    /// Options that only filter by prefix
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Default::default()
        }
    }
}

/// One page of a listing
pub struct Page<T> {
    /// Entries on this page
    pub items: Vec<T>,

    /// Cursor for the next page, `None` on the last page
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// A page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    /// Whether there are no more pages
    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// One addressable object within a container
///
/// Accessors other than [`Item::open`] read state captured when the item was
/// fetched. `Option<I>` also implements this trait so an unresolved handle
/// answers with zero values or [`Error::NotFound`] instead of panicking.
#[async_trait]
pub trait Item: Send + Sync {
    /// Object key
    fn id(&self) -> &str;

    /// Display name (the key for object stores)
    fn name(&self) -> &str;

    /// Externally visible URL, derived and never fetched
    fn url(&self) -> Url;

    /// Content length in bytes
    fn size(&self) -> Result<i64>;

    /// Open a stream positioned at the start of the content
    async fn open(&self) -> Result<ItemReader>;

    /// Last modification time
    fn last_mod(&self) -> Result<Timestamp>;

    /// Content hash / ETag
    fn etag(&self) -> Result<String>;

    /// User metadata
    fn metadata(&self) -> Result<Metadata>;
}

/// A named bucket within a location
#[async_trait]
pub trait Container: Send + Sync {
    /// Container identifier
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// Fetch one item; [`Error::NotFound`] when it does not exist
    async fn item(&self, id: &str) -> Result<Box<dyn Item>>;

    /// List items
    async fn items(&self, options: ListOptions) -> Result<Page<Box<dyn Item>>>;

    /// Delete one item
    async fn remove_item(&self, id: &str) -> Result<()>;

    /// Upload an item
    async fn put(&self, name: &str, data: Vec<u8>, metadata: Metadata) -> Result<Box<dyn Item>>;
}

/// One configured backend session
#[async_trait]
pub trait Location: Send + Sync {
    /// Release the session
    async fn close(&self) -> Result<()>;

    /// Create a container
    async fn create_container(&self, name: &str) -> Result<Box<dyn Container>>;

    /// List containers
    async fn containers(&self, options: ListOptions) -> Result<Page<Box<dyn Container>>>;

    /// Get a container by id; [`Error::NotFound`] when it does not exist
    async fn container(&self, id: &str) -> Result<Box<dyn Container>>;

    /// Delete a container
    async fn remove_container(&self, id: &str) -> Result<()>;

    /// Resolve an item from its URL
    async fn item_by_url(&self, url: &Url) -> Result<Box<dyn Item>>;
}

#[async_trait]
impl<I: Item + ?Sized> Item for Box<I> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn url(&self) -> Url {
        (**self).url()
    }

    fn size(&self) -> Result<i64> {
        (**self).size()
    }

    async fn open(&self) -> Result<ItemReader> {
        (**self).open().await
    }

    fn last_mod(&self) -> Result<Timestamp> {
        (**self).last_mod()
    }

    fn etag(&self) -> Result<String> {
        (**self).etag()
    }

    fn metadata(&self) -> Result<Metadata> {
        (**self).metadata()
    }
}

fn unresolved() -> Error {
    Error::NotFound("item handle is not resolved".into())
}

#[async_trait]
impl<I: Item> Item for Option<I> {
    fn id(&self) -> &str {
        self.as_ref().map_or("", |i| i.id())
    }

    fn name(&self) -> &str {
        self.as_ref().map_or("", |i| i.name())
    }

    fn url(&self) -> Url {
        self.as_ref().map_or_else(blank_url, |i| i.url())
    }

    fn size(&self) -> Result<i64> {
        self.as_ref().ok_or_else(unresolved)?.size()
    }

    async fn open(&self) -> Result<ItemReader> {
        self.as_ref().ok_or_else(unresolved)?.open().await
    }

    fn last_mod(&self) -> Result<Timestamp> {
        self.as_ref().ok_or_else(unresolved)?.last_mod()
    }

    fn etag(&self) -> Result<String> {
        self.as_ref().ok_or_else(unresolved)?.etag()
    }

    fn metadata(&self) -> Result<Metadata> {
        self.as_ref().ok_or_else(unresolved)?.metadata()
    }
}

/// Serializable snapshot of an item for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInfo {
    /// Object key
    pub id: String,

    /// Item URL
    pub url: String,

    /// Size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Human-readable size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// ETag (usually MD5 for single-part uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// User metadata
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl ItemInfo {
    /// Capture the accessor values of an item
    pub fn from_item(item: &dyn Item) -> Self {
        let size_bytes = item.size().ok();
        Self {
            id: item.id().to_string(),
            url: item.url().to_string(),
            size_bytes,
            size_human: size_bytes
                .map(|size| humansize::format_size(size.max(0) as u64, humansize::BINARY)),
            last_modified: item.last_mod().ok(),
            etag: item.etag().ok().filter(|e| !e.is_empty()),
            metadata: item.metadata().unwrap_or_default(),
        }
    }
}
