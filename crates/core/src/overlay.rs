//! Identity-remapping overlay
//!
//! An overlay presents an existing location under a different kind. Every
//! operation is forwarded to the wrapped location unchanged, except URL
//! handling: [`OverlayLocation::item_by_url`] translates the overlay's scheme
//! back to the wrapped backend's scheme before delegating, and items it
//! returns report the overlay's scheme from [`Item::url`].

use async_trait::async_trait;
use jiff::Timestamp;
use url::Url;

use crate::error::{Error, Result};
use crate::traits::{Container, Item, ItemReader, ListOptions, Location, Metadata, Page};

/// Return a copy of `url` with its scheme replaced
pub fn with_scheme(url: &Url, scheme: &str) -> Result<Url> {
    let mut rewritten = url.clone();
    rewritten.set_scheme(scheme).map_err(|()| {
        Error::InvalidUrl(format!("cannot rewrite scheme of {url} to {scheme}"))
    })?;
    Ok(rewritten)
}

/// Location wrapper that changes the externally visible kind
pub struct OverlayLocation {
    inner: Box<dyn Location>,
    kind: String,
    target_scheme: String,
}

impl OverlayLocation {
    /// Wrap `inner`, exposing it as `kind` while its own URLs use `target_scheme`
    pub fn new(
        kind: impl Into<String>,
        target_scheme: impl Into<String>,
        inner: Box<dyn Location>,
    ) -> Self {
        Self {
            inner,
            kind: kind.into(),
            target_scheme: target_scheme.into(),
        }
    }

    /// Kind reported by overlaid items
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Scheme used when delegating to the wrapped location
    pub fn target_scheme(&self) -> &str {
        &self.target_scheme
    }
}

#[async_trait]
impl Location for OverlayLocation {
    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }

    async fn create_container(&self, name: &str) -> Result<Box<dyn Container>> {
        self.inner.create_container(name).await
    }

    async fn containers(&self, options: ListOptions) -> Result<Page<Box<dyn Container>>> {
        self.inner.containers(options).await
    }

    async fn container(&self, id: &str) -> Result<Box<dyn Container>> {
        self.inner.container(id).await
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        self.inner.remove_container(id).await
    }

    async fn item_by_url(&self, url: &Url) -> Result<Box<dyn Item>> {
        let target = with_scheme(url, &self.target_scheme)?;
        tracing::debug!(from = %url, to = %target, "delegating overlay item lookup");
        let item = self.inner.item_by_url(&target).await?;
        Ok(Box::new(OverlayItem::new(self.kind.clone(), item)))
    }
}

/// Item wrapper whose URL reports the overlay's kind
pub struct OverlayItem {
    inner: Box<dyn Item>,
    kind: String,
}

impl OverlayItem {
    /// Wrap `inner` so its URL uses `kind` as scheme
    pub fn new(kind: impl Into<String>, inner: Box<dyn Item>) -> Self {
        Self {
            inner,
            kind: kind.into(),
        }
    }
}

#[async_trait]
impl Item for OverlayItem {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn url(&self) -> Url {
        let url = self.inner.url();
        with_scheme(&url, &self.kind).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "keeping wrapped item URL");
            url
        })
    }

    fn size(&self) -> Result<i64> {
        self.inner.size()
    }

    async fn open(&self) -> Result<ItemReader> {
        self.inner.open().await
    }

    fn last_mod(&self) -> Result<Timestamp> {
        self.inner.last_mod()
    }

    fn etag(&self) -> Result<String> {
        self.inner.etag()
    }

    fn metadata(&self) -> Result<Metadata> {
        self.inner.metadata()
    }
}
