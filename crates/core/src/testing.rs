//! In-memory fakes used by unit tests

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jiff::Timestamp;
use url::Url;

use crate::error::{Error, Result};
use crate::traits::{Container, Item, ItemReader, ListOptions, Location, Metadata, Page};

#[derive(Clone)]
pub struct FakeItem {
    scheme: String,
    container: String,
    id: String,
    body: Vec<u8>,
    metadata: Metadata,
}

impl FakeItem {
    pub fn new(scheme: &str, container: &str, id: &str, body: &[u8]) -> Self {
        Self {
            scheme: scheme.to_string(),
            container: container.to_string(),
            id: id.to_string(),
            body: body.to_vec(),
            metadata: Metadata::new(),
        }
    }
}

#[async_trait]
impl Item for FakeItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn url(&self) -> Url {
        Url::parse(&format!("{}://{}/{}", self.scheme, self.container, self.id)).unwrap()
    }

    fn size(&self) -> Result<i64> {
        Ok(self.body.len() as i64)
    }

    async fn open(&self) -> Result<ItemReader> {
        Ok(Box::pin(std::io::Cursor::new(self.body.clone())))
    }

    fn last_mod(&self) -> Result<Timestamp> {
        Ok(Timestamp::UNIX_EPOCH)
    }

    fn etag(&self) -> Result<String> {
        Ok(format!("etag-{}", self.id))
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(self.metadata.clone())
    }
}

type Store = Arc<Mutex<BTreeMap<String, BTreeMap<String, FakeItem>>>>;

pub struct FakeContainer {
    name: String,
    scheme: String,
    store: Store,
}

#[async_trait]
impl Container for FakeContainer {
    fn id(&self) -> &str {
        &self.name
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn item(&self, id: &str) -> Result<Box<dyn Item>> {
        let store = self.store.lock().unwrap();
        store
            .get(&self.name)
            .and_then(|items| items.get(id))
            .map(|item| Box::new(item.clone()) as Box<dyn Item>)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn items(&self, options: ListOptions) -> Result<Page<Box<dyn Item>>> {
        let prefix = options.prefix.unwrap_or_default();
        let store = self.store.lock().unwrap();
        let items = store
            .get(&self.name)
            .map(|items| {
                items
                    .values()
                    .filter(|i| i.id.starts_with(&prefix))
                    .map(|i| Box::new(i.clone()) as Box<dyn Item>)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Page::last(items))
    }

    async fn remove_item(&self, id: &str) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store
            .get_mut(&self.name)
            .and_then(|items| items.remove(id))
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn put(&self, name: &str, data: Vec<u8>, metadata: Metadata) -> Result<Box<dyn Item>> {
        let mut item = FakeItem::new(&self.scheme, &self.name, name, &data);
        item.metadata = metadata;
        let mut store = self.store.lock().unwrap();
        store
            .entry(self.name.clone())
            .or_default()
            .insert(name.to_string(), item.clone());
        Ok(Box::new(item))
    }
}

/// Location whose items report `scheme` and that records every URL it resolves
pub struct FakeLocation {
    scheme: String,
    store: Store,
    pub seen_urls: Arc<Mutex<Vec<Url>>>,
}

impl FakeLocation {
    pub fn new(scheme: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            store: Arc::default(),
            seen_urls: Arc::default(),
        }
    }

    pub fn with_item(self, container: &str, id: &str, body: &[u8]) -> Self {
        self.store
            .lock()
            .unwrap()
            .entry(container.to_string())
            .or_default()
            .insert(id.to_string(), FakeItem::new(&self.scheme, container, id, body));
        self
    }

    fn container_handle(&self, name: &str) -> FakeContainer {
        FakeContainer {
            name: name.to_string(),
            scheme: self.scheme.clone(),
            store: self.store.clone(),
        }
    }
}

#[async_trait]
impl Location for FakeLocation {
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn create_container(&self, name: &str) -> Result<Box<dyn Container>> {
        self.store
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default();
        Ok(Box::new(self.container_handle(name)))
    }

    async fn containers(&self, options: ListOptions) -> Result<Page<Box<dyn Container>>> {
        let prefix = options.prefix.unwrap_or_default();
        let names: Vec<String> = self
            .store
            .lock()
            .unwrap()
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect();
        Ok(Page::last(
            names
                .iter()
                .map(|name| Box::new(self.container_handle(name)) as Box<dyn Container>)
                .collect(),
        ))
    }

    async fn container(&self, id: &str) -> Result<Box<dyn Container>> {
        if self.store.lock().unwrap().contains_key(id) {
            Ok(Box::new(self.container_handle(id)))
        } else {
            Err(Error::NotFound(id.to_string()))
        }
    }

    async fn remove_container(&self, id: &str) -> Result<()> {
        self.store
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn item_by_url(&self, url: &Url) -> Result<Box<dyn Item>> {
        self.seen_urls.lock().unwrap().push(url.clone());
        if url.scheme() != self.scheme {
            return Err(Error::InvalidUrl(format!(
                "expected scheme {}, got {}",
                self.scheme,
                url.scheme()
            )));
        }
        let container = url.host_str().unwrap_or_default();
        let id = url.path().trim_start_matches('/');
        self.container_handle(container).item(id).await
    }
}
