//! sw-core: storage-agnostic core of stowage
//!
//! This crate provides:
//! - The Location / Container / Item traits every backend implements
//! - The opaque Config handed to backends
//! - The Kind Registry that resolves a kind name or URL to a backend
//! - The identity-remapping overlay
//! - Profile file management for front ends
//!
//! This crate is independent of any specific storage SDK.

pub mod config;
pub mod error;
pub mod overlay;
pub mod path;
pub mod profile;
pub mod registry;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, ConfigMap};
pub use error::{Error, Result};
pub use overlay::{OverlayItem, OverlayLocation};
pub use path::{ProfilePath, parse_path};
pub use profile::{Profile, ProfileManager};
pub use registry::{MakeFn, Registration, Registry, ValidateFn};
pub use traits::{
    Container, Item, ItemInfo, ItemReader, ListOptions, Location, Metadata, Page, blank_url,
};
