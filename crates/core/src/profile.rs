//! Profile file management
//!
//! A profile is a named (kind, config) pair so front ends can dial a location
//! without repeating credentials. Profiles are stored in TOML at
//! ~/.config/sw/config.toml, or under `$SW_CONFIG_DIR` when it is set.
//!
//! PROTECTED FILE: Changes to schema_version require migration support.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigMap;
use crate::error::{Error, Result};

/// Current profile file schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "SW_CONFIG_DIR";

/// A named location definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique name for this profile
    pub name: String,

    /// Registered kind to dial (e.g. "s3", "unionmeta")
    pub kind: String,

    /// Options handed to the backend unchanged
    #[serde(default)]
    pub config: ConfigMap,
}

impl Profile {
    /// Create a new profile
    pub fn new(name: impl Into<String>, kind: impl Into<String>, config: ConfigMap) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            config,
        }
    }
}

/// On-disk profile file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFile {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Configured profiles
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Default for ProfileFile {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            profiles: Vec::new(),
        }
    }
}

/// Loads, saves and edits the profile file
#[derive(Debug)]
pub struct ProfileManager {
    path: PathBuf,
}

impl ProfileManager {
    /// Create a manager for the default profile file location
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| {
                    Error::InvalidConfig("Could not determine config directory".into())
                })?
                .join("sw"),
        };
        Ok(Self::with_path(dir.join("config.toml")))
    }

    /// Create a manager for a specific file (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the profile file
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the profile file
    ///
    /// A missing file yields an empty default. A file written by a newer
    /// schema is rejected.
    pub fn load(&self) -> Result<ProfileFile> {
        if !self.path.exists() {
            return Ok(ProfileFile::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut file: ProfileFile = toml::from_str(&content)?;

        if file.schema_version > SCHEMA_VERSION {
            return Err(Error::InvalidConfig(format!(
                "Profile file version {} is newer than supported version {}",
                file.schema_version, SCHEMA_VERSION
            )));
        }
        file.schema_version = SCHEMA_VERSION;

        Ok(file)
    }

    /// Save the profile file with owner-only permissions
    pub fn save(&self, file: &ProfileFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(file)?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        tracing::debug!(path = %self.path.display(), "saved profile file");
        Ok(())
    }

    /// List all profiles
    pub fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.load()?.profiles)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Result<Profile> {
        self.load()?
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::NotFound(format!("profile '{name}'")))
    }

    /// Add or replace a profile
    pub fn set(&self, profile: Profile) -> Result<()> {
        let mut file = self.load()?;
        file.profiles.retain(|p| p.name != profile.name);
        file.profiles.push(profile);
        self.save(&file)
    }

    /// Remove a profile
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut file = self.load()?;
        let original_len = file.profiles.len();
        file.profiles.retain(|p| p.name != name);

        if file.profiles.len() == original_len {
            return Err(Error::NotFound(format!("profile '{name}'")));
        }

        self.save(&file)
    }
}
