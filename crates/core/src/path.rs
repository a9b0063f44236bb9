//! Profile path parsing
//!
//! Front ends address listings as `profile[/container[/prefix]]`.

use crate::error::{Error, Result};

/// A parsed `profile[/container[/prefix]]` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePath {
    /// Profile name
    pub profile: String,
    /// Container name, `None` to address the location itself
    pub container: Option<String>,
    /// Item prefix (empty for the container root)
    pub prefix: String,
}

impl ProfilePath {
    /// Create a new ProfilePath
    pub fn new(
        profile: impl Into<String>,
        container: Option<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            profile: profile.into(),
            container,
            prefix: prefix.into(),
        }
    }
}

impl std::fmt::Display for ProfilePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.container {
            None => write!(f, "{}", self.profile),
            Some(c) if self.prefix.is_empty() => write!(f, "{}/{}", self.profile, c),
            Some(c) => write!(f, "{}/{}/{}", self.profile, c, self.prefix),
        }
    }
}

/// Parse a path string into a ProfilePath
pub fn parse_path(path: &str) -> Result<ProfilePath> {
    if path.is_empty() {
        return Err(Error::InvalidUrl("Path cannot be empty".into()));
    }

    let mut parts = path.splitn(3, '/');
    let profile = parts.next().unwrap_or_default();
    if !is_valid_profile_name(profile) {
        return Err(Error::InvalidUrl(format!(
            "Invalid profile name in '{path}'. Use format: profile[/container[/prefix]]"
        )));
    }

    let container = parts.next().filter(|c| !c.is_empty()).map(str::to_string);
    let prefix = parts.next().unwrap_or_default();

    if container.is_none() && !prefix.is_empty() {
        return Err(Error::InvalidUrl("Container name cannot be empty".into()));
    }

    Ok(ProfilePath::new(profile, container, prefix))
}

/// Check if a string is a valid profile name
pub fn is_valid_profile_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
