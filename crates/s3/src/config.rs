//! S3 configuration keys, validation and session settings
//!
//! Everything here is pure: [`validate`] and [`SessionSettings::resolve`]
//! only read the supplied [`Config`], so they are safe to call repeatedly
//! ahead of building a client.

use std::fmt;

use sw_core::{Config, Error, Result};

/// Optional; `accesskey` (default) or `iam`
pub const CONFIG_AUTH_TYPE: &str = "auth_type";

/// Access key id, required in `accesskey` mode
pub const CONFIG_ACCESS_KEY_ID: &str = "access_key_id";

/// Secret key, required in `accesskey` mode
pub const CONFIG_SECRET_KEY: &str = "secret_key";

/// Target region
pub const CONFIG_REGION: &str = "region";

/// Custom endpoint for S3-compatible services such as MinIO
pub const CONFIG_ENDPOINT: &str = "endpoint";

/// `true` forces plain HTTP to the custom endpoint
pub const CONFIG_DISABLE_SSL: &str = "disable_ssl";

/// Legacy SigV2 signing; only `false` is accepted
pub const CONFIG_V2_SIGNING: &str = "v2_signing";

/// Region used when neither the caller nor the config names one
pub const DEFAULT_REGION: &str = "us-east-1";

const AUTH_TYPE_ACCESS_KEY: &str = "accesskey";
const AUTH_TYPE_IAM: &str = "iam";

/// How the session obtains credentials
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Static key pair from config
    AccessKey {
        access_key_id: String,
        secret_key: String,
    },
    /// Ambient credentials from the execution environment
    Iam,
}

impl Auth {
    /// Derive the auth mode from config, checking required credentials
    pub fn from_config(config: &dyn Config) -> Result<Self> {
        let auth_type = config.config(CONFIG_AUTH_TYPE).unwrap_or_default();
        match auth_type.as_str() {
            "" | AUTH_TYPE_ACCESS_KEY => Ok(Auth::AccessKey {
                access_key_id: required(config, CONFIG_ACCESS_KEY_ID)?,
                secret_key: required(config, CONFIG_SECRET_KEY)?,
            }),
            AUTH_TYPE_IAM => Ok(Auth::Iam),
            other => Err(Error::InvalidConfig(format!("invalid auth_type: {other}"))),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::AccessKey { access_key_id, .. } => f
                .debug_struct("AccessKey")
                .field("access_key_id", access_key_id)
                .field("secret_key", &"<redacted>")
                .finish(),
            Auth::Iam => f.write_str("Iam"),
        }
    }
}

/// Fully resolved inputs for building a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Credential mode
    pub auth: Auth,
    /// Region the client signs for
    pub region: String,
    /// Custom endpoint, as configured (scheme forced to http by `disable_ssl`)
    pub endpoint: Option<String>,
}

impl SessionSettings {
    /// Resolve settings from config
    ///
    /// A non-empty `region` argument wins over the config's `region`, which
    /// wins over [`DEFAULT_REGION`].
    pub fn resolve(config: &dyn Config, region: &str) -> Result<Self> {
        let auth = Auth::from_config(config)?;

        let region = non_empty(Some(region.to_string()))
            .or_else(|| non_empty(config.config(CONFIG_REGION)))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        if flag(config, CONFIG_V2_SIGNING)? {
            return Err(Error::InvalidConfig(format!(
                "{CONFIG_V2_SIGNING} is not supported; requests are signed with SigV4"
            )));
        }

        let disable_ssl = flag(config, CONFIG_DISABLE_SSL)?;
        let endpoint = match non_empty(config.config(CONFIG_ENDPOINT)) {
            Some(endpoint) => Some(resolve_endpoint(endpoint, disable_ssl)?),
            None if disable_ssl => {
                return Err(Error::InvalidConfig(format!(
                    "{CONFIG_DISABLE_SSL} requires {CONFIG_ENDPOINT}"
                )));
            }
            None => None,
        };

        Ok(Self {
            auth,
            region,
            endpoint,
        })
    }

    /// Same settings pinned to another region
    pub fn with_region(&self, region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..self.clone()
        }
    }
}

/// Check S3 config without performing I/O
pub fn validate(config: &dyn Config) -> Result<()> {
    SessionSettings::resolve(config, "").map(|_| ())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required(config: &dyn Config, name: &str) -> Result<String> {
    non_empty(config.config(name)).ok_or_else(|| Error::InvalidConfig(format!("missing {name}")))
}

fn flag(config: &dyn Config, name: &str) -> Result<bool> {
    match config.config(name).as_deref() {
        None | Some("") | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(Error::InvalidConfig(format!(
            "{name} must be \"true\" or \"false\", got \"{other}\""
        ))),
    }
}

fn resolve_endpoint(endpoint: String, disable_ssl: bool) -> Result<String> {
    url::Url::parse(&endpoint)
        .map_err(|e| Error::InvalidConfig(format!("invalid {CONFIG_ENDPOINT} '{endpoint}': {e}")))?;

    match endpoint.strip_prefix("https://") {
        Some(rest) if disable_ssl => Ok(format!("http://{rest}")),
        _ => Ok(endpoint),
    }
}
