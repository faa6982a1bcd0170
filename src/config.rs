//! Tenant credential store
//!
//! Credentials live in a JSON file keyed by tenant:
//!
//! ```json
//! {
//!   "acme-prod": {
//!     "username": "integration@acme.com",
//!     "password": "hunter2",
//!     "securityToken": "XXXXXXXX",
//!     "consumerKey": "3MVG9...",
//!     "consumerSecret": "1234567890",
//!     "salesforceURL": "acme.my.salesforce.com"
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

pub const DEFAULT_API_VERSION: &str = "v37.0";

/// Credentials and endpoint for a single tenant.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConfig {
    pub username: String,
    pub password: String,
    pub security_token: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    #[serde(rename = "salesforceURL")]
    pub salesforce_url: String,
    #[serde(default)]
    pub api_version: Option<String>,
}

impl TenantConfig {
    /// Base URL of the instance. Bare hosts are assumed to speak HTTPS.
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.salesforce_url.trim().trim_end_matches('/');
        let raw = if raw.starts_with("http://") || raw.starts_with("https://") {
            format!("{}/", raw)
        } else {
            format!("https://{}/", raw)
        };
        Url::parse(&raw).map_err(|e| {
            Error::Configuration(format!("invalid salesforceURL '{}': {}", self.salesforce_url, e))
        })
    }

    /// Host name used to group output files, e.g. `acme.my.salesforce.com`.
    pub fn host(&self) -> Result<String> {
        let url = self.base_url()?;
        match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => Ok(format!("{}_{}", host, port)),
            (Some(host), None) => Ok(host.to_string()),
            (None, _) => Err(Error::Configuration(format!(
                "salesforceURL '{}' has no host",
                self.salesforce_url
            ))),
        }
    }

    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }
}

impl std::fmt::Debug for TenantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("security_token", &"***")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .field("salesforce_url", &self.salesforce_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// All tenants from a credential file.
///
/// Records are kept undecoded until selected, so one broken entry does not
/// block the others.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    tenants: BTreeMap<String, Value>,
}

impl CredentialStore {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "cannot read credential file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            Error::Configuration(msg) => {
                Error::Configuration(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let tenants: BTreeMap<String, Value> = serde_json::from_str(content).map_err(|e| {
            Error::Configuration(format!("credential file is not a JSON object: {}", e))
        })?;
        Ok(Self { tenants })
    }

    /// Tenant keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        self.tenants.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    pub fn tenant(&self, key: &str) -> Result<TenantConfig> {
        let raw = self.tenants.get(key).ok_or_else(|| {
            Error::Configuration(format!(
                "unknown tenant '{}'. Known tenants: {}",
                key,
                self.keys().join(", ")
            ))
        })?;
        let tenant: TenantConfig = serde_json::from_value(raw.clone())
            .map_err(|e| Error::Configuration(format!("tenant '{}': {}", key, e)))?;
        tenant.base_url()?;
        Ok(tenant)
    }
}
