//! Connection settings loaded from a TOML file.
//!
//! ```toml
//! base_url = "https://api.trello.com/1"
//! api_key = "..."
//! token = "..."
//! timeout_secs = 30
//! auth_style = "query"   # or "header"
//! ```
//!
//! Every key is optional in the file; the CLI layers flags and environment
//! variables on top and calls [`Config::validate`] last.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;
use trello_core::{AuthStyle, Credentials, TrelloClient, DEFAULT_BASE_URL};

use crate::error::Error;

#[derive(Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
    pub token: String,
    pub timeout_secs: u64,
    pub auth_style: AuthStyle,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            token: String::new(),
            timeout_secs: 30,
            auth_style: AuthStyle::Query,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("token", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .field("auth_style", &self.auth_style)
            .finish()
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::parse(&content)?;
        info!(path = %path.display(), base_url = %config.base_url, "configuration loaded");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject settings no request could succeed with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("api_key is not set".to_string()));
        }
        if self.token.trim().is_empty() {
            return Err(Error::Config("token is not set".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "base_url must be an http(s) url, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.api_key, &self.token)
    }

    pub fn client(&self) -> TrelloClient {
        TrelloClient::new(&self.base_url, self.credentials()).with_auth_style(self.auth_style)
    }
}
