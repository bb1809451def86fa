//! API key + token credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::Query;

/// Where credentials are placed on an outgoing request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStyle {
    /// `key` and `token` query parameters.
    #[default]
    Query,
    /// An `Authorization: OAuth ...` header.
    Header,
}

/// A developer API key and a user token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub token: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            token: token.into(),
        }
    }

    pub(crate) fn apply_query(&self, query: &mut Query) {
        query.push("key", &self.api_key).push("token", &self.token);
    }

    pub(crate) fn authorization_header(&self) -> (String, String) {
        (
            "Authorization".to_string(),
            format!(
                "OAuth oauth_consumer_key=\"{}\", oauth_token=\"{}\"",
                self.api_key, self.token
            ),
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("token", &"***")
            .finish()
    }
}
