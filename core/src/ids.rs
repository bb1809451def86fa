//! Trello object identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const ID_LEN: usize = 24;

/// A Trello object id: exactly 24 hexadecimal digits.
///
/// Boards, lists, cards, labels, members and checklists all share this
/// format. Validation happens once at construction so `build_*` methods can
/// splice ids into paths without further checks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrelloId(String);

impl TrelloId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TrelloId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == ID_LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(TrelloId(s.to_string()))
        } else {
            Err(ApiError::InvalidId(s.to_string()))
        }
    }
}

impl TryFrom<String> for TrelloId {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TrelloId> for String {
    fn from(id: TrelloId) -> Self {
        id.0
    }
}

impl fmt::Display for TrelloId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrelloId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
