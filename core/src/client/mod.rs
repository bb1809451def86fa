//! Stateless HTTP request builder and response parser for the Trello API.
//!
//! # Design
//! `TrelloClient` holds a base URL and credentials and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes the
//! matching `HttpResponse`. Operations returning the same record shape share
//! a parser (`parse_card` serves get, create and update).
//!
//! Trello answers every successful call, creates and deletes included, with
//! 200, so there is a single expected status.

mod boards;
mod cards;
mod lists;

pub use boards::DEFAULT_MEMBERSHIP_FIELDS;
pub use cards::DEFAULT_MEMBER_FIELDS;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

use crate::auth::{AuthStyle, Credentials};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::ids::TrelloId;
use crate::query::Query;
use crate::types::{
    Action, ActionCount, Attachment, Board, BoardMembers, BoardPlugin, Card, CheckItem,
    CheckItemState, Checklist, CustomField, Label, Member, Membership, MyPrefs, PluginData,
    TrelloList,
};

/// Public Trello REST endpoint, API version 1.
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com/1";

const SUCCESS: u16 = 200;

/// Synchronous, stateless client for the Trello REST API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network. The caller is responsible for executing the HTTP
/// round-trip between `build_*` and `parse_*`.
#[derive(Debug, Clone)]
pub struct TrelloClient {
    base_url: String,
    credentials: Credentials,
    auth_style: AuthStyle,
}

impl TrelloClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            auth_style: AuthStyle::default(),
        }
    }

    /// Client for the public API at [`DEFAULT_BASE_URL`].
    pub fn public(credentials: Credentials) -> Self {
        Self::new(DEFAULT_BASE_URL, credentials)
    }

    pub fn with_auth_style(mut self, style: AuthStyle) -> Self {
        self.auth_style = style;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str, params: Query) -> HttpRequest {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        let mut query = Query::new();
        match self.auth_style {
            AuthStyle::Query => self.credentials.apply_query(&mut query),
            AuthStyle::Header => headers.push(self.credentials.authorization_header()),
        }
        let mut pairs = query.into_pairs();
        pairs.extend(params.into_pairs());
        HttpRequest {
            method,
            path: format!("{}/{}", self.base_url, path),
            query: pairs,
            headers,
            body: None,
        }
    }

    fn get(&self, path: &str, params: Query) -> HttpRequest {
        self.request(HttpMethod::Get, path, params)
    }

    // -----------------------------------------------------------------------
    // Response parsers, one per response shape
    // -----------------------------------------------------------------------

    pub fn parse_boards(&self, response: HttpResponse) -> Result<Vec<Board>, ApiError> {
        decode(response)
    }

    /// Board name to id, from the response of `build_list_boards`.
    pub fn parse_board_ids(
        &self,
        response: HttpResponse,
    ) -> Result<BTreeMap<String, TrelloId>, ApiError> {
        let boards: Vec<Board> = decode(response)?;
        Ok(boards.into_iter().map(|b| (b.name, b.id)).collect())
    }

    pub fn parse_board(&self, response: HttpResponse) -> Result<Board, ApiError> {
        decode(response)
    }

    /// Raw JSON of a single-field lookup (`/boards/{id}/{field}`,
    /// `/cards/{id}/{field}`). The shape depends on the field.
    pub fn parse_field(&self, response: HttpResponse) -> Result<serde_json::Value, ApiError> {
        decode(response)
    }

    pub fn parse_actions(&self, response: HttpResponse) -> Result<Vec<Action>, ApiError> {
        decode(response)
    }

    pub fn parse_action_count(&self, response: HttpResponse) -> Result<ActionCount, ApiError> {
        decode(response)
    }

    pub fn parse_lists(&self, response: HttpResponse) -> Result<Vec<TrelloList>, ApiError> {
        decode(response)
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<TrelloList, ApiError> {
        decode(response)
    }

    pub fn parse_cards(&self, response: HttpResponse) -> Result<Vec<Card>, ApiError> {
        decode(response)
    }

    pub fn parse_card(&self, response: HttpResponse) -> Result<Card, ApiError> {
        decode(response)
    }

    pub fn parse_checklists(&self, response: HttpResponse) -> Result<Vec<Checklist>, ApiError> {
        decode(response)
    }

    pub fn parse_checklist(&self, response: HttpResponse) -> Result<Checklist, ApiError> {
        decode(response)
    }

    pub fn parse_check_item(&self, response: HttpResponse) -> Result<CheckItem, ApiError> {
        decode(response)
    }

    pub fn parse_check_item_states(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<CheckItemState>, ApiError> {
        decode(response)
    }

    pub fn parse_labels(&self, response: HttpResponse) -> Result<Vec<Label>, ApiError> {
        decode(response)
    }

    pub fn parse_members(&self, response: HttpResponse) -> Result<Vec<Member>, ApiError> {
        decode(response)
    }

    pub fn parse_memberships(&self, response: HttpResponse) -> Result<Vec<Membership>, ApiError> {
        decode(response)
    }

    /// Roster answered by `build_invite_member` and `build_add_member`.
    pub fn parse_board_members(&self, response: HttpResponse) -> Result<BoardMembers, ApiError> {
        decode(response)
    }

    pub fn parse_membership(&self, response: HttpResponse) -> Result<Membership, ApiError> {
        decode(response)
    }

    pub fn parse_my_prefs(&self, response: HttpResponse) -> Result<MyPrefs, ApiError> {
        decode(response)
    }

    pub fn parse_custom_fields(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<CustomField>, ApiError> {
        decode(response)
    }

    pub fn parse_attachments(&self, response: HttpResponse) -> Result<Vec<Attachment>, ApiError> {
        decode(response)
    }

    pub fn parse_attachment(&self, response: HttpResponse) -> Result<Attachment, ApiError> {
        decode(response)
    }

    pub fn parse_plugin_data(&self, response: HttpResponse) -> Result<Vec<PluginData>, ApiError> {
        decode(response)
    }

    pub fn parse_board_plugins(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<BoardPlugin>, ApiError> {
        decode(response)
    }

    /// Deletes answer with a small JSON envelope that carries nothing useful.
    pub fn parse_deleted(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, SUCCESS)
    }
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response, SUCCESS)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        s if s == expected => Ok(()),
        401 => Err(ApiError::Unauthorized {
            body: response.body.clone(),
        }),
        404 => Err(ApiError::NotFound {
            body: response.body.clone(),
        }),
        429 => Err(ApiError::RateLimited {
            retry_after: response
                .header("retry-after")
                .and_then(|v| v.trim().parse().ok()),
            body: response.body.clone(),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// Field names are spliced into the path, so only plain identifiers pass.
fn field_segment(field: &str) -> Result<&str, ApiError> {
    if !field.is_empty() && field.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(field)
    } else {
        Err(ApiError::InvalidField(field.to_string()))
    }
}
