//! Synchronous API client core for the Trello REST API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//!
//! # Design
//! - `TrelloClient` is stateless: it holds only the base URL and credentials.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - Arguments travel as query parameters, the way Trello expects them, and
//!   unset optional arguments are never sent.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod ids;
pub mod options;
pub mod query;
pub mod types;

pub use auth::{AuthStyle, Credentials};
pub use client::{TrelloClient, DEFAULT_BASE_URL, DEFAULT_MEMBERSHIP_FIELDS, DEFAULT_MEMBER_FIELDS};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use ids::TrelloId;
pub use options::{ActionsQuery, BoardOptions, CardOptions, ChecklistsOptions, ListsOptions};
pub use types::{
    Action, ActionCount, ActionFormat, Attachment, Badges, Board, BoardMembers, BoardPlugin,
    BoardPrefs, BoardUpdate, Card, CardFilter, CardUpdate, CheckItem, CheckItemState,
    CheckItemStatus, Checklist, CustomField, EmailPosition, Label, LabelNames, ListFilter, Member,
    MemberInvite, MemberType, Membership, MyPref, MyPrefs, NewBoard, NewCard, NewList,
    PermissionLevel, PluginData, Position, TrelloList,
};
