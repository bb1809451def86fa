//! Domain DTOs for the Trello API.
//!
//! # Design
//! Response records are deserialized leniently: Trello lets the caller narrow
//! the returned `fields`, so anything beyond `id` is optional or defaulted.
//! Input records (`New*`, `*Update`) are rendered into query parameters, the
//! way Trello expects create/update arguments. They also derive serde so test
//! vectors can describe them as JSON.
//!
//! These types are defined independently from the mock-server crate;
//! integration tests catch schema drift between the two.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::TrelloId;
use crate::query::Query;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Position of a list, card or checklist within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    Bottom,
    #[serde(untagged)]
    At(f64),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Top => f.write_str("top"),
            Position::Bottom => f.write_str("bottom"),
            Position::At(pos) => write!(f, "{pos}"),
        }
    }
}

macro_rules! query_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($name))),
                }
            }
        }
    };
}

query_enum!(
    /// Filter for `GET /boards/{id}/cards/{filter}`.
    CardFilter {
        All => "all",
        Closed => "closed",
        None => "none",
        Open => "open",
        Visible => "visible",
    }
);

query_enum!(
    /// Filter for `GET /boards/{id}/lists/{filter}`.
    ListFilter {
        All => "all",
        Closed => "closed",
        None => "none",
        Open => "open",
    }
);

query_enum!(
    ActionFormat {
        List => "list",
        Count => "count",
    }
);

query_enum!(
    PermissionLevel {
        Org => "org",
        Private => "private",
        Public => "public",
    }
);

query_enum!(
    CheckItemStatus {
        Complete => "complete",
        Incomplete => "incomplete",
    }
);

query_enum!(
    /// Role of a member on a board.
    MemberType {
        Admin => "admin",
        Normal => "normal",
        Observer => "observer",
    }
);

query_enum!(
    /// Where the email-to-board address places new cards.
    EmailPosition {
        Bottom => "bottom",
        Top => "top",
    }
);

/// One of the acting member's preferences on a board, with its new value.
///
/// Each variant maps to `PUT /boards/{id}/myPrefs/{name}?value=...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MyPref {
    EmailPosition(EmailPosition),
    /// List that receives cards emailed to the board.
    IdEmailList(TrelloId),
    ShowListGuide(bool),
    ShowSidebar(bool),
    ShowSidebarActivity(bool),
    ShowSidebarBoardActions(bool),
    ShowSidebarMembers(bool),
}

impl MyPref {
    /// Path segment naming the preference.
    pub fn name(&self) -> &'static str {
        match self {
            MyPref::EmailPosition(_) => "emailPosition",
            MyPref::IdEmailList(_) => "idEmailList",
            MyPref::ShowListGuide(_) => "showListGuide",
            MyPref::ShowSidebar(_) => "showSidebar",
            MyPref::ShowSidebarActivity(_) => "showSidebarActivity",
            MyPref::ShowSidebarBoardActions(_) => "showSidebarBoardActions",
            MyPref::ShowSidebarMembers(_) => "showSidebarMembers",
        }
    }

    pub fn value(&self) -> String {
        match self {
            MyPref::EmailPosition(position) => position.to_string(),
            MyPref::IdEmailList(id) => id.to_string(),
            MyPref::ShowListGuide(on)
            | MyPref::ShowSidebar(on)
            | MyPref::ShowSidebarActivity(on)
            | MyPref::ShowSidebarBoardActions(on)
            | MyPref::ShowSidebarMembers(on) => on.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Response records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: TrelloId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub id_organization: Option<String>,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub short_url: Option<String>,
    #[serde(default)]
    pub prefs: Option<BoardPrefs>,
    #[serde(default)]
    pub label_names: Option<LabelNames>,
    #[serde(default)]
    pub date_last_activity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardPrefs {
    pub permission_level: Option<String>,
    pub voting: Option<String>,
    pub comments: Option<String>,
    pub invitations: Option<String>,
    pub self_join: Option<bool>,
    pub card_covers: Option<bool>,
    pub hide_votes: Option<bool>,
    pub background: Option<String>,
    pub card_aging: Option<String>,
    pub calendar_feed_enabled: Option<bool>,
}

/// Display names of the six default label colours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelNames {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yellow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purple: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue: Option<String>,
}

impl LabelNames {
    fn entries(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("green", self.green.as_deref()),
            ("yellow", self.yellow.as_deref()),
            ("orange", self.orange.as_deref()),
            ("red", self.red.as_deref()),
            ("purple", self.purple.as_deref()),
            ("blue", self.blue.as_deref()),
        ]
    }
}

/// A list (column) on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloList {
    pub id: TrelloId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub id_board: Option<TrelloId>,
    #[serde(default)]
    pub pos: Option<f64>,
    #[serde(default)]
    pub subscribed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: TrelloId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub id_board: Option<TrelloId>,
    #[serde(default)]
    pub id_list: Option<TrelloId>,
    #[serde(default)]
    pub id_labels: Vec<TrelloId>,
    #[serde(default)]
    pub id_members: Vec<TrelloId>,
    #[serde(default)]
    pub id_checklists: Vec<TrelloId>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub due_complete: bool,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub pos: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub short_url: Option<String>,
    #[serde(default)]
    pub date_last_activity: Option<String>,
    #[serde(default)]
    pub badges: Option<Badges>,
}

/// Summary counters shown on the front of a card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Badges {
    pub votes: u32,
    pub comments: u32,
    pub attachments: u32,
    pub check_items: u32,
    pub check_items_checked: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: TrelloId,
    #[serde(default)]
    pub id_board: Option<TrelloId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: TrelloId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub initials: Option<String>,
    #[serde(default)]
    pub avatar_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: TrelloId,
    pub id_member: TrelloId,
    pub member_type: String,
    #[serde(default)]
    pub unconfirmed: bool,
    #[serde(default)]
    pub deactivated: bool,
    /// Present when the call asked for `member_fields`.
    #[serde(default)]
    pub member: Option<Member>,
}

/// Roster returned when a member is invited to or added to a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMembers {
    pub id: TrelloId,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

/// The acting member's preferences on one board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MyPrefs {
    pub show_sidebar: Option<bool>,
    pub show_sidebar_members: Option<bool>,
    pub show_sidebar_board_actions: Option<bool>,
    pub show_sidebar_activity: Option<bool>,
    pub show_list_guide: Option<bool>,
    pub email_position: Option<EmailPosition>,
    pub id_email_list: Option<TrelloId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: TrelloId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id_board: Option<TrelloId>,
    #[serde(default)]
    pub id_card: Option<TrelloId>,
    #[serde(default)]
    pub pos: Option<f64>,
    #[serde(default)]
    pub check_items: Vec<CheckItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckItem {
    pub id: TrelloId,
    #[serde(default)]
    pub name: String,
    pub state: CheckItemStatus,
    #[serde(default)]
    pub id_checklist: Option<TrelloId>,
    #[serde(default)]
    pub pos: Option<f64>,
    #[serde(default)]
    pub due: Option<String>,
    /// Minutes before `due` at which the assignee is reminded.
    #[serde(default)]
    pub due_reminder: Option<i64>,
    #[serde(default)]
    pub id_member: Option<TrelloId>,
}

/// Entry of `GET /cards/{id}/checkItemStates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckItemState {
    pub id_check_item: TrelloId,
    pub state: CheckItemStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: TrelloId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub is_upload: bool,
    #[serde(default)]
    pub id_member: Option<TrelloId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: TrelloId,
    #[serde(default)]
    pub id_model: Option<TrelloId>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(default)]
    pub pos: Option<f64>,
}

/// An entry in a board or card activity log.
///
/// `data` varies by action type and is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: TrelloId,
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub id_member_creator: Option<TrelloId>,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub member_creator: Option<Member>,
}

/// Response of an actions request made with `format=count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCount {
    #[serde(rename = "_value")]
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginData {
    pub id: String,
    pub id_plugin: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub id_model: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub access: String,
}

/// A Power-Up enabled on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPlugin {
    pub id: String,
    #[serde(default)]
    pub id_board: Option<TrelloId>,
    pub id_plugin: String,
}

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBoard {
    pub name: String,
    pub desc: Option<String>,
    pub default_lists: Option<bool>,
    pub default_labels: Option<bool>,
    pub id_organization: Option<String>,
    pub permission_level: Option<PermissionLevel>,
    pub id_board_source: Option<TrelloId>,
}

impl NewBoard {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push("name", &self.name)
            .push_opt("desc", self.desc.as_ref())
            .push_opt("defaultLists", self.default_lists)
            .push_opt("defaultLabels", self.default_labels)
            .push_opt("idOrganization", self.id_organization.as_ref())
            .push_opt("prefs_permissionLevel", self.permission_level)
            .push_opt("idBoardSource", self.id_board_source.as_ref());
    }
}

/// Partial update of a board. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardUpdate {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub closed: Option<bool>,
    pub subscribed: Option<bool>,
    pub id_organization: Option<String>,
    pub permission_level: Option<PermissionLevel>,
    pub self_join: Option<bool>,
    pub card_covers: Option<bool>,
    pub hide_votes: Option<bool>,
    pub invitations: Option<String>,
    pub voting: Option<String>,
    pub comments: Option<String>,
    pub background: Option<String>,
    pub card_aging: Option<String>,
    pub calendar_feed_enabled: Option<bool>,
    pub label_names: Option<LabelNames>,
}

impl BoardUpdate {
    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push_opt("name", self.name.as_ref())
            .push_opt("desc", self.desc.as_ref())
            .push_opt("closed", self.closed)
            .push_opt("subscribed", self.subscribed)
            .push_opt("idOrganization", self.id_organization.as_ref())
            .push_opt("prefs/permissionLevel", self.permission_level)
            .push_opt("prefs/selfJoin", self.self_join)
            .push_opt("prefs/cardCovers", self.card_covers)
            .push_opt("prefs/hideVotes", self.hide_votes)
            .push_opt("prefs/invitations", self.invitations.as_ref())
            .push_opt("prefs/voting", self.voting.as_ref())
            .push_opt("prefs/comments", self.comments.as_ref())
            .push_opt("prefs/background", self.background.as_ref())
            .push_opt("prefs/cardAging", self.card_aging.as_ref())
            .push_opt("prefs/calendarFeedEnabled", self.calendar_feed_enabled);
        if let Some(names) = &self.label_names {
            for (color, name) in names.entries() {
                q.push_opt(&format!("labelNames/{color}"), name);
            }
        }
    }
}

/// Invitation of someone to a board by email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInvite {
    pub email: String,
    #[serde(rename = "type", default = "MemberInvite::default_type")]
    pub member_type: MemberType,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl MemberInvite {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            member_type: Self::default_type(),
            full_name: None,
        }
    }

    fn default_type() -> MemberType {
        MemberType::Normal
    }

    /// Problems Trello would reject the invitation for, if any.
    pub(crate) fn problem(&self) -> Option<String> {
        if self.email.trim().is_empty() {
            return Some("email must not be empty".to_string());
        }
        match &self.full_name {
            Some(name) if name.is_empty() => Some("fullName must not be empty".to_string()),
            Some(name) if name.starts_with(' ') || name.ends_with(' ') => Some(format!(
                "fullName {name:?} must not begin or end with a space"
            )),
            _ => None,
        }
    }

    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push("email", &self.email)
            .push("type", self.member_type)
            .push_opt("fullName", self.full_name.as_ref());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewList {
    pub name: String,
    pub id_board: TrelloId,
    #[serde(default)]
    pub pos: Option<Position>,
    #[serde(default)]
    pub id_list_source: Option<TrelloId>,
}

impl NewList {
    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push("name", &self.name)
            .push("idBoard", &self.id_board)
            .push_opt("pos", self.pos)
            .push_opt("idListSource", self.id_list_source.as_ref());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub id_list: TrelloId,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub pos: Option<Position>,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub due_complete: Option<bool>,
    #[serde(default)]
    pub id_members: Vec<TrelloId>,
    #[serde(default)]
    pub id_labels: Vec<TrelloId>,
    #[serde(default)]
    pub url_source: Option<String>,
    #[serde(default)]
    pub id_card_source: Option<TrelloId>,
}

impl NewCard {
    pub fn new(id_list: TrelloId, name: impl Into<String>) -> Self {
        Self {
            id_list,
            name: name.into(),
            desc: None,
            pos: None,
            due: None,
            start: None,
            due_complete: None,
            id_members: Vec::new(),
            id_labels: Vec::new(),
            url_source: None,
            id_card_source: None,
        }
    }

    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push("idList", &self.id_list)
            .push("name", &self.name)
            .push_opt("desc", self.desc.as_ref())
            .push_opt("pos", self.pos)
            .push_opt("due", self.due.as_ref())
            .push_opt("start", self.start.as_ref())
            .push_opt("dueComplete", self.due_complete)
            .push_list("idMembers", &self.id_members)
            .push_list("idLabels", &self.id_labels)
            .push_opt("urlSource", self.url_source.as_ref())
            .push_opt("idCardSource", self.id_card_source.as_ref());
    }
}

/// Partial update of a card. Only `Some` fields are sent; an empty
/// `id_members`/`id_labels` vector clears the assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardUpdate {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub closed: Option<bool>,
    pub id_list: Option<TrelloId>,
    pub id_board: Option<TrelloId>,
    pub pos: Option<Position>,
    pub due: Option<String>,
    pub start: Option<String>,
    pub due_complete: Option<bool>,
    pub subscribed: Option<bool>,
    pub id_members: Option<Vec<TrelloId>>,
    pub id_labels: Option<Vec<TrelloId>>,
}

impl CardUpdate {
    pub fn archive() -> Self {
        Self {
            closed: Some(true),
            ..Self::default()
        }
    }

    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push_opt("name", self.name.as_ref())
            .push_opt("desc", self.desc.as_ref())
            .push_opt("closed", self.closed)
            .push_opt("idList", self.id_list.as_ref())
            .push_opt("idBoard", self.id_board.as_ref())
            .push_opt("pos", self.pos)
            .push_opt("due", self.due.as_ref())
            .push_opt("start", self.start.as_ref())
            .push_opt("dueComplete", self.due_complete)
            .push_opt("subscribed", self.subscribed)
            .push_opt("idMembers", self.id_members.as_deref().map(join_ids))
            .push_opt("idLabels", self.id_labels.as_deref().map(join_ids));
    }
}

fn join_ids(ids: &[TrelloId]) -> String {
    ids.iter().map(TrelloId::as_str).collect::<Vec<_>>().join(",")
}
