//! Per-operation query options.
//!
//! `Default` for each struct reproduces the parameter set the Trello web API
//! documents as its own defaults, so a default-constructed option struct
//! yields the same payload the server would assume.

use crate::ids::TrelloId;
use crate::query::Query;
use crate::types::{ActionFormat, CardFilter, ListFilter};

/// Hard upper bound Trello enforces on `limit` for action queries.
pub const MAX_ACTIONS_LIMIT: u32 = 1000;

/// Nested resources and fields for `GET /boards/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardOptions {
    pub actions: String,
    pub board_stars: String,
    pub cards: String,
    pub card_plugin_data: bool,
    pub checklists: String,
    pub custom_fields: bool,
    pub fields: String,
    pub labels: bool,
    pub lists: String,
    pub members: String,
    pub memberships: String,
    pub plugin_data: bool,
    pub organization: bool,
    pub organization_plugin_data: bool,
    pub my_prefs: bool,
    pub tags: bool,
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self {
            actions: "all".to_string(),
            board_stars: "none".to_string(),
            cards: "none".to_string(),
            card_plugin_data: false,
            checklists: "none".to_string(),
            custom_fields: false,
            fields: "name,desc,descData,closed,idOrganization,pinned,url,shortUrl,prefs,labelNames"
                .to_string(),
            labels: false,
            lists: "open".to_string(),
            members: "none".to_string(),
            memberships: "none".to_string(),
            plugin_data: false,
            organization: false,
            organization_plugin_data: false,
            my_prefs: false,
            tags: false,
        }
    }
}

impl BoardOptions {
    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push("actions", &self.actions)
            .push("boardStars", &self.board_stars)
            .push("cards", &self.cards)
            .push("card_pluginData", self.card_plugin_data)
            .push("checklists", &self.checklists)
            .push("customFields", self.custom_fields)
            .push("fields", &self.fields)
            .push("labels", self.labels)
            .push("lists", &self.lists)
            .push("members", &self.members)
            .push("memberships", &self.memberships)
            .push("pluginData", self.plugin_data)
            .push("organization", self.organization)
            .push("organization_pluginData", self.organization_plugin_data)
            .push("myPrefs", self.my_prefs)
            .push("tags", self.tags);
    }
}

/// Nested resources and fields for `GET /cards/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardOptions {
    pub fields: String,
    pub actions: bool,
    pub attachments: bool,
    pub attachment_fields: String,
    pub members: bool,
    pub member_fields: String,
    pub members_voted: bool,
    pub member_voted_fields: String,
    pub check_item_states: bool,
    pub checklists: String,
    pub checklist_fields: String,
    pub board: bool,
    pub board_fields: String,
    pub list: bool,
    pub plugin_data: bool,
    pub stickers: bool,
    pub sticker_fields: String,
    pub custom_field_items: bool,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            fields: "all".to_string(),
            actions: false,
            attachments: false,
            attachment_fields: "all".to_string(),
            members: false,
            member_fields: "all".to_string(),
            members_voted: false,
            member_voted_fields: "all".to_string(),
            check_item_states: false,
            checklists: "none".to_string(),
            checklist_fields: "all".to_string(),
            board: false,
            board_fields: "name,desc,descData,closed,idOrganization,pinned,url,prefs".to_string(),
            list: false,
            plugin_data: false,
            stickers: false,
            sticker_fields: "all".to_string(),
            custom_field_items: false,
        }
    }
}

impl CardOptions {
    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push("fields", &self.fields)
            .push("actions", self.actions)
            .push("attachments", self.attachments)
            .push("attachment_fields", &self.attachment_fields)
            .push("members", self.members)
            .push("member_fields", &self.member_fields)
            .push("membersVoted", self.members_voted)
            .push("memberVoted_fields", &self.member_voted_fields)
            .push("checkItemStates", self.check_item_states)
            .push("checklists", &self.checklists)
            .push("checklist_fields", &self.checklist_fields)
            .push("board", self.board)
            .push("board_fields", &self.board_fields)
            .push("list", self.list)
            .push("pluginData", self.plugin_data)
            .push("stickers", self.stickers)
            .push("sticker_fields", &self.sticker_fields)
            .push("customFieldItems", self.custom_field_items);
    }
}

/// Filters and paging for board or card action logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionsQuery {
    /// Comma-separated action types, e.g. `createCard,updateCard`.
    pub filter: Option<String>,
    pub fields: Option<String>,
    pub format: ActionFormat,
    pub id_models: Vec<TrelloId>,
    pub limit: u32,
    pub member: bool,
    pub member_fields: Option<String>,
    pub member_creator: bool,
    pub member_creator_fields: Option<String>,
    pub page: u32,
    pub reactions: bool,
    /// Only actions before this action id.
    pub before: Option<TrelloId>,
    /// Only actions after this action id.
    pub since: Option<TrelloId>,
}

impl Default for ActionsQuery {
    fn default() -> Self {
        Self {
            filter: None,
            fields: None,
            format: ActionFormat::List,
            id_models: Vec::new(),
            limit: 50,
            member: true,
            member_fields: None,
            member_creator: true,
            member_creator_fields: None,
            page: 0,
            reactions: false,
            before: None,
            since: None,
        }
    }
}

impl ActionsQuery {
    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push_opt("fields", self.fields.as_ref())
            .push_opt("filter", self.filter.as_ref())
            .push("format", self.format)
            .push_list("idModels", &self.id_models)
            .push("limit", self.limit.min(MAX_ACTIONS_LIMIT))
            .push("member", self.member)
            .push_opt("member_fields", self.member_fields.as_ref())
            .push("memberCreator", self.member_creator)
            .push_opt("memberCreator_fields", self.member_creator_fields.as_ref())
            .push("page", self.page)
            .push("reactions", self.reactions)
            .push_opt("before", self.before.as_ref())
            .push_opt("since", self.since.as_ref());
    }
}

/// Options for `GET /boards/{id}/lists`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListsOptions {
    pub filter: ListFilter,
    pub fields: String,
    pub cards: CardFilter,
    pub card_fields: String,
}

impl Default for ListsOptions {
    fn default() -> Self {
        Self {
            filter: ListFilter::All,
            fields: "all".to_string(),
            cards: CardFilter::All,
            card_fields: "all".to_string(),
        }
    }
}

impl ListsOptions {
    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push("filter", self.filter)
            .push("fields", &self.fields)
            .push("cards", self.cards)
            .push("card_fields", &self.card_fields);
    }
}

/// Options for `GET /cards/{id}/checklists`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistsOptions {
    pub check_items: String,
    pub check_item_fields: String,
    pub filter: String,
    pub fields: String,
}

impl Default for ChecklistsOptions {
    fn default() -> Self {
        Self {
            check_items: "all".to_string(),
            check_item_fields: "name,nameData,pos,state,due,dueReminder,idMember".to_string(),
            filter: "all".to_string(),
            fields: "all".to_string(),
        }
    }
}

impl ChecklistsOptions {
    pub(crate) fn write_query(&self, q: &mut Query) {
        q.push("checkItems", &self.check_items)
            .push("checkItem_fields", &self.check_item_fields)
            .push("filter", &self.filter)
            .push("fields", &self.fields);
    }
}
