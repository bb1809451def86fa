//! Card endpoints: `/cards/...`.

use super::{field_segment, TrelloClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::ids::TrelloId;
use crate::options::{CardOptions, ChecklistsOptions};
use crate::query::Query;
use crate::types::{CardUpdate, NewCard};

/// Member fields requested when the caller does not narrow them.
pub const DEFAULT_MEMBER_FIELDS: &str = "avatarHash,fullName,initials,username";

impl TrelloClient {
    pub fn build_get_card(&self, id: &TrelloId, options: &CardOptions) -> HttpRequest {
        let mut q = Query::new();
        options.write_query(&mut q);
        self.get(&format!("cards/{id}"), q)
    }

    pub fn build_get_card_field(&self, id: &TrelloId, field: &str) -> Result<HttpRequest, ApiError> {
        let field = field_segment(field)?;
        Ok(self.get(&format!("cards/{id}/{field}"), Query::new()))
    }

    pub fn build_get_card_actions(
        &self,
        id: &TrelloId,
        filter: Option<&str>,
        page: u32,
    ) -> HttpRequest {
        let mut q = Query::new();
        q.push_opt("filter", filter).push("page", page);
        self.get(&format!("cards/{id}/actions"), q)
    }

    /// With `cover_only` the server returns just the cover attachment.
    pub fn build_get_attachments(&self, id: &TrelloId, fields: &str, cover_only: bool) -> HttpRequest {
        let mut q = Query::new();
        q.push("fields", fields)
            .push("filter", if cover_only { "cover" } else { "false" });
        self.get(&format!("cards/{id}/attachments"), q)
    }

    pub fn build_get_card_attachment(
        &self,
        card_id: &TrelloId,
        attachment_id: &TrelloId,
        fields: &[&str],
    ) -> HttpRequest {
        let mut q = Query::new();
        q.push_list("fields", fields);
        self.get(&format!("cards/{card_id}/attachments/{attachment_id}"), q)
    }

    /// Parse with `parse_board`.
    pub fn build_get_card_board(&self, id: &TrelloId, fields: &str) -> HttpRequest {
        let mut q = Query::new();
        q.push("fields", fields);
        self.get(&format!("cards/{id}/board"), q)
    }

    /// Parse with `parse_check_item_states`.
    pub fn build_get_completed_check_items(&self, id: &TrelloId, fields: &str) -> HttpRequest {
        let mut q = Query::new();
        q.push("fields", fields);
        self.get(&format!("cards/{id}/checkItemStates"), q)
    }

    pub fn build_get_card_checklists(&self, id: &TrelloId, options: &ChecklistsOptions) -> HttpRequest {
        let mut q = Query::new();
        options.write_query(&mut q);
        self.get(&format!("cards/{id}/checklists"), q)
    }

    pub fn build_get_card_check_item(
        &self,
        card_id: &TrelloId,
        check_item_id: &TrelloId,
        fields: &str,
    ) -> HttpRequest {
        let mut q = Query::new();
        q.push("fields", fields);
        self.get(&format!("cards/{card_id}/checkItem/{check_item_id}"), q)
    }

    /// Parse with `parse_list`.
    pub fn build_get_card_list(&self, id: &TrelloId, fields: &str) -> HttpRequest {
        let mut q = Query::new();
        q.push("fields", fields);
        self.get(&format!("cards/{id}/list"), q)
    }

    pub fn build_get_card_members(&self, id: &TrelloId, fields: &str) -> HttpRequest {
        let mut q = Query::new();
        q.push("fields", fields);
        self.get(&format!("cards/{id}/members"), q)
    }

    pub fn build_get_card_members_voted(&self, id: &TrelloId, fields: &str) -> HttpRequest {
        let mut q = Query::new();
        q.push("fields", fields);
        self.get(&format!("cards/{id}/membersVoted"), q)
    }

    pub fn build_get_card_plugin_data(&self, id: &TrelloId) -> HttpRequest {
        self.get(&format!("cards/{id}/pluginData"), Query::new())
    }

    pub fn build_create_card(&self, input: &NewCard) -> HttpRequest {
        let mut q = Query::new();
        input.write_query(&mut q);
        self.request(HttpMethod::Post, "cards", q)
    }

    pub fn build_update_card(&self, id: &TrelloId, input: &CardUpdate) -> HttpRequest {
        let mut q = Query::new();
        input.write_query(&mut q);
        self.request(HttpMethod::Put, &format!("cards/{id}"), q)
    }

    pub fn build_delete_card(&self, id: &TrelloId) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("cards/{id}"), Query::new())
    }

    /// Parse with `parse_checklist`.
    pub fn build_create_checklist(&self, card_id: &TrelloId, name: &str) -> HttpRequest {
        let mut q = Query::new();
        q.push("idCard", card_id).push("name", name);
        self.request(HttpMethod::Post, "checklists", q)
    }

    /// Parse with `parse_check_item`.
    pub fn build_add_check_item(
        &self,
        checklist_id: &TrelloId,
        name: &str,
        checked: bool,
    ) -> HttpRequest {
        let mut q = Query::new();
        q.push("name", name).push("checked", checked);
        self.request(
            HttpMethod::Post,
            &format!("checklists/{checklist_id}/checkItems"),
            q,
        )
    }
}
