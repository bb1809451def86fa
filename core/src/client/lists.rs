//! List endpoints.

use super::TrelloClient;
use crate::http::{HttpMethod, HttpRequest};
use crate::ids::TrelloId;
use crate::query::Query;
use crate::types::NewList;

impl TrelloClient {
    /// Parse with `parse_list`.
    pub fn build_create_list(&self, input: &NewList) -> HttpRequest {
        let mut q = Query::new();
        input.write_query(&mut q);
        self.request(HttpMethod::Post, "lists", q)
    }

    /// Parse with `parse_cards`.
    pub fn build_get_list_cards(&self, id: &TrelloId) -> HttpRequest {
        self.get(&format!("lists/{id}/cards"), Query::new())
    }
}
