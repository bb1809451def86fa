//! A client paired with an executor: one method call, one round-trip.
//!
//! `Trello` drives a blocking `Transport`, `AsyncTrello` an `AsyncTransport`.
//! Both delegate request building and response parsing to `TrelloClient`, so
//! they add no API semantics of their own.

use std::collections::BTreeMap;

use tracing::warn;
use trello_core::{
    ApiError, Board, BoardMembers, BoardOptions, BoardUpdate, Card, CardFilter, CardOptions,
    CardUpdate, CheckItem, Checklist, ChecklistsOptions, HttpRequest, HttpResponse, Label,
    ListsOptions, MemberInvite, MemberType, MyPref, MyPrefs, NewBoard, NewCard, NewList,
    TrelloClient, TrelloId, TrelloList,
};

use crate::error::Error;
use crate::transport::{AsyncTransport, Transport};

/// Blocking session.
pub struct Trello<T> {
    client: TrelloClient,
    transport: T,
}

impl<T: Transport> Trello<T> {
    pub fn new(client: TrelloClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TrelloClient {
        &self.client
    }

    /// Execute `request` and decode the response with `parse`.
    ///
    /// Any `build_*`/`parse_*` pair of `TrelloClient` fits, which covers the
    /// operations without a convenience method here.
    pub fn call<R>(
        &self,
        request: HttpRequest,
        parse: impl FnOnce(&TrelloClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, Error> {
        let response = self.transport.execute(&request)?;
        parse(&self.client, response).map_err(|err| {
            warn!(method = %request.method, url = %request.redacted_url(), error = %err, "api call failed");
            Error::Api(err)
        })
    }

    pub fn boards(&self) -> Result<Vec<Board>, Error> {
        self.call(self.client.build_list_boards(), TrelloClient::parse_boards)
    }

    pub fn board_ids(&self) -> Result<BTreeMap<String, TrelloId>, Error> {
        self.call(self.client.build_list_boards(), TrelloClient::parse_board_ids)
    }

    pub fn board(&self, id: &TrelloId) -> Result<Board, Error> {
        let request = self.client.build_get_board(id, &BoardOptions::default());
        self.call(request, TrelloClient::parse_board)
    }

    pub fn create_board(&self, input: &NewBoard) -> Result<Board, Error> {
        self.call(self.client.build_create_board(input), TrelloClient::parse_board)
    }

    pub fn update_board(&self, id: &TrelloId, input: &BoardUpdate) -> Result<Board, Error> {
        self.call(self.client.build_update_board(id, input), TrelloClient::parse_board)
    }

    pub fn delete_board(&self, id: &TrelloId) -> Result<(), Error> {
        self.call(self.client.build_delete_board(id), TrelloClient::parse_deleted)
    }

    pub fn invite_member(
        &self,
        board_id: &TrelloId,
        invite: &MemberInvite,
    ) -> Result<BoardMembers, Error> {
        let request = self.client.build_invite_member(board_id, invite)?;
        self.call(request, TrelloClient::parse_board_members)
    }

    pub fn add_member(
        &self,
        board_id: &TrelloId,
        member_id: &TrelloId,
        member_type: MemberType,
    ) -> Result<BoardMembers, Error> {
        let request = self
            .client
            .build_add_member(board_id, member_id, member_type, false);
        self.call(request, TrelloClient::parse_board_members)
    }

    pub fn update_my_pref(&self, board_id: &TrelloId, pref: &MyPref) -> Result<MyPrefs, Error> {
        let request = self.client.build_update_my_pref(board_id, pref);
        self.call(request, TrelloClient::parse_my_prefs)
    }

    pub fn lists(&self, board_id: &TrelloId) -> Result<Vec<TrelloList>, Error> {
        let request = self.client.build_get_lists(board_id, &ListsOptions::default());
        self.call(request, TrelloClient::parse_lists)
    }

    pub fn create_list(&self, input: &NewList) -> Result<TrelloList, Error> {
        self.call(self.client.build_create_list(input), TrelloClient::parse_list)
    }

    pub fn labels(&self, board_id: &TrelloId) -> Result<Vec<Label>, Error> {
        self.call(self.client.build_get_labels(board_id), TrelloClient::parse_labels)
    }

    /// Open cards on a board, or the cards matching `filter`.
    pub fn cards(&self, board_id: &TrelloId, filter: Option<CardFilter>) -> Result<Vec<Card>, Error> {
        let request = match filter {
            Some(filter) => self.client.build_get_filtered_cards(board_id, filter),
            None => self.client.build_get_board_cards(board_id),
        };
        self.call(request, TrelloClient::parse_cards)
    }

    pub fn card(&self, id: &TrelloId) -> Result<Card, Error> {
        let request = self.client.build_get_card(id, &CardOptions::default());
        self.call(request, TrelloClient::parse_card)
    }

    pub fn create_card(&self, input: &NewCard) -> Result<Card, Error> {
        self.call(self.client.build_create_card(input), TrelloClient::parse_card)
    }

    pub fn update_card(&self, id: &TrelloId, input: &CardUpdate) -> Result<Card, Error> {
        self.call(self.client.build_update_card(id, input), TrelloClient::parse_card)
    }

    pub fn archive_card(&self, id: &TrelloId) -> Result<Card, Error> {
        self.update_card(id, &CardUpdate::archive())
    }

    pub fn delete_card(&self, id: &TrelloId) -> Result<(), Error> {
        self.call(self.client.build_delete_card(id), TrelloClient::parse_deleted)
    }

    pub fn card_checklists(&self, card_id: &TrelloId) -> Result<Vec<Checklist>, Error> {
        let request = self
            .client
            .build_get_card_checklists(card_id, &ChecklistsOptions::default());
        self.call(request, TrelloClient::parse_checklists)
    }

    pub fn create_checklist(&self, card_id: &TrelloId, name: &str) -> Result<Checklist, Error> {
        let request = self.client.build_create_checklist(card_id, name);
        self.call(request, TrelloClient::parse_checklist)
    }

    pub fn add_check_item(
        &self,
        checklist_id: &TrelloId,
        name: &str,
        checked: bool,
    ) -> Result<CheckItem, Error> {
        let request = self.client.build_add_check_item(checklist_id, name, checked);
        self.call(request, TrelloClient::parse_check_item)
    }
}

/// Non-blocking session.
pub struct AsyncTrello<T> {
    client: TrelloClient,
    transport: T,
}

impl<T: AsyncTransport> AsyncTrello<T> {
    pub fn new(client: TrelloClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &TrelloClient {
        &self.client
    }

    pub async fn call<R>(
        &self,
        request: HttpRequest,
        parse: impl FnOnce(&TrelloClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, Error> {
        let response = self.transport.execute(&request).await?;
        parse(&self.client, response).map_err(|err| {
            warn!(method = %request.method, url = %request.redacted_url(), error = %err, "api call failed");
            Error::Api(err)
        })
    }

    pub async fn boards(&self) -> Result<Vec<Board>, Error> {
        self.call(self.client.build_list_boards(), TrelloClient::parse_boards)
            .await
    }

    pub async fn board(&self, id: &TrelloId) -> Result<Board, Error> {
        let request = self.client.build_get_board(id, &BoardOptions::default());
        self.call(request, TrelloClient::parse_board).await
    }

    pub async fn create_board(&self, input: &NewBoard) -> Result<Board, Error> {
        self.call(self.client.build_create_board(input), TrelloClient::parse_board)
            .await
    }

    pub async fn lists(&self, board_id: &TrelloId) -> Result<Vec<TrelloList>, Error> {
        let request = self.client.build_get_lists(board_id, &ListsOptions::default());
        self.call(request, TrelloClient::parse_lists).await
    }

    pub async fn card(&self, id: &TrelloId) -> Result<Card, Error> {
        let request = self.client.build_get_card(id, &CardOptions::default());
        self.call(request, TrelloClient::parse_card).await
    }

    pub async fn create_card(&self, input: &NewCard) -> Result<Card, Error> {
        self.call(self.client.build_create_card(input), TrelloClient::parse_card)
            .await
    }

    pub async fn update_card(&self, id: &TrelloId, input: &CardUpdate) -> Result<Card, Error> {
        self.call(self.client.build_update_card(id, input), TrelloClient::parse_card)
            .await
    }

    pub async fn delete_card(&self, id: &TrelloId) -> Result<(), Error> {
        self.call(self.client.build_delete_card(id), TrelloClient::parse_deleted)
            .await
    }
}
