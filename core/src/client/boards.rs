//! Board endpoints: `/members/me/boards` and `/boards/...`.

use super::{field_segment, TrelloClient};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::ids::TrelloId;
use crate::options::{ActionsQuery, BoardOptions, ListsOptions};
use crate::query::Query;
use crate::types::{BoardUpdate, CardFilter, ListFilter, MemberInvite, MemberType, MyPref, NewBoard};

/// `member_fields` sent by `build_update_membership` when none are given.
pub const DEFAULT_MEMBERSHIP_FIELDS: &str = "fullName, username";

impl TrelloClient {
    /// Boards of the member owning the token. Parse with `parse_boards` or
    /// `parse_board_ids`.
    pub fn build_list_boards(&self) -> HttpRequest {
        self.get("members/me/boards", Query::new())
    }

    pub fn build_get_board(&self, id: &TrelloId, options: &BoardOptions) -> HttpRequest {
        let mut q = Query::new();
        options.write_query(&mut q);
        self.get(&format!("boards/{id}"), q)
    }

    pub fn build_get_board_field(&self, id: &TrelloId, field: &str) -> Result<HttpRequest, ApiError> {
        let field = field_segment(field)?;
        Ok(self.get(&format!("boards/{id}/{field}"), Query::new()))
    }

    /// Parse with `parse_actions`, or `parse_action_count` when
    /// `query.format` is `Count`.
    pub fn build_get_board_actions(&self, id: &TrelloId, query: &ActionsQuery) -> HttpRequest {
        let mut q = Query::new();
        query.write_query(&mut q);
        self.get(&format!("boards/{id}/actions"), q)
    }

    pub fn build_get_board_cards(&self, id: &TrelloId) -> HttpRequest {
        self.get(&format!("boards/{id}/cards"), Query::new())
    }

    /// A card looked up through its board. `query` narrows the card's
    /// fields and the actions nested in the answer.
    pub fn build_get_board_card(
        &self,
        board_id: &TrelloId,
        card_id: &TrelloId,
        query: &ActionsQuery,
    ) -> HttpRequest {
        let mut q = Query::new();
        query.write_query(&mut q);
        self.get(&format!("boards/{board_id}/cards/{card_id}"), q)
    }

    pub fn build_get_filtered_cards(&self, id: &TrelloId, filter: CardFilter) -> HttpRequest {
        self.get(&format!("boards/{id}/cards/{filter}"), Query::new())
    }

    pub fn build_get_board_checklists(&self, id: &TrelloId) -> HttpRequest {
        self.get(&format!("boards/{id}/checklists"), Query::new())
    }

    pub fn build_get_custom_fields(&self, id: &TrelloId) -> HttpRequest {
        self.get(&format!("boards/{id}/customFields"), Query::new())
    }

    pub fn build_get_labels(&self, id: &TrelloId) -> HttpRequest {
        self.get(&format!("boards/{id}/labels"), Query::new())
    }

    pub fn build_get_lists(&self, id: &TrelloId, options: &ListsOptions) -> HttpRequest {
        let mut q = Query::new();
        options.write_query(&mut q);
        self.get(&format!("boards/{id}/lists"), q)
    }

    pub fn build_get_filtered_lists(&self, id: &TrelloId, filter: ListFilter) -> HttpRequest {
        self.get(&format!("boards/{id}/lists/{filter}"), Query::new())
    }

    pub fn build_get_board_members(&self, id: &TrelloId) -> HttpRequest {
        self.get(&format!("boards/{id}/members"), Query::new())
    }

    pub fn build_get_memberships(&self, id: &TrelloId) -> HttpRequest {
        self.get(&format!("boards/{id}/memberships"), Query::new())
    }

    /// Enabled Power-Ups. Parse with `parse_board_plugins`.
    pub fn build_get_board_plugins(&self, id: &TrelloId) -> HttpRequest {
        self.get(&format!("boards/{id}/boardPlugins"), Query::new())
    }

    pub fn build_create_board(&self, input: &NewBoard) -> HttpRequest {
        let mut q = Query::new();
        input.write_query(&mut q);
        self.request(HttpMethod::Post, "boards", q)
    }

    pub fn build_update_board(&self, id: &TrelloId, input: &BoardUpdate) -> HttpRequest {
        let mut q = Query::new();
        input.write_query(&mut q);
        self.request(HttpMethod::Put, &format!("boards/{id}"), q)
    }

    pub fn build_delete_board(&self, id: &TrelloId) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("boards/{id}"), Query::new())
    }

    /// Invite someone by email. Parse with `parse_board_members`.
    ///
    /// Fails with `InvalidArgument` for a blank email, or a full name that is
    /// empty or padded with spaces, before anything is sent.
    pub fn build_invite_member(
        &self,
        id: &TrelloId,
        invite: &MemberInvite,
    ) -> Result<HttpRequest, ApiError> {
        if let Some(problem) = invite.problem() {
            return Err(ApiError::InvalidArgument(problem));
        }
        let mut q = Query::new();
        invite.write_query(&mut q);
        Ok(self.request(HttpMethod::Put, &format!("boards/{id}/members"), q))
    }

    /// Add an existing member. Parse with `parse_board_members`.
    pub fn build_add_member(
        &self,
        id: &TrelloId,
        member_id: &TrelloId,
        member_type: MemberType,
        allow_billable_guest: bool,
    ) -> HttpRequest {
        let mut q = Query::new();
        q.push("type", member_type)
            .push("allowBillableGuest", allow_billable_guest);
        self.request(HttpMethod::Put, &format!("boards/{id}/members/{member_id}"), q)
    }

    /// Change the role behind a membership. Parse with `parse_membership`.
    pub fn build_update_membership(
        &self,
        id: &TrelloId,
        membership_id: &TrelloId,
        member_type: MemberType,
        member_fields: Option<&str>,
    ) -> HttpRequest {
        let mut q = Query::new();
        q.push("type", member_type)
            .push("member_fields", member_fields.unwrap_or(DEFAULT_MEMBERSHIP_FIELDS));
        self.request(
            HttpMethod::Put,
            &format!("boards/{id}/memberships/{membership_id}"),
            q,
        )
    }

    /// Set one of the acting member's preferences. Parse with `parse_my_prefs`.
    pub fn build_update_my_pref(&self, id: &TrelloId, pref: &MyPref) -> HttpRequest {
        let mut q = Query::new();
        q.push("value", pref.value());
        self.request(
            HttpMethod::Put,
            &format!("boards/{id}/myPrefs/{}", pref.name()),
            q,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tests::{client, id, ok};
    use crate::error::ApiError;
    use crate::http::HttpMethod;
    use crate::options::{ActionsQuery, BoardOptions};
    use crate::types::{
        ActionFormat, BoardUpdate, CardFilter, EmailPosition, ListFilter, MemberInvite,
        MemberType, MyPref, NewBoard, PermissionLevel,
    };

    #[test]
    fn list_boards_targets_current_member() {
        let req = client().build_list_boards();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/1/members/me/boards");
        assert!(req.body.is_none());
        assert_eq!(req.query.len(), 2);
    }

    #[test]
    fn get_board_sends_default_options() {
        let req = client().build_get_board(&id(7), &BoardOptions::default());
        assert_eq!(
            req.path,
            "http://localhost:3000/1/boards/000000000000000000000007"
        );
        assert_eq!(req.query_value("actions"), Some("all"));
        assert_eq!(req.query_value("lists"), Some("open"));
        assert_eq!(req.query_value("myPrefs"), Some("false"));
    }

    #[test]
    fn board_field_rejects_bad_field() {
        let err = client().build_get_board_field(&id(1), "name/../x").unwrap_err();
        assert!(matches!(err, ApiError::InvalidField(_)));
        let req = client().build_get_board_field(&id(1), "name").unwrap();
        assert!(req.path.ends_with("/boards/000000000000000000000001/name"));
    }

    #[test]
    fn board_field_parses_raw_value() {
        let value = client().parse_field(ok(r#"{"_value":"Roadmap"}"#)).unwrap();
        assert_eq!(value["_value"], "Roadmap");
    }

    #[test]
    fn actions_count_request_and_parse() {
        let query = ActionsQuery {
            format: ActionFormat::Count,
            filter: Some("createCard".to_string()),
            ..ActionsQuery::default()
        };
        let req = client().build_get_board_actions(&id(1), &query);
        assert!(req.path.ends_with("/actions"));
        assert_eq!(req.query_value("format"), Some("count"));
        assert_eq!(req.query_value("filter"), Some("createCard"));
        let count = client().parse_action_count(ok(r#"{"_value":12}"#)).unwrap();
        assert_eq!(count.value, 12);
    }

    #[test]
    fn filtered_paths_use_filter_segment() {
        let req = client().build_get_filtered_cards(&id(1), CardFilter::Closed);
        assert!(req.path.ends_with("/cards/closed"));
        let req = client().build_get_filtered_lists(&id(1), ListFilter::Open);
        assert!(req.path.ends_with("/lists/open"));
    }

    #[test]
    fn board_card_sends_the_action_query() {
        let req = client().build_get_board_card(&id(1), &id(2), &ActionsQuery::default());
        assert!(req
            .path
            .ends_with("/boards/000000000000000000000001/cards/000000000000000000000002"));
        assert!(req.query_value("fields").is_none());
        assert_eq!(req.query_value("memberCreator"), Some("true"));

        let query = ActionsQuery {
            fields: Some("name,desc".to_string()),
            filter: Some("commentCard".to_string()),
            id_models: vec![id(2)],
            limit: 10,
            member_fields: Some("fullName".to_string()),
            reactions: true,
            since: Some(id(30)),
            ..ActionsQuery::default()
        };
        let req = client().build_get_board_card(&id(1), &id(2), &query);
        assert_eq!(req.query_value("fields"), Some("name,desc"));
        assert_eq!(req.query_value("filter"), Some("commentCard"));
        assert_eq!(req.query_value("idModels"), Some("000000000000000000000002"));
        assert_eq!(req.query_value("limit"), Some("10"));
        assert_eq!(req.query_value("member_fields"), Some("fullName"));
        assert_eq!(req.query_value("reactions"), Some("true"));
        assert_eq!(req.query_value("since"), Some("00000000000000000000001e"));
    }

    #[test]
    fn create_board_uses_query_payload() {
        let input = NewBoard {
            desc: Some("Planning".to_string()),
            default_lists: Some(false),
            permission_level: Some(PermissionLevel::Org),
            ..NewBoard::named("Roadmap")
        };
        let req = client().build_create_board(&input);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/1/boards");
        assert!(req.body.is_none());
        assert_eq!(req.query_value("name"), Some("Roadmap"));
        assert_eq!(req.query_value("defaultLists"), Some("false"));
        assert_eq!(req.query_value("prefs_permissionLevel"), Some("org"));
        assert!(req.query_value("defaultLabels").is_none());
    }

    #[test]
    fn update_board_sends_only_set_fields() {
        let update = BoardUpdate {
            closed: Some(true),
            ..BoardUpdate::default()
        };
        let req = client().build_update_board(&id(3), &update);
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.query.len(), 3);
        assert_eq!(req.query_value("closed"), Some("true"));
    }

    #[test]
    fn parse_labels_and_memberships() {
        let labels = client()
            .parse_labels(ok(&format!(
                r#"[{{"id":"{}","idBoard":"{}","name":"Urgent","color":"red"}}]"#,
                id(5),
                id(1)
            )))
            .unwrap();
        assert_eq!(labels[0].color.as_deref(), Some("red"));

        let memberships = client()
            .parse_memberships(ok(&format!(
                r#"[{{"id":"{}","idMember":"{}","memberType":"admin","unconfirmed":false}}]"#,
                id(8),
                id(9)
            )))
            .unwrap();
        assert_eq!(memberships[0].member_type, "admin");
        assert!(!memberships[0].deactivated);
    }

    #[test]
    fn parse_board_plugins() {
        let plugins = client()
            .parse_board_plugins(ok(&format!(
                r#"[{{"id":"p1","idBoard":"{}","idPlugin":"55a5d916446f517774210004"}}]"#,
                id(1)
            )))
            .unwrap();
        assert_eq!(plugins[0].id_plugin, "55a5d916446f517774210004");
    }

    #[test]
    fn invite_member_sends_email_and_type() {
        let invite = MemberInvite {
            full_name: Some("Ada Lovelace".to_string()),
            ..MemberInvite::new("ada@example.com")
        };
        let req = client().build_invite_member(&id(1), &invite).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert!(req.path.ends_with("/boards/000000000000000000000001/members"));
        assert_eq!(req.query_value("email"), Some("ada@example.com"));
        assert_eq!(req.query_value("type"), Some("normal"));
        assert_eq!(req.query_value("fullName"), Some("Ada Lovelace"));

        let req = client()
            .build_invite_member(&id(1), &MemberInvite::new("bob@example.com"))
            .unwrap();
        assert!(req.query_value("fullName").is_none());
    }

    #[test]
    fn invite_member_rejects_bad_input_before_building() {
        let err = client()
            .build_invite_member(&id(1), &MemberInvite::new(""))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(ref msg) if msg.contains("email")));

        let invite = MemberInvite {
            full_name: Some("Ada ".to_string()),
            ..MemberInvite::new("ada@example.com")
        };
        let err = client().build_invite_member(&id(1), &invite).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(ref msg) if msg.contains("fullName")));
    }

    #[test]
    fn add_member_defaults_to_no_billable_guest() {
        let req = client().build_add_member(&id(1), &id(4), MemberType::Observer, false);
        assert_eq!(req.method, HttpMethod::Put);
        assert!(req
            .path
            .ends_with("/boards/000000000000000000000001/members/000000000000000000000004"));
        assert_eq!(req.query_value("type"), Some("observer"));
        assert_eq!(req.query_value("allowBillableGuest"), Some("false"));
    }

    #[test]
    fn update_membership_defaults_member_fields() {
        let req = client().build_update_membership(&id(1), &id(8), MemberType::Admin, None);
        assert!(req.path.ends_with("/memberships/000000000000000000000008"));
        assert_eq!(req.query_value("type"), Some("admin"));
        assert_eq!(req.query_value("member_fields"), Some("fullName, username"));
        let req =
            client().build_update_membership(&id(1), &id(8), MemberType::Normal, Some("all"));
        assert_eq!(req.query_value("member_fields"), Some("all"));
    }

    #[test]
    fn my_pref_goes_in_the_path() {
        let req = client().build_update_my_pref(&id(1), &MyPref::ShowSidebarMembers(false));
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(
            req.path,
            "http://localhost:3000/1/boards/000000000000000000000001/myPrefs/showSidebarMembers"
        );
        assert_eq!(req.query_value("value"), Some("false"));

        let req = client().build_update_my_pref(
            &id(1),
            &MyPref::EmailPosition(EmailPosition::Bottom),
        );
        assert!(req.path.ends_with("/myPrefs/emailPosition"));
        assert_eq!(req.query_value("value"), Some("bottom"));

        let req = client().build_update_my_pref(&id(1), &MyPref::IdEmailList(id(12)));
        assert!(req.path.ends_with("/myPrefs/idEmailList"));
        assert_eq!(req.query_value("value"), Some("00000000000000000000000c"));
    }

    #[test]
    fn parse_roster_membership_and_prefs() {
        let body = format!(
            r#"{{"id":"{}","members":[{{"id":"{}","fullName":"Ada"}}],
               "memberships":[{{"id":"{}","idMember":"{}","memberType":"normal","unconfirmed":true}}]}}"#,
            id(1),
            id(4),
            id(8),
            id(4)
        );
        let roster = client().parse_board_members(ok(&body)).unwrap();
        assert_eq!(roster.id, id(1));
        assert_eq!(roster.members[0].full_name.as_deref(), Some("Ada"));
        assert!(roster.memberships[0].unconfirmed);

        let body = format!(
            r#"{{"id":"{}","idMember":"{}","memberType":"admin",
               "member":{{"id":"{}","fullName":"Ada","username":"ada"}}}}"#,
            id(8),
            id(4),
            id(4)
        );
        let membership = client().parse_membership(ok(&body)).unwrap();
        assert_eq!(membership.member_type, "admin");
        assert_eq!(
            membership.member.and_then(|m| m.username).as_deref(),
            Some("ada")
        );

        let prefs = client()
            .parse_my_prefs(ok(r#"{"showSidebar":false,"emailPosition":"top","idEmailList":null}"#))
            .unwrap();
        assert_eq!(prefs.show_sidebar, Some(false));
        assert_eq!(prefs.email_position, Some(EmailPosition::Top));
    }
}
