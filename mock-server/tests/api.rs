use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{
    app, app_with_credentials, Board, Card, CheckItem, Checklist, Label, List, Member, Membership,
    MyPrefs, ME_ID,
};
use serde_json::Value;
use tower::ServiceExt;

const AUTH: &str = "key=test-key&token=test-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Authenticated request; `query` holds the call's own arguments.
fn call(method: &str, path: &str, query: &str) -> Request<String> {
    let uri = if query.is_empty() {
        format!("/1{path}?{AUTH}")
    } else {
        format!("/1{path}?{AUTH}&{query}")
    };
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn create_board(app: &Router, query: &str) -> Board {
    let resp = send(app, call("POST", "/boards", query)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

async fn lists_of(app: &Router, board: &Board) -> Vec<List> {
    let resp = send(app, call("GET", &format!("/boards/{}/lists", board.id), "")).await;
    body_json(resp).await
}

async fn create_card(app: &Router, list: &List, query: &str) -> Card {
    let query = format!("idList={}&{query}", list.id);
    let resp = send(app, call("POST", "/cards", &query)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- auth ---

#[tokio::test]
async fn missing_credentials_are_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/1/members/me/boards")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "invalid key");
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/1/members/me/boards?key=test-key&token=nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(resp).await, "invalid token");
}

#[tokio::test]
async fn oauth_header_is_accepted() {
    let resp = app_with_credentials("k1", "t1")
        .oneshot(
            Request::builder()
                .uri("/1/members/me/boards")
                .header(
                    "Authorization",
                    r#"OAuth oauth_consumer_key="k1", oauth_token="t1""#,
                )
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let boards: Vec<Board> = body_json(resp).await;
    assert!(boards.is_empty());
}

// --- boards ---

#[tokio::test]
async fn new_board_gets_default_lists_and_labels() {
    let app = app();
    let board = create_board(&app, "name=Roadmap&desc=Q3").await;
    assert_eq!(board.name, "Roadmap");
    assert_eq!(board.desc, "Q3");
    assert_eq!(board.prefs.permission_level, "private");

    let names: Vec<String> = lists_of(&app, &board).await.into_iter().map(|l| l.name).collect();
    assert_eq!(names, ["To Do", "Doing", "Done"]);

    let resp = send(&app, call("GET", &format!("/boards/{}/labels", board.id), "")).await;
    let labels: Vec<Label> = body_json(resp).await;
    assert_eq!(labels.len(), 6);
}

#[tokio::test]
async fn defaults_can_be_switched_off() {
    let app = app();
    let board = create_board(&app, "name=Empty&defaultLists=false&defaultLabels=false").await;
    assert!(lists_of(&app, &board).await.is_empty());
}

#[tokio::test]
async fn board_without_name_is_rejected() {
    let resp = send(&app(), call("POST", "/boards", "")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "invalid value for name");
}

#[tokio::test]
async fn malformed_id_is_bad_request() {
    let resp = send(&app(), call("GET", "/boards/not-an-id", "")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "invalid id");
}

#[tokio::test]
async fn unknown_board_is_not_found() {
    let resp = send(&app(), call("GET", "/boards/5a0000000000000000000fff", "")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_and_delete_board() {
    let app = app();
    let board = create_board(&app, "name=Old").await;

    let path = format!("/boards/{}", board.id);
    let resp = send(&app, call("PUT", &path, "name=New&closed=true")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Board = body_json(resp).await;
    assert_eq!(updated.name, "New");
    assert!(updated.closed);

    let resp = send(&app, call("DELETE", &path, "")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert!(body["_value"].is_null());

    let resp = send(&app, call("GET", &path, "")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn my_boards_are_sorted_by_name() {
    let app = app();
    create_board(&app, "name=Zeta").await;
    create_board(&app, "name=Alpha").await;
    let resp = send(&app, call("GET", "/members/me/boards", "")).await;
    let boards: Vec<Board> = body_json(resp).await;
    let names: Vec<&str> = boards.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Zeta"]);
}

// --- members and preferences ---

#[tokio::test]
async fn invited_member_joins_unconfirmed() {
    let app = app();
    let board = create_board(&app, "name=Team").await;
    let path = format!("/boards/{}/members", board.id);

    let resp = send(&app, call("PUT", &path, "email=ada%40example.com&fullName=Ada%20Lovelace")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let roster: Value = body_json(resp).await;
    assert_eq!(roster["id"], board.id.as_str());
    let memberships: Vec<Membership> = serde_json::from_value(roster["memberships"].clone()).unwrap();
    assert_eq!(memberships.len(), 2);
    let invited = memberships.iter().find(|m| m.id_member != ME_ID).unwrap();
    assert_eq!(invited.member_type, "normal");
    assert!(invited.unconfirmed);

    let resp = send(&app, call("GET", &path, "")).await;
    let members: Vec<Member> = body_json(resp).await;
    assert!(members.iter().any(|m| m.full_name == "Ada Lovelace"));
}

#[tokio::test]
async fn invitation_arguments_are_checked() {
    let app = app();
    let board = create_board(&app, "name=Checks").await;
    let path = format!("/boards/{}/members", board.id);

    let resp = send(&app, call("PUT", &path, "email=")).await;
    assert_eq!(body_text(resp).await, "invalid value for email");
    let resp = send(&app, call("PUT", &path, "email=ada%40example.com&fullName=%20Ada")).await;
    assert_eq!(body_text(resp).await, "invalid value for fullName");
    let resp = send(&app, call("PUT", &path, "email=ada%40example.com&type=owner")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "invalid value for type");
}

#[tokio::test]
async fn known_member_can_be_added_to_another_board() {
    let app = app();
    let first = create_board(&app, "name=First").await;
    let second = create_board(&app, "name=Second").await;

    let resp = send(
        &app,
        call("PUT", &format!("/boards/{}/members", first.id), "email=bob%40example.com"),
    )
    .await;
    let roster: Value = body_json(resp).await;
    let bob: Vec<Member> = serde_json::from_value(roster["members"].clone()).unwrap();
    let bob = bob.into_iter().find(|m| m.id != ME_ID).unwrap();
    assert_eq!(bob.username, "bob");

    let path = format!("/boards/{}/members/{}", second.id, bob.id);
    let resp = send(&app, call("PUT", &path, "type=observer&allowBillableGuest=false")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let roster: Value = body_json(resp).await;
    let memberships: Vec<Membership> = serde_json::from_value(roster["memberships"].clone()).unwrap();
    let added = memberships.iter().find(|m| m.id_member == bob.id).unwrap();
    assert_eq!(added.member_type, "observer");
    assert!(!added.unconfirmed);

    let unknown = format!("/boards/{}/members/5a0000000000000000000fff", second.id);
    let resp = send(&app, call("PUT", &unknown, "type=normal")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn membership_type_changes_but_last_admin_stays() {
    let app = app();
    let board = create_board(&app, "name=Roles").await;
    let resp = send(&app, call("GET", &format!("/boards/{}/memberships", board.id), "")).await;
    let memberships: Vec<Membership> = body_json(resp).await;
    let mine = &memberships[0];

    let path = format!("/boards/{}/memberships/{}", board.id, mine.id);
    let resp = send(&app, call("PUT", &path, "type=normal")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    send(
        &app,
        call("PUT", &format!("/boards/{}/members", board.id), "email=cy%40example.com&type=admin"),
    )
    .await;
    let resp = send(&app, call("PUT", &path, "type=normal&member_fields=fullName,username")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = body_json(resp).await;
    assert_eq!(updated["memberType"], "normal");
    assert_eq!(updated["member"]["username"], "mockuser");

    let actions = send(
        &app,
        call("GET", &format!("/boards/{}/actions", board.id), "filter=makeNormalMemberOfBoard"),
    )
    .await;
    let actions: Vec<Value> = body_json(actions).await;
    assert_eq!(actions.len(), 1);
}

#[tokio::test]
async fn my_prefs_are_updated_one_at_a_time() {
    let app = app();
    let board = create_board(&app, "name=Prefs").await;
    let lists = lists_of(&app, &board).await;
    let prefs_path = |name: &str| format!("/boards/{}/myPrefs/{name}", board.id);

    let resp = send(&app, call("PUT", &prefs_path("showSidebar"), "value=false")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let prefs: MyPrefs = body_json(resp).await;
    assert!(!prefs.show_sidebar);
    assert!(prefs.show_sidebar_members);

    let resp = send(&app, call("PUT", &prefs_path("emailPosition"), "value=top")).await;
    let prefs: MyPrefs = body_json(resp).await;
    assert_eq!(prefs.email_position, "top");
    assert!(!prefs.show_sidebar);

    let query = format!("value={}", lists[2].id);
    let resp = send(&app, call("PUT", &prefs_path("idEmailList"), &query)).await;
    let prefs: MyPrefs = body_json(resp).await;
    assert_eq!(prefs.id_email_list.as_deref(), Some(lists[2].id.as_str()));
}

#[tokio::test]
async fn bad_pref_values_are_rejected() {
    let app = app();
    let board = create_board(&app, "name=Bad").await;
    let prefs_path = |name: &str| format!("/boards/{}/myPrefs/{name}", board.id);

    let resp = send(&app, call("PUT", &prefs_path("showListGuide"), "value=True")).await;
    assert_eq!(body_text(resp).await, "invalid value for value");
    let resp = send(&app, call("PUT", &prefs_path("emailPosition"), "value=middle")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = send(
        &app,
        call("PUT", &prefs_path("idEmailList"), "value=5a0000000000000000000fff"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = send(&app, call("PUT", &prefs_path("showEverything"), "value=true")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- cards ---

#[tokio::test]
async fn card_lifecycle() {
    let app = app();
    let board = create_board(&app, "name=Work").await;
    let lists = lists_of(&app, &board).await;

    let card = create_card(&app, &lists[0], "name=Write%20tests&desc=all%20of%20them").await;
    assert_eq!(card.name, "Write tests");
    assert_eq!(card.id_board, board.id);

    let path = format!("/cards/{}", card.id);
    let query = format!("idList={}&closed=true", lists[1].id);
    let resp = send(&app, call("PUT", &path, &query)).await;
    let updated: Card = body_json(resp).await;
    assert_eq!(updated.id_list, lists[1].id);
    assert!(updated.closed);
    assert_eq!(updated.desc, "all of them");

    let resp = send(&app, call("GET", &format!("/boards/{}/cards", board.id), "")).await;
    let open: Vec<Card> = body_json(resp).await;
    assert!(open.is_empty());
    let resp = send(&app, call("GET", &format!("/boards/{}/cards/closed", board.id), "")).await;
    let closed: Vec<Card> = body_json(resp).await;
    assert_eq!(closed.len(), 1);

    let resp = send(&app, call("DELETE", &path, "")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(&app, call("GET", &path, "")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn top_position_goes_first() {
    let app = app();
    let board = create_board(&app, "name=Order").await;
    let lists = lists_of(&app, &board).await;
    create_card(&app, &lists[0], "name=First").await;
    create_card(&app, &lists[0], "name=Urgent&pos=top").await;

    let resp = send(&app, call("GET", &format!("/lists/{}/cards", lists[0].id), "")).await;
    let cards: Vec<Card> = body_json(resp).await;
    assert_eq!(cards[0].name, "Urgent");
}

#[tokio::test]
async fn moved_card_is_positioned_among_destination_cards() {
    let app = app();
    let board = create_board(&app, "name=Moves").await;
    let lists = lists_of(&app, &board).await;
    let moving = create_card(&app, &lists[0], "name=Moving").await;
    for name in ["A2", "A3", "A4"] {
        create_card(&app, &lists[0], &format!("name={name}")).await;
    }
    create_card(&app, &lists[1], "name=B1").await;
    let last = create_card(&app, &lists[1], "name=B2").await;

    let query = format!("idList={}&pos=bottom", lists[1].id);
    let resp = send(&app, call("PUT", &format!("/cards/{}", moving.id), &query)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let moved: Card = body_json(resp).await;
    assert_eq!(moved.pos, last.pos + 65536.0);

    let resp = send(&app, call("GET", &format!("/lists/{}/cards", lists[1].id), "")).await;
    let names: Vec<String> = body_json::<Vec<Card>>(resp).await.into_iter().map(|c| c.name).collect();
    assert_eq!(names, ["B1", "B2", "Moving"]);
}

#[tokio::test]
async fn card_moves_to_first_list_of_another_board() {
    let app = app();
    let source = create_board(&app, "name=Source").await;
    let target = create_board(&app, "name=Target").await;
    let card = create_card(&app, &lists_of(&app, &source).await[0], "name=Travel").await;
    let target_lists = lists_of(&app, &target).await;

    let path = format!("/cards/{}", card.id);
    let resp = send(&app, call("PUT", &path, &format!("idBoard={}", target.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let moved: Card = body_json(resp).await;
    assert_eq!(moved.id_board, target.id);
    assert_eq!(moved.id_list, target_lists[0].id);
}

#[tokio::test]
async fn list_outside_requested_board_is_rejected() {
    let app = app();
    let first = create_board(&app, "name=First").await;
    let second = create_board(&app, "name=Second").await;
    let card = create_card(&app, &lists_of(&app, &first).await[0], "name=Stuck").await;
    let other_list = &lists_of(&app, &first).await[1];

    let query = format!("idBoard={}&idList={}", second.id, other_list.id);
    let resp = send(&app, call("PUT", &format!("/cards/{}", card.id), &query)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "invalid value for idList");

    let query = "idBoard=5a0000000000000000000fff";
    let resp = send(&app, call("PUT", &format!("/cards/{}", card.id), query)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn card_labels_resolve_to_records() {
    let app = app();
    let board = create_board(&app, "name=Labels").await;
    let lists = lists_of(&app, &board).await;
    let resp = send(&app, call("GET", &format!("/boards/{}/labels", board.id), "")).await;
    let labels: Vec<Label> = body_json(resp).await;

    let card = create_card(&app, &lists[0], &format!("name=Tagged&idLabels={}", labels[0].id)).await;
    assert_eq!(card.labels.len(), 1);
    assert_eq!(card.labels[0].color, labels[0].color);
}

#[tokio::test]
async fn card_in_unknown_list_is_not_found() {
    let resp = send(
        &app(),
        call("POST", "/cards", "idList=5a0000000000000000000fff&name=Lost"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_boolean_flag_is_bad_request() {
    let app = app();
    let board = create_board(&app, "name=Flags").await;
    let lists = lists_of(&app, &board).await;
    let card = create_card(&app, &lists[0], "name=X").await;
    let resp = send(&app, call("PUT", &format!("/cards/{}", card.id), "closed=yes")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "invalid value for closed");
}

// --- checklists and actions ---

#[tokio::test]
async fn checklist_items_update_badges() {
    let app = app();
    let board = create_board(&app, "name=Checks").await;
    let lists = lists_of(&app, &board).await;
    let card = create_card(&app, &lists[0], "name=Release").await;

    let resp = send(&app, call("POST", "/checklists", &format!("idCard={}&name=Steps", card.id))).await;
    let checklist: Checklist = body_json(resp).await;
    let items_path = format!("/checklists/{}/checkItems", checklist.id);
    let resp = send(&app, call("POST", &items_path, "name=Tag&checked=true")).await;
    let item: CheckItem = body_json(resp).await;
    assert_eq!(item.state, "complete");
    send(&app, call("POST", &items_path, "name=Publish")).await;

    let resp = send(&app, call("GET", &format!("/cards/{}", card.id), "")).await;
    let card: Card = body_json(resp).await;
    assert_eq!(card.badges.check_items, 2);
    assert_eq!(card.badges.check_items_checked, 1);

    let resp = send(&app, call("GET", &format!("/cards/{}/checklists", card.id), "")).await;
    let checklists: Vec<Checklist> = body_json(resp).await;
    assert_eq!(checklists[0].check_items.len(), 2);
}

#[tokio::test]
async fn actions_can_be_counted_and_filtered() {
    let app = app();
    let board = create_board(&app, "name=Log").await;
    let lists = lists_of(&app, &board).await;
    create_card(&app, &lists[0], "name=A").await;
    create_card(&app, &lists[0], "name=B").await;

    let path = format!("/boards/{}/actions", board.id);
    let resp = send(&app, call("GET", &path, "filter=createCard&format=count")).await;
    let count: Value = body_json(resp).await;
    assert_eq!(count["_value"], 2);

    let resp = send(&app, call("GET", &path, "limit=1")).await;
    let actions: Vec<Value> = body_json(resp).await;
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0]["type"], "createCard");
}
