//! In-memory emulation of the slice of the Trello REST API the client uses.
//!
//! Arguments arrive as query parameters, credentials as `key`/`token` query
//! parameters or an `Authorization: OAuth ...` header, and every success is a
//! 200, mirroring the real service closely enough for round-trip tests.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_KEY: &str = "test-key";
pub const DEFAULT_TOKEN: &str = "test-token";

/// Id of the member that owns the configured token.
pub const ME_ID: &str = "5a0000000000000000000001";

const POS_STEP: f64 = 65536.0;
const DEFAULT_LISTS: [&str; 3] = ["To Do", "Doing", "Done"];
const LABEL_COLORS: [&str; 6] = ["green", "yellow", "orange", "red", "purple", "blue"];

type Params = HashMap<String, String>;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefs {
    pub permission_level: String,
    pub voting: String,
    pub comments: String,
    pub invitations: String,
    pub self_join: bool,
    pub card_covers: bool,
    pub hide_votes: bool,
    pub background: String,
    pub card_aging: String,
    pub calendar_feed_enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub closed: bool,
    pub id_organization: Option<String>,
    pub pinned: bool,
    pub url: String,
    pub short_url: String,
    pub prefs: Prefs,
    pub label_names: HashMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub name: String,
    pub closed: bool,
    pub id_board: String,
    pub pos: f64,
    pub subscribed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: String,
    pub id_board: String,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badges {
    pub votes: u32,
    pub comments: u32,
    pub attachments: u32,
    pub check_items: u32,
    pub check_items_checked: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub desc: String,
    pub closed: bool,
    pub id_board: String,
    pub id_list: String,
    pub id_labels: Vec<String>,
    pub id_members: Vec<String>,
    pub id_checklists: Vec<String>,
    pub labels: Vec<Label>,
    pub due: Option<String>,
    pub due_complete: bool,
    pub start: Option<String>,
    pub pos: f64,
    pub url: String,
    pub short_url: String,
    pub badges: Badges,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckItem {
    pub id: String,
    pub name: String,
    pub state: String,
    pub id_checklist: String,
    pub pos: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: String,
    pub name: String,
    pub id_board: String,
    pub id_card: String,
    pub pos: f64,
    pub check_items: Vec<CheckItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub full_name: String,
    pub username: String,
    pub initials: String,
    pub avatar_hash: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    pub id_member: String,
    pub member_type: String,
    pub unconfirmed: bool,
    pub deactivated: bool,
}

/// The acting member's preferences on one board.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyPrefs {
    pub show_sidebar: bool,
    pub show_sidebar_members: bool,
    pub show_sidebar_board_actions: bool,
    pub show_sidebar_activity: bool,
    pub show_list_guide: bool,
    pub email_position: String,
    pub id_email_list: Option<String>,
}

impl Default for MyPrefs {
    fn default() -> Self {
        Self {
            show_sidebar: true,
            show_sidebar_members: true,
            show_sidebar_board_actions: true,
            show_sidebar_activity: true,
            show_list_guide: false,
            email_position: "bottom".to_string(),
            id_email_list: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    #[serde(rename = "type")]
    pub action_type: String,
    pub id_member_creator: String,
    pub data: Value,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct Store {
    pub boards: HashMap<String, Board>,
    pub lists: HashMap<String, List>,
    pub cards: HashMap<String, Card>,
    pub labels: HashMap<String, Label>,
    pub checklists: HashMap<String, Checklist>,
    pub memberships: HashMap<String, Vec<Membership>>,
    /// Members created by email invitations. The token owner is implicit.
    pub members: HashMap<String, Member>,
    /// Invited email address to member id.
    pub emails: HashMap<String, String>,
    pub my_prefs: HashMap<String, MyPrefs>,
    /// Per-board action log, newest first.
    pub actions: HashMap<String, Vec<Action>>,
}

impl Store {
    fn log(&mut self, board_id: &str, action_type: &str, data: Value) {
        let action = Action {
            id: new_id(),
            action_type: action_type.to_string(),
            id_member_creator: ME_ID.to_string(),
            data,
        };
        self.actions
            .entry(board_id.to_string())
            .or_default()
            .insert(0, action);
    }

    fn board_lists(&self, board_id: &str) -> Vec<List> {
        let mut lists: Vec<List> = self
            .lists
            .values()
            .filter(|l| l.id_board == board_id)
            .cloned()
            .collect();
        lists.sort_by(|a, b| a.pos.total_cmp(&b.pos));
        lists
    }

    fn cards_where(&self, keep: impl Fn(&Card) -> bool) -> Vec<Card> {
        let mut cards: Vec<Card> = self.cards.values().filter(|c| keep(c)).cloned().collect();
        cards.sort_by(|a, b| a.pos.total_cmp(&b.pos));
        cards
    }

    fn member(&self, id: &str) -> Option<Member> {
        if id == ME_ID {
            Some(me())
        } else {
            self.members.get(id).cloned()
        }
    }

    /// Adds `member_id` to the board, or changes the type of its membership.
    fn join(
        &mut self,
        board_id: &str,
        member_id: &str,
        member_type: &str,
        unconfirmed: bool,
    ) -> Result<(), MockError> {
        let memberships = self.memberships.entry(board_id.to_string()).or_default();
        if demotes_last_admin(memberships, member_id, member_type) {
            return Err(MockError::InvalidValue("type".to_string()));
        }
        match memberships.iter_mut().find(|m| m.id_member == member_id) {
            Some(existing) => existing.member_type = member_type.to_string(),
            None => memberships.push(Membership {
                id: new_id(),
                id_member: member_id.to_string(),
                member_type: member_type.to_string(),
                unconfirmed,
                deactivated: false,
            }),
        }
        Ok(())
    }

    /// Board id with its members and memberships.
    fn roster(&self, board_id: &str) -> Value {
        let memberships = self.memberships.get(board_id).cloned().unwrap_or_default();
        let members: Vec<Member> = memberships
            .iter()
            .filter_map(|m| self.member(&m.id_member))
            .collect();
        json!({ "id": board_id, "members": members, "memberships": memberships })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    key: Arc<str>,
    token: Arc<str>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum MockError {
    InvalidKey,
    InvalidToken,
    InvalidId,
    NotFound,
    InvalidValue(String),
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            MockError::InvalidKey => (StatusCode::UNAUTHORIZED, "invalid key".to_string()),
            MockError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid token".to_string()),
            MockError::InvalidId => (StatusCode::BAD_REQUEST, "invalid id".to_string()),
            MockError::NotFound => (
                StatusCode::NOT_FOUND,
                "The requested resource was not found.".to_string(),
            ),
            MockError::InvalidValue(key) => {
                (StatusCode::BAD_REQUEST, format!("invalid value for {key}"))
            }
        };
        (status, body).into_response()
    }
}

type Reply<T> = Result<Json<T>, MockError>;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn app() -> Router {
    app_with_credentials(DEFAULT_KEY, DEFAULT_TOKEN)
}

pub fn app_with_credentials(key: &str, token: &str) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store::default())),
        key: Arc::from(key),
        token: Arc::from(token),
    };
    let api = Router::new()
        .route("/members/me/boards", get(my_boards))
        .route("/boards", post(create_board))
        .route(
            "/boards/{id}",
            get(get_board).put(update_board).delete(delete_board),
        )
        .route("/boards/{id}/lists", get(board_lists))
        .route("/boards/{id}/lists/{filter}", get(filtered_lists))
        .route("/boards/{id}/cards", get(board_cards))
        .route("/boards/{id}/cards/{selector}", get(board_card_or_filter))
        .route("/boards/{id}/labels", get(board_labels))
        .route("/boards/{id}/members", get(board_members).put(invite_member))
        .route("/boards/{id}/members/{member}", put(add_member))
        .route("/boards/{id}/memberships", get(board_memberships))
        .route("/boards/{id}/memberships/{membership}", put(update_membership))
        .route("/boards/{id}/myPrefs/{pref}", put(update_my_pref))
        .route("/boards/{id}/checklists", get(board_checklists))
        .route("/boards/{id}/customFields", get(board_empty))
        .route("/boards/{id}/boardPlugins", get(board_empty))
        .route("/boards/{id}/actions", get(board_actions))
        .route("/lists", post(create_list))
        .route("/lists/{id}/cards", get(list_cards))
        .route("/cards", post(create_card))
        .route(
            "/cards/{id}",
            get(get_card).put(update_card).delete(delete_card),
        )
        .route("/cards/{id}/list", get(card_list))
        .route("/cards/{id}/board", get(card_board))
        .route("/cards/{id}/checklists", get(card_checklists))
        .route("/cards/{id}/members", get(card_members))
        .route("/checklists", post(create_checklist))
        .route("/checklists/{id}/checkItems", post(create_check_item))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .with_state(state);
    Router::new().nest("/1", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn authenticate(
    State(state): State<AppState>,
    Query(params): Query<Params>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(parse_oauth_header);
    let (key, token) = match header {
        Some((key, token)) => (key, token),
        None => (params.get("key").cloned(), params.get("token").cloned()),
    };
    if key.as_deref() != Some(&*state.key) {
        tracing::debug!(path = %request.uri().path(), "rejected key");
        return MockError::InvalidKey.into_response();
    }
    if token.as_deref() != Some(&*state.token) {
        tracing::debug!(path = %request.uri().path(), "rejected token");
        return MockError::InvalidToken.into_response();
    }
    next.run(request).await
}

/// Extracts `oauth_consumer_key` and `oauth_token` from an OAuth header.
fn parse_oauth_header(value: &str) -> (Option<String>, Option<String>) {
    let mut key = None;
    let mut token = None;
    let Some(rest) = value.strip_prefix("OAuth ") else {
        return (None, None);
    };
    for part in rest.split(',') {
        let Some((name, raw)) = part.trim().split_once('=') else {
            continue;
        };
        let unquoted = raw.trim_matches('"').to_string();
        match name {
            "oauth_consumer_key" => key = Some(unquoted),
            "oauth_token" => token = Some(unquoted),
            _ => {}
        }
    }
    (key, token)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()[..24].to_string()
}

fn short_link(id: &str) -> String {
    id[id.len() - 8..].to_string()
}

fn valid_id(id: &str) -> Result<(), MockError> {
    if id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(MockError::InvalidId)
    }
}

fn flag(params: &Params, key: &str) -> Result<Option<bool>, MockError> {
    match params.get(key).map(String::as_str) {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(MockError::InvalidValue(key.to_string())),
    }
}

fn required<'a>(params: &'a Params, key: &str) -> Result<&'a str, MockError> {
    params
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| MockError::InvalidValue(key.to_string()))
}

fn id_list(raw: &str) -> Result<Vec<String>, MockError> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|id| valid_id(id).map(|_| id.to_string()))
        .collect()
}

/// Resolves `top`, `bottom` or a number against existing sibling positions.
fn position(raw: Option<&String>, siblings: &[f64]) -> Result<f64, MockError> {
    let max = siblings.iter().copied().fold(0.0, f64::max);
    let min = siblings.iter().copied().fold(f64::INFINITY, f64::min);
    match raw.map(String::as_str) {
        None | Some("bottom") => Ok(max + POS_STEP),
        Some("top") if siblings.is_empty() => Ok(POS_STEP),
        Some("top") => Ok(min / 2.0),
        Some(n) => n
            .parse::<f64>()
            .ok()
            .filter(|p| *p >= 0.0)
            .ok_or_else(|| MockError::InvalidValue("pos".to_string())),
    }
}

fn member_type(raw: Option<&str>) -> Result<String, MockError> {
    match raw {
        Some(kind @ ("admin" | "normal" | "observer")) => Ok(kind.to_string()),
        _ => Err(MockError::InvalidValue("type".to_string())),
    }
}

fn demotes_last_admin(memberships: &[Membership], member_id: &str, member_type: &str) -> bool {
    let admins: Vec<&Membership> = memberships
        .iter()
        .filter(|m| m.member_type == "admin")
        .collect();
    member_type != "admin" && admins.len() == 1 && admins[0].id_member == member_id
}

/// Member record for an invited address, e.g. `ada.l@x.org` becomes `adal`.
fn invited_member(email: &str, full_name: Option<&str>) -> Member {
    let local = email.split('@').next().unwrap_or_default();
    let full_name = full_name.unwrap_or(local).to_string();
    let initials = full_name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect::<String>()
        .to_uppercase();
    Member {
        id: new_id(),
        username: local
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_lowercase(),
        full_name,
        initials,
        avatar_hash: None,
    }
}

fn me() -> Member {
    Member {
        id: ME_ID.to_string(),
        full_name: "Mock User".to_string(),
        username: "mockuser".to_string(),
        initials: "MU".to_string(),
        avatar_hash: None,
    }
}

// ---------------------------------------------------------------------------
// Boards
// ---------------------------------------------------------------------------

async fn my_boards(State(state): State<AppState>) -> Json<Vec<Board>> {
    let store = state.store.read().await;
    let mut boards: Vec<Board> = store.boards.values().cloned().collect();
    boards.sort_by(|a, b| a.name.cmp(&b.name));
    Json(boards)
}

async fn create_board(State(state): State<AppState>, Query(params): Query<Params>) -> Reply<Board> {
    let name = required(&params, "name")?;
    if name.is_empty() {
        return Err(MockError::InvalidValue("name".to_string()));
    }
    let id = new_id();
    let board = Board {
        id: id.clone(),
        name: name.to_string(),
        desc: params.get("desc").cloned().unwrap_or_default(),
        closed: false,
        id_organization: params.get("idOrganization").cloned(),
        pinned: false,
        url: format!("https://trello.com/b/{}", short_link(&id)),
        short_url: format!("https://trello.com/b/{}", short_link(&id)),
        prefs: Prefs {
            permission_level: params
                .get("prefs_permissionLevel")
                .cloned()
                .unwrap_or_else(|| "private".to_string()),
            voting: "disabled".to_string(),
            comments: "members".to_string(),
            invitations: "members".to_string(),
            background: "blue".to_string(),
            card_aging: "regular".to_string(),
            card_covers: true,
            ..Prefs::default()
        },
        label_names: LABEL_COLORS
            .iter()
            .map(|c| (c.to_string(), String::new()))
            .collect(),
    };

    let mut store = state.store.write().await;
    if flag(&params, "defaultLists")?.unwrap_or(true) {
        for (i, name) in DEFAULT_LISTS.iter().enumerate() {
            let list = List {
                id: new_id(),
                name: name.to_string(),
                closed: false,
                id_board: id.clone(),
                pos: POS_STEP * (i as f64 + 1.0),
                subscribed: false,
            };
            store.lists.insert(list.id.clone(), list);
        }
    }
    if flag(&params, "defaultLabels")?.unwrap_or(true) {
        for color in LABEL_COLORS {
            let label = Label {
                id: new_id(),
                id_board: id.clone(),
                name: String::new(),
                color: Some(color.to_string()),
            };
            store.labels.insert(label.id.clone(), label);
        }
    }
    store.memberships.insert(
        id.clone(),
        vec![Membership {
            id: new_id(),
            id_member: ME_ID.to_string(),
            member_type: "admin".to_string(),
            unconfirmed: false,
            deactivated: false,
        }],
    );
    store.log(&id, "createBoard", json!({ "board": { "id": id, "name": board.name } }));
    store.boards.insert(id, board.clone());
    tracing::debug!(board = %board.id, "board created");
    Ok(Json(board))
}

async fn get_board(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Board> {
    valid_id(&id)?;
    let store = state.store.read().await;
    store.boards.get(&id).cloned().map(Json).ok_or(MockError::NotFound)
}

async fn update_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Reply<Board> {
    valid_id(&id)?;
    let closed = flag(&params, "closed")?;
    let mut store = state.store.write().await;
    let board = store.boards.get_mut(&id).ok_or(MockError::NotFound)?;
    if let Some(name) = params.get("name") {
        board.name = name.clone();
    }
    if let Some(desc) = params.get("desc") {
        board.desc = desc.clone();
    }
    if let Some(closed) = closed {
        board.closed = closed;
    }
    if let Some(level) = params.get("prefs/permissionLevel") {
        board.prefs.permission_level = level.clone();
    }
    if let Some(background) = params.get("prefs/background") {
        board.prefs.background = background.clone();
    }
    for color in LABEL_COLORS {
        if let Some(name) = params.get(&format!("labelNames/{color}")) {
            board.label_names.insert(color.to_string(), name.clone());
        }
    }
    let board = board.clone();
    store.log(&id, "updateBoard", json!({ "board": { "id": id } }));
    Ok(Json(board))
}

async fn delete_board(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Value> {
    valid_id(&id)?;
    let mut store = state.store.write().await;
    store.boards.remove(&id).ok_or(MockError::NotFound)?;
    store.lists.retain(|_, l| l.id_board != id);
    store.cards.retain(|_, c| c.id_board != id);
    store.labels.retain(|_, l| l.id_board != id);
    store.checklists.retain(|_, c| c.id_board != id);
    store.memberships.remove(&id);
    store.my_prefs.remove(&id);
    store.actions.remove(&id);
    Ok(Json(json!({ "_value": null })))
}

async fn board_lists(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Reply<Vec<List>> {
    let filter = params.get("filter").cloned().unwrap_or_else(|| "all".to_string());
    filtered_lists(State(state), Path((id, filter))).await
}

async fn filtered_lists(
    State(state): State<AppState>,
    Path((id, filter)): Path<(String, String)>,
) -> Reply<Vec<List>> {
    valid_id(&id)?;
    let store = state.store.read().await;
    if !store.boards.contains_key(&id) {
        return Err(MockError::NotFound);
    }
    let lists = store.board_lists(&id);
    let lists = match filter.as_str() {
        "all" => lists,
        "open" => lists.into_iter().filter(|l| !l.closed).collect(),
        "closed" => lists.into_iter().filter(|l| l.closed).collect(),
        "none" => Vec::new(),
        _ => return Err(MockError::InvalidValue("filter".to_string())),
    };
    Ok(Json(lists))
}

async fn board_cards(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Vec<Card>> {
    valid_id(&id)?;
    let store = state.store.read().await;
    if !store.boards.contains_key(&id) {
        return Err(MockError::NotFound);
    }
    Ok(Json(store.cards_where(|c| c.id_board == id && !c.closed)))
}

/// `/boards/{id}/cards/{selector}` is either a card id or a card filter.
async fn board_card_or_filter(
    State(state): State<AppState>,
    Path((id, selector)): Path<(String, String)>,
) -> Result<Json<Value>, MockError> {
    valid_id(&id)?;
    let store = state.store.read().await;
    if !store.boards.contains_key(&id) {
        return Err(MockError::NotFound);
    }
    if valid_id(&selector).is_ok() {
        let card = store
            .cards
            .get(&selector)
            .filter(|c| c.id_board == id)
            .ok_or(MockError::NotFound)?;
        return Ok(Json(json!(card)));
    }
    let cards = match selector.as_str() {
        "all" => store.cards_where(|c| c.id_board == id),
        "open" | "visible" => store.cards_where(|c| c.id_board == id && !c.closed),
        "closed" => store.cards_where(|c| c.id_board == id && c.closed),
        "none" => Vec::new(),
        _ => return Err(MockError::InvalidValue("filter".to_string())),
    };
    Ok(Json(json!(cards)))
}

async fn board_labels(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Vec<Label>> {
    valid_id(&id)?;
    let store = state.store.read().await;
    if !store.boards.contains_key(&id) {
        return Err(MockError::NotFound);
    }
    let mut labels: Vec<Label> = store
        .labels
        .values()
        .filter(|l| l.id_board == id)
        .cloned()
        .collect();
    labels.sort_by_key(|l| {
        l.color
            .as_deref()
            .and_then(|c| LABEL_COLORS.iter().position(|known| *known == c))
    });
    Ok(Json(labels))
}

async fn board_members(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Vec<Member>> {
    valid_id(&id)?;
    let store = state.store.read().await;
    let memberships = store.memberships.get(&id).ok_or(MockError::NotFound)?;
    Ok(Json(
        memberships
            .iter()
            .filter_map(|m| store.member(&m.id_member))
            .collect(),
    ))
}

async fn invite_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, MockError> {
    valid_id(&id)?;
    let email = required(&params, "email")?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err(MockError::InvalidValue("email".to_string())),
    }
    let kind = member_type(Some(params.get("type").map_or("normal", String::as_str)))?;
    let full_name = params.get("fullName").map(String::as_str);
    if full_name.is_some_and(|n| n.is_empty() || n.starts_with(' ') || n.ends_with(' ')) {
        return Err(MockError::InvalidValue("fullName".to_string()));
    }

    let mut store = state.store.write().await;
    if !store.boards.contains_key(&id) {
        return Err(MockError::NotFound);
    }
    let known = store.emails.get(email).cloned();
    let member_id = match known {
        Some(member_id) => member_id,
        None => {
            let member = invited_member(email, full_name);
            let member_id = member.id.clone();
            store.emails.insert(email.to_string(), member_id.clone());
            store.members.insert(member_id.clone(), member);
            member_id
        }
    };
    store.join(&id, &member_id, &kind, true)?;
    store.log(&id, "addMemberToBoard", json!({ "idMemberAdded": member_id }));
    tracing::debug!(board = %id, member = %member_id, "member invited");
    Ok(Json(store.roster(&id)))
}

async fn add_member(
    State(state): State<AppState>,
    Path((id, member_id)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, MockError> {
    valid_id(&id)?;
    valid_id(&member_id)?;
    let kind = member_type(params.get("type").map(String::as_str))?;
    flag(&params, "allowBillableGuest")?;

    let mut store = state.store.write().await;
    if !store.boards.contains_key(&id) || store.member(&member_id).is_none() {
        return Err(MockError::NotFound);
    }
    store.join(&id, &member_id, &kind, false)?;
    store.log(&id, "addMemberToBoard", json!({ "idMemberAdded": member_id }));
    Ok(Json(store.roster(&id)))
}

async fn update_membership(
    State(state): State<AppState>,
    Path((id, membership_id)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, MockError> {
    valid_id(&id)?;
    valid_id(&membership_id)?;
    let kind = member_type(params.get("type").map(String::as_str))?;

    let mut store = state.store.write().await;
    let member_id = store
        .memberships
        .get(&id)
        .and_then(|all| all.iter().find(|m| m.id == membership_id))
        .map(|m| m.id_member.clone())
        .ok_or(MockError::NotFound)?;
    store.join(&id, &member_id, &kind, false)?;
    let action = match kind.as_str() {
        "admin" => "makeAdminOfBoard",
        "observer" => "makeObserverOfBoard",
        _ => "makeNormalMemberOfBoard",
    };
    store.log(&id, action, json!({ "idMember": member_id }));

    let membership = store
        .memberships
        .get(&id)
        .and_then(|all| all.iter().find(|m| m.id == membership_id))
        .cloned()
        .ok_or(MockError::NotFound)?;
    let mut body = json!(membership);
    body["member"] = json!(store.member(&member_id));
    Ok(Json(body))
}

async fn update_my_pref(
    State(state): State<AppState>,
    Path((id, pref)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> Reply<MyPrefs> {
    valid_id(&id)?;
    let value = required(&params, "value")?;
    let invalid = || MockError::InvalidValue("value".to_string());
    let switch = || -> Result<bool, MockError> { flag(&params, "value")?.ok_or_else(invalid) };

    let mut store = state.store.write().await;
    if !store.boards.contains_key(&id) {
        return Err(MockError::NotFound);
    }
    if pref == "idEmailList" && !store.lists.get(value).is_some_and(|l| l.id_board == id) {
        return Err(invalid());
    }
    let prefs = store.my_prefs.entry(id).or_default();
    match pref.as_str() {
        "emailPosition" if matches!(value, "top" | "bottom") => {
            prefs.email_position = value.to_string()
        }
        "emailPosition" => return Err(invalid()),
        "idEmailList" => prefs.id_email_list = Some(value.to_string()),
        "showListGuide" => prefs.show_list_guide = switch()?,
        "showSidebar" => prefs.show_sidebar = switch()?,
        "showSidebarActivity" => prefs.show_sidebar_activity = switch()?,
        "showSidebarBoardActions" => prefs.show_sidebar_board_actions = switch()?,
        "showSidebarMembers" => prefs.show_sidebar_members = switch()?,
        _ => return Err(MockError::NotFound),
    }
    Ok(Json(prefs.clone()))
}

async fn board_memberships(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Reply<Vec<Membership>> {
    valid_id(&id)?;
    let store = state.store.read().await;
    store.memberships.get(&id).cloned().map(Json).ok_or(MockError::NotFound)
}

async fn board_checklists(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Reply<Vec<Checklist>> {
    valid_id(&id)?;
    let store = state.store.read().await;
    if !store.boards.contains_key(&id) {
        return Err(MockError::NotFound);
    }
    Ok(Json(
        store
            .checklists
            .values()
            .filter(|c| c.id_board == id)
            .cloned()
            .collect(),
    ))
}

/// Custom fields and Power-Ups are never enabled on mock boards.
async fn board_empty(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Vec<Value>> {
    valid_id(&id)?;
    let store = state.store.read().await;
    if !store.boards.contains_key(&id) {
        return Err(MockError::NotFound);
    }
    Ok(Json(Vec::new()))
}

async fn board_actions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Result<Json<Value>, MockError> {
    valid_id(&id)?;
    let store = state.store.read().await;
    if !store.boards.contains_key(&id) {
        return Err(MockError::NotFound);
    }
    let filter: Option<Vec<&str>> = params.get("filter").map(|f| f.split(',').collect());
    let limit: usize = match params.get("limit") {
        Some(raw) => raw
            .parse()
            .map_err(|_| MockError::InvalidValue("limit".to_string()))?,
        None => 50,
    };
    let actions: Vec<&Action> = store
        .actions
        .get(&id)
        .map(|log| {
            log.iter()
                .filter(|a| {
                    filter
                        .as_ref()
                        .map_or(true, |types| types.contains(&a.action_type.as_str()))
                })
                .collect()
        })
        .unwrap_or_default();
    if params.get("format").map(String::as_str) == Some("count") {
        return Ok(Json(json!({ "_value": actions.len() })));
    }
    Ok(Json(json!(actions.into_iter().take(limit).collect::<Vec<_>>())))
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

async fn create_list(State(state): State<AppState>, Query(params): Query<Params>) -> Reply<List> {
    let name = required(&params, "name")?.to_string();
    let id_board = required(&params, "idBoard")?.to_string();
    valid_id(&id_board)?;
    let mut store = state.store.write().await;
    if !store.boards.contains_key(&id_board) {
        return Err(MockError::NotFound);
    }
    let siblings: Vec<f64> = store.board_lists(&id_board).iter().map(|l| l.pos).collect();
    let list = List {
        id: new_id(),
        name,
        closed: false,
        id_board: id_board.clone(),
        pos: position(params.get("pos"), &siblings)?,
        subscribed: false,
    };
    store.lists.insert(list.id.clone(), list.clone());
    store.log(
        &id_board,
        "createList",
        json!({ "list": { "id": list.id, "name": list.name } }),
    );
    Ok(Json(list))
}

async fn list_cards(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Vec<Card>> {
    valid_id(&id)?;
    let store = state.store.read().await;
    if !store.lists.contains_key(&id) {
        return Err(MockError::NotFound);
    }
    Ok(Json(store.cards_where(|c| c.id_list == id && !c.closed)))
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

async fn create_card(State(state): State<AppState>, Query(params): Query<Params>) -> Reply<Card> {
    let id_list = required(&params, "idList")?.to_string();
    valid_id(&id_list)?;
    let due_complete = flag(&params, "dueComplete")?.unwrap_or(false);
    let id_labels = id_list_param(&params, "idLabels")?;
    let id_members = id_list_param(&params, "idMembers")?;

    let mut store = state.store.write().await;
    let id_board = store
        .lists
        .get(&id_list)
        .map(|l| l.id_board.clone())
        .ok_or(MockError::NotFound)?;
    let labels = resolve_labels(&store, &id_labels)?;
    let siblings: Vec<f64> = store
        .cards_where(|c| c.id_list == id_list)
        .iter()
        .map(|c| c.pos)
        .collect();
    let id = new_id();
    let card = Card {
        id: id.clone(),
        name: params.get("name").cloned().unwrap_or_default(),
        desc: params.get("desc").cloned().unwrap_or_default(),
        closed: false,
        id_board: id_board.clone(),
        id_list,
        id_labels,
        id_members,
        id_checklists: Vec::new(),
        labels,
        due: params.get("due").cloned(),
        due_complete,
        start: params.get("start").cloned(),
        pos: position(params.get("pos"), &siblings)?,
        url: format!("https://trello.com/c/{}", short_link(&id)),
        short_url: format!("https://trello.com/c/{}", short_link(&id)),
        badges: Badges::default(),
    };
    store.cards.insert(id.clone(), card.clone());
    store.log(
        &id_board,
        "createCard",
        json!({ "card": { "id": id, "name": card.name } }),
    );
    Ok(Json(card))
}

async fn get_card(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Card> {
    valid_id(&id)?;
    let store = state.store.read().await;
    store.cards.get(&id).cloned().map(Json).ok_or(MockError::NotFound)
}

async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Reply<Card> {
    valid_id(&id)?;
    let closed = flag(&params, "closed")?;
    let due_complete = flag(&params, "dueComplete")?;
    let id_labels = params.get("idLabels").map(|raw| id_list(raw)).transpose()?;
    let id_members = params.get("idMembers").map(|raw| id_list(raw)).transpose()?;

    let mut store = state.store.write().await;
    let current_list = store
        .cards
        .get(&id)
        .map(|c| c.id_list.clone())
        .ok_or(MockError::NotFound)?;
    let target_list = destination(&store, params.get("idList"), params.get("idBoard"))?;
    let labels = id_labels
        .as_ref()
        .map(|ids| resolve_labels(&store, ids))
        .transpose()?;
    let dest_list = target_list
        .as_ref()
        .map_or(current_list, |(list_id, _)| list_id.clone());
    let siblings: Vec<f64> = store
        .cards_where(|c| c.id_list == dest_list && c.id != id)
        .iter()
        .map(|c| c.pos)
        .collect();
    let pos = params
        .get("pos")
        .map(|raw| position(Some(raw), &siblings))
        .transpose()?;

    let card = store.cards.get_mut(&id).ok_or(MockError::NotFound)?;
    if let Some(name) = params.get("name") {
        card.name = name.clone();
    }
    if let Some(desc) = params.get("desc") {
        card.desc = desc.clone();
    }
    if let Some(closed) = closed {
        card.closed = closed;
    }
    if let Some(due_complete) = due_complete {
        card.due_complete = due_complete;
    }
    if let Some(due) = params.get("due") {
        card.due = (!due.is_empty()).then(|| due.clone());
    }
    if let Some((list_id, board_id)) = target_list {
        card.id_list = list_id;
        card.id_board = board_id;
    }
    if let Some(pos) = pos {
        card.pos = pos;
    }
    if let (Some(ids), Some(labels)) = (id_labels, labels) {
        card.id_labels = ids;
        card.labels = labels;
    }
    if let Some(ids) = id_members {
        card.id_members = ids;
    }
    let card = card.clone();
    store.log(&card.id_board, "updateCard", json!({ "card": { "id": card.id } }));
    Ok(Json(card))
}

/// Resolves `idList`/`idBoard` of a card update to the `(list, board)` the
/// card moves into. A bare `idBoard` lands on that board's first open list.
fn destination(
    store: &Store,
    id_list: Option<&String>,
    id_board: Option<&String>,
) -> Result<Option<(String, String)>, MockError> {
    if let Some(board_id) = id_board {
        valid_id(board_id)?;
        if !store.boards.contains_key(board_id) {
            return Err(MockError::NotFound);
        }
    }
    match (id_list, id_board) {
        (Some(list_id), board_id) => {
            valid_id(list_id)?;
            let list = store.lists.get(list_id).ok_or(MockError::NotFound)?;
            if board_id.is_some_and(|b| *b != list.id_board) {
                return Err(MockError::InvalidValue("idList".to_string()));
            }
            Ok(Some((list.id.clone(), list.id_board.clone())))
        }
        (None, Some(board_id)) => store
            .board_lists(board_id)
            .into_iter()
            .find(|l| !l.closed)
            .map(|l| Some((l.id, l.id_board)))
            .ok_or_else(|| MockError::InvalidValue("idBoard".to_string())),
        (None, None) => Ok(None),
    }
}

async fn delete_card(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Value> {
    valid_id(&id)?;
    let mut store = state.store.write().await;
    let card = store.cards.remove(&id).ok_or(MockError::NotFound)?;
    store.checklists.retain(|_, c| c.id_card != id);
    store.log(&card.id_board, "deleteCard", json!({ "card": { "id": id } }));
    Ok(Json(json!({ "limits": {} })))
}

async fn card_list(State(state): State<AppState>, Path(id): Path<String>) -> Reply<List> {
    valid_id(&id)?;
    let store = state.store.read().await;
    let card = store.cards.get(&id).ok_or(MockError::NotFound)?;
    store.lists.get(&card.id_list).cloned().map(Json).ok_or(MockError::NotFound)
}

async fn card_board(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Board> {
    valid_id(&id)?;
    let store = state.store.read().await;
    let card = store.cards.get(&id).ok_or(MockError::NotFound)?;
    store.boards.get(&card.id_board).cloned().map(Json).ok_or(MockError::NotFound)
}

async fn card_checklists(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Reply<Vec<Checklist>> {
    valid_id(&id)?;
    let store = state.store.read().await;
    let card = store.cards.get(&id).ok_or(MockError::NotFound)?;
    let mut checklists: Vec<Checklist> = card
        .id_checklists
        .iter()
        .filter_map(|cid| store.checklists.get(cid).cloned())
        .collect();
    checklists.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    Ok(Json(checklists))
}

async fn card_members(State(state): State<AppState>, Path(id): Path<String>) -> Reply<Vec<Member>> {
    valid_id(&id)?;
    let store = state.store.read().await;
    let card = store.cards.get(&id).ok_or(MockError::NotFound)?;
    let members = card
        .id_members
        .iter()
        .filter_map(|m| store.member(m))
        .collect();
    Ok(Json(members))
}

// ---------------------------------------------------------------------------
// Checklists
// ---------------------------------------------------------------------------

async fn create_checklist(
    State(state): State<AppState>,
    Query(params): Query<Params>,
) -> Reply<Checklist> {
    let id_card = required(&params, "idCard")?.to_string();
    valid_id(&id_card)?;
    let mut store = state.store.write().await;
    let (id_board, existing) = {
        let card = store.cards.get(&id_card).ok_or(MockError::NotFound)?;
        (card.id_board.clone(), card.id_checklists.len())
    };
    let checklist = Checklist {
        id: new_id(),
        name: params
            .get("name")
            .cloned()
            .unwrap_or_else(|| "Checklist".to_string()),
        id_board,
        id_card: id_card.clone(),
        pos: POS_STEP * (existing as f64 + 1.0),
        check_items: Vec::new(),
    };
    if let Some(card) = store.cards.get_mut(&id_card) {
        card.id_checklists.push(checklist.id.clone());
    }
    store.checklists.insert(checklist.id.clone(), checklist.clone());
    Ok(Json(checklist))
}

async fn create_check_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<Params>,
) -> Reply<CheckItem> {
    valid_id(&id)?;
    let name = required(&params, "name")?.to_string();
    let checked = flag(&params, "checked")?.unwrap_or(false);
    let mut store = state.store.write().await;
    let checklist = store.checklists.get_mut(&id).ok_or(MockError::NotFound)?;
    let siblings: Vec<f64> = checklist.check_items.iter().map(|i| i.pos).collect();
    let item = CheckItem {
        id: new_id(),
        name,
        state: if checked { "complete" } else { "incomplete" }.to_string(),
        id_checklist: id,
        pos: position(params.get("pos"), &siblings)?,
    };
    checklist.check_items.push(item.clone());
    let id_card = checklist.id_card.clone();
    if let Some(card) = store.cards.get_mut(&id_card) {
        card.badges.check_items += 1;
        if checked {
            card.badges.check_items_checked += 1;
        }
    }
    Ok(Json(item))
}

fn id_list_param(params: &Params, key: &str) -> Result<Vec<String>, MockError> {
    params
        .get(key)
        .map(|raw| id_list(raw))
        .transpose()
        .map(Option::unwrap_or_default)
}

fn resolve_labels(store: &Store, ids: &[String]) -> Result<Vec<Label>, MockError> {
    ids.iter()
        .map(|id| store.labels.get(id).cloned().ok_or(MockError::NotFound))
        .collect()
}
