//! In-memory homeserver speaking just enough of the Matrix client-server API
//! to execute request descriptors end to end.
//!
//! Users and login tokens are seeded up front with [`Homeserver::with_user`]
//! and [`Homeserver::with_login_token`]; everything else (sessions, rooms,
//! events) is created through the API and lives only as long as the process.

mod auth;
mod error;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use auth::Session;
pub use error::MatrixError;

use error::Result;

pub const DEFAULT_PORT: u16 = 8008;
pub const DEFAULT_SERVER_NAME: &str = "localhost";
const DEFAULT_MESSAGES_LIMIT: usize = 10;

/// Process configuration, read from `PORT` and `SERVER_NAME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub server_name: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let server_name = std::env::var("SERVER_NAME")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string());
        Self { port, server_name }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub event_id: String,
    pub room_id: String,
    pub sender: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_key: Option<String>,
    pub content: Value,
    pub origin_server_ts: u64,
}

#[derive(Debug)]
struct Room {
    room_id: String,
    name: Option<String>,
    topic: Option<String>,
    canonical_alias: Option<String>,
    room_type: Option<String>,
    public: bool,
    members: BTreeSet<String>,
    timeline: Vec<Event>,
}

impl Room {
    fn append(&mut self, sender: &str, event_type: &str, state_key: Option<&str>, content: Value) -> String {
        let event_id = format!("${}", Uuid::new_v4().simple());
        self.timeline.push(Event {
            event_id: event_id.clone(),
            room_id: self.room_id.clone(),
            sender: sender.to_string(),
            event_type: event_type.to_string(),
            state_key: state_key.map(str::to_string),
            content,
            origin_server_ts: now_ms(),
        });
        event_id
    }

    fn join(&mut self, user_id: &str) {
        if self.members.insert(user_id.to_string()) {
            self.append(user_id, "m.room.member", Some(user_id), json!({ "membership": "join" }));
        }
    }

    fn matches(&self, filter: &RoomFilter) -> bool {
        let term_matches = match filter.generic_search_term.as_deref() {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [&self.name, &self.topic, &self.canonical_alias]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        };
        let type_matches = filter.room_types.is_empty() || filter.room_types.contains(&self.room_type);
        term_matches && type_matches
    }

    fn summary(&self) -> Value {
        let mut chunk = json!({
            "room_id": self.room_id,
            "num_joined_members": self.members.len(),
            "world_readable": false,
            "guest_can_join": false,
        });
        if let Some(name) = &self.name {
            chunk["name"] = json!(name);
        }
        if let Some(topic) = &self.topic {
            chunk["topic"] = json!(topic);
        }
        if let Some(alias) = &self.canonical_alias {
            chunk["canonical_alias"] = json!(alias);
        }
        if let Some(room_type) = &self.room_type {
            chunk["room_type"] = json!(room_type);
        }
        chunk
    }
}

/// All server state.
#[derive(Debug)]
pub struct Homeserver {
    server_name: String,
    passwords: HashMap<String, String>,
    login_tokens: HashMap<String, String>,
    sessions: HashMap<String, Session>,
    rooms: Vec<Room>,
    aliases: HashMap<String, String>,
    transactions: HashMap<(String, String), String>,
}

impl Homeserver {
    pub fn new(server_name: &str) -> Self {
        Self {
            server_name: server_name.to_string(),
            passwords: HashMap::new(),
            login_tokens: HashMap::new(),
            sessions: HashMap::new(),
            rooms: Vec::new(),
            aliases: HashMap::new(),
            transactions: HashMap::new(),
        }
    }

    /// Register a user that can log in with `password`.
    pub fn with_user(mut self, user: &str, password: &str) -> Self {
        let user_id = self.user_id(user);
        self.passwords.insert(user_id, password.to_string());
        self
    }

    /// Issue a single-use `m.login.token` token for `user`.
    pub fn with_login_token(mut self, user: &str, token: &str) -> Self {
        let user_id = self.user_id(user);
        self.login_tokens.insert(token.to_string(), user_id);
        self
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Fully qualify a localpart; full user ids pass through.
    pub fn user_id(&self, user: &str) -> String {
        if user.starts_with('@') {
            user.to_string()
        } else {
            format!("@{user}:{}", self.server_name)
        }
    }

    pub(crate) fn session(&self, access_token: &str) -> Option<&Session> {
        self.sessions.get(access_token)
    }

    fn open_session(&mut self, user_id: String, device_id: Option<String>) -> Session {
        let session = Session {
            user_id,
            device_id: device_id
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| random_id(10).to_uppercase()),
            access_token: format!("syt_{}", Uuid::new_v4().simple()),
        };
        self.sessions.insert(session.access_token.clone(), session.clone());
        session
    }

    fn resolve(&self, room_id_or_alias: &str) -> String {
        self.aliases
            .get(room_id_or_alias)
            .cloned()
            .unwrap_or_else(|| room_id_or_alias.to_string())
    }

    fn room(&self, room_id_or_alias: &str) -> Result<&Room> {
        let room_id = self.resolve(room_id_or_alias);
        self.rooms
            .iter()
            .find(|r| r.room_id == room_id)
            .ok_or_else(|| MatrixError::NotFound(format!("Unknown room {room_id_or_alias}")))
    }

    fn room_mut(&mut self, room_id_or_alias: &str) -> Result<&mut Room> {
        let room_id = self.resolve(room_id_or_alias);
        self.rooms
            .iter_mut()
            .find(|r| r.room_id == room_id)
            .ok_or_else(|| MatrixError::NotFound(format!("Unknown room {room_id_or_alias}")))
    }
}

pub type Db = Arc<RwLock<Homeserver>>;

pub fn app(server: Homeserver) -> Router {
    let db: Db = Arc::new(RwLock::new(server));
    Router::new()
        .route("/_matrix/client/v3/login", get(login_flows).post(login))
        .route("/_matrix/client/v3/account/whoami", get(whoami))
        .route("/_matrix/client/v3/createRoom", post(create_room))
        .route("/_matrix/client/v3/join/{room}", post(join))
        .route("/_matrix/client/v3/rooms/{room}/send/{event_type}/{txn}", put(send_event))
        .route("/_matrix/client/v3/rooms/{room}/messages", get(messages))
        .route("/_matrix/client/v3/publicRooms", get(public_rooms).post(search_public_rooms))
        .with_state(db)
}

pub async fn run(listener: TcpListener, server: Homeserver) -> std::result::Result<(), std::io::Error> {
    axum::serve(listener, app(server)).await
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn random_id(len: usize) -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(len);
    id
}

fn position_token(prefix: char, pos: usize) -> String {
    format!("{prefix}{pos}")
}

fn parse_position(prefix: char, token: &str) -> Result<usize> {
    token
        .strip_prefix(prefix)
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| MatrixError::BadRequest(format!("Invalid pagination token {token}")))
}

// --- login ---

#[derive(Deserialize)]
struct Identifier {
    #[serde(rename = "type")]
    kind: String,
    user: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(rename = "type")]
    kind: String,
    identifier: Option<Identifier>,
    password: Option<String>,
    token: Option<String>,
    device_id: Option<String>,
}

async fn login_flows() -> Json<Value> {
    Json(json!({
        "flows": [{ "type": "m.login.password" }, { "type": "m.login.token" }]
    }))
}

async fn login(State(db): State<Db>, Json(req): Json<LoginRequest>) -> Result<Json<Value>> {
    let mut hs = db.write().await;
    let user_id = match req.kind.as_str() {
        "m.login.password" => {
            let user = req
                .identifier
                .filter(|i| i.kind == "m.id.user")
                .and_then(|i| i.user)
                .ok_or_else(|| MatrixError::BadRequest("Only m.id.user identifiers are supported".into()))?;
            let user_id = hs.user_id(&user);
            let valid = hs
                .passwords
                .get(&user_id)
                .is_some_and(|expected| req.password.as_deref() == Some(expected.as_str()));
            if !valid {
                return Err(MatrixError::Forbidden("Invalid username or password".into()));
            }
            user_id
        }
        "m.login.token" => {
            let token = req
                .token
                .ok_or_else(|| MatrixError::BadRequest("Missing login token".into()))?;
            hs.login_tokens
                .remove(&token)
                .ok_or_else(|| MatrixError::Forbidden("Invalid login token".into()))?
        }
        other => return Err(MatrixError::BadRequest(format!("Unsupported login type {other}"))),
    };

    let session = hs.open_session(user_id, req.device_id);
    tracing::info!(user_id = %session.user_id, device_id = %session.device_id, "logged in");
    Ok(Json(json!({
        "user_id": session.user_id,
        "access_token": session.access_token,
        "device_id": session.device_id,
        "home_server": hs.server_name,
    })))
}

async fn whoami(session: Session) -> Json<Value> {
    Json(json!({ "user_id": session.user_id, "device_id": session.device_id }))
}

// --- rooms ---

#[derive(Deserialize)]
struct CreateRoomRequest {
    visibility: Option<String>,
    room_alias_name: Option<String>,
    name: Option<String>,
    topic: Option<String>,
    creation_content: Option<Value>,
    #[serde(default)]
    invite: Vec<String>,
}

async fn create_room(
    State(db): State<Db>,
    session: Session,
    Json(req): Json<CreateRoomRequest>,
) -> Result<Json<Value>> {
    let mut hs = db.write().await;
    let alias = req
        .room_alias_name
        .as_deref()
        .map(|local| format!("#{local}:{}", hs.server_name));
    if alias.as_ref().is_some_and(|a| hs.aliases.contains_key(a)) {
        return Err(MatrixError::RoomInUse);
    }

    let room_id = format!("!{}:{}", random_id(18), hs.server_name);
    let room_type = req
        .creation_content
        .as_ref()
        .and_then(|c| c.get("type"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let mut room = Room {
        room_id: room_id.clone(),
        name: req.name.clone(),
        topic: req.topic.clone(),
        canonical_alias: alias.clone(),
        room_type,
        public: req.visibility.as_deref() == Some("public"),
        members: BTreeSet::new(),
        timeline: Vec::new(),
    };

    let mut create_content = req.creation_content.unwrap_or_else(|| json!({}));
    create_content["creator"] = json!(session.user_id);
    room.append(&session.user_id, "m.room.create", Some(""), create_content);
    room.join(&session.user_id);
    if let Some(name) = &req.name {
        room.append(&session.user_id, "m.room.name", Some(""), json!({ "name": name }));
    }
    if let Some(topic) = &req.topic {
        room.append(&session.user_id, "m.room.topic", Some(""), json!({ "topic": topic }));
    }
    if let Some(alias) = &alias {
        room.append(&session.user_id, "m.room.canonical_alias", Some(""), json!({ "alias": alias }));
        hs.aliases.insert(alias.clone(), room_id.clone());
    }
    for invitee in &req.invite {
        room.append(&session.user_id, "m.room.member", Some(invitee.as_str()), json!({ "membership": "invite" }));
    }
    hs.rooms.push(room);

    tracing::info!(%room_id, creator = %session.user_id, "room created");
    Ok(Json(json!({ "room_id": room_id })))
}

async fn join(State(db): State<Db>, session: Session, Path(room): Path<String>) -> Result<Json<Value>> {
    let mut hs = db.write().await;
    let room = hs.room_mut(&room)?;
    room.join(&session.user_id);
    tracing::debug!(room_id = %room.room_id, user_id = %session.user_id, "joined");
    Ok(Json(json!({ "room_id": room.room_id })))
}

/// Repeating a transaction id on the same session returns the original event.
async fn send_event(
    State(db): State<Db>,
    session: Session,
    Path((room, event_type, txn)): Path<(String, String, String)>,
    Json(content): Json<Value>,
) -> Result<Json<Value>> {
    let mut hs = db.write().await;
    let key = (session.access_token.clone(), txn);
    if let Some(event_id) = hs.transactions.get(&key) {
        return Ok(Json(json!({ "event_id": event_id })));
    }

    let room = hs.room_mut(&room)?;
    if !room.members.contains(&session.user_id) {
        return Err(MatrixError::Forbidden(format!("{} is not in the room", session.user_id)));
    }
    let event_id = room.append(&session.user_id, &event_type, None, content);
    tracing::debug!(%event_id, %event_type, "event sent");
    hs.transactions.insert(key, event_id.clone());
    Ok(Json(json!({ "event_id": event_id })))
}

#[derive(Deserialize)]
struct MessagesParams {
    from: Option<String>,
    dir: Option<String>,
    limit: Option<usize>,
}

/// Timeline pagination. Tokens are `t{index}` positions between events.
async fn messages(
    State(db): State<Db>,
    session: Session,
    Path(room): Path<String>,
    Query(params): Query<MessagesParams>,
) -> Result<Json<Value>> {
    let hs = db.read().await;
    let room = hs.room(&room)?;
    if !room.members.contains(&session.user_id) {
        return Err(MatrixError::Forbidden(format!("{} is not in the room", session.user_id)));
    }

    let len = room.timeline.len();
    let limit = params.limit.unwrap_or(DEFAULT_MESSAGES_LIMIT);
    let forward = params.dir.as_deref() == Some("f");
    let from = match params.from.as_deref() {
        Some(token) => parse_position('t', token)?.min(len),
        None if forward => 0,
        None => len,
    };

    let (chunk, end): (Vec<&Event>, Option<usize>) = if forward {
        let stop = (from + limit).min(len);
        (room.timeline[from..stop].iter().collect(), (stop < len).then_some(stop))
    } else {
        let stop = from.saturating_sub(limit);
        (room.timeline[stop..from].iter().rev().collect(), (stop > 0).then_some(stop))
    };

    let mut body = json!({ "start": position_token('t', from), "chunk": chunk });
    if let Some(end) = end {
        body["end"] = json!(position_token('t', end));
    }
    Ok(Json(body))
}

// --- directory ---

#[derive(Deserialize, Default)]
struct RoomFilter {
    generic_search_term: Option<String>,
    #[serde(default)]
    room_types: Vec<Option<String>>,
}

#[derive(Deserialize)]
struct PublicRoomsParams {
    limit: Option<usize>,
    since: Option<String>,
}

#[derive(Deserialize)]
struct PublicRoomsRequest {
    limit: Option<usize>,
    since: Option<String>,
    #[serde(default)]
    filter: RoomFilter,
}

fn list_public_rooms(hs: &Homeserver, limit: Option<usize>, since: Option<&str>, filter: &RoomFilter) -> Result<Value> {
    let rooms: Vec<&Room> = hs.rooms.iter().filter(|r| r.public && r.matches(filter)).collect();
    let total = rooms.len();
    let offset = since.map(|s| parse_position('p', s)).transpose()?.unwrap_or(0).min(total);
    let stop = limit.map_or(total, |l| (offset + l).min(total));

    let mut body = json!({
        "chunk": rooms[offset..stop].iter().map(|r| r.summary()).collect::<Vec<_>>(),
        "total_room_count_estimate": total,
    });
    if stop < total {
        body["next_batch"] = json!(position_token('p', stop));
    }
    if offset > 0 {
        let prev = limit.map_or(0, |l| offset.saturating_sub(l));
        body["prev_batch"] = json!(position_token('p', prev));
    }
    Ok(body)
}

async fn public_rooms(State(db): State<Db>, Query(params): Query<PublicRoomsParams>) -> Result<Json<Value>> {
    let hs = db.read().await;
    list_public_rooms(&hs, params.limit, params.since.as_deref(), &RoomFilter::default()).map(Json)
}

async fn search_public_rooms(State(db): State<Db>, Json(req): Json<PublicRoomsRequest>) -> Result<Json<Value>> {
    let hs = db.read().await;
    list_public_rooms(&hs, req.limit, req.since.as_deref(), &req.filter).map(Json)
}
