// Shared integration-test helpers: a fake MCP poker server plus router helpers.
//
// The fake speaks just enough MCP (initialize / session header / tools/call)
// and just enough poker (blinds, turn order, call/raise/fold) to drive the
// relay end to end. Betting rounds never close; streets do not advance.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use url::Url;

use pokertable_relay::config::RelayConfig;
use pokertable_relay::state::AppState;

// ═══════════════════════════════════════════════════════════════════════════
//  Fake MCP server
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Bare JSON bodies.
    Json,
    /// `text/event-stream` bodies with a single `data:` line.
    Sse,
    /// Handshake works, but `tools/call` answers with a non-JSON body.
    GarbageToolCalls,
}

#[derive(Debug, Default)]
pub struct Stats {
    pub initialize: AtomicUsize,
    pub notifications: AtomicUsize,
    pub tool_calls: AtomicUsize,
    pub rejected: AtomicUsize,
}

struct FakeSeat {
    name: String,
    kind: String,
    stack: u64,
    bet: u64,
    folded: bool,
}

struct FakeTable {
    id: String,
    hand: u64,
    status: &'static str,
    pot: u64,
    dealer: usize,
    actor: Option<usize>,
    small_blind: u64,
    big_blind: u64,
    seats: Vec<FakeSeat>,
}

impl FakeTable {
    /// Hole cards are only shown for human seats.
    fn snapshot(&self) -> Value {
        let seats: Vec<Value> = self
            .seats
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let cards: Vec<&str> = if self.hand > 0 && s.kind == "human" {
                    vec!["Ah", "Td"]
                } else {
                    vec![]
                };
                json!({
                    "seat": i,
                    "player_name": s.name,
                    "player_type": s.kind,
                    "stack": s.stack,
                    "bet": s.bet,
                    "is_folded": s.folded,
                    "cards": cards,
                })
            })
            .collect();

        json!({
            "table_id": self.id,
            "hand_number": self.hand,
            "status": self.status,
            "stage": "preflop",
            "pot": self.pot,
            "dealer_seat": self.dealer,
            "actor_seat": self.actor,
            "small_blind": self.small_blind,
            "big_blind": self.big_blind,
            "seat_count": self.seats.len(),
            "seats": seats,
            "board": [],
        })
    }

    fn post(&mut self, seat: usize, amount: u64) {
        let s = &mut self.seats[seat];
        let paid = amount.min(s.stack);
        s.stack -= paid;
        s.bet += paid;
        self.pot += paid;
    }

    fn max_bet(&self) -> u64 {
        self.seats.iter().map(|s| s.bet).max().unwrap_or(0)
    }

    fn deal(&mut self) -> Result<(), String> {
        if self.status == "active" {
            return Err("Hand already in progress".into());
        }
        self.hand += 1;
        let n = self.seats.len();
        self.dealer = ((self.hand - 1) as usize) % n;
        for s in &mut self.seats {
            s.bet = 0;
            s.folded = false;
        }
        self.pot = 0;
        self.post((self.dealer + 1) % n, self.small_blind);
        self.post((self.dealer + 2) % n, self.big_blind);
        self.actor = Some((self.dealer + 3) % n);
        self.status = "active";
        Ok(())
    }

    fn act(&mut self, seat: usize, action: &str, amount: Option<u64>) -> Result<(), String> {
        if self.status != "active" {
            return Err("No hand in progress".into());
        }
        if self.actor != Some(seat) {
            return Err("Not your turn".into());
        }
        let max = self.max_bet();
        let bet = self.seats[seat].bet;
        match action {
            "fold" => self.seats[seat].folded = true,
            "check" => {
                if bet < max {
                    return Err("Cannot check facing a bet".into());
                }
            }
            "call" => self.post(seat, max - bet),
            "raise" => {
                let to = amount.ok_or("Raise needs an amount")?;
                if to <= max {
                    return Err("Raise must exceed the current bet".into());
                }
                self.post(seat, to - bet);
            }
            other => return Err(format!("Unknown action '{other}'")),
        }
        self.advance(seat);
        Ok(())
    }

    fn advance(&mut self, from: usize) {
        let n = self.seats.len();
        let live = self.seats.iter().filter(|s| !s.folded).count();
        if live <= 1 {
            self.status = "complete";
            self.actor = None;
            return;
        }
        self.actor = (1..=n).map(|step| (from + step) % n).find(|&s| !self.seats[s].folded);
    }

    fn ai_move(&mut self, seat: usize) -> Result<(), String> {
        if self.seats.get(seat).map(|s| s.kind.as_str()) != Some("ai") {
            return Err("Seat is not an AI".into());
        }
        let action = if self.seats[seat].bet < self.max_bet() { "call" } else { "check" };
        self.act(seat, action, None)
    }
}

const TOOL_NAMES: [&str; 5] = ["create_table", "deal_hand", "act", "get_state", "trigger_ai"];

struct Fake {
    framing: Framing,
    stats: Arc<Stats>,
    sessions: Mutex<HashSet<String>>,
    tables: Mutex<HashMap<String, FakeTable>>,
    next_id: AtomicUsize,
}

impl Fake {
    fn call_tool(&self, name: &str, args: &Value) -> Result<Value, String> {
        let mut tables = self.tables.lock().unwrap();

        if name == "create_table" {
            let id = format!("table-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            let seats = args["players"]
                .as_array()
                .ok_or("players must be an array")?
                .iter()
                .map(|p| FakeSeat {
                    name: p["name"].as_str().unwrap_or("?").to_string(),
                    kind: p["type"].as_str().unwrap_or("ai").to_string(),
                    stack: p["stack"].as_u64().unwrap_or(1000),
                    bet: 0,
                    folded: false,
                })
                .collect();
            let table = FakeTable {
                id: id.clone(),
                hand: 0,
                status: "ready",
                pot: 0,
                dealer: 0,
                actor: None,
                small_blind: args["small_blind"].as_u64().unwrap_or(5),
                big_blind: args["big_blind"].as_u64().unwrap_or(10),
                seats,
            };
            let snap = table.snapshot();
            tables.insert(id, table);
            return Ok(snap);
        }

        let table_id = args["table_id"].as_str().ok_or("table_id is required")?;
        let table = tables
            .get_mut(table_id)
            .ok_or_else(|| format!("Unknown table '{table_id}'"))?;
        let seat = args["seat"].as_u64().map(|s| s as usize);

        match name {
            "deal_hand" => table.deal()?,
            "act" => table.act(
                seat.ok_or("seat is required")?,
                args["action"].as_str().unwrap_or(""),
                args["amount"].as_u64(),
            )?,
            "trigger_ai" => table.ai_move(seat.ok_or("seat is required")?)?,
            "get_state" => {}
            other => return Err(format!("Unknown tool '{other}'")),
        }
        Ok(table.snapshot())
    }
}

fn reply(framing: Framing, envelope: Value) -> Response {
    match framing {
        Framing::Sse => (
            [(header::CONTENT_TYPE, "text/event-stream")],
            format!("event: message\ndata: {}\n\n", envelope),
        )
            .into_response(),
        _ => Json(envelope).into_response(),
    }
}

async fn mcp_endpoint(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Json(req): Json<Value>,
) -> Response {
    let method = req["method"].as_str().unwrap_or("").to_string();
    let id = req.get("id").cloned().unwrap_or(Value::Null);

    if method == "initialize" {
        let n = fake.stats.initialize.fetch_add(1, Ordering::SeqCst) + 1;
        let sid = format!("sess-{n}");
        fake.sessions.lock().unwrap().insert(sid.clone());
        let mut resp = reply(
            fake.framing,
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": req["params"]["protocolVersion"],
                    "capabilities": { "tools": {} },
                    "serverInfo": { "name": "fake-poker", "version": "0.0.1" }
                }
            }),
        );
        resp.headers_mut()
            .insert("mcp-session-id", HeaderValue::from_str(&sid).unwrap());
        return resp;
    }

    let sid = headers.get("mcp-session-id").and_then(|v| v.to_str().ok());
    let known = sid.is_some_and(|s| fake.sessions.lock().unwrap().contains(s));
    if !known {
        fake.stats.rejected.fetch_add(1, Ordering::SeqCst);
        let status = if sid.is_some() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_REQUEST
        };
        return (status, "Session not found").into_response();
    }

    if method == "notifications/initialized" {
        fake.stats.notifications.fetch_add(1, Ordering::SeqCst);
        return StatusCode::ACCEPTED.into_response();
    }

    let result = match method.as_str() {
        "tools/list" => {
            let tools: Vec<Value> = TOOL_NAMES
                .iter()
                .map(|n| json!({ "name": n, "inputSchema": { "type": "object" } }))
                .collect();
            json!({ "tools": tools })
        }
        "resources/list" => json!({ "resources": [{ "uri": "poker://rules", "name": "rules" }] }),
        "resources/read" => json!({
            "contents": [{ "uri": req["params"]["uri"], "text": "No limit hold'em" }]
        }),
        "tools/call" => {
            fake.stats.tool_calls.fetch_add(1, Ordering::SeqCst);
            if fake.framing == Framing::GarbageToolCalls {
                return (StatusCode::OK, "<<definitely not json>>").into_response();
            }
            let name = req["params"]["name"].as_str().unwrap_or("");
            match fake.call_tool(name, &req["params"]["arguments"]) {
                Ok(snapshot) => json!({
                    "content": [{ "type": "text", "text": snapshot.to_string() }],
                    "structuredContent": snapshot,
                }),
                Err(message) => json!({
                    "content": [{ "type": "text", "text": message }],
                    "isError": true,
                }),
            }
        }
        _ => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("Method not found: {method}") }
            }))
            .into_response();
        }
    };

    reply(fake.framing, json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

pub struct FakeMcpServer {
    pub base: String,
    pub stats: Arc<Stats>,
    fake: Arc<Fake>,
}

impl FakeMcpServer {
    pub async fn start(framing: Framing) -> Self {
        let stats = Arc::new(Stats::default());
        let fake = Arc::new(Fake {
            framing,
            stats: stats.clone(),
            sessions: Mutex::new(HashSet::new()),
            tables: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/mcp", post(mcp_endpoint))
            .route(
                "/broken",
                post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            )
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            stats,
            fake,
        }
    }

    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("{}{}", self.base, path)).unwrap()
    }

    pub fn mcp_url(&self) -> Url {
        self.url("/mcp")
    }

    /// Forget every session, as a restarted server would.
    pub fn expire_sessions(&self) {
        self.fake.sessions.lock().unwrap().clear();
    }

    pub fn initialize_count(&self) -> usize {
        self.stats.initialize.load(Ordering::SeqCst)
    }

    pub fn tool_call_count(&self) -> usize {
        self.stats.tool_calls.load(Ordering::SeqCst)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Relay helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Relay state pointed at `url`, with no pause between AI turns.
pub fn relay_state(url: Url) -> AppState {
    let mut cfg = RelayConfig::for_endpoint(url);
    cfg.ai_step_delay = Duration::ZERO;
    cfg.mcp_timeout = Duration::from_secs(5);
    AppState::new(cfg).unwrap()
}

pub fn relay_state_with(url: Url, tweak: impl FnOnce(&mut RelayConfig)) -> AppState {
    let mut cfg = RelayConfig::for_endpoint(url);
    cfg.ai_step_delay = Duration::ZERO;
    cfg.mcp_timeout = Duration::from_secs(5);
    tweak(&mut cfg);
    AppState::new(cfg).unwrap()
}

pub fn app(state: AppState) -> Router {
    pokertable_relay::create_router(state)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Collect a response body into a `serde_json::Value`.
pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
