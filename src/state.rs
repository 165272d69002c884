// Application state

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, MutexGuard};
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::Mutex;

use crate::config::RelayConfig;
use crate::game::{DrainSettings, PokerGame};
use crate::mcp::{McpSession, McpTransport, ToolInvoker};

/// A table view, serialized per table so only one action runs at a time.
pub type SharedGame = Arc<Mutex<PokerGame<ToolInvoker>>>;

// ── Bounded registry ────────────────────────────────────────────────────────

struct Slot<V> {
    value: V,
    last_used: Instant,
}

/// String-keyed map with an entry cap and idle expiry.
///
/// Expired entries are dropped whenever the map is touched; a full map
/// evicts its least recently used entry to make room.
pub(crate) struct Registry<V> {
    entries: std::sync::Mutex<HashMap<String, Slot<V>>>,
    capacity: usize,
    idle_ttl: Duration,
    kind: &'static str,
}

impl<V: Clone> Registry<V> {
    pub(crate) fn new(kind: &'static str, capacity: usize, idle_ttl: Duration) -> Self {
        Self {
            entries: std::sync::Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            idle_ttl,
            kind,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot<V>>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn prune(&self, map: &mut HashMap<String, Slot<V>>, now: Instant) {
        let before = map.len();
        map.retain(|_, slot| now.duration_since(slot.last_used) <= self.idle_ttl);
        let expired = before - map.len();
        if expired > 0 {
            tracing::debug!(registry = self.kind, expired, "registry: dropped idle entries");
        }
    }

    fn store(&self, map: &mut HashMap<String, Slot<V>>, key: &str, value: V, now: Instant) {
        self.prune(map, now);
        while map.len() >= self.capacity && !map.contains_key(key) {
            let Some(oldest) = map
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            tracing::info!(registry = self.kind, key = %oldest, "registry: full, evicting least recently used");
            map.remove(&oldest);
        }
        map.insert(
            key.to_string(),
            Slot {
                value,
                last_used: now,
            },
        );
    }

    pub(crate) fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut map = self.lock();
        self.prune(&mut map, now);
        let slot = map.get_mut(key)?;
        slot.last_used = now;
        Some(slot.value.clone())
    }

    pub(crate) fn get_or_insert_with(&self, key: &str, make: impl FnOnce() -> V) -> V {
        let now = Instant::now();
        let mut map = self.lock();
        self.prune(&mut map, now);
        if let Some(slot) = map.get_mut(key) {
            slot.last_used = now;
            return slot.value.clone();
        }
        let value = make();
        self.store(&mut map, key, value.clone(), now);
        value
    }

    pub(crate) fn insert(&self, key: &str, value: V) {
        let now = Instant::now();
        let mut map = self.lock();
        self.store(&mut map, key, value, now);
    }

    /// Live entries, after dropping expired ones.
    pub(crate) fn len(&self) -> usize {
        let mut map = self.lock();
        self.prune(&mut map, Instant::now());
        map.len()
    }
}

// ── AppState ────────────────────────────────────────────────────────────────

/// Clone-friendly: everything mutable sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub transport: Arc<McpTransport>,
    /// MCP sessions keyed by client id (`X-Client-Id`).
    sessions: Arc<Registry<Arc<McpSession>>>,
    /// Table views keyed by remote table id.
    games: Arc<Registry<SharedGame>>,
    pub start_time: Instant,
    pub ready: Arc<AtomicBool>,
}

impl AppState {
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Relaxed);
        tracing::info!("Relay marked as READY");
    }
}

impl AppState {
    pub fn new(config: RelayConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(config.mcp_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        let transport = McpTransport::new(client, config.mcp_url.clone(), config.mcp_timeout);

        tracing::info!(
            "AppState initialised - MCP endpoint {}, timeout {}s, up to {} sessions / {} tables (idle {}s)",
            config.mcp_url,
            config.mcp_timeout.as_secs(),
            config.max_sessions,
            config.max_tables,
            config.idle_ttl.as_secs()
        );

        Ok(Self {
            sessions: Arc::new(Registry::new("sessions", config.max_sessions, config.idle_ttl)),
            games: Arc::new(Registry::new("tables", config.max_tables, config.idle_ttl)),
            config: Arc::new(config),
            transport: Arc::new(transport),
            start_time: Instant::now(),
            ready: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Tool invoker bound to `client_id`'s session, created on first use.
    pub fn invoker(&self, client_id: &str) -> ToolInvoker {
        let session = self.sessions.get_or_insert_with(client_id, || {
            tracing::debug!(client_id = %client_id, "MCP: new client session handle");
            Arc::new(McpSession::new())
        });
        ToolInvoker::new(self.transport.clone(), session, self.config.client.clone())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn table_count(&self) -> usize {
        self.games.len()
    }

    pub fn drain_settings(&self) -> DrainSettings {
        DrainSettings {
            step_delay: self.config.ai_step_delay,
            max_steps: self.config.ai_max_steps,
        }
    }

    pub fn insert_game(&self, table_id: &str, game: PokerGame<ToolInvoker>) -> SharedGame {
        let shared = Arc::new(Mutex::new(game));
        self.games.insert(table_id, shared.clone());
        shared
    }

    pub fn game(&self, table_id: &str) -> Option<SharedGame> {
        self.games.get(table_id)
    }
}
