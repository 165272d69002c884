//! Per-client MCP session handle.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{Mutex, MutexGuard};

/// Session state for one logical client of the remote MCP server.
///
/// The id lives behind a `std::sync::RwLock` because it is only touched in
/// short, non-async critical sections. Establishment is serialized separately
/// by an async mutex so concurrent first calls share a single `initialize`.
#[derive(Debug, Default)]
pub struct McpSession {
    id: RwLock<Option<String>>,
    established: AtomicBool,
    next_request_id: AtomicU64,
    establish: Mutex<()>,
}

impl McpSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session id last returned in an `Mcp-Session-Id` header.
    pub fn id(&self) -> Option<String> {
        self.id.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// `true` once `initialize` has completed and until the session is cleared.
    pub fn is_established(&self) -> bool {
        self.established.load(Ordering::Acquire)
    }

    /// Monotonically increasing JSON-RPC request id, starting at 1.
    pub fn next_request_id(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn record_id(&self, id: &str) {
        let mut slot = self.id.write().unwrap_or_else(|p| p.into_inner());
        if slot.as_deref() != Some(id) {
            tracing::debug!(session_id = %id, "MCP: session id recorded");
            *slot = Some(id.to_string());
        }
    }

    pub(crate) fn mark_established(&self) {
        self.established.store(true, Ordering::Release);
    }

    /// Forget the session; the next call performs a fresh `initialize`.
    pub fn clear(&self) {
        *self.id.write().unwrap_or_else(|p| p.into_inner()) = None;
        self.established.store(false, Ordering::Release);
    }

    pub(crate) async fn lock_establish(&self) -> MutexGuard<'_, ()> {
        self.establish.lock().await
    }
}
