//! Live-notification hub
//!
//! A single task owns the set of connected clients; everyone else talks
//! to it through three channels (register, unregister, broadcast), so
//! the set itself needs no lock. Deliveries are fire-and-forget: a
//! client whose outbound queue is full or closed is dropped on the spot,
//! and a full hub inlet drops the notification rather than blocking the
//! caller.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

const REGISTER_CAPACITY: usize = 32;
const BROADCAST_CAPACITY: usize = 64;

/// Payload pushed to every live client when a run completes
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisCompleteEvent {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub project_id: String,
    pub scan_type: String,
    pub issues_found: u32,
    pub timestamp: i64,
}

impl AnalysisCompleteEvent {
    pub fn new(project_id: &str, scan_type: &str, issues_found: u32) -> Self {
        Self {
            event_type: "analysis_complete",
            project_id: project_id.to_string(),
            scan_type: scan_type.to_string(),
            issues_found,
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// One registered client: its id plus the sender feeding its socket
/// writer task. Dropping the sender closes the connection.
pub struct ClientHandle {
    pub id: Uuid,
    pub sender: mpsc::Sender<String>,
}

/// The connection registry. Only [`run`] ever touches `clients`.
pub struct NotificationHub {
    clients: HashMap<Uuid, mpsc::Sender<String>>,
}

impl NotificationHub {
    fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    fn register(&mut self, client: ClientHandle) {
        self.clients.insert(client.id, client.sender);
        info!("WebSocket client connected. Total: {}", self.clients.len());
    }

    /// Idempotent: unregistering an absent client is a no-op
    fn unregister(&mut self, id: Uuid) {
        if self.clients.remove(&id).is_some() {
            info!("WebSocket client disconnected. Total: {}", self.clients.len());
        }
    }

    /// One non-blocking send attempt per client; any failure drops that
    /// client immediately.
    fn broadcast(&mut self, payload: &str) {
        let mut dead = Vec::new();
        for (id, sender) in &self.clients {
            if sender.try_send(payload.to_string()).is_err() {
                dead.push(*id);
            }
        }
        for id in dead {
            self.clients.remove(&id);
            warn!("Dropped unresponsive WebSocket client {}", id);
        }
    }

    fn len(&self) -> usize {
        self.clients.len()
    }
}

/// Cloneable handle other tasks use to reach the hub
#[derive(Clone)]
pub struct HubHandle {
    register_tx: mpsc::Sender<ClientHandle>,
    unregister_tx: mpsc::Sender<Uuid>,
    broadcast_tx: mpsc::Sender<String>,
}

impl HubHandle {
    pub async fn register(&self, client: ClientHandle) {
        let _ = self.register_tx.send(client).await;
    }

    pub async fn unregister(&self, id: Uuid) {
        let _ = self.unregister_tx.send(id).await;
    }

    /// Queue a completion event for broadcast. Never blocks; returns
    /// false when the event had to be dropped.
    pub fn notify_analysis_complete(&self, event: &AnalysisCompleteEvent) -> bool {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Failed to encode notification: {}", err);
                return false;
            }
        };

        match self.broadcast_tx.try_send(payload) {
            Ok(()) => {
                info!("Real-time notification queued for project {}", event.project_id);
                true
            }
            Err(_) => {
                warn!("Notification dropped for project {}: hub queue full", event.project_id);
                false
            }
        }
    }
}

/// Spawn the hub task and return its handle
pub fn spawn() -> HubHandle {
    let (register_tx, register_rx) = mpsc::channel(REGISTER_CAPACITY);
    let (unregister_tx, unregister_rx) = mpsc::channel(REGISTER_CAPACITY);
    let (broadcast_tx, broadcast_rx) = mpsc::channel(BROADCAST_CAPACITY);

    tokio::spawn(run(register_rx, unregister_rx, broadcast_rx));

    HubHandle {
        register_tx,
        unregister_tx,
        broadcast_tx,
    }
}

async fn run(
    mut register_rx: mpsc::Receiver<ClientHandle>,
    mut unregister_rx: mpsc::Receiver<Uuid>,
    mut broadcast_rx: mpsc::Receiver<String>,
) {
    let mut hub = NotificationHub::new();

    loop {
        // Membership changes win over deliveries when both are queued
        tokio::select! {
            biased;
            Some(client) = register_rx.recv() => hub.register(client),
            Some(id) = unregister_rx.recv() => hub.unregister(id),
            Some(payload) = broadcast_rx.recv() => hub.broadcast(&payload),
            else => break,
        }
    }

    info!("Notification hub stopped with {} clients", hub.len());
}
