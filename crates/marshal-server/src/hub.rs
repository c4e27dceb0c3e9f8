//! Broadcast registry of connected `WebSocket` clients.
//!
//! The hub maps a stable integer client id to a bounded mailbox sender.
//! Client tasks hold only their id and their mailbox receiver: the task
//! drains the mailbox into its socket, and removes itself from the
//! registry on exit. Nothing in the hub touches a socket.
//!
//! [`WsHub::broadcast`] snapshots the registry under a short-lived lock,
//! releases it, then enqueues without waiting. A client whose mailbox is
//! full cannot keep up with the stream; it is evicted on the spot, which
//! bounds per-client memory and keeps one stalled consumer from delaying
//! the rest.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Capacity of each client mailbox.
///
/// A subscriber that falls this many messages behind the broadcast
/// stream is disconnected.
pub const MAILBOX_CAPACITY: usize = 256;

/// Registry of connected `WebSocket` clients keyed by client id.
#[derive(Debug, Default)]
pub struct WsHub {
    clients: Mutex<HashMap<u64, mpsc::Sender<Message>>>,
    next_id: AtomicU64,
}

impl WsHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new client.
    ///
    /// Returns the assigned client id and the mailbox receiver the
    /// client task should drain into its socket. The receiver yields
    /// `None` once the hub has evicted or closed the client.
    pub fn register(&self) -> (u64, mpsc::Receiver<Message>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        self.lock().insert(id, tx);
        tracing::debug!(client = id, "hub registered client");
        (id, rx)
    }

    /// Remove a client from the registry. Idempotent.
    pub fn unregister(&self, id: u64) {
        if self.lock().remove(&id).is_some() {
            tracing::debug!(client = id, "hub removed client");
        }
    }

    /// Enqueue a text frame for every currently registered client,
    /// including the sender on an inbound re-broadcast.
    ///
    /// Delivery to each client is FIFO in broadcast-call order; delivery
    /// across clients is independent. Returns the number of clients the
    /// message was enqueued for. Clients with a full mailbox are evicted.
    pub fn broadcast(&self, text: &str) -> usize {
        let snapshot: Vec<(u64, mpsc::Sender<Message>)> = self
            .lock()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let message = Message::Text(text.to_owned().into());
        let mut delivered = 0;
        let mut evicted = Vec::new();
        for (id, tx) in snapshot {
            match tx.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(client = id, "client cannot keep up, dropping it");
                    evicted.push(id);
                }
                // The client task already went away; clean up its slot.
                Err(TrySendError::Closed(_)) => evicted.push(id),
            }
        }
        for id in evicted {
            self.unregister(id);
        }

        delivered
    }

    /// Number of currently registered clients.
    pub fn client_count(&self) -> usize {
        self.lock().len()
    }

    /// Drop every client mailbox, terminating all client tasks. Used
    /// during shutdown.
    pub fn close_all(&self) {
        let count = {
            let mut clients = self.lock();
            let count = clients.len();
            clients.clear();
            count
        };
        if count > 0 {
            tracing::info!(count, "hub closed all clients");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, mpsc::Sender<Message>>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
