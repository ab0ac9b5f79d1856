use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

/// Connections currently being served, keyed by a per-server id.
///
/// Cloning yields another handle to the same set.
#[derive(Debug, Default, Clone)]
pub struct ConnectionSet {
    entries: Arc<Mutex<HashMap<u64, Option<SocketAddr>>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection. It stays in the set until the guard is dropped.
    pub fn insert(&self, peer_addr: Option<SocketAddr>) -> ConnectionGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, peer_addr);

        ConnectionGuard {
            set: self.clone(),
            id,
            peer_addr,
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Peer addresses of the live connections, in no particular order.
    pub fn peers(&self) -> Vec<Option<SocketAddr>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .copied()
            .collect()
    }

    fn remove(&self, id: u64) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// Membership of one connection in a `ConnectionSet`.
#[derive(Debug)]
pub struct ConnectionGuard {
    set: ConnectionSet,
    id: u64,
    peer_addr: Option<SocketAddr>,
}

impl ConnectionGuard {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.set.remove(self.id);
    }
}
