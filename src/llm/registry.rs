//! Per-key tracking of in-flight chat requests.
//!
//! At most one request is outstanding for a given key: registering a key
//! that is already in use cancels the previous request before the new handle
//! is handed out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::cancel::CancellationToken;

/// Cancellation handle for one registered request.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    id: u64,
    token: CancellationToken,
}

impl RequestHandle {
    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Maps request keys to the cancellation handle of their current request.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    handles: Mutex<HashMap<String, RequestHandle>>,
    next_id: AtomicU64,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new request under `key`, cancelling any request it replaces.
    pub fn register(&self, key: &str) -> RequestHandle {
        let handle = RequestHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            token: CancellationToken::new(),
        };

        let mut handles = self.lock();
        if let Some(previous) = handles.insert(key.to_string(), handle.clone()) {
            previous.token.cancel();
            tracing::debug!(key, replaced = previous.id, "cancelled superseded request");
        }

        handle
    }

    /// Cancels and forgets the request registered under `key`, if any.
    pub fn cancel(&self, key: &str) {
        if let Some(handle) = self.lock().remove(key) {
            handle.token.cancel();
            tracing::debug!(key, id = handle.id, "request cancelled");
        }
    }

    /// Forgets the request under `key` without cancelling it.
    pub fn complete(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Forgets the request under `key` only if it is still `handle`.
    ///
    /// Returns `true` when the entry was removed.
    pub fn release(&self, key: &str, handle: &RequestHandle) -> bool {
        let mut handles = self.lock();
        if handles.get(key).is_some_and(|current| current.id == handle.id) {
            handles.remove(key);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Returns the handle currently registered under `key`.
    pub fn get(&self, key: &str) -> Option<RequestHandle> {
        self.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RequestHandle>> {
        // The map holds no invariant a panicking holder could break halfway.
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
