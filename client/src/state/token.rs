//! The single persisted bearer-token slot.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every request attaches the token read from here, and the session store
//! listens for [`TokenChange`] events so that all sessions sharing a slot
//! converge after another one logs in or out.
//!
//! DESIGN
//! ======
//! Writes are last-write-wins. A change event is emitted only when the stored
//! value actually changes, so clearing an already-empty slot is silent.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::ClientError;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "auth_token";

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Notification that the value under `key` changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenChange {
    pub key: &'static str,
    /// `true` when a token is now stored, `false` after removal.
    pub present: bool,
}

/// Persistent storage for the bearer token.
pub trait TokenStore: Send + Sync {
    /// Read the current token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the backing medium cannot be read.
    fn load(&self) -> Result<Option<String>, ClientError>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the token cannot be written.
    fn store(&self, token: &str) -> Result<(), ClientError>;

    /// Remove the stored token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Storage`] if the token cannot be removed.
    fn clear(&self) -> Result<(), ClientError>;

    /// Subscribe to change events for this slot.
    fn subscribe(&self) -> broadcast::Receiver<TokenChange>;
}

fn notify(tx: &broadcast::Sender<TokenChange>, present: bool) {
    // No receivers is fine: nobody is listening yet.
    let _ = tx.send(TokenChange { key: TOKEN_KEY, present });
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process token slot. Shared by every session built on the same `Arc`.
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
    changes: broadcast::Sender<TokenChange>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { slot: Mutex::new(None), changes }
    }

    /// Start with `token` already stored, without emitting a change.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        if let Ok(mut slot) = store.slot.lock() {
            *slot = Some(token.to_owned());
        }
        store
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, ClientError> {
        self.slot
            .lock()
            .map_err(|_| ClientError::Storage("token slot lock poisoned".into()))
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        Ok(self.lock()?.clone())
    }

    fn store(&self, token: &str) -> Result<(), ClientError> {
        let changed = {
            let mut slot = self.lock()?;
            let changed = slot.as_deref() != Some(token);
            *slot = Some(token.to_owned());
            changed
        };
        if changed {
            notify(&self.changes, true);
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let changed = self.lock()?.take().is_some();
        if changed {
            notify(&self.changes, false);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TokenChange> {
        self.changes.subscribe()
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Token persisted as a single file. Used by the CLI between invocations.
///
/// Writes made through this handle are announced immediately. Writes made by
/// other processes are announced only while [`FileTokenStore::watch`] runs;
/// the front end owning the store starts it.
pub struct FileTokenStore {
    path: PathBuf,
    last_seen: Mutex<Option<String>>,
    changes: broadcast::Sender<TokenChange>,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let path = path.into();
        let last_seen = read_token_file(&path).ok().flatten();
        Self { path, last_seen: Mutex::new(last_seen), changes }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Poll the file every `period` and announce changes made elsewhere.
    pub fn watch(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let current = match read_token_file(&self.path) {
                    Ok(current) => current,
                    Err(e) => {
                        tracing::warn!(error = %e, path = %self.path.display(), "token file poll failed");
                        continue;
                    }
                };
                if let Some(present) = self.remember(current) {
                    tracing::debug!(present, "token file changed externally");
                    notify(&self.changes, present);
                }
            }
        })
    }

    /// Record `current` as the last observed value. Returns `Some(present)` if
    /// it differs from what was seen before.
    fn remember(&self, current: Option<String>) -> Option<bool> {
        let Ok(mut last) = self.last_seen.lock() else {
            return None;
        };
        if *last == current {
            return None;
        }
        let present = current.is_some();
        *last = current;
        Some(present)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, ClientError> {
        read_token_file(&self.path)
    }

    fn store(&self, token: &str) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::Storage(e.to_string()))?;
        }
        std::fs::write(&self.path, token).map_err(|e| ClientError::Storage(e.to_string()))?;
        if let Some(present) = self.remember(Some(token.to_owned())) {
            notify(&self.changes, present);
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(ClientError::Storage(e.to_string())),
        }
        if let Some(present) = self.remember(None) {
            notify(&self.changes, present);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TokenChange> {
        self.changes.subscribe()
    }
}

fn read_token_file(path: &Path) -> Result<Option<String>, ClientError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let token = contents.trim();
            Ok((!token.is_empty()).then(|| token.to_owned()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ClientError::Storage(e.to_string())),
    }
}
