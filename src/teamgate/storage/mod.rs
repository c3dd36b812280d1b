//! Origin-scoped storage and the session flag built on top of it.
//!
//! A `Storage` is one browsing context's handle on the origin: reads and
//! writes are synchronous and immediately visible to the same context, while
//! other contexts learn about changes through `StorageEvent`s (when the
//! backend can deliver them) or by reading again. `SessionStore` binds a
//! storage handle to the single session key.

pub mod file;
pub mod memory;

pub use file::{FileOrigin, FileStorage};
pub use memory::{MemoryOrigin, MemoryStorage};

use crate::teamgate::errors::StorageError;
use std::{fmt, sync::Arc};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use ulid::Ulid;

const AUTHENTICATED_VALUE: &str = "true";
const UNAUTHENTICATED_VALUE: &str = "false";

/// Identifies one browsing context of an origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextId(Ulid);

impl ContextId {
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A change made to the origin by some context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
    pub source: ContextId,
}

pub trait Storage: Send + Sync {
    fn context_id(&self) -> ContextId;
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing an absent key succeeds.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
    /// Raw change feed of the origin. Backends without notifications return a
    /// receiver whose sender is already gone.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

/// The persisted "is this client authenticated" flag.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    key: String,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn context_id(&self) -> ContextId {
        self.storage.context_id()
    }

    /// Absent, malformed or unreadable values all read as `false`.
    #[must_use]
    pub fn read(&self) -> bool {
        self.read_checked().unwrap_or_else(|err| {
            warn!("Failed to read session flag: {err}");
            false
        })
    }

    /// Like `read`, but a storage failure is reported instead of reading as
    /// `false`. Used where a write has to be confirmed.
    pub fn read_checked(&self) -> Result<bool, StorageError> {
        Ok(self
            .storage
            .get_item(&self.key)?
            .is_some_and(|value| value == AUTHENTICATED_VALUE))
    }

    pub fn write(&self, authenticated: bool) -> Result<(), StorageError> {
        let value = if authenticated {
            AUTHENTICATED_VALUE
        } else {
            UNAUTHENTICATED_VALUE
        };
        debug!(context = %self.context_id(), "writing session flag: {value}");
        self.storage.set_item(&self.key, value)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        debug!(context = %self.context_id(), "clearing session flag");
        self.storage.remove_item(&self.key)
    }

    /// Notifications about the session key raised by other contexts.
    #[must_use]
    pub fn subscribe(&self) -> SessionEvents {
        SessionEvents {
            receiver: self.storage.subscribe(),
            key: self.key.clone(),
            own_context: self.storage.context_id(),
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SessionStore")
            .field("key", &self.key)
            .field("context", &self.context_id())
            .finish()
    }
}

/// Change notifications for one session key, excluding the subscriber's own
/// writes.
pub struct SessionEvents {
    receiver: broadcast::Receiver<StorageEvent>,
    key: String,
    own_context: ContextId,
}

impl SessionEvents {
    /// Waits for the next relevant change. Returns `None` once the origin can
    /// no longer deliver notifications. A lagged receiver reports a change,
    /// since the missed events may have touched the key.
    pub async fn changed(&mut self) -> Option<()> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.key == self.key && event.source != self.own_context => {
                    return Some(())
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!("session events lagged by {skipped}");
                    return Some(());
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
