use super::{ContextId, Storage, StorageEvent};
use crate::teamgate::errors::StorageError;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

struct Shared {
    items: Mutex<HashMap<String, String>>,
    events: Option<broadcast::Sender<StorageEvent>>,
}

/// In-process origin shared by any number of contexts.
#[derive(Clone)]
pub struct MemoryOrigin {
    shared: Arc<Shared>,
}

impl MemoryOrigin {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self::build(Some(events))
    }

    /// An origin whose writes never raise change notifications, so other
    /// contexts only notice them by reading again.
    #[must_use]
    pub fn without_events() -> Self {
        Self::build(None)
    }

    fn build(events: Option<broadcast::Sender<StorageEvent>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                items: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    /// Opens a new browsing context on this origin.
    #[must_use]
    pub fn context(&self) -> MemoryStorage {
        MemoryStorage {
            shared: Arc::clone(&self.shared),
            context_id: ContextId::new(),
        }
    }
}

impl Default for MemoryOrigin {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MemoryStorage {
    shared: Arc<Shared>,
    context_id: ContextId,
}

impl MemoryStorage {
    fn items(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.shared
            .items
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }

    fn emit(&self, key: &str, new_value: Option<String>) {
        if let Some(events) = &self.shared.events {
            // No subscribers is fine.
            let _ = events.send(StorageEvent {
                key: key.to_string(),
                new_value,
                source: self.context_id,
            });
        }
    }
}

impl Storage for MemoryStorage {
    fn context_id(&self) -> ContextId {
        self.context_id
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items()?.insert(key.to_string(), value.to_string());
        self.emit(key, Some(value.to_string()));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let removed = self.items()?.remove(key);
        if removed.is_some() {
            self.emit(key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        match &self.shared.events {
            Some(events) => events.subscribe(),
            None => broadcast::channel(1).1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts_share_items() {
        let origin = MemoryOrigin::new();
        let first = origin.context();
        let second = origin.context();
        assert_ne!(first.context_id(), second.context_id());

        first.set_item("isLoggedIn", "true").unwrap();
        assert_eq!(
            second.get_item("isLoggedIn").unwrap(),
            Some("true".to_string())
        );

        second.remove_item("isLoggedIn").unwrap();
        assert_eq!(first.get_item("isLoggedIn").unwrap(), None);
    }

    #[test]
    fn events_carry_source_and_value() {
        let origin = MemoryOrigin::new();
        let writer = origin.context();
        let mut receiver = origin.context().subscribe();

        writer.set_item("isLoggedIn", "true").unwrap();
        writer.remove_item("isLoggedIn").unwrap();
        // Absent key: no second removal event.
        writer.remove_item("isLoggedIn").unwrap();

        let set = receiver.try_recv().unwrap();
        assert_eq!(set.source, writer.context_id());
        assert_eq!(set.new_value, Some("true".to_string()));
        let removed = receiver.try_recv().unwrap();
        assert_eq!(removed.new_value, None);
        assert!(receiver.try_recv().is_err());
    }
}
