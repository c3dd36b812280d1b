//! Process-wide application context: who is logged in, whether the
//! notification bell is shown, and the pending member-record queue. The
//! context is handed to every consumer explicitly; there is no ambient
//! provider to fall back from.

use std::{
    collections::VecDeque,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

/// Reference to a team member record waiting in the notification queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRecordRef {
    pub id: String,
    pub name: String,
}

impl MemberRecordRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    pub identity: Option<String>,
    pub notification_affordance: bool,
    pub pending_queue: VecDeque<MemberRecordRef>,
}

#[derive(Clone, Debug, Default)]
pub struct AppContext {
    state: Arc<RwLock<AppState>>,
}

impl AppContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Every write replaces whole fields, so a poisoned lock still holds a
    // consistent state.
    fn read(&self) -> RwLockReadGuard<'_, AppState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn set_identity(&self, identity: &str) {
        self.write().identity = Some(identity.to_string());
    }

    #[must_use]
    pub fn identity(&self) -> Option<String> {
        self.read().identity.clone()
    }

    pub fn set_notification_affordance(&self, shown: bool) {
        self.write().notification_affordance = shown;
    }

    #[must_use]
    pub fn notification_affordance(&self) -> bool {
        self.read().notification_affordance
    }

    pub fn enqueue(&self, record: MemberRecordRef) {
        self.write().pending_queue.push_back(record);
    }

    pub fn dequeue(&self) -> Option<MemberRecordRef> {
        self.write().pending_queue.pop_front()
    }

    /// Removes a queued record by id, returning it when present.
    pub fn remove(&self, id: &str) -> Option<MemberRecordRef> {
        let mut state = self.write();
        let index = state.pending_queue.iter().position(|record| record.id == id)?;
        state.pending_queue.remove(index)
    }

    #[must_use]
    pub fn pending(&self) -> Vec<MemberRecordRef> {
        self.read().pending_queue.iter().cloned().collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> AppState {
        self.read().clone()
    }

    /// Resets every field to its default, used on logout.
    pub fn clear_auth(&self) {
        debug!("clearing application context");
        *self.write() = AppState::default();
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        *self.read() == AppState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let context = AppContext::new();
        let other = context.clone();
        context.set_identity("a@socialbeat.in");
        context.set_notification_affordance(true);
        assert_eq!(other.identity().as_deref(), Some("a@socialbeat.in"));
        assert!(other.notification_affordance());
    }

    #[test]
    fn queue_keeps_insertion_order() {
        let context = AppContext::new();
        context.enqueue(MemberRecordRef::new("1", "Asha"));
        context.enqueue(MemberRecordRef::new("2", "Ravi"));
        context.enqueue(MemberRecordRef::new("3", "Meera"));

        assert_eq!(context.remove("2").map(|r| r.name), Some("Ravi".to_string()));
        assert_eq!(context.remove("9"), None);
        assert_eq!(context.dequeue().map(|r| r.id), Some("1".to_string()));
        assert_eq!(context.pending(), vec![MemberRecordRef::new("3", "Meera")]);
    }

    #[test]
    fn clear_auth_resets_everything() {
        let context = AppContext::new();
        context.set_identity("hr@socialbeat.in");
        context.set_notification_affordance(true);
        context.enqueue(MemberRecordRef::new("1", "Asha"));
        assert!(!context.is_default());

        context.clear_auth();

        assert!(context.is_default());
        assert_eq!(context.snapshot(), AppState::default());
    }
}
