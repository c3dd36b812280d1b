//! View guards. `Protected` wraps views that need a session and sends the
//! context to the login view otherwise; `Public` wraps the login view and
//! sends an authenticated context to the main view. Both re-derive the flag
//! on mount, on every navigation, on change notifications for the session
//! key and on a fixed polling interval, the fallback for changes that never
//! raise a notification.

use crate::teamgate::{
    config::AuthConfig,
    navigation::{Location, NavigateOptions, Navigator, Route},
    storage::{SessionEvents, SessionStore},
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardKind {
    Protected,
    Public,
}

impl GuardKind {
    /// Guard that belongs in front of `route`.
    #[must_use]
    pub fn for_route(route: Route) -> Self {
        match route {
            Route::Login => Self::Public,
            Route::Home => Self::Protected,
        }
    }

    #[must_use]
    pub fn allows(self, authenticated: bool) -> bool {
        match self {
            Self::Protected => authenticated,
            Self::Public => !authenticated,
        }
    }

    #[must_use]
    pub fn redirect_target(self) -> Route {
        match self {
            Self::Protected => Route::Login,
            Self::Public => Route::Home,
        }
    }

    /// Protected views tolerate slightly more staleness than public ones.
    #[must_use]
    pub fn poll_interval(self, config: &AuthConfig) -> Duration {
        match self {
            Self::Protected => config.protected_poll_interval(),
            Self::Public => config.public_poll_interval(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    Mount,
    Poll,
    Notification,
    Navigation,
}

struct Evaluator {
    kind: GuardKind,
    view: Route,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<bool>,
}

impl Evaluator {
    fn evaluate(&self, trigger: Trigger) {
        let authenticated = self.store.read();
        let previous = self.state.send_replace(authenticated);
        if previous != authenticated {
            debug!(?trigger, kind = ?self.kind, "session flag changed to {authenticated}");
        } else {
            trace!(?trigger, kind = ?self.kind, "session flag unchanged");
        }

        if self.kind.allows(authenticated) {
            return;
        }
        // Only the view this guard wraps is redirected; once the redirect
        // lands the guard is no longer in front of anything.
        let current = self.navigator.current();
        let target = self.kind.redirect_target();
        if current == self.view && current != target {
            info!(?trigger, "redirecting {} to {target}", self.view);
            self.navigator.navigate(target, NavigateOptions::replace());
        }
    }
}

pub struct SessionGuard;

impl SessionGuard {
    /// Mounts a guard in front of `view`, which must be a route `kind`
    /// belongs to. The first evaluation happens before this returns; the rest
    /// run on a task owned by the returned handle. Must be called inside a
    /// tokio runtime.
    pub fn mount(
        kind: GuardKind,
        view: Route,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        config: &AuthConfig,
    ) -> GuardHandle {
        debug_assert_eq!(GuardKind::for_route(view), kind);
        let (state, receiver) = watch::channel(store.read());
        let evaluator = Evaluator {
            kind,
            view,
            store,
            navigator,
            state,
        };

        // Subscribe before the first read so no change slips in between.
        let events = evaluator.store.subscribe();
        let locations = evaluator.navigator.subscribe();
        evaluator.evaluate(Trigger::Mount);

        let period = kind.poll_interval(config);
        let task = tokio::spawn(reconcile(evaluator, events, locations, period));

        GuardHandle {
            kind,
            state: receiver,
            task,
        }
    }
}

async fn reconcile(
    evaluator: Evaluator,
    mut events: SessionEvents,
    mut locations: watch::Receiver<Location>,
    period: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately and mount already evaluated.
    ticker.tick().await;

    let mut events_open = true;
    let mut locations_open = true;

    loop {
        let trigger = tokio::select! {
            _ = ticker.tick() => Trigger::Poll,
            changed = events.changed(), if events_open => match changed {
                Some(()) => Trigger::Notification,
                None => {
                    debug!("change notifications unavailable, relying on polling");
                    events_open = false;
                    continue;
                }
            },
            changed = locations.changed(), if locations_open => match changed {
                Ok(()) => Trigger::Navigation,
                Err(_) => {
                    locations_open = false;
                    continue;
                }
            },
        };
        evaluator.evaluate(trigger);
    }
}

/// Owns a mounted guard. Dropping it tears the guard down: the polling
/// interval and both subscriptions go away with the task.
pub struct GuardHandle {
    kind: GuardKind,
    state: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl GuardHandle {
    #[must_use]
    pub fn kind(&self) -> GuardKind {
        self.kind
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        *self.state.borrow()
    }

    /// Whether the wrapped view may render.
    #[must_use]
    pub fn allowed(&self) -> bool {
        self.kind.allows(self.is_authenticated())
    }

    /// Watches the flag as this guard last observed it.
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<bool> {
        self.state.clone()
    }

    pub fn unmount(self) {}
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teamgate::{
        navigation::History,
        storage::{FileOrigin, MemoryOrigin},
    };
    use tokio::time::{sleep, timeout, Instant};

    fn config() -> AuthConfig {
        AuthConfig::new("http://localhost")
            .with_poll_intervals(Duration::from_millis(40), Duration::from_millis(10))
    }

    const SCHEDULING_SLACK: Duration = Duration::from_millis(30);

    async fn wait_for(receiver: &mut watch::Receiver<bool>, expected: bool) {
        timeout(Duration::from_secs(2), receiver.wait_for(|value| *value == expected))
            .await
            .expect("guard did not observe the change")
            .expect("guard stopped");
    }

    #[test]
    fn kinds_are_inverted() {
        assert!(GuardKind::Protected.allows(true));
        assert!(!GuardKind::Protected.allows(false));
        assert!(GuardKind::Public.allows(false));
        assert!(!GuardKind::Public.allows(true));
        assert_eq!(GuardKind::Protected.redirect_target(), Route::Login);
        assert_eq!(GuardKind::Public.redirect_target(), Route::Home);
        assert_eq!(GuardKind::for_route(Route::Home), GuardKind::Protected);
        let config = AuthConfig::new("http://localhost");
        assert!(
            GuardKind::Protected.poll_interval(&config) > GuardKind::Public.poll_interval(&config)
        );
    }

    #[tokio::test]
    async fn protected_guard_redirects_on_mount_without_session() {
        let origin = MemoryOrigin::new();
        let store = SessionStore::new(Arc::new(origin.context()), "isLoggedIn");
        let history = Arc::new(History::new(Route::Login));
        history.navigate(Route::Home, NavigateOptions::default());

        let guard = SessionGuard::mount(
            GuardKind::Protected,
            Route::Home,
            store,
            history.clone(),
            &config(),
        );

        assert!(!guard.allowed());
        assert_eq!(history.current(), Route::Login);
        // Replace: the stale protected entry is gone.
        assert_eq!(history.stack(), vec![Route::Login, Route::Login]);
    }

    #[tokio::test]
    async fn notification_from_other_context_is_observed() {
        let origin = MemoryOrigin::new();
        let other = SessionStore::new(Arc::new(origin.context()), "isLoggedIn");
        let store = SessionStore::new(Arc::new(origin.context()), "isLoggedIn");
        // Slow polling so only the notification can explain a quick update.
        let config = AuthConfig::new("http://localhost")
            .with_poll_intervals(Duration::from_secs(30), Duration::from_secs(30));
        let history = Arc::new(History::new(Route::Login));
        let guard = SessionGuard::mount(
            GuardKind::Public,
            Route::Login,
            store,
            history.clone(),
            &config,
        );
        let mut changes = guard.changes();

        other.write(true).unwrap();

        wait_for(&mut changes, true).await;
        assert_eq!(history.current(), Route::Home);
    }

    #[tokio::test]
    async fn polling_converges_without_notifications() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SessionStore::new(
            Arc::new(FileOrigin::open(dir.path()).unwrap().context()),
            "isLoggedIn",
        );
        let reader = SessionStore::new(
            Arc::new(FileOrigin::open(dir.path()).unwrap().context()),
            "isLoggedIn",
        );
        let config = config();
        let history = Arc::new(History::new(Route::Home));
        writer.write(true).unwrap();
        let guard = SessionGuard::mount(
            GuardKind::Protected,
            Route::Home,
            reader,
            history.clone(),
            &config,
        );
        assert!(guard.allowed());
        let mut changes = guard.changes();

        let started = Instant::now();
        writer.clear().unwrap();
        wait_for(&mut changes, false).await;

        // One polling interval, plus slack for the task to be scheduled.
        assert!(started.elapsed() < config.protected_poll_interval() + SCHEDULING_SLACK);
        assert_eq!(history.current(), Route::Login);
    }

    #[tokio::test]
    async fn same_context_programmatic_change_is_polled() {
        let origin = MemoryOrigin::without_events();
        let store = SessionStore::new(Arc::new(origin.context()), "isLoggedIn");
        let history = Arc::new(History::new(Route::Login));
        let guard = SessionGuard::mount(
            GuardKind::Public,
            Route::Login,
            store.clone(),
            history.clone(),
            &config(),
        );
        let mut changes = guard.changes();

        store.write(true).unwrap();

        wait_for(&mut changes, true).await;
        assert_eq!(history.current(), Route::Home);
    }

    #[tokio::test]
    async fn navigation_back_to_guarded_view_redirects_again() {
        let origin = MemoryOrigin::new();
        let store = SessionStore::new(Arc::new(origin.context()), "isLoggedIn");
        let config = AuthConfig::new("http://localhost")
            .with_poll_intervals(Duration::from_secs(30), Duration::from_secs(30));
        let history = Arc::new(History::new(Route::Home));
        let guard = SessionGuard::mount(
            GuardKind::Protected,
            Route::Home,
            store,
            history.clone(),
            &config,
        );
        assert_eq!(history.current(), Route::Login);

        history.navigate(Route::Home, NavigateOptions::default());

        timeout(Duration::from_secs(2), async {
            while history.current() != Route::Login {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
        drop(guard);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn guard_mounted_for_a_view_already_left_stays_quiet() {
        let origin = MemoryOrigin::new();
        let store = SessionStore::new(Arc::new(origin.context()), "isLoggedIn");
        // The context moved to `/` before the protected guard for `/home` was
        // mounted.
        let history = Arc::new(History::new(Route::Login));
        let guard = SessionGuard::mount(
            GuardKind::Protected,
            Route::Home,
            store,
            history.clone(),
            &config(),
        );

        sleep(Duration::from_millis(50)).await;

        assert!(!guard.allowed());
        assert_eq!(history.subscribe().borrow().seq, 0);
        assert_eq!(history.stack(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_task() {
        let origin = MemoryOrigin::new();
        let store = SessionStore::new(Arc::new(origin.context()), "isLoggedIn");
        let history = Arc::new(History::new(Route::Login));
        let guard = SessionGuard::mount(
            GuardKind::Public,
            Route::Login,
            store.clone(),
            history.clone(),
            &config(),
        );
        let changes = guard.changes();

        guard.unmount();
        sleep(Duration::from_millis(20)).await;
        assert!(changes.has_changed().is_err());

        store.write(true).unwrap();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(history.current(), Route::Login);
    }
}
