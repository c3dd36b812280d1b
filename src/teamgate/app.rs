//! A browsing context of the dashboard: history, session view, application
//! context and the router that keeps the right guard in front of the
//! current route (`/` behind the public guard, `/home` behind the protected
//! guard).

use crate::teamgate::{
    client::IdentityValidator,
    config::AuthConfig,
    context::AppContext,
    guard::{GuardHandle, GuardKind, SessionGuard},
    handshake::{HandshakeController, Unmount},
    logout::LogoutAction,
    navigation::{History, Location, Navigator, Route},
    storage::{ContextId, SessionStore, Storage},
};
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{error::Elapsed, timeout},
};
use tracing::{debug, info};

type LoginSlot = Arc<Mutex<Option<Arc<dyn Unmount>>>>;

pub struct Tab {
    history: Arc<History>,
    session: SessionStore,
    context: AppContext,
    config: AuthConfig,
    login_view: LoginSlot,
    guard_kind: watch::Receiver<GuardKind>,
    router: JoinHandle<()>,
}

impl Tab {
    /// Opens a context at `initial` and mounts its guard. Must be called
    /// inside a tokio runtime.
    pub fn open(storage: Arc<dyn Storage>, config: AuthConfig, initial: Route) -> Self {
        let history = Arc::new(History::new(initial));
        let session = SessionStore::new(storage, config.session_key());
        let login_view: LoginSlot = Arc::new(Mutex::new(None));

        let locations = history.subscribe();
        let kind = GuardKind::for_route(initial);
        let guard = SessionGuard::mount(kind, initial, session.clone(), history.clone(), &config);
        let (kind_tx, guard_kind) = watch::channel(kind);

        info!(context = %session.context_id(), "opened tab at {initial}");

        let router = tokio::spawn(route(Router {
            history: history.clone(),
            session: session.clone(),
            config: config.clone(),
            login_view: login_view.clone(),
            guard: Some(guard),
            kind: kind_tx,
            locations,
        }));

        Self {
            history,
            session,
            context: AppContext::new(),
            config,
            login_view,
            guard_kind,
            router,
        }
    }

    #[must_use]
    pub fn context_id(&self) -> ContextId {
        self.session.context_id()
    }

    #[must_use]
    pub fn route(&self) -> Route {
        self.history.current()
    }

    #[must_use]
    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Kind of the guard currently mounted by the router.
    #[must_use]
    pub fn guard_kind(&self) -> GuardKind {
        *self.guard_kind.borrow()
    }

    /// Mounts a fresh login view. It is unmounted as soon as the context
    /// leaves the login route, or when another login view replaces it.
    pub fn login_view<V>(&self, validator: Arc<V>) -> Result<Arc<HandshakeController<V>>, regex::Error>
    where
        V: IdentityValidator + 'static,
    {
        let controller = Arc::new(HandshakeController::mount(
            validator,
            self.session.clone(),
            self.context.clone(),
            self.history.clone(),
            &self.config,
        )?);
        let previous = self
            .login_view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(controller.clone());
        if let Some(previous) = previous {
            previous.unmount();
        }
        if self.route() != Route::Login {
            controller.unmount();
        }
        Ok(controller)
    }

    #[must_use]
    pub fn logout_action(&self) -> LogoutAction {
        LogoutAction::new(
            self.session.clone(),
            self.context.clone(),
            self.history.clone(),
            &self.config,
        )
    }

    /// Waits until the context shows `route`.
    pub async fn wait_for_route(&self, route: Route, limit: Duration) -> Result<(), Elapsed> {
        let mut locations = self.history.subscribe();
        timeout(limit, async move {
            // The history outlives this call, so the sender cannot go away.
            let _ = locations
                .wait_for(|location| location.route == route)
                .await;
        })
        .await
    }

    /// Closes the context, tearing down its router, guard and login view.
    pub fn close(self) {}
}

impl Drop for Tab {
    fn drop(&mut self) {
        self.router.abort();
        if let Some(view) = self
            .login_view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            view.unmount();
        }
    }
}

struct Router {
    history: Arc<History>,
    session: SessionStore,
    config: AuthConfig,
    login_view: LoginSlot,
    guard: Option<GuardHandle>,
    kind: watch::Sender<GuardKind>,
    locations: watch::Receiver<Location>,
}

async fn route(mut router: Router) {
    while router.locations.changed().await.is_ok() {
        let location = *router.locations.borrow_and_update();

        if location.route != Route::Login {
            let view = router
                .login_view
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(view) = view {
                debug!("unmounting login view");
                view.unmount();
            }
        }

        let kind = GuardKind::for_route(location.route);
        if kind == *router.kind.borrow() {
            // The mounted guard reacts to same-kind navigations itself.
            continue;
        }

        debug!(?kind, "remounting guard for {}", location.route);
        // Tear the old guard down before the new one starts evaluating.
        drop(router.guard.take());
        router.guard = Some(SessionGuard::mount(
            kind,
            location.route,
            router.session.clone(),
            router.history.clone(),
            &router.config,
        ));
        router.kind.send_replace(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teamgate::storage::MemoryOrigin;

    fn config() -> AuthConfig {
        AuthConfig::new("http://localhost")
            .with_poll_intervals(Duration::from_millis(30), Duration::from_millis(10))
            .with_logout_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn unauthenticated_home_lands_on_login() {
        let origin = MemoryOrigin::new();
        let tab = Tab::open(Arc::new(origin.context()), config(), Route::Home);

        tab.wait_for_route(Route::Login, Duration::from_secs(2))
            .await
            .unwrap();
        timeout(Duration::from_secs(2), async {
            while tab.guard_kind() != GuardKind::Public {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn authenticated_login_lands_on_home() {
        let origin = MemoryOrigin::new();
        origin.context().set_item("isLoggedIn", "true").unwrap();
        let tab = Tab::open(Arc::new(origin.context()), config(), Route::Login);

        assert_eq!(tab.route(), Route::Home);
        tab.wait_for_route(Route::Home, Duration::from_secs(2))
            .await
            .unwrap();
        tab.close();
    }

    #[tokio::test]
    async fn logout_goes_back_to_login_and_stays() {
        let origin = MemoryOrigin::new();
        origin.context().set_item("isLoggedIn", "true").unwrap();
        let tab = Tab::open(Arc::new(origin.context()), config(), Route::Home);
        assert_eq!(tab.guard_kind(), GuardKind::Protected);

        tab.logout_action().run().await.unwrap();

        assert_eq!(tab.route(), Route::Login);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tab.route(), Route::Login);
        assert_eq!(tab.guard_kind(), GuardKind::Public);
    }
}
