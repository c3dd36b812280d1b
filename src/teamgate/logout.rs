//! Logout: clear the session flag, confirm the clear, reset the application
//! context and return the context to the login view.

use crate::teamgate::{
    config::AuthConfig,
    context::AppContext,
    errors::AuthError,
    navigation::{NavigateOptions, Navigator, Route},
    storage::SessionStore,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;
use tracing::{error, info, instrument};

pub const LOGOUT_NOTICE: &str = "Logged out successfully";

pub struct LogoutAction {
    session: SessionStore,
    context: AppContext,
    navigator: Arc<dyn Navigator>,
    delay: Duration,
    running: AtomicBool,
}

/// Resets the running flag however `run` exits.
struct Running<'a>(&'a AtomicBool);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl LogoutAction {
    pub fn new(
        session: SessionStore,
        context: AppContext,
        navigator: Arc<dyn Navigator>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            session,
            context,
            navigator,
            delay: config.logout_delay(),
            running: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Nothing is reset and nobody navigates unless the clear is confirmed
    /// by reading the flag back.
    #[instrument(skip_all)]
    pub async fn run(&self) -> Result<&'static str, AuthError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(AuthError::Busy);
        }
        let _running = Running(&self.running);

        if let Err(err) = self.session.clear() {
            error!("Failed to remove login status: {err}");
            return Err(AuthError::logout_failed());
        }
        match self.session.read_checked() {
            Ok(false) => {}
            Ok(true) => {
                error!("Failed to remove login status: flag still set");
                return Err(AuthError::logout_failed());
            }
            Err(err) => {
                error!("Failed to confirm logout: {err}");
                return Err(AuthError::logout_failed());
            }
        }

        self.context.clear_auth();

        sleep(self.delay).await;

        self.navigator.navigate(Route::Login, NavigateOptions::replace());
        info!("logged out");

        Ok(LOGOUT_NOTICE)
    }
}
