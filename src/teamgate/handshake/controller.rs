use super::attempt::{AttemptState, LoginAttempt, LoginPhase, CODE_SENT_NOTICE};
use crate::teamgate::{
    client::IdentityValidator,
    config::AuthConfig,
    context::AppContext,
    errors::{AuthError, ErrorState, StorageError},
    identity::{sanitize_input, IdentityPolicy},
    navigation::{NavigateOptions, Navigator, Route},
    storage::SessionStore,
};
use secrecy::{ExposeSecret, SecretString};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// A mounted view that can be torn down by its router.
pub trait Unmount: Send + Sync {
    fn unmount(&self);
}

/// Result of a successful identity submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityOutcome {
    /// The server dispatched a one-time code.
    CodeDispatched { privileged: bool },
}

/// Drives one login view's handshake. A controller is created per mount and
/// becomes inert after `unmount`: responses that complete afterwards are
/// dropped without touching the attempt, the session or the context.
pub struct HandshakeController<V> {
    validator: Arc<V>,
    session: SessionStore,
    context: AppContext,
    navigator: Arc<dyn Navigator>,
    policy: IdentityPolicy,
    code_check_delay: Duration,
    state: Mutex<AttemptState>,
}

impl<V: IdentityValidator> Unmount for HandshakeController<V> {
    fn unmount(&self) {
        HandshakeController::unmount(self);
    }
}

impl<V: IdentityValidator> HandshakeController<V> {
    pub fn mount(
        validator: Arc<V>,
        session: SessionStore,
        context: AppContext,
        navigator: Arc<dyn Navigator>,
        config: &AuthConfig,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            validator,
            session,
            context,
            navigator,
            policy: IdentityPolicy::new(config.allowed_domains())?,
            code_check_delay: config.code_check_delay(),
            state: Mutex::new(AttemptState::fresh()),
        })
    }

    fn state(&self) -> MutexGuard<'_, AttemptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Discards the attempt. The in-memory code is dropped with it.
    pub fn unmount(&self) {
        let mut state = self.state();
        *state = AttemptState::default();
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.state().mounted
    }

    #[must_use]
    pub fn attempt(&self) -> LoginAttempt {
        self.state().view()
    }

    /// Inline text for the current attempt: the error when one is set,
    /// otherwise the "code sent" notice once a code was dispatched.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        let state = self.state();
        match state.error_state {
            ErrorState::InvalidDomain => Some(self.invalid_domain().to_string()),
            ErrorState::IdentityNotFound => Some(AuthError::IdentityNotFound.to_string()),
            ErrorState::InvalidCode => Some(AuthError::InvalidCode.to_string()),
            ErrorState::None if state.code_dispatched && state.phase == LoginPhase::AwaitingCode => {
                Some(CODE_SENT_NOTICE.to_string())
            }
            ErrorState::None => None,
        }
    }

    fn invalid_domain(&self) -> AuthError {
        AuthError::InvalidDomain {
            allowed: self.policy.describe(),
        }
    }

    /// Marks a submission as in flight after checking it may start.
    fn begin(&self, expected: LoginPhase) -> Result<MutexGuard<'_, AttemptState>, AuthError> {
        let mut state = self.state();
        if !state.mounted {
            return Err(AuthError::Unmounted);
        }
        if state.loading {
            return Err(AuthError::Busy);
        }
        if state.phase != expected {
            return Err(AuthError::WrongPhase);
        }
        state.loading = true;
        state.error_state = ErrorState::None;
        Ok(state)
    }

    /// Re-acquires the attempt after a suspension. Fails when the view was
    /// torn down in the meantime.
    fn resume(&self) -> Result<MutexGuard<'_, AttemptState>, AuthError> {
        let mut state = self.state();
        if !state.mounted {
            warn!("discarding completion for an unmounted login view");
            return Err(AuthError::Unmounted);
        }
        state.loading = false;
        Ok(state)
    }

    #[instrument(skip_all)]
    pub async fn submit_identity(&self, raw: &str) -> Result<IdentityOutcome, AuthError> {
        let identity = sanitize_input(raw);
        {
            let mut state = self.begin(LoginPhase::AwaitingIdentity)?;
            state.identity.clone_from(&identity);
            if !self.policy.is_allowed(&identity) {
                state.loading = false;
                state.error_state = ErrorState::InvalidDomain;
                return Err(self.invalid_domain());
            }
        }

        let response = self.validator.validate(&identity).await;

        let mut state = self.resume()?;
        let code = match response {
            Ok(response) if response.is_success() => match response.dev_code {
                Some(code) if !code.is_empty() => Some((code, response.in_hr_team)),
                _ => {
                    warn!("identity validation succeeded without a code");
                    None
                }
            },
            Ok(response) => {
                info!(status = %response.status, "identity not recognized");
                None
            }
            Err(err) => {
                error!("Identity validation failed: {err}");
                None
            }
        };

        let Some((code, privileged)) = code else {
            state.error_state = ErrorState::IdentityNotFound;
            return Err(AuthError::IdentityNotFound);
        };

        state.issued_code = Some(SecretString::from(code));
        state.privileged = privileged;
        state.phase = LoginPhase::AwaitingCode;
        state.code_dispatched = true;
        info!(privileged, "one-time code dispatched");

        Ok(IdentityOutcome::CodeDispatched { privileged })
    }

    #[instrument(skip_all)]
    pub async fn submit_code(&self, raw: &str) -> Result<(), AuthError> {
        let submitted = raw.trim().to_string();
        self.begin(LoginPhase::AwaitingCode)?
            .submitted_code
            .clone_from(&submitted);

        // UX pacing only; the comparison below does not depend on it.
        sleep(self.code_check_delay).await;

        let mut state = self.resume()?;
        let matches = state
            .issued_code
            .as_ref()
            .is_some_and(|code| code.expose_secret() == submitted);
        if !matches {
            state.error_state = ErrorState::InvalidCode;
            return Err(AuthError::InvalidCode);
        }

        if let Err(err) = self.persist_session() {
            error!("Failed to store login status: {err}");
            state.error_state = ErrorState::InvalidCode;
            return Err(AuthError::InvalidCode);
        }

        state.phase = LoginPhase::Authenticated;
        state.issued_code = None;
        self.context.set_identity(&state.identity);
        self.context.set_notification_affordance(state.privileged);
        drop(state);

        info!("login confirmed");
        self.navigator.navigate(Route::Home, NavigateOptions::default());

        Ok(())
    }

    /// Writes the session flag and reads it back before anything navigates.
    fn persist_session(&self) -> Result<(), StorageError> {
        self.session.write(true)?;
        if self.session.read_checked()? {
            Ok(())
        } else {
            Err(StorageError::Unavailable(
                "session flag did not persist".to_string(),
            ))
        }
    }
}
