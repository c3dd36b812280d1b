use crate::teamgate::errors::ErrorState;
use secrecy::SecretString;

pub const CODE_SENT_NOTICE: &str = "OTP sent to your email. Please check your inbox.";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginPhase {
    #[default]
    AwaitingIdentity,
    AwaitingCode,
    /// Terminal for the controller: the session flag was written and confirmed.
    Authenticated,
}

/// Render-ready view of the current login attempt. The issued code is never
/// part of it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginAttempt {
    pub identity: String,
    pub phase: LoginPhase,
    pub submitted_code: String,
    pub error_state: ErrorState,
    pub code_dispatched: bool,
    pub has_issued_code: bool,
    pub loading: bool,
}

/// Mutable attempt state owned by the controller.
#[derive(Default)]
pub(super) struct AttemptState {
    pub(super) identity: String,
    pub(super) phase: LoginPhase,
    pub(super) issued_code: Option<SecretString>,
    pub(super) submitted_code: String,
    pub(super) error_state: ErrorState,
    pub(super) code_dispatched: bool,
    pub(super) privileged: bool,
    pub(super) loading: bool,
    pub(super) mounted: bool,
}

impl AttemptState {
    pub(super) fn fresh() -> Self {
        Self {
            mounted: true,
            ..Self::default()
        }
    }

    pub(super) fn view(&self) -> LoginAttempt {
        LoginAttempt {
            identity: self.identity.clone(),
            phase: self.phase,
            submitted_code: self.submitted_code.clone(),
            error_state: self.error_state,
            code_dispatched: self.code_dispatched,
            has_issued_code: self.issued_code.is_some(),
            loading: self.loading,
        }
    }
}
