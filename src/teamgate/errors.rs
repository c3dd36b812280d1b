use thiserror::Error;

/// Failures of the origin storage backing the session flag.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the handshake, logout and guard flows. The `Display`
/// output is the inline text shown to the operator, so it must never carry
/// transport or storage detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Only {allowed} email ID will be valid to login")]
    InvalidDomain { allowed: String },
    #[error("User does not exist")]
    IdentityNotFound,
    #[error("Invalid OTP. Please try again.")]
    InvalidCode,
    #[error("{0}")]
    TransientWriteFailure(String),
    #[error("A request is already in progress")]
    Busy,
    #[error("Action not available at this step")]
    WrongPhase,
    #[error("View is no longer mounted")]
    Unmounted,
}

impl AuthError {
    pub(crate) fn logout_failed() -> Self {
        Self::TransientWriteFailure("Failed to logout. Please try again.".to_string())
    }
}

/// Inline error annotation carried by a login attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorState {
    #[default]
    None,
    InvalidDomain,
    IdentityNotFound,
    InvalidCode,
}

impl ErrorState {
    #[must_use]
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_do_not_leak_detail() {
        assert_eq!(AuthError::IdentityNotFound.to_string(), "User does not exist");
        assert_eq!(
            AuthError::InvalidCode.to_string(),
            "Invalid OTP. Please try again."
        );
        assert_eq!(
            AuthError::logout_failed().to_string(),
            "Failed to logout. Please try again."
        );
        assert_eq!(
            AuthError::InvalidDomain {
                allowed: "@socialbeat.in or @influencer.in".to_string()
            }
            .to_string(),
            "Only @socialbeat.in or @influencer.in email ID will be valid to login"
        );
    }

    #[test]
    fn error_state_defaults_to_none() {
        assert!(ErrorState::default().is_none());
        assert!(!ErrorState::InvalidCode.is_none());
    }
}
