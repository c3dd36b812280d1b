pub mod cli;
pub mod teamgate;

pub use teamgate::{
    app::Tab,
    config::AuthConfig,
    context::{AppContext, MemberRecordRef},
    errors::{AuthError, ErrorState, StorageError},
    guard::{GuardHandle, GuardKind, SessionGuard},
    handshake::{HandshakeController, IdentityOutcome, LoginAttempt, LoginPhase},
    logout::LogoutAction,
    navigation::{History, Route},
    storage::SessionStore,
};
