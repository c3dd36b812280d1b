//! Two-phase login handshake: identity submission, then one-time code
//! verification against the code returned by the identity step.
//!
//! `AwaitingIdentity --(allowed domain, server success)--> AwaitingCode
//! --(code match, session write confirmed)--> Authenticated`. Every failure
//! loops back to the same phase with an error annotation; retries are
//! unbounded.

mod attempt;
mod controller;

pub use attempt::{LoginAttempt, LoginPhase, CODE_SENT_NOTICE};
pub use controller::{HandshakeController, IdentityOutcome, Unmount};
