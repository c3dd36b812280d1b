//! Session-authentication core of the team dashboard. A login view runs the
//! two-step handshake (company email, then a one-time code), the result is a
//! single persisted flag shared by every browsing context of the origin, and
//! guards keep each context's views consistent with that flag.
//!
//! Flow Overview: `HandshakeController` validates the identity, calls the
//! remote validation endpoint and, once the code matches, writes the session
//! flag and populates `AppContext`. `SessionGuard` observes the flag (change
//! notifications plus polling) and redirects. `LogoutAction` clears the flag,
//! resets the context and sends the context back to the login view.

pub mod app;
pub mod client;
pub mod config;
pub mod context;
pub mod errors;
pub mod guard;
pub mod handshake;
pub mod identity;
pub mod logout;
pub mod navigation;
pub mod storage;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
