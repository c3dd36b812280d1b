use crate::cli::globals::GlobalArgs;
use crate::teamgate::storage::SessionStore;
use anyhow::Result;
use std::sync::Arc;

/// Handle the status action
pub fn handle(globals: &GlobalArgs) -> Result<bool> {
    let config = globals.auth_config();
    let session = SessionStore::new(Arc::new(globals.origin()?.context()), config.session_key());

    let authenticated = session.read();
    if authenticated {
        println!("Logged in");
    } else {
        println!("Logged out");
    }

    Ok(authenticated)
}
