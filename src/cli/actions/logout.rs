use crate::cli::globals::GlobalArgs;
use crate::teamgate::{app::Tab, navigation::Route};
use anyhow::Result;
use std::sync::Arc;
use tracing::instrument;

/// Handle the logout action
#[instrument(skip(globals))]
pub async fn handle(globals: &GlobalArgs) -> Result<()> {
    let origin = globals.origin()?;
    let tab = Tab::open(Arc::new(origin.context()), globals.auth_config(), Route::Home);

    let notice = tab.logout_action().run().await?;
    println!("{notice}");

    tab.close();
    Ok(())
}
