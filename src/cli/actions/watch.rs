use crate::cli::globals::GlobalArgs;
use crate::teamgate::{
    app::Tab,
    navigation::{Navigator, Route},
};
use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, instrument};

/// Handle the watch action: keeps a context open at `route` and reports
/// every redirect its guards make until interrupted.
#[instrument(skip(globals))]
pub async fn handle(route: Route, globals: &GlobalArgs) -> Result<()> {
    let origin = globals.origin()?;
    let tab = Tab::open(Arc::new(origin.context()), globals.auth_config(), route);
    let mut locations = tab.history().subscribe();

    println!("{}", locations.borrow_and_update().route);

    loop {
        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("interrupted, closing context {}", tab.context_id());
                break;
            }
            changed = locations.changed() => {
                if changed.is_err() {
                    break;
                }
                let location = *locations.borrow_and_update();
                info!(seq = location.seq, "route changed to {}", location.route);
                println!("{}", location.route);
            }
        }
    }

    tab.close();
    Ok(())
}
