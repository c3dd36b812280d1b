use crate::cli::globals::GlobalArgs;
use crate::teamgate::{
    app::Tab, client::HttpIdentityValidator, errors::AuthError, navigation::Route,
};
use anyhow::{anyhow, Result};
use std::{io::Write, sync::Arc, time::Duration};
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, instrument};

/// How long the login route may take to hand over to `/home`.
const HANDOVER_LIMIT: Duration = Duration::from_secs(5);

type Input = Lines<BufReader<Stdin>>;

async fn prompt(lines: &mut Input, label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    lines
        .next_line()
        .await?
        .ok_or_else(|| anyhow!("input closed before the login finished"))
}

/// Handle the login action
#[instrument(skip(globals))]
pub async fn handle(email: Option<String>, globals: &GlobalArgs) -> Result<()> {
    let config = globals.auth_config();
    let validator = Arc::new(HttpIdentityValidator::new(&config)?);
    let origin = globals.origin()?;
    let tab = Tab::open(Arc::new(origin.context()), config, Route::Login);

    if tab.route() != Route::Login {
        println!("Already logged in");
        return Ok(());
    }

    let controller = tab.login_view(validator)?;
    let mut lines = BufReader::new(stdin()).lines();
    let mut email = email;

    loop {
        let identity = match email.take() {
            Some(identity) => identity,
            None => prompt(&mut lines, "Enter your company email: ").await?,
        };
        match controller.submit_identity(&identity).await {
            Ok(outcome) => {
                debug!(?outcome, "identity accepted");
                break;
            }
            Err(err @ (AuthError::InvalidDomain { .. } | AuthError::IdentityNotFound)) => {
                eprintln!("{err}");
            }
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(notice) = controller.message() {
        println!("{notice}");
    }

    loop {
        let code = prompt(&mut lines, "Please enter your OTP: ").await?;
        match controller.submit_code(&code).await {
            Ok(()) => break,
            Err(AuthError::InvalidCode) => eprintln!("{}", AuthError::InvalidCode),
            Err(err) => return Err(err.into()),
        }
    }

    tab.wait_for_route(Route::Home, HANDOVER_LIMIT).await?;

    match tab.context().identity() {
        Some(identity) => println!("Logged in as {identity}"),
        None => println!("Logged in"),
    }
    if tab.context().notification_affordance() {
        println!("Notifications are available for this account");
    }

    tab.close();
    Ok(())
}
