use anyhow::Result;
use teamgate::cli::{actions, actions::Action, start, telemetry};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action
    let result = match action {
        Action::Login { email } => actions::login::handle(email, &globals).await,
        Action::Logout => actions::logout::handle(&globals).await,
        Action::Status => actions::status::handle(&globals).map(|_| ()),
        Action::Watch { route } => actions::watch::handle(route, &globals).await,
    };

    telemetry::shutdown_tracer();

    result
}
