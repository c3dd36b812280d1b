use crate::cli::globals::DEFAULT_STORAGE_DIR;
use crate::teamgate::navigation::Route;
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn validator_route() -> ValueParser {
    ValueParser::from(move |path: &str| -> std::result::Result<String, String> {
        Route::from_path(path)
            .map(|route| route.path().to_string())
            .ok_or_else(|| "route must be / or /home".to_string())
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("teamgate")
        .about("Team dashboard login")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Team dashboard API base URL, example: https://api.tld")
                .env("TEAMGATE_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("storage-dir")
                .long("storage-dir")
                .help("Directory holding the shared session flag")
                .env("TEAMGATE_STORAGE_DIR")
                .default_value(DEFAULT_STORAGE_DIR)
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("TEAMGATE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Log in with your company email and a one-time code")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Company email, prompted for when missing"),
                ),
        )
        .subcommand(Command::new("logout").about("Clear the shared session"))
        .subcommand(Command::new("status").about("Show whether the session is active"))
        .subcommand(
            Command::new("watch")
                .about("Open a dashboard context and follow its guard redirects")
                .arg(
                    Arg::new("route")
                        .short('r')
                        .long("route")
                        .help("Route to open: / or /home")
                        .default_value("/home")
                        .value_parser(validator_route()),
                ),
        )
}
