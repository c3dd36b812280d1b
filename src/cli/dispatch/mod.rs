use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::teamgate::navigation::Route;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let storage_dir = matches
        .get_one::<String>("storage-dir")
        .map(PathBuf::from)
        .context("missing required argument: --storage-dir")?;

    let mut globals = GlobalArgs::new(storage_dir);
    if let Some(api_url) = matches.get_one::<String>("api-url") {
        globals.set_api_url(api_url.to_string());
    }

    let action = match matches.subcommand() {
        Some(("login", sub_m)) => {
            if globals.api_url.is_none() {
                return Err(anyhow!("missing required argument: --api-url"));
            }
            Action::Login {
                email: sub_m.get_one::<String>("email").map(ToString::to_string),
            }
        }
        Some(("logout", _)) => Action::Logout,
        Some(("status", _)) => Action::Status,
        Some(("watch", sub_m)) => {
            let path = sub_m
                .get_one::<String>("route")
                .context("missing required argument: --route")?;
            Action::Watch {
                route: Route::from_path(path)
                    .ok_or_else(|| anyhow!("unknown route: {path}"))?,
            }
        }
        _ => return Err(anyhow!("unknown subcommand")),
    };

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn test_handler_login() {
        temp_env::with_vars(
            [
                ("TEAMGATE_API_URL", None::<&str>),
                ("TEAMGATE_STORAGE_DIR", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "teamgate",
                    "--api-url",
                    "https://api.tld",
                    "--storage-dir",
                    "/tmp/tg",
                    "login",
                    "-e",
                    "a@socialbeat.in",
                ]);
                let (action, globals) = handler(&matches).unwrap();
                assert_eq!(
                    action,
                    Action::Login {
                        email: Some("a@socialbeat.in".to_string())
                    }
                );
                assert_eq!(globals.storage_dir, PathBuf::from("/tmp/tg"));
                assert_eq!(globals.api_url.as_deref(), Some("https://api.tld"));
            },
        );
    }

    #[test]
    fn test_handler_login_requires_api_url() {
        temp_env::with_vars([("TEAMGATE_API_URL", None::<&str>)], || {
            let matches = commands::new().get_matches_from(vec!["teamgate", "login"]);
            assert!(handler(&matches).is_err());
        });
    }

    #[test]
    fn test_handler_watch() {
        let matches = commands::new().get_matches_from(vec!["teamgate", "watch"]);
        let (action, _) = handler(&matches).unwrap();
        assert_eq!(action, Action::Watch { route: Route::Home });

        let matches = commands::new().get_matches_from(vec!["teamgate", "logout"]);
        assert_eq!(handler(&matches).unwrap().0, Action::Logout);
    }
}
