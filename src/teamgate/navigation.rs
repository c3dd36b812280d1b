//! Logical routes and per-context navigation history.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tokio::sync::watch;
use tracing::debug;

pub mod paths {
    pub const LOGIN: &str = "/";
    pub const HOME: &str = "/home";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Public entry view.
    Login,
    /// Protected main view.
    Home,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => paths::LOGIN,
            Self::Home => paths::HOME,
        }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim() {
            paths::LOGIN | "" => Some(Self::Login),
            paths::HOME | "/home/" => Some(Self::Home),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.path())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current entry instead of pushing a new one, so "back"
    /// cannot return to it.
    pub replace: bool,
}

impl NavigateOptions {
    #[must_use]
    pub fn replace() -> Self {
        Self { replace: true }
    }
}

/// Current navigation target. `seq` changes on every navigation, including
/// navigations to the route already shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub route: Route,
    pub seq: u64,
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route, options: NavigateOptions);
    fn current(&self) -> Route;
    fn subscribe(&self) -> watch::Receiver<Location>;
}

struct Entries {
    stack: Vec<Route>,
    seq: u64,
}

/// In-memory history stack of one browsing context.
pub struct History {
    entries: Mutex<Entries>,
    location: watch::Sender<Location>,
}

impl History {
    #[must_use]
    pub fn new(initial: Route) -> Self {
        let (location, _) = watch::channel(Location {
            route: initial,
            seq: 0,
        });
        Self {
            entries: Mutex::new(Entries {
                stack: vec![initial],
                seq: 0,
            }),
            location,
        }
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Goes back one entry; `None` when already at the first entry.
    pub fn back(&self) -> Option<Route> {
        let mut entries = self.entries();
        if entries.stack.len() < 2 {
            return None;
        }
        entries.stack.pop();
        let route = *entries.stack.last()?;
        entries.seq += 1;
        self.location.send_replace(Location {
            route,
            seq: entries.seq,
        });
        Some(route)
    }

    #[must_use]
    pub fn stack(&self) -> Vec<Route> {
        self.entries().stack.clone()
    }
}

impl Navigator for History {
    fn navigate(&self, route: Route, options: NavigateOptions) {
        let mut entries = self.entries();
        if options.replace {
            entries.stack.pop();
        }
        entries.stack.push(route);
        entries.seq += 1;
        debug!(replace = options.replace, "navigating to {route}");
        self.location.send_replace(Location {
            route,
            seq: entries.seq,
        });
    }

    fn current(&self) -> Route {
        self.location.borrow().route
    }

    fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }
}
