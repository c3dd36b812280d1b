use crate::teamgate::navigation::Route;

pub mod login;
pub mod logout;
pub mod status;
pub mod watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Login { email: Option<String> },
    Logout,
    Status,
    Watch { route: Route },
}
