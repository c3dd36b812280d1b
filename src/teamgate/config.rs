//! Runtime configuration for the handshake, guards and logout. Values are
//! public; nothing secret belongs here.

use std::time::Duration;

const DEFAULT_ALLOWED_DOMAINS: [&str; 2] = ["socialbeat.in", "influencer.in"];
const DEFAULT_SESSION_KEY: &str = "isLoggedIn";
const DEFAULT_CODE_CHECK_DELAY_MS: u64 = 500;
const DEFAULT_LOGOUT_DELAY_MS: u64 = 500;
const DEFAULT_PROTECTED_POLL_MS: u64 = 500;
const DEFAULT_PUBLIC_POLL_MS: u64 = 100;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    api_base_url: String,
    allowed_domains: Vec<String>,
    session_key: String,
    code_check_delay: Duration,
    logout_delay: Duration,
    protected_poll_interval: Duration,
    public_poll_interval: Duration,
    request_timeout: Duration,
}

impl AuthConfig {
    #[must_use]
    pub fn new(api_base_url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url),
            allowed_domains: DEFAULT_ALLOWED_DOMAINS
                .iter()
                .map(ToString::to_string)
                .collect(),
            session_key: DEFAULT_SESSION_KEY.to_string(),
            code_check_delay: Duration::from_millis(DEFAULT_CODE_CHECK_DELAY_MS),
            logout_delay: Duration::from_millis(DEFAULT_LOGOUT_DELAY_MS),
            protected_poll_interval: Duration::from_millis(DEFAULT_PROTECTED_POLL_MS),
            public_poll_interval: Duration::from_millis(DEFAULT_PUBLIC_POLL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        }
    }

    #[must_use]
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = domains
            .iter()
            .filter_map(|domain| normalize_value(domain))
            .collect();
        self
    }

    #[must_use]
    pub fn with_session_key(mut self, key: &str) -> Self {
        if let Some(key) = normalize_value(key) {
            self.session_key = key;
        }
        self
    }

    #[must_use]
    pub fn with_code_check_delay(mut self, delay: Duration) -> Self {
        self.code_check_delay = delay;
        self
    }

    #[must_use]
    pub fn with_logout_delay(mut self, delay: Duration) -> Self {
        self.logout_delay = delay;
        self
    }

    #[must_use]
    pub fn with_poll_intervals(mut self, protected: Duration, public: Duration) -> Self {
        self.protected_poll_interval = protected;
        self.public_poll_interval = public;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    #[must_use]
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    #[must_use]
    pub fn code_check_delay(&self) -> Duration {
        self.code_check_delay
    }

    #[must_use]
    pub fn logout_delay(&self) -> Duration {
        self.logout_delay
    }

    #[must_use]
    pub fn protected_poll_interval(&self) -> Duration {
        self.protected_poll_interval
    }

    #[must_use]
    pub fn public_poll_interval(&self) -> Duration {
        self.public_poll_interval
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn normalize_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}

/// Trims a configuration value and rejects it when empty.
pub(crate) fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_timings() {
        let config = AuthConfig::new("https://api.example.test/");
        assert_eq!(config.api_base_url(), "https://api.example.test");
        assert_eq!(config.allowed_domains(), ["socialbeat.in", "influencer.in"]);
        assert_eq!(config.session_key(), "isLoggedIn");
        assert_eq!(config.code_check_delay(), Duration::from_millis(500));
        assert_eq!(config.logout_delay(), Duration::from_millis(500));
        assert!(config.protected_poll_interval() > config.public_poll_interval());
    }

    #[test]
    fn normalize_value_trims_and_rejects_empty() {
        assert_eq!(normalize_value(""), None);
        assert_eq!(normalize_value("   "), None);
        assert_eq!(normalize_value(" key "), Some("key".to_string()));
    }

    #[test]
    fn empty_overrides_are_ignored() {
        let config = AuthConfig::new("http://localhost")
            .with_session_key("  ")
            .with_allowed_domains(vec![" example.test ".to_string(), String::new()]);
        assert_eq!(config.session_key(), "isLoggedIn");
        assert_eq!(config.allowed_domains(), ["example.test"]);
    }
}
