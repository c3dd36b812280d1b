use crate::teamgate::{config::AuthConfig, errors::StorageError, storage::FileOrigin};
use std::path::PathBuf;

pub const DEFAULT_STORAGE_DIR: &str = ".teamgate";

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub api_url: Option<String>,
    pub storage_dir: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(storage_dir: PathBuf) -> Self {
        Self {
            api_url: None,
            storage_dir,
        }
    }

    pub fn set_api_url(&mut self, api_url: String) {
        self.api_url = Some(api_url);
    }

    /// Handshake configuration; the API base stays empty when no URL was
    /// given, which only commands that never reach the server accept.
    #[must_use]
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.api_url.as_deref().unwrap_or_default())
    }

    /// The origin shared by every command run against the same directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be created.
    pub fn origin(&self) -> Result<FileOrigin, StorageError> {
        FileOrigin::open(self.storage_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let mut args = GlobalArgs::new(PathBuf::from(DEFAULT_STORAGE_DIR));
        assert_eq!(args.storage_dir, PathBuf::from(".teamgate"));
        assert_eq!(args.auth_config().api_base_url(), "");

        args.set_api_url("https://api.example.test/".to_string());
        assert_eq!(args.auth_config().api_base_url(), "https://api.example.test");
    }

    #[test]
    fn test_origin_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let args = GlobalArgs::new(dir.path().join("origin"));
        let origin = args.origin().unwrap();
        assert!(origin.dir().is_dir());
    }
}
