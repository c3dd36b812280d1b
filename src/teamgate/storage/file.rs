//! Directory-backed origin: one file per key. Every process pointed at the
//! same directory shares the session flag. Notifications only reach contexts
//! opened from the same `FileOrigin` value; anything else is picked up by the
//! guards' polling.

use super::{ContextId, Storage, StorageEvent};
use crate::teamgate::errors::StorageError;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::broadcast;
use tracing::debug;
use ulid::Ulid;

const EVENT_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct FileOrigin {
    dir: Arc<PathBuf>,
    events: broadcast::Sender<StorageEvent>,
}

impl FileOrigin {
    /// Opens (and creates when missing) the origin directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!("file origin at {}", dir.display());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            dir: Arc::new(dir),
            events,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn context(&self) -> FileStorage {
        FileStorage {
            origin: self.clone(),
            context_id: ContextId::new(),
        }
    }
}

pub struct FileStorage {
    origin: FileOrigin,
    context_id: ContextId,
}

impl FileStorage {
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            || key.starts_with('.')
        {
            return Err(StorageError::Unavailable(format!(
                "invalid storage key: {key:?}"
            )));
        }
        Ok(self.origin.dir.join(key))
    }

    fn emit(&self, key: &str, new_value: Option<String>) {
        let _ = self.origin.events.send(StorageEvent {
            key: key.to_string(),
            new_value,
            source: self.context_id,
        });
    }
}

impl Storage for FileStorage {
    fn context_id(&self) -> ContextId {
        self.context_id
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Write then rename so readers never observe a partial value.
        let staging = self.origin.dir.join(format!(".{key}.{}", Ulid::new()));
        fs::write(&staging, value)?;
        if let Err(err) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        self.emit(key, Some(value.to_string()));
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => {
                self.emit(key, None);
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.origin.events.subscribe()
    }
}
