use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Fixed key the personal API credential is stored under
pub const CREDENTIAL_KEY: &str = "gemini_api_key";

/// Errors that can occur during credential persistence
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize credentials: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write credentials: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to read credential file: {0}")]
    ReadError(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Narrow read/write boundary for the single persisted credential
pub trait CredentialStore: Send {
    fn load(&self) -> PersistenceResult<Option<String>>;
    fn save(&mut self, credential: &str) -> PersistenceResult<()>;
    fn clear(&mut self) -> PersistenceResult<()>;
}

/// Stores the credential in a small JSON map on disk.
///
/// Other entries in the file are preserved.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> PersistenceResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let json = fs::read_to_string(&self.path)
            .map_err(|e| PersistenceError::ReadError(e.to_string()))?;
        if json.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&json)? {
            Value::Object(map) => Ok(map),
            _ => Err(PersistenceError::ReadError(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> PersistenceResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> PersistenceResult<Option<String>> {
        let map = self.read_map()?;
        Ok(map
            .get(CREDENTIAL_KEY)
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(str::to_owned))
    }

    fn save(&mut self, credential: &str) -> PersistenceResult<()> {
        let mut map = self.read_map()?;
        map.insert(CREDENTIAL_KEY.to_owned(), Value::String(credential.to_owned()));
        self.write_map(&map)?;
        log::info!("Credential saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&mut self) -> PersistenceResult<()> {
        let mut map = self.read_map()?;
        if map.remove(CREDENTIAL_KEY).is_some() {
            self.write_map(&map)?;
            log::info!("Credential removed from {}", self.path.display());
        }
        Ok(())
    }
}

/// In-memory store; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: &str) -> Self {
        let store = Self::default();
        store
            .entries
            .lock()
            .insert(CREDENTIAL_KEY.to_owned(), credential.to_owned());
        store
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> PersistenceResult<Option<String>> {
        Ok(self.get(CREDENTIAL_KEY))
    }

    fn save(&mut self, credential: &str) -> PersistenceResult<()> {
        self.entries
            .lock()
            .insert(CREDENTIAL_KEY.to_owned(), credential.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> PersistenceResult<()> {
        self.entries.lock().remove(CREDENTIAL_KEY);
        Ok(())
    }
}
