//! Storage backends for the save record
//!
//! A backend stores one JSON document. It knows nothing about the record's
//! shape; parsing and repair happen in `record`.

use thiserror::Error;

/// Failure talking to the storage medium
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage rejected the write: {0}")]
    Rejected(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode save: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence port: read, write and remove one JSON document
pub trait SaveBackend {
    /// `Ok(None)` when nothing has been saved yet
    fn read(&self) -> StorageResult<Option<String>>;
    fn write(&mut self, data: &str) -> StorageResult<()>;
    fn remove(&mut self) -> StorageResult<()>;
}

/// In-memory backend for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Option<String>,
    /// Reject every write (exercises the retry path)
    pub fail_writes: bool,
    /// Successful writes so far
    pub writes: u32,
    /// Write calls so far, failed ones included
    pub attempts: u32,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-filled with `data`
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl SaveBackend for MemoryBackend {
    fn read(&self) -> StorageResult<Option<String>> {
        Ok(self.data.clone())
    }

    fn write(&mut self, data: &str) -> StorageResult<()> {
        self.attempts += 1;
        if self.fail_writes {
            return Err(StorageError::Rejected("writes disabled".to_string()));
        }
        self.data = Some(data.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self) -> StorageResult<()> {
        self.data = None;
        Ok(())
    }
}

/// JSON file on disk (native only). Writes go to a temp file first and are
/// renamed over the save.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileBackend {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn tmp_path(&self) -> std::path::PathBuf {
        self.path.with_extension("tmp")
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SaveBackend for FileBackend {
    fn read(&self) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, data: &str) -> StorageResult<()> {
        let tmp = self.tmp_path();
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn remove(&mut self) -> StorageResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
