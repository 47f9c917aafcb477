//! Blob stores: in-memory, file (native) and LocalStorage (wasm)

use super::{BlobStore, PersistError};

/// Process-local store, used by tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blob: Option<Vec<u8>>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a previously saved blob
    pub fn with_blob(blob: Vec<u8>) -> Self {
        Self {
            blob: Some(blob),
            ..Self::default()
        }
    }

    /// A store whose writes always fail
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// A store whose reads always fail
    pub fn unreadable() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }
}

impl BlobStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        if self.fail_reads {
            return Err(PersistError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.blob.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), PersistError> {
        if self.fail_writes {
            return Err(PersistError::Unavailable("writes disabled".to_string()));
        }
        self.blob = Some(bytes.to_vec());
        Ok(())
    }
}

/// Single-file store. Writes go to a sibling temp file first, then rename.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl BlobStore for FileStore {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Browser LocalStorage under a fixed key
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub const DEFAULT_KEY: &'static str = "pathways_progress";

    pub fn new() -> Self {
        Self::with_key(Self::DEFAULT_KEY)
    }

    pub fn with_key(key: &str) -> Self {
        Self { key: key.to_string() }
    }

    fn storage() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| PersistError::Unavailable("localStorage not available".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl BlobStore for LocalStorageStore {
    fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        let storage = Self::storage()?;
        let item = storage
            .get_item(&self.key)
            .map_err(|e| PersistError::Unavailable(format!("{e:?}")))?;
        Ok(item.map(String::into_bytes))
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), PersistError> {
        let storage = Self::storage()?;
        let json = std::str::from_utf8(bytes)
            .map_err(|e| PersistError::Unavailable(format!("blob is not UTF-8: {e}")))?;
        storage
            .set_item(&self.key, json)
            .map_err(|e| PersistError::Unavailable(format!("{e:?}")))
    }
}
