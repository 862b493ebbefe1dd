use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ---- Storage Keys ----

/// Keys in the key-value medium. All values are strings; boolean flags are
/// compared against their literal string form on read.
pub mod keys {
    /// Serialized `StoreData` JSON.
    pub const DATA: &str = "memoAppData";
    pub const ACTIVE_FOLDER: &str = "memoAppActiveFolderId";
    pub const ACTIVE_NOTE: &str = "memoAppActiveNoteId";
    /// `"true"` when the gallery list mode is on.
    pub const GALLERY_VIEW: &str = "memoAppGalleryView";
    /// `"enabled"` or `"disabled"`.
    pub const DARK_MODE: &str = "darkMode";
}

// ---- Storage Trait ----

/// String-valued key-value persistence, the shape of browser local storage.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ---- In-Memory Storage ----

/// Shared in-process map. Cloned handles see the same entries, which lets a
/// test hand the storage to a store and still inspect it afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("storage mutex").get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("storage mutex")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.lock().expect("storage mutex").remove(key);
        Ok(())
    }
}

// ---- File-Backed Storage ----

/// One JSON file holding the whole key-value map, written through on every
/// mutation. The map is small (a handful of keys) so rewriting it wholesale
/// is fine.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStorage {
    /// Open (or create) the storage file at `path`. A missing file starts
    /// empty; a malformed file is treated the same way rather than blocking
    /// startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create storage dir for '{}'", path.display()))?;
        }

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read storage file '{}'", path.display()))?;
            match serde_json::from_str(&content) {
                Ok(map) => map,
                Err(e) => {
                    eprintln!(
                        "Warning: storage file '{}' is malformed, starting fresh: {}",
                        path.display(),
                        e
                    );
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write storage file '{}'", self.path.display()))?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ---- Tests ----
