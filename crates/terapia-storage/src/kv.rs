use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;

/// A write to one slot: `Some(value)` stores, `None` removes.
pub type SlotWrite<'a> = (&'a str, Option<&'a str>);

/// Named string slots persisted outside process memory.
///
/// `write_batch` is all-or-nothing so related slots (token and profile) are
/// never left partially written.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write_batch(&self, writes: &[SlotWrite<'_>]) -> Result<(), StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write_batch(&[(key, Some(value))])
    }
}

fn apply(slots: &mut BTreeMap<String, String>, writes: &[SlotWrite<'_>]) {
    for (key, value) in writes {
        match value {
            Some(v) => {
                slots.insert((*key).to_string(), (*v).to_string());
            }
            None => {
                slots.remove(*key);
            }
        }
    }
}

/// In-process store. Nothing survives a restart; used by tests and by
/// `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<BTreeMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn write_batch(&self, writes: &[SlotWrite<'_>]) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        apply(&mut slots, writes);
        Ok(())
    }
}

/// All slots in one JSON object on disk.
///
/// Every batch rewrites the whole file through a temp file and a rename, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, reading existing slots if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let slots = if path.exists() {
            let contents = std::fs::read(&path).map_err(|e| io_err(&path, e))?;
            if contents.iter().all(u8::is_ascii_whitespace) {
                BTreeMap::new()
            } else {
                serde_json::from_slice(&contents).map_err(|e| {
                    StorageError::Corrupt(format!("{}: {e}", path.display()))
                })?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), slots = slots.len(), "opened slot store");
        Ok(Self {
            path,
            slots: Mutex::new(slots),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, slots: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }

        let json = serde_json::to_vec_pretty(slots)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json).map_err(|e| io_err(&tmp_path, e))?;

        // Slots hold a bearer token; keep the file private on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| io_err(&tmp_path, e))?;
        }

        std::fs::rename(&tmp_path, &self.path).map_err(|e| io_err(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "slot store flushed");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn write_batch(&self, writes: &[SlotWrite<'_>]) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().map_err(|_| StorageError::Poisoned)?;
        let mut next = slots.clone();
        apply(&mut next, writes);
        self.flush(&next)?;
        *slots = next;
        Ok(())
    }
}

fn io_err(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
