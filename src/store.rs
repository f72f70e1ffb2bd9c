//! Key-value blob storage for snapshots.

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Where snapshots live. The engine treats the payload as opaque bytes.
pub trait SnapshotStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;

    fn save(&self, snapshot: &[u8]) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).load()
    }

    fn save(&self, snapshot: &[u8]) -> Result<(), StoreError> {
        (**self).save(snapshot)
    }
}

/// Snapshot kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling file then renames it over the snapshot, so a
    /// failed write leaves the previous snapshot intact.
    fn save(&self, snapshot: &[u8]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let staging = self.staging_path();
        fs::write(&staging, snapshot)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// In-process store, for embedding hosts that persist elsewhere and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: RefCell<Option<Vec<u8>>>,
    saves: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: RefCell::new(Some(snapshot.into())),
            saves: RefCell::new(0),
        }
    }

    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.blob.borrow().clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blob.borrow().clone())
    }

    fn save(&self, snapshot: &[u8]) -> Result<(), StoreError> {
        *self.blob.borrow_mut() = Some(snapshot.to_vec());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}
