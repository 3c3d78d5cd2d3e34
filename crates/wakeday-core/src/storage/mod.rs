//! Best-effort persistence behind the `Store` seam.
//!
//! The tracker never blocks on storage: loads degrade to an empty document,
//! saves report success as a boolean, and the controller logs a failure and
//! keeps going with in-memory state.

pub mod document;

pub use document::{DocumentState, Settings};

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StorageError;

/// Persistence collaborator.
pub trait Store {
    /// Load the document, degrading to an empty default on any failure.
    fn load(&self) -> DocumentState;
    /// Persist the document. Must not panic; a false return means the write
    /// was lost and the caller decides whether to surface that.
    fn save(&self, doc: &DocumentState) -> bool;
}

impl<T: Store + ?Sized> Store for &T {
    fn load(&self) -> DocumentState {
        (**self).load()
    }

    fn save(&self, doc: &DocumentState) -> bool {
        (**self).save(doc)
    }
}

/// JSON document in a single file under the data directory.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `<data_dir>/document.json`.
    pub fn open_default() -> crate::error::Result<Self> {
        Ok(Self::at(crate::config::data_dir()?.join("document.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Strict load for hosts that want to distinguish a corrupt file from
    /// an absent one at startup.
    pub fn try_load(&self) -> Result<DocumentState, StorageError> {
        if !self.path.exists() {
            return Ok(DocumentState::default());
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| StorageError::ReadFailed {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Strict save. Writes to a sibling temp file first so a failed write
    /// never truncates the previous document.
    pub fn try_save(&self, doc: &DocumentState) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(doc).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StorageError::WriteFailed {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StorageError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> DocumentState {
        match self.try_load() {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "failed to load document; starting empty");
                DocumentState::default()
            }
        }
    }

    fn save(&self, doc: &DocumentState) -> bool {
        match self.try_save(doc) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "failed to save document");
                false
            }
        }
    }
}

/// Local store with an optional remote mirror.
///
/// Loads arbitrate later-write-wins on `updated_at`; a strictly newer
/// remote copy replaces the local one and is written back. Saves go local
/// first, then best-effort to the mirror; a mirror failure is logged and
/// never surfaces.
pub struct MirroredStore<L, R> {
    local: L,
    remote: Option<R>,
}

impl<L: Store, R: Store> MirroredStore<L, R> {
    pub fn new(local: L) -> Self {
        Self {
            local,
            remote: None,
        }
    }

    pub fn with_remote(local: L, remote: R) -> Self {
        Self {
            local,
            remote: Some(remote),
        }
    }
}

impl<L: Store, R: Store> Store for MirroredStore<L, R> {
    fn load(&self) -> DocumentState {
        let local = self.local.load();
        let Some(remote_store) = &self.remote else {
            return local;
        };
        let local_at = local.updated_at;
        let merged = DocumentState::merge_newer(local, remote_store.load());
        if merged.updated_at != local_at && !self.local.save(&merged) {
            warn!("failed to mirror the newer remote document locally");
        }
        merged
    }

    fn save(&self, doc: &DocumentState) -> bool {
        let ok = self.local.save(doc);
        if let Some(remote) = &self.remote {
            if !remote.save(doc) {
                debug!("remote mirror write failed; document saved locally only");
            }
        }
        ok
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    doc: RefCell<Option<DocumentState>>,
    fail_saves: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(doc: DocumentState) -> Self {
        Self {
            doc: RefCell::new(Some(doc)),
            fail_saves: Cell::new(false),
        }
    }

    /// Make subsequent saves report failure, for degradation-path tests.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// The last successfully saved document, if any.
    pub fn snapshot(&self) -> Option<DocumentState> {
        self.doc.borrow().clone()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> DocumentState {
        self.doc.borrow().clone().unwrap_or_default()
    }

    fn save(&self, doc: &DocumentState) -> bool {
        if self.fail_saves.get() {
            return false;
        }
        *self.doc.borrow_mut() = Some(doc.clone());
        true
    }
}
