use crate::model::AttendanceDocument;
use anyhow::Context;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to serialize attendance document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("refusing to overwrite unreadable {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Owns the backing JSON file and the in-memory copy of its document.
///
/// Every save rewrites the whole file. The cache only changes after a write
/// has fully succeeded. Nothing serializes load/mutate/save sequences across
/// callers, so two concurrent writers can lose an update (last save wins).
pub struct DocumentStore {
    path: PathBuf,
    cache: Mutex<Option<AttendanceDocument>>,
}

impl DocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Creates the parent directory and performs the initial load, writing an
    /// empty document when the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let store = Self::new(path);
        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create data directory {}", parent.display())
            })?;
        }
        let doc = store.load();
        info!(
            path = %store.path.display(),
            students = doc.students.len(),
            buckets = doc.bucket_count(),
            "attendance document ready"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> AttendanceDocument {
        if let Some(doc) = self.cache().as_ref() {
            return doc.clone();
        }

        let doc = match std::fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<AttendanceDocument>(&raw) {
                Ok(doc) => {
                    *self.cache() = Some(doc.clone());
                    return doc;
                }
                Err(e) => {
                    warn!(
                        path = %self.path.display(),
                        error = %e,
                        raw = %raw,
                        "attendance file is not a valid document, replacing it with an empty one"
                    );
                    AttendanceDocument::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no attendance file, creating an empty document");
                AttendanceDocument::default()
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "failed to read attendance file");
                return AttendanceDocument::default();
            }
        };

        if let Err(e) = self.save(&doc) {
            error!(error = %e, "failed to write the empty attendance document");
        }
        doc
    }

    /// Persists `doc` and makes it the cached copy.
    ///
    /// Until the file has been read or written once, a file that exists but
    /// cannot be read is left alone and the save fails.
    pub fn save(&self, doc: &AttendanceDocument) -> Result<(), StoreError> {
        if self.cache().is_none() {
            if let Err(source) = std::fs::read(&self.path) {
                if source.kind() != std::io::ErrorKind::NotFound {
                    error!(
                        path = %self.path.display(),
                        error = %source,
                        "attendance file is unreadable, not saving"
                    );
                    return Err(StoreError::Unreadable {
                        path: self.path.clone(),
                        source,
                    });
                }
            }
        }

        let mut body = serde_json::to_string_pretty(doc)?;
        body.push('\n');

        let tmp = self.temp_path();
        if let Err(source) = write_then_rename(&tmp, &self.path, body.as_bytes()) {
            let _ = std::fs::remove_file(&tmp);
            error!(path = %self.path.display(), error = %source, "attendance save failed");
            return Err(StoreError::Write {
                path: self.path.clone(),
                source,
            });
        }

        *self.cache() = Some(doc.clone());
        Ok(())
    }

    fn cache(&self) -> MutexGuard<'_, Option<AttendanceDocument>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "attendance.json".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()))
    }
}

fn write_then_rename(tmp: &Path, dst: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut f = File::create(tmp)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    drop(f);
    std::fs::rename(tmp, dst)
}
