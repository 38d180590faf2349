//! Temp files - Deferred deletion of provider scratch files
//!
//! Providers write their output (synthesized audio, converted recordings) to
//! scratch files. Instead of deleting those files as soon as a request is
//! served, callers mark them for deletion. A file marked reusable may be
//! handed out again for an equivalent request; a sweep deletes every pending
//! file that was not reused since the previous sweep.
//!
//! Deletion is best-effort: failures are logged and never returned.

mod sweeper;

pub use sweeper::{spawn_sweeper, SweeperConfig};

use serde::Serialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct PendingFile {
    reusable: bool,
    content_key: Option<String>,
    reused: bool,
}

#[derive(Debug, Default)]
struct Pending {
    files: HashMap<PathBuf, PendingFile>,
    by_content: HashMap<String, PathBuf>,
}

impl Pending {
    fn insert(&mut self, path: PathBuf, file: PendingFile) {
        if let Some(previous) = self.files.insert(path.clone(), file.clone()) {
            self.unlink_content(&path, previous.content_key.as_deref());
        }
        if let Some(key) = file.content_key {
            if let Some(displaced) = self.by_content.insert(key, path) {
                // The key now points at the newer file; the old one is a plain pending file
                if let Some(old) = self.files.get_mut(&displaced) {
                    old.content_key = None;
                }
            }
        }
    }

    fn remove(&mut self, path: &Path) -> Option<PendingFile> {
        let file = self.files.remove(path)?;
        self.unlink_content(path, file.content_key.as_deref());
        Some(file)
    }

    fn unlink_content(&mut self, path: &Path, key: Option<&str>) {
        if let Some(key) = key {
            if self.by_content.get(key).is_some_and(|p| p == path) {
                self.by_content.remove(key);
            }
        }
    }
}

/// Outcome of a sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Files removed from disk
    pub deleted: usize,
    /// Files already gone when the sweep reached them
    pub missing: usize,
    /// Reused files kept for another cycle
    pub retained: usize,
    /// Files that could not be removed; they stay pending
    pub failed: usize,
}

/// Registry of scratch files awaiting deletion
#[derive(Debug, Clone)]
pub struct TempFileRegistry {
    scratch_dir: PathBuf,
    pending: Arc<Mutex<Pending>>,
}

impl TempFileRegistry {
    /// Create a registry whose scratch paths live under `scratch_dir`
    #[must_use]
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    /// Directory scratch paths are allocated in
    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Create the scratch directory if needed
    pub async fn ensure_scratch_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.scratch_dir).await
    }

    /// A fresh, unused path in the scratch directory
    #[must_use]
    pub fn scratch_path(&self, extension: &str) -> PathBuf {
        let name = Uuid::new_v4().to_string();
        let mut path = self.scratch_dir.join(name);
        if !extension.is_empty() {
            path.set_extension(extension);
        }
        path
    }

    /// Register `path` for deletion by a later sweep.
    ///
    /// Marking a path again replaces its previous registration.
    pub fn mark_for_deletion(&self, path: impl Into<PathBuf>, reusable: bool) {
        let path = path.into();
        debug!(path = %path.display(), reusable, "Marking file for deletion");
        self.lock().insert(
            path,
            PendingFile {
                reusable,
                content_key: None,
                reused: false,
            },
        );
    }

    /// Register a reusable file holding the content identified by `content_key`
    pub fn mark_reusable(&self, path: impl Into<PathBuf>, content_key: impl Into<String>) {
        let path = path.into();
        debug!(path = %path.display(), "Marking reusable file for deletion");
        self.lock().insert(
            path,
            PendingFile {
                reusable: true,
                content_key: Some(content_key.into()),
                reused: false,
            },
        );
    }

    /// Claim the file registered for `content_key`, if it still exists.
    ///
    /// A claimed file survives the next sweep.
    pub async fn reuse(&self, content_key: &str) -> Option<PathBuf> {
        let path = self.lock().by_content.get(content_key).cloned()?;

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Reusable file vanished, forgetting it");
            let mut pending = self.lock();
            if pending.by_content.get(content_key) == Some(&path) {
                pending.remove(&path);
            }
            return None;
        }

        self.reuse_path(&path).then_some(path)
    }

    /// Claim a registered reusable file by path. Returns `false` if the path is
    /// not pending or was marked non-reusable.
    pub fn reuse_path(&self, path: &Path) -> bool {
        let mut pending = self.lock();
        match pending.files.get_mut(path) {
            Some(file) if file.reusable => {
                file.reused = true;
                debug!(path = %path.display(), "Reusing scratch file");
                true
            }
            _ => false,
        }
    }

    /// Whether `path` is awaiting deletion
    #[must_use]
    pub fn is_pending(&self, path: &Path) -> bool {
        self.lock().files.contains_key(path)
    }

    /// Number of files awaiting deletion
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().files.len()
    }

    /// Delete every pending file not reused since the previous sweep
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let doomed: Vec<PathBuf> = {
            let mut pending = self.lock();
            let mut doomed = Vec::new();
            for (path, file) in pending.files.iter_mut() {
                if file.reusable && file.reused {
                    file.reused = false;
                    report.retained += 1;
                } else {
                    doomed.push(path.clone());
                }
            }
            for path in &doomed {
                pending.remove(path);
            }
            doomed
        };

        self.delete_all(doomed, &mut report).await;
        log_report("Temp file sweep", &report);
        report
    }

    /// Delete every pending file regardless of reuse (shutdown)
    pub async fn sweep_all(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let doomed: Vec<PathBuf> = {
            let mut pending = self.lock();
            pending.by_content.clear();
            pending.files.drain().map(|(path, _)| path).collect()
        };

        self.delete_all(doomed, &mut report).await;
        log_report("Final temp file sweep", &report);
        report
    }

    async fn delete_all(&self, paths: Vec<PathBuf>, report: &mut SweepReport) {
        for path in paths {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => report.deleted += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "Scratch file already gone");
                    report.missing += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to delete scratch file");
                    report.failed += 1;
                    // Retry on the next sweep
                    self.lock().files.entry(path).or_insert(PendingFile {
                        reusable: false,
                        content_key: None,
                        reused: false,
                    });
                }
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn log_report(message: &str, report: &SweepReport) {
    if report.deleted + report.failed > 0 {
        info!(
            deleted = report.deleted,
            missing = report.missing,
            retained = report.retained,
            failed = report.failed,
            "{}",
            message
        );
    } else {
        debug!(
            missing = report.missing,
            retained = report.retained,
            "{}",
            message
        );
    }
}
