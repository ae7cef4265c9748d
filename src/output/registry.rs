//! Temporary artifact registry
//!
//! Process-wide record of every temp file a job writes. Job-lifetime entries
//! are purged when their job ends; caller-lifetime entries (previews handed
//! back to the caller) stay until discarded or until the shutdown purge.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::{debug, warn};

use crate::domain::model::JobId;

/// How long a registered file is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactLifetime {
    /// Deleted when the owning job finishes
    Job,
    /// Handed to the caller, deleted on discard or shutdown
    Caller,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TempArtifact {
    pub path: PathBuf,
    pub owner: JobId,
    pub lifetime: ArtifactLifetime,
}

#[derive(Debug, Default)]
pub struct TempArtifactRegistry {
    entries: Mutex<HashMap<PathBuf, TempArtifact>>,
}

static GLOBAL: OnceLock<Arc<TempArtifactRegistry>> = OnceLock::new();

impl TempArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process
    pub fn global() -> Arc<TempArtifactRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(TempArtifactRegistry::new())))
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, TempArtifact>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, path: impl Into<PathBuf>, owner: JobId, lifetime: ArtifactLifetime) {
        let path = path.into();
        debug!("Registering temp artifact {} for job {}", path.display(), owner.short());
        self.entries().insert(
            path.clone(),
            TempArtifact {
                path,
                owner,
                lifetime,
            },
        );
    }

    /// Forget `path` and delete it from disk. Returns whether it was tracked.
    ///
    /// Unknown paths are left alone; calling twice is harmless.
    pub fn unregister_and_delete(&self, path: &Path) -> bool {
        let removed = self.entries().remove(path);
        match removed {
            Some(artifact) => {
                delete_file(&artifact.path);
                true
            }
            None => false,
        }
    }

    /// Delete every job-lifetime artifact owned by `owner`
    pub fn purge_job(&self, owner: JobId) -> usize {
        let doomed: Vec<PathBuf> = {
            let mut entries = self.entries();
            let paths: Vec<PathBuf> = entries
                .values()
                .filter(|a| a.owner == owner && a.lifetime == ArtifactLifetime::Job)
                .map(|a| a.path.clone())
                .collect();
            for path in &paths {
                entries.remove(path);
            }
            paths
        };
        doomed.iter().filter(|path| delete_file(path)).count()
    }

    /// Hand a finished job output to the caller
    pub fn promote(&self, path: &Path) -> bool {
        match self.entries().get_mut(path) {
            Some(artifact) => {
                artifact.lifetime = ArtifactLifetime::Caller;
                true
            }
            None => false,
        }
    }

    /// Stop tracking `path` without deleting it
    pub fn detach(&self, path: &Path) -> bool {
        self.entries().remove(path).is_some()
    }

    /// Best-effort delete of everything still registered
    pub fn purge_all(&self) -> usize {
        let doomed: Vec<PathBuf> = self.entries().drain().map(|(path, _)| path).collect();
        let removed = doomed.iter().filter(|path| delete_file(path)).count();
        if !doomed.is_empty() {
            debug!("Purged {} of {} temp artifact(s)", removed, doomed.len());
        }
        removed
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries().contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<TempArtifact> {
        self.entries().get(path).cloned()
    }

    pub fn owned_by(&self, owner: JobId) -> Vec<PathBuf> {
        self.entries()
            .values()
            .filter(|a| a.owner == owner)
            .map(|a| a.path.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Delete a file; a missing file is fine, other failures are logged only
fn delete_file(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Deleted temp artifact {}", path.display());
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Failed to delete temp artifact {}: {}", path.display(), e);
            false
        }
    }
}

/// Purges a job's artifacts when dropped
pub struct JobScope {
    registry: Arc<TempArtifactRegistry>,
    job_id: JobId,
}

impl JobScope {
    pub fn new(registry: Arc<TempArtifactRegistry>, job_id: JobId) -> Self {
        Self { registry, job_id }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Register a file the job is about to create
    pub fn track(&self, path: &Path) {
        self.registry
            .register(path, self.job_id, ArtifactLifetime::Job);
    }

    /// Keep `path` alive past the end of the job
    pub fn promote(&self, path: &Path) -> bool {
        self.registry.promote(path)
    }

    /// End the job now; returns how many files were deleted
    pub fn close(self) -> usize {
        self.registry.purge_job(self.job_id)
    }
}

impl Drop for JobScope {
    fn drop(&mut self) {
        self.registry.purge_job(self.job_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"data").unwrap();
        path
    }

    #[test]
    fn test_unregister_and_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempArtifactRegistry::new();
        let path = touch(dir.path(), "a.mp4");
        registry.register(&path, JobId::new(), ArtifactLifetime::Caller);

        assert!(registry.unregister_and_delete(&path));
        assert!(!path.exists());
        assert!(!registry.unregister_and_delete(&path));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempArtifactRegistry::new();
        let path = dir.path().join("never-written.mp4");
        registry.register(&path, JobId::new(), ArtifactLifetime::Job);
        assert!(registry.unregister_and_delete(&path));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_paths_are_not_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempArtifactRegistry::new();
        let path = touch(dir.path(), "user.mp4");
        assert!(!registry.unregister_and_delete(&path));
        assert!(path.exists());
    }

    #[test]
    fn test_purge_job_only_touches_job_lifetime_of_owner() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempArtifactRegistry::new();
        let job = JobId::new();
        let other = JobId::new();

        let part = touch(dir.path(), "part.mp4");
        let preview = touch(dir.path(), "preview.mp4");
        let foreign = touch(dir.path(), "foreign.mp4");
        registry.register(&part, job, ArtifactLifetime::Job);
        registry.register(&preview, job, ArtifactLifetime::Caller);
        registry.register(&foreign, other, ArtifactLifetime::Job);

        assert_eq!(registry.purge_job(job), 1);
        assert!(!part.exists());
        assert!(preview.exists());
        assert!(foreign.exists());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_purge_all_empty_and_repeated() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempArtifactRegistry::new();
        assert_eq!(registry.purge_all(), 0);

        for name in ["a.mp4", "b.mp4", "c.txt"] {
            let path = touch(dir.path(), name);
            registry.register(&path, JobId::new(), ArtifactLifetime::Caller);
        }
        assert_eq!(registry.purge_all(), 3);
        assert_eq!(registry.purge_all(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_promote_and_detach() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TempArtifactRegistry::new();
        let job = JobId::new();
        let path = touch(dir.path(), "preview.mp4");
        registry.register(&path, job, ArtifactLifetime::Job);

        assert!(registry.promote(&path));
        assert_eq!(registry.get(&path).unwrap().lifetime, ArtifactLifetime::Caller);
        assert_eq!(registry.purge_job(job), 0);

        assert!(registry.detach(&path));
        assert!(!registry.contains(&path));
        assert!(path.exists());
        assert!(!registry.promote(&path));
    }

    #[test]
    fn test_job_scope_purges_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(TempArtifactRegistry::new());
        let part = touch(dir.path(), "part.mp4");
        let kept = touch(dir.path(), "kept.mp4");
        {
            let scope = JobScope::new(Arc::clone(&registry), JobId::new());
            scope.track(&part);
            scope.track(&kept);
            assert!(scope.promote(&kept));
            assert_eq!(registry.owned_by(scope.job_id()).len(), 2);
        }
        assert!(!part.exists());
        assert!(kept.exists());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(TempArtifactRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let path = PathBuf::from(format!("/nonexistent/{}-{}.mp4", t, i));
                        registry.register(&path, JobId::new(), ArtifactLifetime::Job);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 400);
        assert_eq!(registry.purge_all(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_global_is_shared() {
        let a = TempArtifactRegistry::global();
        let b = TempArtifactRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
