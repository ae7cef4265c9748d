//! Temporary file naming
//!
//! Every job gets its own stamp (wall-clock time plus a random token) so that
//! concurrently running jobs never collide in the shared temp directory.

use std::path::PathBuf;

use chrono::Local;
use uuid::Uuid;

/// Prefix shared by every file this crate writes to the temp directory
pub const TEMP_PREFIX: &str = "clipstudio";

/// Generates job-namespaced paths in a temp directory
#[derive(Debug, Clone)]
pub struct ArtifactNamer {
    dir: PathBuf,
    feature: String,
    stamp: String,
}

impl ArtifactNamer {
    pub fn new(dir: impl Into<PathBuf>, feature: &str) -> Self {
        Self {
            dir: dir.into(),
            feature: feature.to_string(),
            stamp: format!("{}-{}", Local::now().format("%Y%m%d%H%M%S%3f"), random_token()),
        }
    }

    /// `<dir>/clipstudio-<feature>-<stamp>-<label>.<ext>`
    pub fn path(&self, label: &str, extension: &str) -> PathBuf {
        self.dir.join(format!(
            "{}-{}-{}-{}.{}",
            TEMP_PREFIX, self.feature, self.stamp, label, extension
        ))
    }

    /// Final output of a preview job
    pub fn preview(&self) -> PathBuf {
        self.path("preview", "mp4")
    }

    /// Intermediate file owned by the job
    pub fn intermediate(&self, label: &str, extension: &str) -> PathBuf {
        self.path(label, extension)
    }

    pub fn stamp(&self) -> &str {
        &self.stamp
    }
}

/// Eight lowercase hex characters
fn random_token() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_layout() {
        let namer = ArtifactNamer::new("/tmp/work", "merge");
        let path = namer.intermediate("part0", "mp4");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(path.starts_with("/tmp/work"));
        assert!(name.starts_with("clipstudio-merge-"));
        assert!(name.ends_with("-part0.mp4"));
        assert!(name.contains(namer.stamp()));
    }

    #[test]
    fn test_stamp_shape() {
        let namer = ArtifactNamer::new("/tmp", "cut");
        let (time, token) = namer.stamp().split_once('-').unwrap();
        assert_eq!(time.len(), 17);
        assert!(time.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(token.len(), 8);
    }

    #[test]
    fn test_concurrent_namers_do_not_collide() {
        let a = ArtifactNamer::new("/tmp", "speed");
        let b = ArtifactNamer::new("/tmp", "speed");
        assert_ne!(a.preview(), b.preview());
    }
}
