//! Path helpers for concat lists and output locations

use std::path::Path;

use crate::error::ClipStudioResult;

/// Render a path for a concat list `file '...'` line.
///
/// Backslashes become forward slashes. A single quote closes the quoted
/// string, is emitted escaped, and reopens it: `'\''`.
pub fn escape_concat_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace('\'', "'\\''")
}

/// Create the parent directory of an output file if it is missing
pub fn ensure_parent_dir(path: &Path) -> ClipStudioResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_escape_concat_path_forward_slashes() {
        let path = PathBuf::from(r"C:\Users\me\clip.mp4");
        assert_eq!(escape_concat_path(&path), "C:/Users/me/clip.mp4");
    }

    #[test]
    fn test_escape_concat_path_quotes() {
        let path = PathBuf::from("/tmp/it's here.mp4");
        assert_eq!(escape_concat_path(&path), "/tmp/it'\\''s here.mp4");
    }

    #[test]
    fn test_ensure_parent_dir_creates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("deeper").join("out.mp4");
        ensure_parent_dir(&target).unwrap();
        assert!(target.parent().unwrap().is_dir());
        ensure_parent_dir(&target).unwrap();
    }

    #[test]
    fn test_ensure_parent_dir_bare_file_name() {
        assert!(ensure_parent_dir(Path::new("out.mp4")).is_ok());
    }
}
