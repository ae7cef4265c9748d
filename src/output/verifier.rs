//! Output file checks

use std::path::Path;

use crate::error::{ClipStudioError, ClipStudioResult};

/// Confirm a stage really produced its file. Returns the size in bytes.
pub fn verify_output_file(stage: &str, path: &Path) -> ClipStudioResult<u64> {
    let missing = || ClipStudioError::OutputMissing {
        stage: stage.to_string(),
        path: path.to_path_buf(),
    };

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        _ => Err(missing()),
    }
}
