use std::path::{Path, PathBuf};

use crate::errors::{StepwiseError, StepwiseResult};

/// Walk up from `start` looking for a file named `filename`.
/// Returns the path to the directory containing the file, or `None`.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Locate `filename` in `start` or the nearest ancestor that contains it,
/// returning the full path to the file.
pub fn locate_file(start: &Path, filename: &str) -> StepwiseResult<PathBuf> {
    match find_ancestor_with(start, filename) {
        Some(dir) => {
            let path = dir.join(filename);
            tracing::debug!("Found {filename} at {}", path.display());
            Ok(path)
        }
        None => Err(StepwiseError::Manifest {
            message: format!(
                "No {filename} found in {} or any parent directory",
                start.display()
            ),
        }),
    }
}
