use crate::error::ShrinkError;
use crate::transform::ImageTransform;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Sizes of one file measured around a successful transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrinkResult {
    path: PathBuf,
    original_size: u64,
    new_size: u64,
}

impl ShrinkResult {
    pub fn new(path: PathBuf, original_size: u64, new_size: u64) -> Self {
        Self {
            path,
            original_size,
            new_size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn new_size(&self) -> u64 {
        self.new_size
    }

    /// Negative when the transform made the file larger.
    pub fn shrink_percentage(&self) -> f64 {
        shrink_percentage(self.original_size, self.new_size)
    }
}

/// A file that could not be shrunk, with the reason.
#[derive(Debug)]
pub struct ProcessingError {
    path: PathBuf,
    cause: ShrinkError,
}

impl ProcessingError {
    pub fn new(path: PathBuf, cause: ShrinkError) -> Self {
        Self { path, cause }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cause(&self) -> &ShrinkError {
        &self.cause
    }
}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.cause)
    }
}

impl std::error::Error for ProcessingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Calculate the size reduction as a percentage of the original size.
///
/// Returns 0 for an empty original so callers never divide by zero.
pub fn shrink_percentage(original_size: u64, new_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    (1.0 - new_size as f64 / original_size as f64) * 100.0
}

/// Shrinks one file: measure, transform, measure again.
///
/// A single attempt is made. If the first measurement fails the transform is never
/// invoked; if the transform fails the file is not measured again.
pub fn shrink_file(
    path: PathBuf,
    transform: &dyn ImageTransform,
) -> std::result::Result<ShrinkResult, ProcessingError> {
    let original_size = match file_size(&path) {
        Ok(size) => size,
        Err(e) => return Err(ProcessingError::new(path, e)),
    };

    if let Err(e) = transform.process(&path) {
        return Err(ProcessingError::new(path, e));
    }

    match file_size(&path) {
        Ok(new_size) => Ok(ShrinkResult::new(path, original_size, new_size)),
        Err(e) => Err(ProcessingError::new(path, e)),
    }
}

fn file_size(path: &Path) -> crate::error::Result<u64> {
    Ok(fs::metadata(path)?.len())
}
