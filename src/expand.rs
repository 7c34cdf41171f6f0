use crate::constants::DIRECTORY_IMAGE_EXTENSIONS;
use crate::error::{Result, ShrinkError};
use glob::glob;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandOptions {
    /// Walk subdirectories when a pattern resolves to a directory.
    pub recursive: bool,
}

/// Resolves glob patterns into the list of files a batch will process.
///
/// Patterns are resolved independently and concatenated in input order. A pattern
/// that matches nothing is logged and skipped; only a malformed pattern is an error.
/// The same path produced by more than one pattern is kept once, at its first position.
pub fn expand_patterns<S: AsRef<str>>(patterns: &[S], options: &ExpandOptions) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        debug!("Expanding pattern: {}", pattern);

        let matches = expand_pattern(pattern, options)?;
        if matches.is_empty() {
            warn!("No files found matching pattern: {}", pattern);
            continue;
        }

        for path in matches {
            if seen.insert(path.clone()) {
                files.push(path);
            } else {
                debug!("Skipping duplicate path: {}", path.display());
            }
        }
    }

    Ok(files)
}

fn expand_pattern(pattern: &str, options: &ExpandOptions) -> Result<Vec<PathBuf>> {
    let entries = glob(pattern).map_err(|source| ShrinkError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_dir() => files.extend(collect_directory(&path, options.recursive)),
            Ok(path) => files.push(path),
            Err(e) => warn!("Skipping unreadable path {}: {}", e.path().display(), e.error()),
        }
    }

    Ok(files)
}

fn collect_directory(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let walker = if recursive {
        WalkDir::new(dir)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let mut files = Vec::new();
    let entries = walker
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in entries {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_image_file(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping entry in {}: {}", dir.display(), e),
        }
    }

    files
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| DIRECTORY_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
