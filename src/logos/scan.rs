//! Recursive directory walk
//!
//! Depth-first over the logos tree using `ignore::WalkBuilder` with every
//! ignore-file source switched off. Hidden entries are skipped and symlinked
//! directories are not followed; symlinked files are reported like regular files.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use super::error::LogoError;
use crate::logger;

/// Counters collected during a walk
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub directories: usize,
    pub files: usize,
    pub skipped_directories: usize,
}

/// Walk `root` and call `visit` for every regular file found.
///
/// Failing to read `root` itself is an error. Unreadable subdirectories are
/// logged and skipped.
pub fn walk_files<F>(root: &Path, mut visit: F) -> Result<ScanStats, LogoError>
where
    F: FnMut(PathBuf),
{
    // The walker reports a broken root like any other entry error
    if let Err(source) = fs::read_dir(root) {
        return Err(LogoError::ReadDir {
            path: root.to_path_buf(),
            source,
        });
    }

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .follow_links(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .build();

    let mut stats = ScanStats::default();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                logger::log_warning(&format!("Skipping unreadable directory: {e}"));
                stats.skipped_directories += 1;
                continue;
            }
        };
        let Some(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            stats.directories += 1;
        } else if file_type.is_file() || (file_type.is_symlink() && entry.path().is_file()) {
            stats.files += 1;
            visit(entry.into_path());
        }
    }

    Ok(stats)
}
