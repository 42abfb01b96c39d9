//! Logo candidate files

use std::path::{Component, Path, PathBuf};

/// A file on disk that may represent a ticker's logo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Top-level directory below the logos root (`ticker_icons`, `crypto_icons`, ...)
    pub category: Option<String>,
    /// Lowercase extension without the leading dot
    pub extension: Option<String>,
}

impl Candidate {
    /// Build a candidate for `path`, which must live under `root`.
    ///
    /// Files sitting directly in the root have no category.
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let category = path
            .strip_prefix(root)
            .ok()
            .and_then(|relative| {
                let mut components = relative.components();
                let first = components.next()?;
                // A single component is the file itself
                components.next()?;
                match first {
                    Component::Normal(name) => name.to_str().map(ToString::to_string),
                    _ => None,
                }
            });

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        Self {
            path,
            category,
            extension,
        }
    }

    /// File name used for `Content-Disposition`
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}
