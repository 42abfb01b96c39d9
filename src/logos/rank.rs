//! Candidate ranking
//!
//! Candidates are ordered by category preference first, then by extension
//! preference. Anything not listed ranks after every listed value. Remaining
//! ties fall back to the lowercase path so selection never depends on scan order.

use std::cmp::Ordering;

use super::candidate::Candidate;

/// Default category order, most preferred first
pub const DEFAULT_SUBDIR_PREFERENCE: [&str; 4] =
    ["ticker_icons", "crypto_icons", "forex_icons", "exchange_icons"];

/// Default extension order, most preferred first
pub const DEFAULT_EXTENSION_PREFERENCE: [&str; 6] = ["png", "svg", "webp", "jpg", "jpeg", "ico"];

/// Two-level priority order used to pick the best candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankPolicy {
    subdirs: Vec<String>,
    extensions: Vec<String>,
}

impl RankPolicy {
    /// Build a policy. Extensions may be given with or without the leading dot.
    pub fn new<S, E>(subdirs: S, extensions: E) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            subdirs: subdirs.into_iter().map(Into::into).collect(),
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    fn subdir_rank(&self, candidate: &Candidate) -> usize {
        candidate
            .category
            .as_deref()
            .and_then(|c| self.subdirs.iter().position(|s| s == c))
            .unwrap_or(self.subdirs.len())
    }

    fn extension_rank(&self, candidate: &Candidate) -> usize {
        candidate
            .extension
            .as_deref()
            .and_then(|e| self.extensions.iter().position(|s| s == e))
            .unwrap_or(self.extensions.len())
    }

    /// Compare two candidates; `Less` means `a` is preferred
    pub fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        self.subdir_rank(a)
            .cmp(&self.subdir_rank(b))
            .then_with(|| self.extension_rank(a).cmp(&self.extension_rank(b)))
            .then_with(|| {
                let pa = a.path.to_string_lossy().to_lowercase();
                let pb = b.path.to_string_lossy().to_lowercase();
                pa.cmp(&pb)
            })
    }
}

impl Default for RankPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SUBDIR_PREFERENCE, DEFAULT_EXTENSION_PREFERENCE)
    }
}
