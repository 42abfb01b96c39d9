//! Ticker key normalization
//!
//! Ticker lookups are case-insensitive; every key is stored uppercase.

use std::fmt;
use std::path::Path;

use super::error::LogoError;

/// Normalized (trimmed, uppercase) ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickerKey(String);

impl TickerKey {
    /// Normalize a requested ticker. Empty input after trimming is rejected.
    pub fn parse(raw: &str) -> Result<Self, LogoError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LogoError::EmptyTicker);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Derive the key from a file name without its extension.
    ///
    /// Returns `None` for paths without a UTF-8 file stem.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }
        Some(Self(stem.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TickerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
