// Application state module
// Owns the configuration and the logo index shared by all connections

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::logos::{LogoError, LogoIndex};

/// Application state
pub struct AppState {
    pub config: Config,
    pub index: Arc<LogoIndex>,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    /// Build state around an existing index
    pub fn new(config: Config, index: LogoIndex) -> Self {
        let cached_access_log = Arc::new(AtomicBool::new(config.logging.access_log));
        Self {
            config,
            index: Arc::new(index),
            cached_access_log,
        }
    }

    /// Build state and index the configured logos directory.
    ///
    /// A missing logos root is fatal for the caller.
    pub fn from_config(config: Config) -> Result<Self, LogoError> {
        let index = LogoIndex::build(&config.logos.root_dir, config.logos.rank_policy())?;
        Ok(Self::new(config, index))
    }
}
