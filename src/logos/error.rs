use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the logo index and resolver
#[derive(Debug, Error)]
pub enum LogoError {
    #[error("logos directory '{}' is missing or not a directory", .0.display())]
    RootMissing(PathBuf),

    #[error("failed to read directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Ticker must not be empty")]
    EmptyTicker,

    #[error("Logo not found for ticker '{0}'")]
    NotFound(String),
}
