//! Logo lookup subsystem
//!
//! Maps ticker symbols to image files under the logos directory:
//! - `scan`: recursive walk of the logos tree
//! - `index`: in-memory ticker index with on-demand cache fill
//! - `rank`: category / extension priority used to pick one file per ticker

mod candidate;
mod error;
mod index;
mod rank;
mod scan;
mod ticker;

pub use candidate::Candidate;
pub use error::LogoError;
pub use index::{LogoIndex, Lookup, Resolution, ResolvedFrom};
pub use rank::{RankPolicy, DEFAULT_EXTENSION_PREFERENCE, DEFAULT_SUBDIR_PREFERENCE};
pub use scan::ScanStats;
pub use ticker::TickerKey;
