//! Ticker to logo index
//!
//! Built once from the logos root at startup. Lookups are a two-phase
//! affair: the fast path reads the in-memory map, the slow path rescans the
//! tree for the one requested ticker and fills the map so the next request
//! hits. Entries are only ever added.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use super::candidate::Candidate;
use super::error::LogoError;
use super::rank::RankPolicy;
use super::scan::walk_files;
use super::ticker::TickerKey;
use crate::logger;

/// Outcome of the in-memory lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Best candidate already indexed
    Hit(Candidate),
    /// Nothing indexed for this key
    Miss,
}

/// Which phase produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedFrom {
    Index,
    Rescan,
}

/// A ticker resolved to the file that should be served
#[derive(Debug, Clone)]
pub struct Resolution {
    pub key: TickerKey,
    pub candidate: Candidate,
    pub source: ResolvedFrom,
}

/// In-memory ticker index over a logos directory
#[derive(Debug)]
pub struct LogoIndex {
    root: PathBuf,
    policy: RankPolicy,
    /// Candidate sets, kept sorted best-first and unique by path
    entries: RwLock<HashMap<TickerKey, Vec<Candidate>>>,
}

impl LogoIndex {
    /// Walk `root` and index every file found.
    ///
    /// Fails if the root is missing, not a directory, or unreadable.
    pub fn build(root: impl AsRef<Path>, policy: RankPolicy) -> Result<Self, LogoError> {
        let root = root.as_ref();
        let root = match root.canonicalize() {
            Ok(p) if p.is_dir() => p,
            _ => return Err(LogoError::RootMissing(root.to_path_buf())),
        };

        let mut entries = HashMap::new();
        let stats = walk_files(&root, |path| {
            if let Some(key) = TickerKey::from_path(&path) {
                let candidate = Candidate::new(&root, path);
                insert_candidate(&mut entries, &policy, key, candidate);
            }
        })?;

        logger::log_index_built(&root, entries.len(), &stats);

        Ok(Self {
            root,
            policy,
            entries: RwLock::new(entries),
        })
    }

    /// Canonical logos root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of distinct tickers indexed
    pub fn ticker_count(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Fast path: consult the in-memory map only
    pub fn lookup(&self, key: &TickerKey) -> Lookup {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key).and_then(|c| c.first()) {
            Some(best) => Lookup::Hit(best.clone()),
            None => Lookup::Miss,
        }
    }

    /// All indexed candidates for a key, best first.
    ///
    /// Lets callers fall back to a runner-up when the best file is unreadable.
    pub fn candidates(&self, key: &TickerKey) -> Vec<Candidate> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Slow path: rescan the tree for files named after `key` and add them.
    ///
    /// Returns how many candidates were newly inserted.
    pub fn rescan(&self, key: &TickerKey) -> Result<usize, LogoError> {
        let mut found = Vec::new();
        walk_files(&self.root, |path| {
            if TickerKey::from_path(&path).as_ref() == Some(key) {
                found.push(Candidate::new(&self.root, path));
            }
        })?;

        if found.is_empty() {
            return Ok(0);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut added = 0;
        for candidate in found {
            if insert_candidate(&mut entries, &self.policy, key.clone(), candidate) {
                added += 1;
            }
        }
        drop(entries);

        if added > 0 {
            logger::log_debug(&format!("Indexed {added} new file(s) for ticker {key}"));
        }
        Ok(added)
    }

    /// Resolve a key from async code. The rescan runs on the blocking pool.
    pub async fn resolve(self: &Arc<Self>, key: TickerKey) -> Result<Resolution, LogoError> {
        if let Lookup::Hit(candidate) = self.lookup(&key) {
            return Ok(Resolution {
                key,
                candidate,
                source: ResolvedFrom::Index,
            });
        }

        let index = Arc::clone(self);
        let not_found = LogoError::NotFound(key.to_string());
        match tokio::task::spawn_blocking(move || index.resolve_by_rescan(&key)).await {
            Ok(result) => result,
            Err(e) => {
                logger::log_error(&format!("Logo rescan task failed: {e}"));
                Err(not_found)
            }
        }
    }

    fn resolve_by_rescan(&self, key: &TickerKey) -> Result<Resolution, LogoError> {
        if let Err(e) = self.rescan(key) {
            logger::log_error(&format!("Fallback scan for {key} failed: {e}"));
            return Err(LogoError::NotFound(key.to_string()));
        }

        // Re-read so a concurrent fill is picked up as well
        match self.lookup(key) {
            Lookup::Hit(candidate) => Ok(Resolution {
                key: key.clone(),
                candidate,
                source: ResolvedFrom::Rescan,
            }),
            Lookup::Miss => Err(LogoError::NotFound(key.to_string())),
        }
    }
}

/// Insert keeping the candidate set sorted and unique. Returns `true` if added.
fn insert_candidate(
    entries: &mut HashMap<TickerKey, Vec<Candidate>>,
    policy: &RankPolicy,
    key: TickerKey,
    candidate: Candidate,
) -> bool {
    let set = entries.entry(key).or_default();
    if set.iter().any(|c| c.path == candidate.path) {
        return false;
    }
    set.push(candidate);
    set.sort_by(|a, b| policy.compare(a, b));
    true
}
