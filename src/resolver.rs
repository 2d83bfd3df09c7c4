//! Resolution of watch targets into the set of files to read each cycle.

use crate::error::{Error, Result};
use std::path::PathBuf;

/// What a watcher follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchTarget {
    /// A single file, validated when the watcher is built.
    FixedPath(PathBuf),
    /// A glob pattern, re-resolved on every poll cycle.
    Glob(String),
}

impl WatchTarget {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        WatchTarget::FixedPath(path.into())
    }

    /// Builds a glob target, rejecting patterns that do not compile.
    pub fn glob(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        glob::Pattern::new(&pattern).map_err(|source| Error::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        Ok(WatchTarget::Glob(pattern))
    }

    pub fn is_glob(&self) -> bool {
        matches!(self, WatchTarget::Glob(_))
    }

    /// The files this target names right now.
    ///
    /// A fixed path always resolves to itself, present or not; reading it is
    /// what reports a vanished file.
    pub fn resolve(&self) -> Vec<PathBuf> {
        match self {
            WatchTarget::FixedPath(path) => vec![path.clone()],
            WatchTarget::Glob(pattern) => GlobResolver::resolve(pattern),
        }
    }
}

impl std::fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatchTarget::FixedPath(path) => write!(f, "{}", path.display()),
            WatchTarget::Glob(pattern) => f.write_str(pattern),
        }
    }
}

const MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: true,
};

/// Stateless glob expansion over the filesystem.
///
/// Paths are returned exactly as the pattern spells them (no canonicalisation),
/// so a path keeps the same identity from one cycle to the next.
pub struct GlobResolver;

impl GlobResolver {
    /// Regular files currently matching `pattern`, in sorted order.
    ///
    /// Wildcards do not match a leading `.`, so hidden files are only
    /// picked up by patterns that spell the dot out. No matches (or an
    /// invalid pattern) yields an empty list.
    pub fn resolve(pattern: &str) -> Vec<PathBuf> {
        let paths = match glob::glob_with(pattern, MATCH_OPTIONS) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!("Invalid glob pattern '{}': {}", pattern, e);
                return Vec::new();
            }
        };

        paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry {}: {}", e.path().display(), e);
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect()
    }
}
