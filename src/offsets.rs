//! Per-path read offsets.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Maps each observed path to the byte offset up to which it has been consumed.
///
/// A watcher rebuilds its table every poll cycle from the paths it saw in
/// that cycle, so entries for paths that stopped matching fall away.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct OffsetTable {
    entries: HashMap<PathBuf, u64>,
}

impl OffsetTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Seeds every path at its current size so existing content is skipped.
    ///
    /// Paths whose metadata cannot be read are left out; they are treated as
    /// newly seen on the first cycle that can read them.
    pub(crate) fn seeded_at_end<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut table = Self::new();
        for path in paths {
            match std::fs::metadata(&path) {
                Ok(metadata) => {
                    table.insert(path, metadata.len());
                }
                Err(e) => {
                    tracing::debug!("Not seeding {}: {}", path.display(), e);
                }
            }
        }
        table
    }

    pub(crate) fn get(&self, path: &Path) -> Option<u64> {
        self.entries.get(path).copied()
    }

    pub(crate) fn insert(&mut self, path: PathBuf, offset: u64) {
        self.entries.insert(path, offset);
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TempLogDir;

    #[test]
    fn test_insert_and_get() {
        let mut table = OffsetTable::new();
        assert!(table.is_empty());

        table.insert(PathBuf::from("a.log"), 10);
        table.insert(PathBuf::from("a.log"), 25);
        table.insert(PathBuf::from("b.log"), 0);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(Path::new("a.log")), Some(25));
        assert_eq!(table.get(Path::new("b.log")), Some(0));
        assert_eq!(table.get(Path::new("c.log")), None);
        assert!(table.contains(Path::new("b.log")));
    }

    #[test]
    fn test_seeded_at_end_uses_current_sizes() {
        let dir = TempLogDir::new().unwrap();
        let a = dir.create("a.log", "hello\n").unwrap();
        let b = dir.create("b.log", "").unwrap();
        let missing = dir.path_of("missing.log");

        let table = OffsetTable::seeded_at_end(vec![a.clone(), b.clone(), missing.clone()]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&a), Some(6));
        assert_eq!(table.get(&b), Some(0));
        assert!(!table.contains(&missing));
    }
}
