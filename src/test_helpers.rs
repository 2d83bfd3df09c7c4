//! Test utilities for creating temporary log directories and files.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct TempLogDir {
    dir: tempfile::TempDir,
}

impl TempLogDir {
    /// Create a new empty temporary directory for log files
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the directory, whether it exists or not
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Glob pattern rooted at the directory
    pub fn pattern(&self, glob: &str) -> String {
        self.path_of(glob).to_string_lossy().into_owned()
    }

    /// Create (or replace) a file with the given raw content
    pub fn create(&self, name: &str, content: &str) -> std::io::Result<PathBuf> {
        let path = self.path_of(name);
        let mut file = File::create(&path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok(path)
    }

    /// Append raw content, no newline added
    pub fn append(&self, name: &str, content: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(self.path_of(name))?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Truncate the file (simulate log rotation)
    pub fn truncate(&self, name: &str) -> std::io::Result<()> {
        File::create(self.path_of(name))?;
        Ok(())
    }

    pub fn remove(&self, name: &str) -> std::io::Result<()> {
        std::fs::remove_file(self.path_of(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_log_dir_creation() {
        let dir = TempLogDir::new().unwrap();
        assert!(dir.path().is_dir());
        assert!(!dir.path_of("a.log").exists());
    }

    #[test]
    fn test_create_and_append() {
        let dir = TempLogDir::new().unwrap();
        let path = dir.create("a.log", "line 1\n").unwrap();
        dir.append("a.log", "line 2").unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "line 1\nline 2");
    }

    #[test]
    fn test_truncate_and_remove() {
        let dir = TempLogDir::new().unwrap();
        let path = dir.create("a.log", "initial content\n").unwrap();

        dir.truncate("a.log").unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().is_empty());

        dir.remove("a.log").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_pattern_is_rooted() {
        let dir = TempLogDir::new().unwrap();
        let pattern = dir.pattern("*.log");
        assert!(pattern.starts_with(&*dir.path().to_string_lossy()));
        assert!(pattern.ends_with("*.log"));
    }
}
