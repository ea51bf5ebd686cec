//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! allowing tests to run on macOS and in CI environments without Linux, and
//! to change the kernel tables between collection ticks.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files in memory, allowing tests to simulate various `/proc`
/// states, including files that vanish or become unreadable mid-run.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Paths that exist but fail on read.
    unreadable: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content, replacing any previous content.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Removes a file. Subsequent reads fail with `NotFound`.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        self.files.remove(path.as_ref());
    }

    /// Marks a file as unreadable (or readable again).
    ///
    /// An unreadable file still exists, so it can be opened, but every read
    /// fails with `PermissionDenied`.
    pub fn set_unreadable(&mut self, path: impl AsRef<Path>, unreadable: bool) {
        let path = path.as_ref().to_path_buf();
        if unreadable {
            self.unreadable.insert(path);
        } else {
            self.unreadable.remove(&path);
        }
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        if self.unreadable.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
