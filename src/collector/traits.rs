//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait lets the interrupts collector read the real
//! `/proc/interrupts` on Linux, or an in-memory table in tests where the
//! kernel file does not exist or cannot be controlled.

use std::io;
use std::path::Path;

/// Abstraction for filesystem operations.
///
/// This trait allows collectors to read from the real filesystem or from
/// a mock implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// # Arguments
    /// * `path` - Path to the file to read
    ///
    /// # Returns
    /// The file contents as a string, or an I/O error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_real_fs_read_to_string() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "           CPU0       CPU1\n  0:         44          0   IO-APIC   2-edge      timer\n").unwrap();

        let fs = RealFs::new();
        let content = fs.read_to_string(file.path()).unwrap();
        assert!(content.starts_with("           CPU0"));
        assert!(content.contains("timer"));
    }

    #[test]
    fn test_real_fs_exists() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let fs = RealFs::new();
        assert!(fs.exists(file.path()));
        assert!(!fs.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn test_real_fs_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        let err = fs
            .read_to_string(&dir.path().join("interrupts"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
