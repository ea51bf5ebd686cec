//! Whitespace-tokenizing reader for `/proc` tables.
//!
//! Kernel tables such as `/proc/interrupts` are small, entirely re-generated
//! on every read, and always tokenized the same way: lines split on `\n`,
//! words split on spaces and tabs. `TableReader` re-reads the file on every
//! `read_all()` call and keeps a word index over the text, so callers can
//! address any field by `(line, word)`.
//!
//! The word and line indexes are reused across reads; their capacity
//! follows the largest table seen so far.

use crate::collector::traits::FileSystem;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Reader over a whitespace-separated kernel table.
#[derive(Debug)]
pub struct TableReader {
    path: PathBuf,
    text: String,
    /// Byte ranges of every word in `text`.
    words: Vec<Range<usize>>,
    /// Ranges into `words`, one per line.
    lines: Vec<Range<usize>>,
}

impl TableReader {
    /// Opens a table for reading.
    ///
    /// Fails with `NotFound` if the path does not exist. Nothing is read
    /// until `read_all()` is called.
    pub fn open<F: FileSystem>(fs: &F, path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if !fs.exists(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("cannot open {:?}", path),
            ));
        }
        Ok(Self {
            path,
            text: String::new(),
            words: Vec::new(),
            lines: Vec::new(),
        })
    }

    /// Path this reader was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the whole table from the start and re-tokenizes it.
    ///
    /// On error the previous contents are discarded, so a failed read never
    /// leaves stale lines behind.
    pub fn read_all<F: FileSystem>(&mut self, fs: &F) -> io::Result<()> {
        match fs.read_to_string(&self.path) {
            Ok(text) => {
                self.text = text;
                self.tokenize();
                Ok(())
            }
            Err(e) => {
                self.text.clear();
                self.words.clear();
                self.lines.clear();
                Err(e)
            }
        }
    }

    /// Number of lines in the last read, blank lines included.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of words on `line`, or 0 if the line does not exist.
    pub fn word_count(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |range| range.len())
    }

    /// Word `word` of `line`, or the empty string if it does not exist.
    pub fn word(&self, line: usize, word: usize) -> &str {
        self.lines
            .get(line)
            .filter(|range| word < range.len())
            .and_then(|range| self.words.get(range.start + word))
            .map_or("", |span| &self.text[span.clone()])
    }

    /// All words of `line`, in order.
    pub fn line_words(&self, line: usize) -> impl Iterator<Item = &str> {
        let range = self.lines.get(line).cloned().unwrap_or(0..0);
        self.words[range]
            .iter()
            .map(|span| &self.text[span.clone()])
    }

    fn tokenize(&mut self) {
        self.words.clear();
        self.lines.clear();

        let bytes = self.text.as_bytes();
        let mut line_start = 0;
        let mut word_start: Option<usize> = None;

        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    if let Some(start) = word_start.take() {
                        self.words.push(start..i);
                    }
                    if b == b'\n' {
                        self.lines.push(line_start..self.words.len());
                        line_start = self.words.len();
                    }
                }
                _ => {
                    if word_start.is_none() {
                        word_start = Some(i);
                    }
                }
            }
        }

        // Last line without a trailing newline
        if let Some(start) = word_start {
            self.words.push(start..bytes.len());
        }
        if bytes.last().is_some_and(|&b| b != b'\n') {
            self.lines.push(line_start..self.words.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn read(content: &str) -> TableReader {
        let mut fs = MockFs::new();
        fs.add_file("/proc/interrupts", content);
        let mut reader = TableReader::open(&fs, "/proc/interrupts").unwrap();
        reader.read_all(&fs).unwrap();
        reader
    }

    #[test]
    fn test_open_missing_file() {
        let fs = MockFs::new();
        let err = TableReader::open(&fs, "/proc/interrupts").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_tokenize_spaces_and_tabs() {
        let reader = read("  CPU0\tCPU1  \n 0:  1\t2   timer\n");
        assert_eq!(reader.line_count(), 2);
        assert_eq!(reader.word_count(0), 2);
        assert_eq!(reader.word(0, 1), "CPU1");
        assert_eq!(reader.word_count(1), 4);
        assert_eq!(reader.word(1, 0), "0:");
        assert_eq!(reader.word(1, 3), "timer");
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let reader = read("CPU0\n\n   \n1: 5\n");
        assert_eq!(reader.line_count(), 4);
        assert_eq!(reader.word_count(1), 0);
        assert_eq!(reader.word_count(2), 0);
        assert_eq!(reader.word(3, 1), "5");
    }

    #[test]
    fn test_missing_trailing_newline() {
        let reader = read("CPU0 CPU1\nNMI: 1 2");
        assert_eq!(reader.line_count(), 2);
        assert_eq!(reader.word(1, 2), "2");
    }

    #[test]
    fn test_out_of_range_access() {
        let reader = read("CPU0\n");
        assert_eq!(reader.word_count(5), 0);
        assert_eq!(reader.word(0, 1), "");
        assert_eq!(reader.word(9, 0), "");
        assert_eq!(reader.line_words(9).count(), 0);
    }

    #[test]
    fn test_empty_file() {
        let reader = read("");
        assert_eq!(reader.line_count(), 0);
    }

    #[test]
    fn test_reread_picks_up_new_contents() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/interrupts", "CPU0\n1: 5\n");
        let mut reader = TableReader::open(&fs, "/proc/interrupts").unwrap();
        reader.read_all(&fs).unwrap();
        assert_eq!(reader.line_count(), 2);

        fs.add_file("/proc/interrupts", "CPU0\n1: 6\n2: 7\n");
        reader.read_all(&fs).unwrap();
        assert_eq!(reader.line_count(), 3);
        assert_eq!(reader.word(1, 1), "6");
        assert_eq!(reader.word(2, 1), "7");
    }

    #[test]
    fn test_failed_read_clears_contents() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/interrupts", "CPU0\n1: 5\n");
        let mut reader = TableReader::open(&fs, "/proc/interrupts").unwrap();
        reader.read_all(&fs).unwrap();

        fs.remove_file("/proc/interrupts");
        assert!(reader.read_all(&fs).is_err());
        assert_eq!(reader.line_count(), 0);
    }

    #[test]
    fn test_line_words() {
        let reader = read("   CPU0   CPU1   CPU2\n");
        let words: Vec<&str> = reader.line_words(0).collect();
        assert_eq!(words, vec!["CPU0", "CPU1", "CPU2"]);
    }
}
