//! Flat-file persistence
//!
//! The whole table is serialized as one text file, one entry per line (see
//! [`crate::codec`]), truncated and fully rewritten on every save. There is
//! no append path, no atomic rename, and no fsync: the store trades
//! durability for availability, and the in-memory table stays authoritative
//! when a write fails.
//!
//! Loading is forgiving the same way recovery usually is: an absent file is
//! an empty store, and malformed lines are skipped rather than failing the
//! whole load.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::{PailError, PailResult};
use crate::table::Entry;

/// Reads and rewrites the snapshot file for one store.
#[derive(Debug, Clone)]
pub struct FlatFile {
    path: PathBuf,
}

impl FlatFile {
    /// Create a handle for the given snapshot path. No I/O happens here.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// The snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the snapshot file with the given entries.
    ///
    /// Creates the parent directory recursively if missing. The error is
    /// propagated; the store decides what to do with it (log and continue).
    pub fn save(&self, entries: &[Entry]) -> PailResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| PailError::Io {
                    path: Some(parent.to_path_buf()),
                    kind: e.kind(),
                    message: format!("Failed to create data directory: {}", e),
                })?;
            }
        }

        let lines: Vec<String> = entries
            .iter()
            .map(|e| codec::encode_line(&e.key, &e.value))
            .collect();

        fs::write(&self.path, lines.join("\n")).map_err(|e| PailError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Failed to write snapshot: {}", e),
        })
    }

    /// Read the snapshot back as a sequence of entries.
    ///
    /// An absent file yields an empty sequence. Blank lines and lines with
    /// no unescaped separator are skipped. Any other read failure is
    /// propagated for the store to log.
    pub fn load(&self) -> PailResult<Vec<Entry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PailError::Io {
                    path: Some(self.path.clone()),
                    kind: e.kind(),
                    message: format!("Failed to read snapshot: {}", e),
                })
            }
        };

        let mut entries = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            match codec::decode_line(line) {
                Some((key, value)) => entries.push(Entry { key, value }),
                None => {
                    tracing::debug!(
                        path = %self.path.display(),
                        line = line_no + 1,
                        "skipping malformed snapshot line"
                    );
                }
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(key: &str, value: &str) -> Entry {
        Entry::new(key, value)
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let file = FlatFile::new(dir.path().join("store.txt"));

        let entries = vec![
            entry("name", "John"),
            entry("path", "C:\\Users\\j"),
            entry("note", "line1\nline2"),
            entry("time", "12:30:00"),
        ];
        file.save(&entries).unwrap();

        assert_eq!(file.load().unwrap(), entries);
    }

    #[test]
    fn test_absent_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let file = FlatFile::new(dir.path().join("missing.txt"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("store.txt");
        let file = FlatFile::new(&path);

        file.save(&[entry("k", "v")]).unwrap();
        assert!(path.exists());
        assert_eq!(file.load().unwrap(), vec![entry("k", "v")]);
    }

    #[test]
    fn test_save_truncates_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let file = FlatFile::new(dir.path().join("store.txt"));

        file.save(&[entry("a", "1"), entry("b", "2"), entry("c", "3")]).unwrap();
        file.save(&[entry("a", "1")]).unwrap();

        assert_eq!(file.load().unwrap(), vec![entry("a", "1")]);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.txt");
        fs::write(&path, "good:value\nno separator\n\nalso::no::separator\nlast:one").unwrap();

        let entries = FlatFile::new(&path).load().unwrap();
        assert_eq!(entries, vec![entry("good", "value"), entry("last", "one")]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.txt");
        fs::write(&path, "\n\nk:v\n\n").unwrap();

        assert_eq!(FlatFile::new(&path).load().unwrap(), vec![entry("k", "v")]);
    }

    #[test]
    fn test_empty_store_saves_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.txt");
        let file = FlatFile::new(&path);

        file.save(&[]).unwrap();
        assert!(path.exists());
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_content_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.txt");
        fs::write(&path, [0xFFu8, 0xFE, 0x00]).unwrap();

        assert!(FlatFile::new(&path).load().is_err());
    }

    #[test]
    fn test_save_into_blocked_directory_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let file = FlatFile::new(blocker.join("store.txt"));
        assert!(file.save(&[entry("k", "v")]).is_err());
    }
}
