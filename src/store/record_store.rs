//! A `HashIndex` bound to a backing file.
//!
//! The file is read once when the store is opened and written back in
//! full by `save`.  Nothing is persisted incrementally: changes made
//! after the last successful `save` live only in memory.
//!
//! Values are held in plaintext in memory; the optional obfuscation
//! codec is applied at the file boundary only.
//!
//! The store assumes exclusive single-process access to its file.
//! There is no locking, so two processes flushing the same file race
//! and the last writer wins.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::codec::ObfuscationCodec;
use crate::errors::{CredVaultError, Result};

use super::format;
use super::index::{HashIndex, Record};

/// Persistent associative store of `(key, owner) -> value` records.
pub struct RecordStore {
    /// Path to the backing file.
    path: PathBuf,

    /// In-memory table, populated from `path` on open.
    index: HashIndex,

    /// Applied to `value` and `owner` on save, reversed on load.
    codec: Option<Box<dyn ObfuscationCodec>>,

    /// Lines skipped during load because they could not be parsed.
    skipped: usize,

    /// `true` when the table differs from what was last loaded or saved.
    dirty: bool,
}

impl RecordStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the store backed by `path`.
    ///
    /// A missing file yields an empty store.  Malformed lines are logged
    /// and skipped.  An unreadable file, or more records than
    /// `capacity` can hold, is an error.
    pub fn open(
        path: &Path,
        capacity: usize,
        codec: Option<Box<dyn ObfuscationCodec>>,
    ) -> Result<Self> {
        let mut store = Self {
            path: path.to_path_buf(),
            index: HashIndex::new(capacity)?,
            codec,
            skipped: 0,
            dirty: false,
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no backing file, starting empty");
            return Ok(store);
        }

        let contents = fs::read(path)?;
        for (lineno, raw) in contents.split(|&b| b == b'\n').enumerate() {
            let decoded = std::str::from_utf8(raw)
                .map_err(|_| CredVaultError::MalformedRecord("line is not valid UTF-8".into()))
                .and_then(|line| {
                    let line = line.strip_suffix('\r').unwrap_or(line);
                    if line.trim().is_empty() {
                        Ok(None)
                    } else {
                        format::decode_line(line, store.codec.as_deref()).map(Some)
                    }
                });
            match decoded {
                Ok(None) => {}
                Ok(Some(record)) => {
                    store
                        .index
                        .insert(&record.key, &record.value, &record.owner)?;
                }
                Err(e) => {
                    store.skipped += 1;
                    tracing::warn!(
                        path = %path.display(),
                        line = lineno + 1,
                        "skipping record: {e}"
                    );
                }
            }
        }

        tracing::debug!(
            path = %path.display(),
            records = store.index.len(),
            skipped = store.skipped,
            codec = store.codec_name(),
            "loaded store"
        );
        Ok(store)
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Add a record.  Duplicates are allowed; see `HashIndex::insert`.
    pub fn insert(&mut self, key: &str, value: &str, owner: &str) -> Result<()> {
        self.index.insert(key, value, owner)?;
        self.dirty = true;
        Ok(())
    }

    /// Return the value stored for `(key, owner)`.
    pub fn get(&self, key: &str, owner: &str) -> Option<&str> {
        self.index.get(key, owner)
    }

    pub fn contains(&self, key: &str, owner: &str) -> bool {
        self.index.contains(key, owner)
    }

    /// Remove one entry for `(key, owner)`.  Returns `true` if one existed.
    pub fn remove(&mut self, key: &str, owner: &str) -> bool {
        let removed = self.index.remove(key, owner).is_some();
        self.dirty |= removed;
        removed
    }

    /// Remove every entry for `(key, owner)`, returning how many went.
    pub fn remove_all(&mut self, key: &str, owner: &str) -> usize {
        let mut count = 0;
        while self.remove(key, owner) {
            count += 1;
        }
        count
    }

    /// Remove every record owned by `owner` (full-table scan).
    pub fn remove_owned_by(&mut self, owner: &str) -> usize {
        let removed = self.index.remove_where(|r| r.owner == owner).len();
        self.dirty |= removed > 0;
        removed
    }

    /// All `(key, value)` pairs owned by `owner`, in table order.
    pub fn records_owned_by(&self, owner: &str) -> Vec<(String, String)> {
        self.index
            .iter()
            .filter(|r| r.owner == owner)
            .map(|r| (r.key.clone(), r.value.clone()))
            .collect()
    }

    /// Iterate over every live record.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.index.iter()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write every live record to the backing file atomically.
    ///
    /// Records are written to a temp file in the same directory and
    /// renamed over the target, so a failed save leaves the previous
    /// file intact.
    pub fn save(&mut self) -> Result<()> {
        let codec = self.codec.as_deref();
        let mut buf = String::new();
        for record in self.index.records_in_probe_order() {
            buf.push_str(&format::encode_line(record, codec));
            buf.push('\n');
        }

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let tmp_path = parent.join(format!(
            ".{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        ));

        write_private(&tmp_path, buf.as_bytes())?;
        fs::rename(&tmp_path, &self.path)?;

        self.dirty = false;
        tracing::debug!(
            path = %self.path.display(),
            records = self.index.len(),
            "saved store"
        );
        Ok(())
    }

    /// Save and release the store, reporting any write failure.
    pub fn close(mut self) -> Result<()> {
        let result = self.save();
        // The caller owns the error now; don't retry on drop.
        self.dirty = false;
        result
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Lines skipped as malformed during the last load.
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    /// Returns `true` if there are changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn codec_name(&self) -> &'static str {
        self.codec.as_ref().map_or("none", |c| c.name())
    }
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("path", &self.path)
            .field("records", &self.index.len())
            .field("codec", &self.codec_name())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Drop for RecordStore {
    /// Last-chance flush for stores that were not closed explicitly.
    fn drop(&mut self) {
        if !self.dirty {
            return;
        }
        if let Err(e) = self.save() {
            tracing::error!(
                path = %self.path.display(),
                "failed to save store on drop, unsaved changes lost: {e}"
            );
        }
    }
}

/// Write `data` to `path`, owner read/write only on Unix.
fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::XorCodec;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::open(&dir.path().join("none.txt"), 100, None).unwrap();
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn save_then_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.txt");

        let mut store = RecordStore::open(&path, 100, None).unwrap();
        store.insert("github", "p@ss,1", "alice").unwrap();
        store.insert("alice", "pw", "").unwrap();
        store.close().unwrap();

        let store = RecordStore::open(&path, 100, None).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("github", "alice"), Some("p@ss,1"));
        assert_eq!(store.get("alice", ""), Some("pw"));
    }

    #[test]
    fn drop_flushes_unsaved_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.txt");
        {
            let mut store = RecordStore::open(&path, 100, None).unwrap();
            store.insert("email", "x", "bob").unwrap();
        }
        let store = RecordStore::open(&path, 100, None).unwrap();
        assert_eq!(store.get("email", "bob"), Some("x"));
    }

    #[test]
    fn clean_store_does_not_create_file_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.txt");
        drop(RecordStore::open(&path, 100, None).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.txt");
        fs::write(&path, "good,v,o\nbroken line\n\nalso,good,\nx,y,z,w\n").unwrap();

        let store = RecordStore::open(&path, 100, None).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.skipped_lines(), 2);
        assert_eq!(store.get("good", "o"), Some("v"));
        assert_eq!(store.get("also", ""), Some("good"));
    }

    #[test]
    fn non_utf8_line_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.txt");
        fs::write(&path, b"good,v,o\nbad,\xff\xfe,o\nalso,w,o\n").unwrap();

        let store = RecordStore::open(&path, 100, None).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.skipped_lines(), 1);
        assert_eq!(store.get("good", "o"), Some("v"));
        assert_eq!(store.get("also", "o"), Some("w"));
    }

    #[test]
    fn codec_hides_values_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.txt");
        let codec = || -> Option<Box<dyn ObfuscationCodec>> {
            Some(Box::new(XorCodec::new(b"key").unwrap()))
        };

        let mut store = RecordStore::open(&path, 100, codec()).unwrap();
        store.insert("github", "hunter2", "alice").unwrap();
        store.close().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("github,"));
        assert!(!raw.contains("hunter2"));
        assert!(!raw.contains("alice"));

        let store = RecordStore::open(&path, 100, codec()).unwrap();
        assert_eq!(store.get("github", "alice"), Some("hunter2"));
    }

    #[test]
    fn overfull_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.txt");
        fs::write(&path, "a,1,\nb,2,\nc,3,\n").unwrap();

        let result = RecordStore::open(&path, 2, None);
        assert!(matches!(
            result,
            Err(crate::errors::CredVaultError::CapacityExhausted { capacity: 2 })
        ));
    }

    #[test]
    fn remove_owned_by_leaves_other_owners() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::open(&dir.path().join("v.txt"), 100, None).unwrap();
        store.insert("github", "a", "alice").unwrap();
        store.insert("github", "b", "bob").unwrap();

        assert_eq!(store.remove_owned_by("alice"), 1);
        assert!(!store.contains("github", "alice"));
        assert!(store.contains("github", "bob"));
    }
}
