//! # File-Backed Ledger Store
//!
//! One JSON object per line in `<dir>/<table>.jsonl`, in height order. The
//! file is only ever appended to.
//!
//! ## Single writer
//!
//! An exclusive `flock` is held on the ledger file for the lifetime of the
//! store. A second handle on the same file, in this process or another,
//! fails to open with [`LedgerError::Locked`] instead of appending against
//! an index that no longer matches the file.
//!
//! ## Replay
//!
//! On open every line is decoded and schema-checked, and the replayed chain
//! is verified before the store accepts writes, so a tampered file is
//! refused instead of extended. A final line with no terminating newline
//! is a write that never completed its sync; it was never acknowledged and
//! is truncated away.
//!
//! ## Failed writes
//!
//! If writing or syncing a record fails, the file is cut back to its length
//! before the write. If that also fails the handle refuses further appends
//! with [`LedgerError::Poisoned`]; reopening repairs the torn tail.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::block::CalendarBlock;
use crate::chain::verify_chain;
use crate::error::LedgerError;
use crate::store::{ChainIndex, LedgerStore};
use crate::validation::validate_block;

/// Append-only JSON-lines ledger store.
#[derive(Debug)]
pub struct FileLedgerStore {
    path: PathBuf,
    inner: RwLock<FileInner>,
}

#[derive(Debug)]
struct FileInner {
    index: ChainIndex,
    /// Append handle; holds the exclusive lock until dropped.
    file: File,
    poisoned: bool,
}

impl FileLedgerStore {
    /// Open (or create) the ledger file for `table_name` inside `dir`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Locked`] if another handle holds the file,
    /// [`LedgerError::CorruptRecord`] or [`LedgerError::InvalidRecord`] for
    /// a bad line, and the chain integrity error of the first broken block.
    pub fn open(dir: impl AsRef<Path>, table_name: &str) -> Result<Self, LedgerError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{table_name}.jsonl"));

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        fs2::FileExt::try_lock_exclusive(&file).map_err(|source| LedgerError::Locked {
            path: path.clone(),
            source,
        })?;

        let index = replay(&file, &path)?;
        Ok(Self {
            path,
            inner: RwLock::new(FileInner {
                index,
                file,
                poisoned: false,
            }),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Rebuild the index from the locked file, cutting off an unterminated
/// tail first.
fn replay(file: &File, path: &Path) -> Result<ChainIndex, LedgerError> {
    let mut bytes = Vec::new();
    let mut reader = file.try_clone()?;
    reader.seek(SeekFrom::Start(0))?;
    reader.read_to_end(&mut bytes)?;

    if bytes.last().is_some_and(|b| *b != b'\n') {
        let keep = bytes.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
        tracing::warn!(
            path = %path.display(),
            torn_bytes = bytes.len() - keep,
            "truncating unterminated tail record from ledger file"
        );
        file.set_len(keep as u64)?;
        file.sync_all()?;
        bytes.truncate(keep);
    }

    let mut index = ChainIndex::default();
    for (i, line) in BufRead::lines(bytes.as_slice()).enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let block: CalendarBlock = serde_json::from_str(&line)
            .map_err(|source| LedgerError::CorruptRecord { line: i + 1, source })?;
        validate_block(&block)
            .map_err(|source| LedgerError::InvalidRecord { line: i + 1, source })?;
        index.check_insert(&block)?;
        index.insert(block);
    }

    let verified = verify_chain(index.blocks())?;
    tracing::debug!(
        path = %path.display(),
        blocks = verified.count,
        "replayed ledger file"
    );
    Ok(index)
}

/// What a record write needs from the backing file.
trait RecordFile: Write {
    fn byte_len(&self) -> io::Result<u64>;
    fn sync(&mut self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl RecordFile for File {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

#[derive(Debug)]
struct RecordWriteError {
    source: io::Error,
    rolled_back: bool,
}

/// Write and sync `line`, or cut the file back to where it was.
fn write_record<F: RecordFile>(file: &mut F, line: &[u8]) -> Result<(), RecordWriteError> {
    let len = file.byte_len().map_err(|source| RecordWriteError {
        source,
        rolled_back: true,
    })?;
    let result = file.write_all(line).and_then(|()| file.sync());
    let Err(source) = result else {
        return Ok(());
    };
    let rolled_back = file.truncate(len).is_ok();
    Err(RecordWriteError {
        source,
        rolled_back,
    })
}

impl LedgerStore for FileLedgerStore {
    fn append(&self, block: CalendarBlock) -> Result<(), LedgerError> {
        let mut inner = self.inner.write();
        if inner.poisoned {
            return Err(LedgerError::Poisoned {
                path: self.path.clone(),
            });
        }
        inner.index.check_insert(&block)?;

        let mut line = serde_json::to_vec(&block)?;
        line.push(b'\n');
        if let Err(failure) = write_record(&mut inner.file, &line) {
            if failure.rolled_back {
                tracing::warn!(
                    id = block.id,
                    error = %failure.source,
                    "ledger write failed; file rolled back"
                );
            } else {
                inner.poisoned = true;
                tracing::error!(
                    id = block.id,
                    path = %self.path.display(),
                    error = %failure.source,
                    "ledger write failed and could not be rolled back"
                );
            }
            return Err(failure.source.into());
        }

        inner.index.insert(block);
        Ok(())
    }

    fn head(&self) -> Result<Option<CalendarBlock>, LedgerError> {
        Ok(self.inner.read().index.head().cloned())
    }

    fn range_scan(&self, from: u64, limit: usize) -> Result<Vec<CalendarBlock>, LedgerError> {
        Ok(self.inner.read().index.range(from, limit))
    }

    fn len(&self) -> Result<u64, LedgerError> {
        Ok(self.inner.read().index.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory file that accepts `budget` bytes and then fails.
    struct FlakyFile {
        data: Vec<u8>,
        budget: usize,
        fail_sync: bool,
        fail_truncate: bool,
    }

    impl FlakyFile {
        fn new(data: &[u8], budget: usize) -> Self {
            Self {
                data: data.to_vec(),
                budget,
                fail_sync: false,
                fail_truncate: false,
            }
        }
    }

    impl Write for FlakyFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
            }
            let n = buf.len().min(self.budget);
            self.data.extend_from_slice(&buf[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl RecordFile for FlakyFile {
        fn byte_len(&self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn sync(&mut self) -> io::Result<()> {
            if self.fail_sync {
                return Err(io::Error::new(io::ErrorKind::Other, "sync failed"));
            }
            Ok(())
        }

        fn truncate(&mut self, len: u64) -> io::Result<()> {
            if self.fail_truncate {
                return Err(io::Error::new(io::ErrorKind::Other, "truncate failed"));
            }
            self.data.truncate(len as usize);
            Ok(())
        }
    }

    #[test]
    fn complete_write_is_kept() {
        let mut f = FlakyFile::new(b"{}\n", 64);
        write_record(&mut f, b"{\"id\":1}\n").unwrap();
        assert_eq!(f.data, b"{}\n{\"id\":1}\n");
    }

    #[test]
    fn short_write_is_rolled_back() {
        let mut f = FlakyFile::new(b"{}\n", 4);
        let err = write_record(&mut f, b"{\"id\":1}\n").unwrap_err();
        assert!(err.rolled_back);
        assert_eq!(f.data, b"{}\n");
    }

    #[test]
    fn failed_sync_is_rolled_back() {
        let mut f = FlakyFile::new(b"{}\n", 64);
        f.fail_sync = true;
        let err = write_record(&mut f, b"{\"id\":1}\n").unwrap_err();
        assert!(err.rolled_back);
        assert_eq!(f.data, b"{}\n");
    }

    #[test]
    fn failed_rollback_is_reported() {
        let mut f = FlakyFile::new(b"{}\n", 4);
        f.fail_truncate = true;
        let err = write_record(&mut f, b"{\"id\":1}\n").unwrap_err();
        assert!(!err.rolled_back);
        assert_eq!(f.data, b"{}\n{\"id");
    }

    #[test]
    fn poisoned_store_refuses_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::open(dir.path(), "calendar").unwrap();
        store.inner.write().poisoned = true;

        let block: CalendarBlock = serde_json::from_value(serde_json::json!({
            "id": 0,
            "time": 1,
            "version": 1,
            "stackId": "a.example.org",
            "type": "gen",
            "dataId": "0",
            "dataVal": "00",
            "prevHash": "0".repeat(64),
            "hash": "0".repeat(64),
            "sig": "00:AA==",
        }))
        .unwrap();
        let err = store.append(block).unwrap_err();
        assert!(matches!(err, LedgerError::Poisoned { .. }));
        assert_eq!(store.len().unwrap(), 0);
    }
}
