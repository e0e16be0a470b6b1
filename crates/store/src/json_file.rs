use std::fs;
use std::io::{self, BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::r#trait::{Store, StoreError};
use crate::Snapshot;

const BOOKS_FILE: &str = "books.json";
const USERS_FILE: &str = "users.json";
const TRANSACTIONS_FILE: &str = "transactions.json";
const FILES: [&str; 3] = [BOOKS_FILE, USERS_FILE, TRANSACTIONS_FILE];

/// Present while staged files are being moved into place.
const PENDING_MARKER: &str = "save.pending";

/// One pretty-printed JSON array per record set in a data directory.
///
/// A save stages all three files as `<name>.tmp`, then drops a
/// `save.pending` marker, then renames the staged files into place and
/// removes the marker. `load` first finishes any commit the marker shows was
/// interrupted, and throws away staged files without a marker. Either way the
/// three files always come from the same save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn staged(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.tmp"))
    }

    fn marker(&self) -> PathBuf {
        self.data_dir.join(PENDING_MARKER)
    }

    fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn read_records<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, StoreError> {
        let path = self.data_dir.join(name);
        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no data file yet; starting empty");
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_reader(BufReader::new(file))
            .map_err(|source| StoreError::Serialization { path, source })
    }

    /// Write `records` to the staging file for `name`, fsynced and closed.
    fn write_staged<T: Serialize>(&self, name: &str, records: &[T]) -> Result<(), StoreError> {
        let tmp = self.staged(name);

        let file = fs::File::create(&tmp).map_err(Self::io_err(&tmp))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records).map_err(|source| {
            StoreError::Serialization {
                path: tmp.clone(),
                source,
            }
        })?;
        let file = writer
            .into_inner()
            .map_err(|e| StoreError::Io {
                path: tmp.clone(),
                source: e.into_error(),
            })?;
        file.sync_all().map_err(Self::io_err(&tmp))
    }

    fn stage(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.write_staged(BOOKS_FILE, &snapshot.books)?;
        self.write_staged(USERS_FILE, &snapshot.users)?;
        self.write_staged(TRANSACTIONS_FILE, &snapshot.transactions)
    }

    fn mark_pending(&self) -> Result<(), StoreError> {
        let marker = self.marker();
        fs::File::create(&marker)
            .and_then(|file| file.sync_all())
            .map_err(Self::io_err(&marker))?;
        sync_dir(&self.data_dir).map_err(Self::io_err(&self.data_dir))
    }

    /// Move every staged file into place, then clear the marker.
    ///
    /// Idempotent: files already renamed by an interrupted run are skipped.
    fn commit_staged(&self) -> Result<(), StoreError> {
        for name in FILES {
            let tmp = self.staged(name);
            match fs::rename(&tmp, self.data_dir.join(name)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Io { path: tmp, source }),
            }
        }
        sync_dir(&self.data_dir).map_err(Self::io_err(&self.data_dir))?;
        let marker = self.marker();
        fs::remove_file(&marker).map_err(Self::io_err(&marker))
    }

    fn discard_staged(&self) -> Result<(), StoreError> {
        for name in FILES {
            let tmp = self.staged(name);
            match fs::remove_file(&tmp) {
                Ok(()) => tracing::warn!(path = %tmp.display(), "discarded unfinished save"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Io { path: tmp, source }),
            }
        }
        Ok(())
    }

    /// Bring the directory back to one complete save.
    fn recover(&self) -> Result<(), StoreError> {
        if self.marker().exists() {
            tracing::warn!(dir = %self.data_dir.display(), "finishing interrupted save");
            self.commit_staged()
        } else {
            self.discard_staged()
        }
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        self.recover()?;
        let snapshot = Snapshot {
            books: self.read_records(BOOKS_FILE)?,
            users: self.read_records(USERS_FILE)?,
            transactions: self.read_records(TRANSACTIONS_FILE)?,
        };
        tracing::info!(
            dir = %self.data_dir.display(),
            books = snapshot.books.len(),
            users = snapshot.users.len(),
            transactions = snapshot.transactions.len(),
            "loaded library data"
        );
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).map_err(Self::io_err(&self.data_dir))?;
        self.stage(snapshot)?;
        self.mark_pending()?;
        self.commit_staged()?;
        tracing::debug!(dir = %self.data_dir.display(), "saved library data");
        Ok(())
    }
}
