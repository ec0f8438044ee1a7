use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

use crate::error::Result;

const META_KEY: &[u8] = b"meta";
const DOCUMENTS_TREE: &str = "documents";
const STORE_VERSION: u32 = 1;

/// Written once, when a store is first created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreMeta {
    pub created_at: String,
    pub version: u32,
}

/// What the store knows about one fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub first_seen: String,
    pub times_seen: u64,
}

/// Handle to the persistent store. One per process, shared as [`SharedConnection`].
#[derive(Debug)]
pub struct Connection {
    db: sled::Db,
    documents: sled::Tree,
    path: Option<PathBuf>,
}

pub type SharedConnection = Arc<Connection>;

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

impl Connection {
    /// Open (creating if needed) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = sled::open(&path)?;
        let conn = Self::from_db(db, Some(path))?;
        info!(path = ?conn.path, "storage opened");
        Ok(conn)
    }

    /// A store that is removed when the connection is dropped.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db, None)
    }

    fn from_db(db: sled::Db, path: Option<PathBuf>) -> Result<Self> {
        if db.get(META_KEY)?.is_none() {
            let meta = StoreMeta { created_at: now_rfc3339(), version: STORE_VERSION };
            db.insert(META_KEY, serde_json::to_vec_pretty(&meta)?)?;
        }
        let documents = db.open_tree(DOCUMENTS_TREE)?;
        Ok(Self { db, documents, path })
    }

    /// Directory backing the store; `None` for temporary stores.
    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    pub fn meta(&self) -> Result<Option<StoreMeta>> {
        match self.db.get(META_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Note one more sighting of `fingerprint` and return the updated record.
    pub fn record_document(&self, fingerprint: &str) -> Result<DocumentRecord> {
        loop {
            let current = self.documents.get(fingerprint)?;
            let next = match &current {
                Some(bytes) => {
                    let mut record: DocumentRecord = bincode::deserialize(bytes)?;
                    record.times_seen += 1;
                    record
                }
                None => DocumentRecord { first_seen: now_rfc3339(), times_seen: 1 },
            };
            let encoded = bincode::serialize(&next)?;
            if self.documents.compare_and_swap(fingerprint, current, Some(encoded))?.is_ok() {
                debug!(fingerprint, times_seen = next.times_seen, "document recorded");
                return Ok(next);
            }
        }
    }

    pub fn document_record(&self, fingerprint: &str) -> Result<Option<DocumentRecord>> {
        match self.documents.get(fingerprint)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Number of distinct fingerprints recorded.
    pub fn distinct_documents(&self) -> usize { self.documents.len() }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Target {
    Path(PathBuf),
    Temporary,
}

/// Lazily opens exactly one [`Connection`] and hands out the same `Arc` on
/// every call.
///
/// Construct one in `main` and pass it (or the connection it yields) to the
/// components that need storage.
#[derive(Debug)]
pub struct ConnectionProvider {
    target: Target,
    cell: OnceCell<SharedConnection>,
}

impl ConnectionProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { target: Target::Path(path.as_ref().to_path_buf()), cell: OnceCell::new() }
    }

    pub fn temporary() -> Self {
        Self { target: Target::Temporary, cell: OnceCell::new() }
    }

    /// The shared connection, opening it on first call.
    pub fn get(&self) -> Result<SharedConnection> {
        self.cell
            .get_or_try_init(|| {
                let conn = match &self.target {
                    Target::Path(path) => Connection::open(path)?,
                    Target::Temporary => Connection::temporary()?,
                };
                Ok(Arc::new(conn))
            })
            .map(Arc::clone)
    }

    pub fn is_initialized(&self) -> bool { self.cell.get().is_some() }
}
