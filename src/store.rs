use crate::ports::{DocumentStore, StoreError};
use crate::slam::{SlamAnswer, UserSlamData};

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

pub(crate) const BOOKS_DIR: &str = "books";
const MAX_OWNER_KEY_LEN: usize = 64;

/// File-backed document store: one JSON file per owner under
/// `<data_root>/books/`. Every write goes through `write_lock`, so an
/// append re-reads the current document, pushes, and rewrites atomically
/// without ever racing another writer. Reads stay lock-free: the
/// temp-file-plus-rename write means a reader always sees a complete
/// document.
#[derive(Clone)]
pub struct JsonDocumentStore {
    books_dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonDocumentStore {
    pub fn new(data_root: &Path) -> Self {
        Self {
            books_dir: data_root.join(BOOKS_DIR),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn book_path(&self, owner: &str) -> Result<PathBuf, StoreError> {
        if !is_safe_owner_key(owner) {
            return Err(StoreError::BadKey);
        }
        Ok(self.books_dir.join(format!("{owner}.json")))
    }

    fn read_document(path: &Path) -> Result<Option<UserSlamData>, StoreError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err)),
        };
        let document = serde_json::from_str(&contents).map_err(StoreError::Data)?;
        Ok(Some(document))
    }

    fn write_document(&self, path: &Path, document: &UserSlamData) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.books_dir).map_err(StoreError::Io)?;
        let encoded = serde_json::to_string_pretty(document).map_err(StoreError::Data)?;
        atomic_write(path, encoded.as_bytes()).map_err(StoreError::Io)
    }
}

/// Owner keys come straight from URLs; anything that could escape the
/// books directory is rejected before it touches the filesystem.
fn is_safe_owner_key(owner: &str) -> bool {
    !owner.is_empty()
        && owner.len() <= MAX_OWNER_KEY_LEN
        && owner
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

impl DocumentStore for JsonDocumentStore {
    type GetFut<'a>
        = Pin<Box<dyn Future<Output = Result<Option<UserSlamData>, StoreError>> + Send + 'a>>
    where
        Self: 'a;
    type SetFut<'a>
        = Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>
    where
        Self: 'a;
    type AppendFut<'a>
        = Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>
    where
        Self: 'a;

    fn get<'a>(&'a self, owner: &'a str) -> Self::GetFut<'a> {
        Box::pin(async move {
            let path = match self.book_path(owner) {
                Ok(path) => path,
                // An unsafe key can never have a document.
                Err(StoreError::BadKey) => return Ok(None),
                Err(err) => return Err(err),
            };
            Self::read_document(&path)
        })
    }

    fn set<'a>(&'a self, owner: &'a str, document: &'a UserSlamData) -> Self::SetFut<'a> {
        Box::pin(async move {
            let path = self.book_path(owner)?;
            let _guard = self.write_lock.lock().expect("store write lock");
            self.write_document(&path, document)
        })
    }

    fn append_answer<'a>(&'a self, owner: &'a str, answer: &'a SlamAnswer) -> Self::AppendFut<'a> {
        Box::pin(async move {
            let path = self.book_path(owner)?;
            let _guard = self.write_lock.lock().expect("store write lock");
            let mut document = Self::read_document(&path)?.ok_or(StoreError::NotFound)?;
            document.answers.push(answer.clone());
            self.write_document(&path, &document)
        })
    }
}

pub(crate) fn atomic_write(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("missing parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("book.json");
    let pid = std::process::id();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    for attempt in 0..10u32 {
        let temp_name = format!(".{}.tmp-{}-{}-{}", file_name, pid, nanos, attempt);
        let temp_path = parent.join(temp_name);
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(mut file) => {
                use std::io::Write as _;
                file.write_all(contents)?;
                file.flush()?;
                std::fs::rename(&temp_path, path)?;
                return Ok(());
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to create temp file",
    ))
}
