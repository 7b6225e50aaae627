use crate::slam::{SlamAnswer, UserSlamData};

#[derive(Debug)]
pub enum StoreError {
    /// No document exists for the owner key. A legitimate state for reads;
    /// an error only for appends.
    NotFound,
    /// The owner key cannot name a document (empty or unsafe characters).
    BadKey,
    Io(std::io::Error),
    Data(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => f.write_str("document not found"),
            StoreError::BadKey => f.write_str("invalid owner key"),
            StoreError::Io(err) => write!(f, "storage io error: {err}"),
            StoreError::Data(err) => write!(f, "storage data error: {err}"),
        }
    }
}

/// One collection of per-owner slam documents, keyed by the owner identity
/// string. `append_answer` is the additive primitive: implementations must
/// guarantee that concurrent appends to the same key never lose a
/// submission, so callers never read-modify-write the answers array.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    type GetFut<'a>: Future<Output = Result<Option<UserSlamData>, StoreError>> + Send + 'a
    where
        Self: 'a;
    type SetFut<'a>: Future<Output = Result<(), StoreError>> + Send + 'a
    where
        Self: 'a;
    type AppendFut<'a>: Future<Output = Result<(), StoreError>> + Send + 'a
    where
        Self: 'a;

    /// Full document, or `None` when the owner has no document. Never
    /// errors for absence.
    fn get<'a>(&'a self, owner: &'a str) -> Self::GetFut<'a>;

    /// Full overwrite of the owner's document.
    fn set<'a>(&'a self, owner: &'a str, document: &'a UserSlamData) -> Self::SetFut<'a>;

    /// Adds one answer to the owner's document. Fails with
    /// `StoreError::NotFound` when no document exists.
    fn append_answer<'a>(&'a self, owner: &'a str, answer: &'a SlamAnswer) -> Self::AppendFut<'a>;
}
