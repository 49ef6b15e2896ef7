use crate::DocId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Failures surfaced by the ranking engine. Nothing here is retried
/// internally; callers decide whether to rebuild, re-request, or abort.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A persisted snapshot is absent or missing one of its artifacts.
    /// Recoverable by building and saving the index.
    #[error("index snapshot not found; build the index first")]
    IndexNotBuilt,

    /// `build` was called on an index that already holds documents.
    /// Rebuilding in place is unsupported; start from a fresh index.
    #[error("index already built; rebuilding in place is not supported")]
    AlreadyBuilt,

    /// The corpus handed to `build` repeats a document id.
    #[error("duplicate document id {0} in corpus")]
    DuplicateDocument(DocId),

    /// A single-term lookup received input that did not normalize to
    /// exactly one token.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Plain-IDF lookup on a term absent from the indexed vocabulary.
    #[error("term {0:?} is not in the index vocabulary")]
    UnknownTerm(String),

    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The semantic collaborator failed or returned malformed entries.
    /// Fusion never silently degrades to lexical-only ranking.
    #[error("semantic source failed: {0}")]
    SemanticSource(String),

    /// Snapshot artifacts are present but structurally inconsistent.
    /// Never auto-repaired.
    #[error("corrupt index snapshot: {0}")]
    CorruptSnapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Codec(#[from] bincode::Error),
}
