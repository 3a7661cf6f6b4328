use std::path::PathBuf;
use thiserror::Error;

/// Reasons the index cannot be built from a corpus.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("document at position {position} has an empty id")]
    EmptyId { position: usize },
    #[error("document id {0:?} appears more than once")]
    DuplicateId(String),
}

/// Reasons a corpus cannot be loaded from disk.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// `entry` is 1-based: the array position for `.json`, the line for `.jsonl`.
    #[error("entry {entry} in {} is not a valid document: {source}", .path.display())]
    Entry {
        path: PathBuf,
        entry: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("entry {entry} in {} is missing required field `{field}`", .path.display())]
    MissingField {
        path: PathBuf,
        entry: usize,
        field: &'static str,
    },
    #[error("{} must hold a JSON array or object", .path.display())]
    UnexpectedShape { path: PathBuf },
    #[error("corpus path {} is neither a file nor a directory", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

/// Rejected value for [`crate::IdfWeighting`].
#[derive(Debug, Error)]
#[error("unknown idf weighting {0:?}, expected `standard` or `smoothed`")]
pub struct UnknownWeighting(pub String);
