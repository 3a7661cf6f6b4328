//! Inverted index and TF-IDF ranking over a static corpus of pre-tokenized
//! short documents.
//!
//! The index is built once with [`build_index`] and is read-only afterward, so
//! it can be shared across threads without locking.

pub mod corpus;
pub mod error;
pub mod index;
pub mod query;
pub mod rank;
pub mod tokenizer;

pub use corpus::load_corpus;
pub use error::{BuildError, CorpusError};
pub use index::{build_index, DocMeta, DocOrd, Document, InvertedIndex, TermId};
pub use query::Query;
pub use rank::{rank, Candidates, IdfWeighting, Ranker, ScoredDoc};
