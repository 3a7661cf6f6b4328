//! Loading pre-tokenized documents from disk.
//!
//! Accepts a `.json` file holding an array of documents (or a single one), a
//! `.jsonl` file with one document per line, or a directory walked for both.
//! Each document looks like:
//!
//! ```json
//! {"doc_id": "doc_1", "tweet": ["term", "term"], "date": "...", "url": "...", "hashtags": ["..."]}
//! ```
//!
//! `doc_id` and `tweet` are required; a missing one fails the whole load
//! rather than dropping the entry.

use crate::error::CorpusError;
use crate::index::{DocMeta, Document};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    doc_id: Option<RawId>,
    tweet: Option<Vec<String>>,
    date: Option<String>,
    url: Option<String>,
    hashtags: Option<Vec<String>>,
}

impl RawDocument {
    fn into_document(self, path: &Path, entry: usize) -> Result<Document, CorpusError> {
        let missing = |field| CorpusError::MissingField { path: path.to_path_buf(), entry, field };
        let id = match self.doc_id.ok_or_else(|| missing("doc_id"))? {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        };
        let terms = self.tweet.ok_or_else(|| missing("tweet"))?;
        Ok(Document {
            id,
            terms,
            meta: DocMeta {
                date: self.date.unwrap_or_default(),
                url: self.url.unwrap_or_default(),
                hashtags: self.hashtags.unwrap_or_default(),
            },
        })
    }
}

/// Load every document under `path`, in file order.
///
/// Directories are walked recursively and their `.json` / `.jsonl` files are
/// read in path order so repeated loads see the same corpus.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<Document>, CorpusError> {
    let path = path.as_ref();
    let files = if path.is_dir() {
        corpus_files(path)?
    } else if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        return Err(CorpusError::NotFound(path.to_path_buf()));
    };

    let mut docs = Vec::new();
    for file in &files {
        let before = docs.len();
        if has_extension(file, "jsonl") {
            load_jsonl(file, &mut docs)?;
        } else {
            load_json(file, &mut docs)?;
        }
        tracing::debug!(file = %file.display(), docs = docs.len() - before, "loaded corpus file");
    }
    tracing::info!(path = %path.display(), files = files.len(), docs = docs.len(), "loaded corpus");
    Ok(docs)
}

fn corpus_files(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let p = entry.path();
        if p.is_file() && (has_extension(p, "json") || has_extension(p, "jsonl")) {
            files.push(p.to_path_buf());
        }
    }
    Ok(files)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(ext)
}

fn open(path: &Path) -> Result<BufReader<File>, CorpusError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| CorpusError::Io { path: path.to_path_buf(), source })
}

fn load_jsonl(path: &Path, docs: &mut Vec<Document>) -> Result<(), CorpusError> {
    for (i, line) in open(path)?.lines().enumerate() {
        let line = line.map_err(|source| CorpusError::Io { path: path.to_path_buf(), source })?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = i + 1;
        let raw: RawDocument = serde_json::from_str(&line)
            .map_err(|source| CorpusError::Entry { path: path.to_path_buf(), entry, source })?;
        docs.push(raw.into_document(path, entry)?);
    }
    Ok(())
}

fn load_json(path: &Path, docs: &mut Vec<Document>) -> Result<(), CorpusError> {
    let json: serde_json::Value = serde_json::from_reader(open(path)?)
        .map_err(|source| CorpusError::Json { path: path.to_path_buf(), source })?;
    let values = match json {
        serde_json::Value::Array(arr) => arr,
        obj @ serde_json::Value::Object(_) => vec![obj],
        _ => return Err(CorpusError::UnexpectedShape { path: path.to_path_buf() }),
    };
    for (i, value) in values.into_iter().enumerate() {
        let entry = i + 1;
        let raw: RawDocument = serde_json::from_value(value)
            .map_err(|source| CorpusError::Entry { path: path.to_path_buf(), entry, source })?;
        docs.push(raw.into_document(path, entry)?);
    }
    Ok(())
}
