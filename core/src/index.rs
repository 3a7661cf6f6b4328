use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

pub type TermId = u32;
/// Position of a document in corpus order.
pub type DocOrd = u32;

/// Display attributes carried through the index untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// A pre-tokenized corpus entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "doc_id")]
    pub id: String,
    #[serde(rename = "tweet")]
    pub terms: Vec<String>,
    #[serde(flatten)]
    pub meta: DocMeta,
}

impl Document {
    pub fn new<S: Into<String>>(id: impl Into<String>, terms: impl IntoIterator<Item = S>) -> Self {
        Self {
            id: id.into(),
            terms: terms.into_iter().map(Into::into).collect(),
            meta: DocMeta::default(),
        }
    }
}

/// Inverted index plus the term-frequency and document-length tables derived
/// from the same pass over the corpus.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    dictionary: HashMap<String, TermId>,
    /// term id -> documents containing it, ascending and free of duplicates
    postings: Vec<Vec<DocOrd>>,
    /// doc ord -> term id -> raw count
    term_frequencies: Vec<HashMap<TermId, u32>>,
    doc_lengths: Vec<u32>,
    docs: Vec<Document>,
    ordinals: HashMap<String, DocOrd>,
}

/// Build the index over `documents` in the order given.
///
/// Fails on an empty or repeated document id. Skipping such an entry would
/// change the document count the idf weights are computed from.
pub fn build_index<I>(documents: I) -> Result<InvertedIndex, BuildError>
where
    I: IntoIterator<Item = Document>,
{
    let mut index = InvertedIndex::default();
    for doc in documents {
        index.ingest(doc)?;
    }
    tracing::info!(
        num_docs = index.num_docs(),
        num_terms = index.num_terms(),
        "built inverted index"
    );
    Ok(index)
}

impl InvertedIndex {
    fn ingest(&mut self, doc: Document) -> Result<(), BuildError> {
        let position = self.docs.len();
        if doc.id.trim().is_empty() {
            return Err(BuildError::EmptyId { position });
        }
        let ord = position as DocOrd;
        match self.ordinals.entry(doc.id.clone()) {
            Entry::Occupied(_) => return Err(BuildError::DuplicateId(doc.id)),
            Entry::Vacant(slot) => {
                slot.insert(ord);
            }
        }

        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        for term in &doc.terms {
            let next = self.postings.len() as TermId;
            let tid = *self.dictionary.entry(term.clone()).or_insert(next);
            if tid == next {
                self.postings.push(Vec::new());
            }
            *tf_counts.entry(tid).or_insert(0) += 1;
        }
        // One append per distinct term, and ords only grow, so every posting
        // list stays sorted and duplicate-free.
        for &tid in tf_counts.keys() {
            self.postings[tid as usize].push(ord);
        }

        self.doc_lengths.push(doc.terms.len() as u32);
        self.term_frequencies.push(tf_counts);
        self.docs.push(doc);
        Ok(())
    }

    /// Total number of documents, including zero-length ones.
    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    pub fn num_terms(&self) -> usize {
        self.dictionary.len()
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    /// Documents containing `term`, in corpus order. Empty for unknown terms.
    pub fn postings(&self, term: &str) -> &[DocOrd] {
        self.term_id(term)
            .map(|tid| self.postings_for(tid))
            .unwrap_or_default()
    }

    pub(crate) fn postings_for(&self, tid: TermId) -> &[DocOrd] {
        self.postings
            .get(tid as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings(term).len()
    }

    /// Raw count of `term` in the document, 0 when absent.
    pub fn term_count(&self, doc: DocOrd, term: &str) -> u32 {
        self.term_id(term).map_or(0, |tid| self.term_count_for(doc, tid))
    }

    pub(crate) fn term_count_for(&self, doc: DocOrd, tid: TermId) -> u32 {
        self.term_frequencies
            .get(doc as usize)
            .and_then(|tf| tf.get(&tid))
            .copied()
            .unwrap_or(0)
    }

    pub fn doc_length(&self, doc: DocOrd) -> u32 {
        self.doc_lengths.get(doc as usize).copied().unwrap_or(0)
    }

    pub fn average_doc_length(&self) -> f64 {
        if self.docs.is_empty() {
            return 0.0;
        }
        let total: u64 = self.doc_lengths.iter().map(|&len| len as u64).sum();
        total as f64 / self.docs.len() as f64
    }

    pub fn max_doc_length(&self) -> u32 {
        self.doc_lengths.iter().copied().max().unwrap_or(0)
    }

    pub fn ordinal(&self, id: &str) -> Option<DocOrd> {
        self.ordinals.get(id).copied()
    }

    pub fn document(&self, doc: DocOrd) -> Option<&Document> {
        self.docs.get(doc as usize)
    }

    /// Look a document up by its corpus id.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.ordinal(id).and_then(|ord| self.document(ord))
    }

    pub fn documents(&self) -> impl Iterator<Item = (DocOrd, &Document)> {
        self.docs.iter().enumerate().map(|(i, d)| (i as DocOrd, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("1", ["a", "a", "b"]),
            Document::new("2", ["a"]),
            Document::new("3", Vec::<String>::new()),
        ]
    }

    #[test]
    fn records_counts_and_lengths() {
        let idx = build_index(corpus()).unwrap();
        assert_eq!(idx.num_docs(), 3);
        assert_eq!(idx.num_terms(), 2);
        assert_eq!(idx.term_count(0, "a"), 2);
        assert_eq!(idx.term_count(0, "b"), 1);
        assert_eq!(idx.term_count(1, "b"), 0);
        assert_eq!(idx.doc_length(0), 3);
        assert_eq!(idx.doc_length(1), 1);
        assert_eq!(idx.doc_length(2), 0);
    }

    #[test]
    fn posting_lists_have_no_duplicates() {
        let idx = build_index(corpus()).unwrap();
        assert_eq!(idx.postings("a"), &[0, 1]);
        assert_eq!(idx.postings("b"), &[0]);
        assert_eq!(idx.document_frequency("a"), 2);
        assert!(idx.postings("zzz").is_empty());
    }

    #[test]
    fn empty_document_joins_no_posting_list() {
        let idx = build_index(corpus()).unwrap();
        for term in ["a", "b"] {
            assert!(!idx.postings(term).contains(&2));
        }
        assert_eq!(idx.get("3").map(|d| d.terms.len()), Some(0));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let docs = vec![Document::new("x", ["a"]), Document::new("x", ["b"])];
        let err = build_index(docs).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateId(id) if id == "x"));
    }

    #[test]
    fn rejects_blank_ids() {
        let docs = vec![Document::new("ok", ["a"]), Document::new("  ", ["b"])];
        let err = build_index(docs).unwrap_err();
        assert!(matches!(err, BuildError::EmptyId { position: 1 }));
    }

    #[test]
    fn length_stats() {
        let idx = build_index(corpus()).unwrap();
        assert!((idx.average_doc_length() - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(idx.max_doc_length(), 3);
        assert_eq!(InvertedIndex::default().average_doc_length(), 0.0);
    }
}
