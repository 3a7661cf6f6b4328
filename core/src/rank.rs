//! Cosine-similarity ranking over TF-IDF weights.
//!
//! The vector space has one dimension per distinct query term. On the query
//! side a dimension weighs `(count / query_norm) * idf`; on the document side
//! it weighs `tf / doc_length` with no idf factor. The two sides are
//! deliberately asymmetric and ranking results depend on it, so leave it
//! alone unless symmetric weighting is wanted everywhere.

use crate::error::UnknownWeighting;
use crate::index::{DocOrd, InvertedIndex};
use crate::query::Query;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Inverse document frequency formula used for query weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdfWeighting {
    /// `ln(N / (1 + df))`. Zero or negative once a term is in at least
    /// `N - 1` documents, which drops it from the results.
    #[default]
    Standard,
    /// `ln(1 + N / (1 + df))`, always positive.
    Smoothed,
}

impl IdfWeighting {
    pub fn idf(self, num_docs: usize, df: usize) -> f64 {
        let ratio = num_docs as f64 / (1 + df) as f64;
        match self {
            IdfWeighting::Standard => ratio.ln(),
            IdfWeighting::Smoothed => (1.0 + ratio).ln(),
        }
    }
}

impl fmt::Display for IdfWeighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdfWeighting::Standard => "standard",
            IdfWeighting::Smoothed => "smoothed",
        })
    }
}

impl FromStr for IdfWeighting {
    type Err = UnknownWeighting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(IdfWeighting::Standard),
            "smoothed" => Ok(IdfWeighting::Smoothed),
            _ => Err(UnknownWeighting(s.to_string())),
        }
    }
}

/// Documents eligible for scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates(BTreeSet<DocOrd>);

impl Candidates {
    /// Union of the posting lists of every query term.
    pub fn select(index: &InvertedIndex, query: &Query) -> Self {
        let mut set = BTreeSet::new();
        for (term, _) in query.term_counts() {
            set.extend(index.postings(term).iter().copied());
        }
        Self(set)
    }

    /// Candidates given by corpus id. Unknown ids are ignored.
    pub fn from_ids<'a>(index: &InvertedIndex, ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self(ids.into_iter().filter_map(|id| index.ordinal(id)).collect())
    }

    pub fn contains(&self, doc: DocOrd) -> bool {
        self.0.contains(&doc)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DocOrd> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<DocOrd> for Candidates {
    fn from_iter<I: IntoIterator<Item = DocOrd>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    pub doc: DocOrd,
    pub score: f64,
}

/// Score `candidates` against `query` and return those with a positive score,
/// best first. Equal scores keep corpus order.
pub fn rank(
    index: &InvertedIndex,
    query: &Query,
    candidates: &Candidates,
    weighting: IdfWeighting,
) -> Vec<ScoredDoc> {
    let query_norm = query.norm();
    if query_norm == 0.0 || candidates.is_empty() {
        return Vec::new();
    }
    let num_docs = index.num_docs();

    let mut dots: BTreeMap<DocOrd, f64> = BTreeMap::new();
    for (term, count) in query.term_counts() {
        let Some(tid) = index.term_id(term) else {
            continue;
        };
        let postings = index.postings_for(tid);
        if postings.is_empty() {
            continue;
        }
        let query_weight = (count as f64 / query_norm) * weighting.idf(num_docs, postings.len());
        for &doc in postings {
            if !candidates.contains(doc) {
                continue;
            }
            let len = index.doc_length(doc);
            if len == 0 {
                continue;
            }
            let doc_weight = index.term_count_for(doc, tid) as f64 / len as f64;
            *dots.entry(doc).or_insert(0.0) += doc_weight * query_weight;
        }
    }

    let mut scored: Vec<ScoredDoc> = dots
        .into_iter()
        .filter_map(|(doc, dot)| {
            let score = dot / (index.doc_length(doc) as f64 * query_norm);
            (score.is_finite() && score > 0.0).then_some(ScoredDoc { doc, score })
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    tracing::debug!(
        terms = query.len(),
        candidates = candidates.len(),
        hits = scored.len(),
        "ranked query"
    );
    scored
}

/// Ranking entry point bound to one index and weighting.
#[derive(Debug, Clone, Copy)]
pub struct Ranker<'a> {
    index: &'a InvertedIndex,
    weighting: IdfWeighting,
}

impl<'a> Ranker<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self { index, weighting: IdfWeighting::default() }
    }

    pub fn with_weighting(mut self, weighting: IdfWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn weighting(&self) -> IdfWeighting {
        self.weighting
    }

    pub fn rank(&self, query: &Query, candidates: &Candidates) -> Vec<ScoredDoc> {
        rank(self.index, query, candidates, self.weighting)
    }

    /// Select candidates for `query` and rank them.
    pub fn search(&self, query: &Query) -> Vec<ScoredDoc> {
        let candidates = Candidates::select(self.index, query);
        self.rank(query, &candidates)
    }

    /// Corpus ids for ranked results.
    pub fn ids(&self, results: &[ScoredDoc]) -> Vec<&'a str> {
        results
            .iter()
            .filter_map(|hit| self.index.document(hit.doc))
            .map(|doc| doc.id.as_str())
            .collect()
    }
}
