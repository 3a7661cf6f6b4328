use crate::tokenizer::tokenize;
use std::collections::HashMap;

/// Tokenized search query. Repeated terms are kept: they raise the weight of
/// their dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<String>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        Self { terms: tokenize(raw) }
    }

    /// Wrap terms that are already tokenized.
    pub fn from_terms<S: Into<String>>(terms: impl IntoIterator<Item = S>) -> Self {
        Self { terms: terms.into_iter().map(Into::into).collect() }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Distinct terms with their counts, in order of first occurrence.
    pub fn term_counts(&self) -> Vec<(&str, u32)> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(&str, u32)> = Vec::new();
        for term in &self.terms {
            match slots.get(term.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    slots.insert(term.as_str(), counts.len());
                    counts.push((term.as_str(), 1));
                }
            }
        }
        counts
    }

    /// Euclidean norm of the raw term-count vector.
    pub fn norm(&self) -> f64 {
        self.term_counts()
            .iter()
            .map(|&(_, c)| (c as f64) * (c as f64))
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lowercases_and_keeps_repeats() {
        let q = Query::parse("  Rust rust\tGO ");
        assert_eq!(q.terms(), &["rust", "rust", "go"]);
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn counts_follow_first_occurrence() {
        let q = Query::parse("b a b c b");
        assert_eq!(q.term_counts(), vec![("b", 3), ("a", 1), ("c", 1)]);
    }

    #[test]
    fn norm_uses_raw_counts() {
        let q = Query::parse("a a b");
        assert!((q.norm() - 5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn from_terms_keeps_terms_verbatim() {
        let q = Query::from_terms(["already", "tokenized", "already"]);
        assert_eq!(q.term_counts(), vec![("already", 2), ("tokenized", 1)]);
    }

    #[test]
    fn blank_input_is_empty() {
        let q = Query::parse(" \n\t ");
        assert!(q.is_empty());
        assert_eq!(q.norm(), 0.0);
    }
}
