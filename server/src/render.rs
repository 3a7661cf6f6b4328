use regex::RegexBuilder;
use serde::Serialize;
use tweetsearch_core::Document;

const TITLE_TERMS: usize = 3;

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
    pub title: String,
    pub summary: String,
    pub snippet: String,
    pub date: String,
    pub url: String,
    pub hashtags: String,
    pub details_url: String,
}

#[derive(Debug, Serialize)]
pub struct DocDetails {
    pub doc_id: String,
    pub tweet: Vec<String>,
    pub title: String,
    pub summary: String,
    pub date: String,
    pub url: String,
    pub hashtags: Vec<String>,
}

pub fn title(terms: &[String]) -> String {
    let head: Vec<&str> = terms.iter().take(TITLE_TERMS).map(String::as_str).collect();
    format!("{}...", head.join(" "))
}

pub fn summary(terms: &[String]) -> String {
    terms.join(" ")
}

/// Link to `/doc_details` carrying the search the click comes from.
pub fn details_url(doc_id: &str, query: &str, issued_at: &str) -> String {
    let params = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("id", doc_id)
        .append_pair("q", query)
        .append_pair("issued_at", issued_at)
        .finish();
    format!("/doc_details?{params}")
}

/// Wrap case-insensitive occurrences of `terms` in `<em>`.
pub fn highlight_terms(text: &str, terms: &[String]) -> String {
    let mut alternatives: Vec<&str> = terms.iter().map(String::as_str).filter(|t| !t.is_empty()).collect();
    if alternatives.is_empty() {
        return text.to_string();
    }
    // longest first so "climate" wins over "clim"
    alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    alternatives.dedup();
    let pattern = alternatives.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.replace_all(text, "<em>$0</em>").into_owned(),
        Err(err) => {
            tracing::warn!(%err, "could not build highlight pattern");
            text.to_string()
        }
    }
}

pub fn search_hit(doc: &Document, score: f64, query_terms: &[String], details_url: String) -> SearchHit {
    let summary = summary(&doc.terms);
    SearchHit {
        doc_id: doc.id.clone(),
        score,
        title: title(&doc.terms),
        snippet: highlight_terms(&summary, query_terms),
        summary,
        date: doc.meta.date.clone(),
        url: doc.meta.url.clone(),
        hashtags: doc.meta.hashtags.join(", "),
        details_url,
    }
}

pub fn doc_details(doc: &Document) -> DocDetails {
    DocDetails {
        doc_id: doc.id.clone(),
        tweet: doc.terms.clone(),
        title: title(&doc.terms),
        summary: summary(&doc.terms),
        date: doc.meta.date.clone(),
        url: doc.meta.url.clone(),
        hashtags: doc.meta.hashtags.clone(),
    }
}
