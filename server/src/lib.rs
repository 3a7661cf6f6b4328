use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tweetsearch_core::{build_index, load_corpus, IdfWeighting, InvertedIndex, Ranker};

pub mod context;
pub mod error;
pub mod events;
pub mod render;

use context::{now_rfc3339, ClientInfo, DetailsParams, SearchContext};
use error::ApiError;
use events::{Analytics, ClickEvent, Event, EventSink, QueryEvent};
use render::{DocDetails, SearchHit};

pub const DEFAULT_K: usize = 10;
pub const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub k: Option<usize>,
}

#[derive(Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub query: String,
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub search_id: u64,
    pub issued_at: String,
    pub total_hits: usize,
    pub took_s: f64,
    pub results: Vec<SearchHit>,
}

/// Shared by every handler. The index is immutable, so readers need no lock.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<InvertedIndex>,
    pub weighting: IdfWeighting,
    pub events: Arc<dyn EventSink>,
    next_search_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(index: InvertedIndex, weighting: IdfWeighting, events: Arc<dyn EventSink>) -> Self {
        Self { index: Arc::new(index), weighting, events, next_search_id: Arc::new(AtomicU64::new(1)) }
    }

    /// Load the corpus and build the index. Any corpus problem is fatal here,
    /// before a single request is served.
    pub fn load(corpus: &Path, weighting: IdfWeighting, events: Arc<dyn EventSink>) -> Result<Self> {
        let docs = load_corpus(corpus).with_context(|| format!("loading corpus from {}", corpus.display()))?;
        let index = build_index(docs).context("building inverted index")?;
        Ok(Self::new(index, weighting, events))
    }
}

pub fn build_app(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_get).post(search_post))
        .route("/doc_details", get(doc_details_handler))
        .route("/analytics", get(analytics_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn search_get(
    State(state): State<AppState>,
    client: ClientInfo,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    Json(run_search(&state, params.q.as_deref().unwrap_or(""), params.k, client))
}

pub async fn search_post(
    State(state): State<AppState>,
    client: ClientInfo,
    Form(form): Form<SearchForm>,
) -> Json<SearchResponse> {
    Json(run_search(&state, &form.query, form.k, client))
}

fn run_search(state: &AppState, raw: &str, k: Option<usize>, client: ClientInfo) -> SearchResponse {
    let start = std::time::Instant::now();
    let raw = raw.trim();
    let query = tweetsearch_core::Query::parse(raw);
    let search_id = state.next_search_id.fetch_add(1, Ordering::Relaxed);
    let issued_at = now_rfc3339();

    // Edge case: nothing to search for, and nothing worth logging
    if query.is_empty() {
        let elapsed = start.elapsed();
        return SearchResponse { query: raw.to_string(), search_id, issued_at, total_hits: 0, took_s: elapsed.as_secs_f64(), results: vec![] };
    }

    let event = Event::Query(QueryEvent {
        query: raw.to_string(),
        num_terms: query.len(),
        timestamp: issued_at.clone(),
        user_agent: client.user_agent,
        ip_address: client.ip_address,
    });
    if let Err(err) = state.events.append(event) {
        tracing::warn!(error = %err, "failed to record query event");
    }

    let ranker = Ranker::new(&state.index).with_weighting(state.weighting);
    let hits = ranker.search(&query);
    let total_hits = hits.len();
    let k = k.unwrap_or(DEFAULT_K).clamp(1, MAX_K);

    let results: Vec<SearchHit> = hits
        .iter()
        .take(k)
        .filter_map(|hit| {
            let doc = state.index.document(hit.doc)?;
            let link = render::details_url(&doc.id, raw, &issued_at);
            Some(render::search_hit(doc, hit.score, query.terms(), link))
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::info!(query = raw, search_id, total_hits, took_s = elapsed.as_secs_f64(), "search");
    SearchResponse { query: raw.to_string(), search_id, issued_at, total_hits, took_s: elapsed.as_secs_f64(), results }
}

pub async fn doc_details_handler(
    State(state): State<AppState>,
    client: ClientInfo,
    Query(params): Query<DetailsParams>,
) -> Result<Json<DocDetails>, ApiError> {
    let ctx = SearchContext::from_params(&params)?;
    let doc = state
        .index
        .get(&params.id)
        .ok_or_else(|| ApiError::NotFound(format!("document {} not found", params.id)))?;

    let now = time::OffsetDateTime::now_utc();
    let event = Event::Click(ClickEvent {
        doc_id: doc.id.clone(),
        dwell_time_s: ctx.dwell_time(now),
        query: ctx.query,
        timestamp: now_rfc3339(),
        user_agent: client.user_agent,
        ip_address: client.ip_address,
    });
    if let Err(err) = state.events.append(event) {
        tracing::warn!(error = %err, doc_id = %doc.id, "failed to record click event");
    }
    Ok(Json(render::doc_details(doc)))
}

pub async fn analytics_handler(State(state): State<AppState>) -> Result<Json<Analytics>, ApiError> {
    let events = state.events.replay()?;
    Ok(Json(Analytics::from_events(events)))
}
