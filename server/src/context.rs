//! Per-request context. Nothing about a user is kept between requests: the
//! query a click came from travels in the details link that `/search` hands
//! out.

use crate::error::ApiError;
use axum::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use serde::Deserialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Client details recorded with every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let ip_address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        Ok(ClientInfo { user_agent, ip_address })
    }
}

/// Query string of `/doc_details`.
#[derive(Debug, Deserialize)]
pub struct DetailsParams {
    pub id: String,
    pub q: Option<String>,
    pub issued_at: Option<String>,
}

/// The search a document view came from, if the link carried one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchContext {
    pub query: Option<String>,
    pub issued_at: Option<OffsetDateTime>,
}

impl SearchContext {
    pub fn from_params(params: &DetailsParams) -> Result<Self, ApiError> {
        let issued_at = params
            .issued_at
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| {
                OffsetDateTime::parse(s, &Rfc3339)
                    .map_err(|e| ApiError::BadRequest(format!("invalid issued_at {s:?}: {e}")))
            })
            .transpose()?;
        let query = params.q.clone().filter(|q| !q.trim().is_empty());
        Ok(Self { query, issued_at })
    }

    /// Seconds elapsed between the search and `now`.
    pub fn dwell_time(&self, now: OffsetDateTime) -> Option<f64> {
        self.issued_at.map(|t| (now - t).as_seconds_f64())
    }
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn params(q: Option<&str>, issued_at: Option<&str>) -> DetailsParams {
        DetailsParams { id: "d1".into(), q: q.map(Into::into), issued_at: issued_at.map(Into::into) }
    }

    #[test]
    fn dwell_time_from_issue_time() {
        let ctx = SearchContext::from_params(&params(Some("cats"), Some("2024-10-01T10:00:00Z"))).unwrap();
        assert_eq!(ctx.query.as_deref(), Some("cats"));
        let dwell = ctx.dwell_time(datetime!(2024-10-01 10:00:12.5 UTC)).unwrap();
        assert!((dwell - 12.5).abs() < 1e-9);
    }

    #[test]
    fn missing_context_is_not_an_error() {
        let ctx = SearchContext::from_params(&params(Some("  "), Some(""))).unwrap();
        assert_eq!(ctx, SearchContext::default());
        assert_eq!(ctx.dwell_time(OffsetDateTime::now_utc()), None);
    }

    #[test]
    fn malformed_issue_time_is_rejected() {
        let err = SearchContext::from_params(&params(None, Some("yesterday"))).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
