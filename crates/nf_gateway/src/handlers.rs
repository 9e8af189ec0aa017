use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use nf_core::keywords;

use crate::convert::normalize_envelope;
use crate::error::GatewayError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    /// Search terms, either space separated or an `a OR b` expression.
    pub keywords: Option<String>,
}

/// GET /api/news
pub async fn get_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsQuery>,
) -> Response {
    let raw = match params.keywords {
        Some(k) if !k.trim().is_empty() => k,
        _ => state.fallback.to_expression(),
    };
    let terms = keywords::to_search_terms(&raw);
    info!(q = %terms, "📰 Proxying news search");

    match state.upstream.search(&terms).await {
        Ok(mut envelope) => {
            normalize_envelope(&mut envelope, state.converter.as_ref());
            ([(header::CACHE_CONTROL, "no-store")], Json(envelope)).into_response()
        }
        Err(e) => GatewayError::from(e).into_response(),
    }
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    "ok"
}
