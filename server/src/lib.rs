use anyhow::Result;
use axum::{extract::{Path, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tfidf_core::tokenizer::tokenize;
use tfidf_core::{compute_fingerprint, Error, SharedConnection, TfIdfCalculator};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Body of `POST /corpus` and `POST /score`. `text` may be absent or null,
/// which is rejected with 400.
#[derive(Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Serialize)]
pub struct AddResponse {
    /// Corpus size right after this addition.
    pub document_count: u64,
    pub fingerprint: String,
    /// Sightings of this fingerprint in storage, across runs.
    pub times_seen: u64,
}

#[derive(Serialize)]
pub struct ScoreResponse {
    pub score: f64,
    pub terms: usize,
    pub distinct_terms: usize,
    pub document_count: u64,
}

/// Counts from two sources with different lifetimes.
///
/// `document_count` and `vocabulary_size` describe the in-memory corpus and
/// start from zero on every process start. `distinct_fingerprints` comes
/// from storage and includes documents added by earlier runs, so it can
/// exceed `document_count`.
#[derive(Serialize)]
pub struct StatsResponse {
    pub document_count: u64,
    pub vocabulary_size: usize,
    pub distinct_fingerprints: usize,
}

#[derive(Serialize)]
pub struct TermResponse {
    pub term: String,
    pub document_frequency: u64,
    pub idf: f64,
}

#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<TfIdfCalculator>,
    pub storage: SharedConnection,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(storage: SharedConnection, admin_token: Option<String>) -> Self {
        Self { calculator: Arc::new(TfIdfCalculator::new()), storage, admin_token }
    }
}

/// Build the app from the environment: `ADMIN_TOKEN` guards corpus writes,
/// `CORS_ALLOW_ORIGIN` (comma-separated) restricts origins.
pub fn build_app(storage: SharedConnection) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let state = AppState::new(storage, admin_token);

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

    Ok(router(state).layer(cors))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/corpus", post(add_handler))
        .route("/score", post(score_handler))
        .route("/stats", get(stats_handler))
        .route("/terms/:term", get(term_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn api_error(err: Error) -> (StatusCode, String) {
    let status = if err.is_invalid_argument() { StatusCode::BAD_REQUEST } else { StatusCode::INTERNAL_SERVER_ERROR };
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (status, err.to_string())
}

/// Validates the text, records its fingerprint, then adds it to the corpus.
///
/// Storage goes first: the corpus addition cannot fail, so a storage error
/// answers 500 with the corpus untouched. `document_count` is the count this
/// addition produced, not a later read.
pub async fn add_handler(State(state): State<AppState>, headers: HeaderMap, Json(body): Json<TextBody>) -> Result<Json<AddResponse>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let text = body.text.ok_or(Error::InvalidArgument("text")).map_err(api_error)?;
    let fingerprint = compute_fingerprint(&text);
    let record = state.storage.record_document(&fingerprint).map_err(api_error)?;
    let document_count = state.calculator.add_document(&text);
    Ok(Json(AddResponse { document_count, fingerprint, times_seen: record.times_seen }))
}

pub async fn score_handler(State(state): State<AppState>, Json(body): Json<TextBody>) -> Result<Json<ScoreResponse>, (StatusCode, String)> {
    let text = body.text.ok_or(Error::InvalidArgument("text")).map_err(api_error)?;
    let b = state.calculator.score_breakdown(&text);
    Ok(Json(ScoreResponse { score: b.score, terms: b.term_count, distinct_terms: b.distinct_terms, document_count: b.document_count }))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.calculator.stats();
    Json(StatsResponse {
        document_count: stats.document_count,
        vocabulary_size: stats.vocabulary_size,
        distinct_fingerprints: state.storage.distinct_documents(),
    })
}

pub async fn term_handler(State(state): State<AppState>, Path(raw): Path<String>) -> Result<Json<TermResponse>, (StatusCode, String)> {
    let mut terms = tokenize(&raw);
    if terms.len() != 1 {
        return Err((StatusCode::BAD_REQUEST, format!("expected exactly one term, found {}", terms.len())));
    }
    let term = terms.remove(0);
    let (document_frequency, idf) = state.calculator.term_weight(&term);
    Ok(Json(TermResponse { term, document_frequency, idf }))
}

/// Writes are open when no `ADMIN_TOKEN` is configured.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Ok(()),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
