use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use keystile_auth::{CurrentSubject, Envelope, Subject};
use serde::Serialize;

use crate::server::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    cache: CacheHealth,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheHealth {
    size: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
    hit_rate: f64,
}

pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.cache.stats();
    let body = HealthResponse {
        status: "ok",
        cache: CacheHealth {
            size: stats.size,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate(),
        },
    };
    (StatusCode::OK, Json(body))
}

/// Echoes the subject resolved by the session middleware.
pub async fn me(CurrentSubject(subject): CurrentSubject) -> Envelope<Subject> {
    Envelope::ok(subject)
}
