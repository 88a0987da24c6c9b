// 🎲 Sample Endpoints - Demo rows for the upload screens

use crate::records::Record;
use crate::samples::{sample_applicants, sample_transactions};
use crate::server::error::{lock, ApiError, ApiResult};
use crate::server::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

pub const DEFAULT_TRANSACTION_SAMPLES: usize = 25;
pub const DEFAULT_APPLICANT_SAMPLES: usize = 20;
pub const MAX_SAMPLES: usize = 500;

#[derive(Debug, Default, Deserialize)]
pub struct SampleQuery {
    pub count: Option<usize>,
}

fn sample_count(query: &SampleQuery, default: usize) -> ApiResult<usize> {
    match query.count.unwrap_or(default) {
        0 => Err(ApiError::BadRequest("count must be at least 1".to_string())),
        n if n > MAX_SAMPLES => Err(ApiError::BadRequest(format!("count must be at most {}", MAX_SAMPLES))),
        n => Ok(n),
    }
}

/// GET /api/samples/transactions?count=
pub async fn transactions(
    State(state): State<AppState>,
    Query(query): Query<SampleQuery>,
) -> ApiResult<Json<Vec<Record>>> {
    let count = sample_count(&query, DEFAULT_TRANSACTION_SAMPLES)?;
    let mut rng = lock(&state.rng)?;
    Ok(Json(sample_transactions(&mut *rng, count)))
}

/// GET /api/samples/applicants?count=
pub async fn applicants(
    State(state): State<AppState>,
    Query(query): Query<SampleQuery>,
) -> ApiResult<Json<Vec<Record>>> {
    let count = sample_count(&query, DEFAULT_APPLICANT_SAMPLES)?;
    let mut rng = lock(&state.rng)?;
    Ok(Json(sample_applicants(&mut *rng, count)))
}
