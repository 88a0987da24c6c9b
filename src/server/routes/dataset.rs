// 🏦 Dataset Endpoints - Load, inspect, analyse and clear the stored dataset

use crate::dataset::{generate_dataset, DatasetStats, FeatureWeight, DATASET_STATS, DEFAULT_APPLICATION_COUNT, FEATURE_IMPORTANCE};
use crate::explain::explain_default_risk;
use crate::insights::{
    analyze_applications, default_risk_explanation, score_applications, DatasetCreditScoring, DatasetFraudAnalysis,
    DatasetOverview, PortfolioInsights,
};
use crate::records::RiskLevel;
use crate::server::error::{lock, ApiError, ApiResult};
use crate::server::state::AppState;
use crate::store::StoreStatus;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Largest dataset a single request may generate
pub const MAX_GENERATED_APPLICATIONS: usize = 10_000;

#[derive(Debug, Serialize)]
pub struct DatasetResponse {
    pub status: StoreStatus,
    pub overview: Option<DatasetOverview>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceResponse {
    pub stats: DatasetStats,
    pub feature_importance: Vec<FeatureWeight>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExplanationQuery {
    /// Ask the text generator instead of the rule-based narrative
    #[serde(default)]
    pub ai: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationExplanation {
    pub sk_id_curr: i64,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub target: u8,
    pub explanation: String,
}

fn dataset_response(state: &AppState) -> ApiResult<DatasetResponse> {
    let store = lock(&state.store)?;
    Ok(DatasetResponse {
        status: store.status(),
        overview: DatasetOverview::from_applications(store.applications()),
    })
}

/// GET /api/dataset
pub async fn get_dataset(State(state): State<AppState>) -> ApiResult<Json<DatasetResponse>> {
    Ok(Json(dataset_response(&state)?))
}

/// DELETE /api/dataset
pub async fn clear_dataset(State(state): State<AppState>) -> ApiResult<Json<DatasetResponse>> {
    lock(&state.store)?.clear()?;
    Ok(Json(dataset_response(&state)?))
}

/// POST /api/dataset/generate
pub async fn generate(
    State(state): State<AppState>,
    body: Option<Json<GenerateRequest>>,
) -> ApiResult<Json<DatasetResponse>> {
    let count = body
        .and_then(|Json(req)| req.count)
        .unwrap_or(DEFAULT_APPLICATION_COUNT);
    if count == 0 || count > MAX_GENERATED_APPLICATIONS {
        return Err(ApiError::BadRequest(format!(
            "count must be between 1 and {}",
            MAX_GENERATED_APPLICATIONS
        )));
    }

    let dataset = {
        let mut rng = lock(&state.rng)?;
        generate_dataset(&mut *rng, count)
    };
    lock(&state.store)?.set_dataset(dataset, Utc::now())?;
    info!(count, "synthetic dataset generated");

    Ok(Json(dataset_response(&state)?))
}

/// POST /api/dataset/analyze
pub async fn analyze(State(state): State<AppState>) -> ApiResult<Json<DatasetFraudAnalysis>> {
    let mut store = lock(&state.store)?;
    if !store.data_loaded() {
        return Err(ApiError::NotFound("no dataset loaded".to_string()));
    }

    let analysis = analyze_applications(store.applications(), Utc::now());
    store.set_analysis_results(analysis.results.clone())?;
    Ok(Json(analysis))
}

/// GET /api/dataset/insights
pub async fn insights(State(state): State<AppState>) -> ApiResult<Json<PortfolioInsights>> {
    let store = lock(&state.store)?;
    PortfolioInsights::from_applications(store.applications())
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no dataset loaded".to_string()))
}

/// POST /api/dataset/score
pub async fn score(State(state): State<AppState>) -> ApiResult<Json<DatasetCreditScoring>> {
    let store = lock(&state.store)?;
    if !store.data_loaded() {
        return Err(ApiError::NotFound("no dataset loaded".to_string()));
    }
    Ok(Json(score_applications(store.applications())))
}

/// GET /api/dataset/reference
pub async fn reference() -> Json<ReferenceResponse> {
    Json(ReferenceResponse {
        stats: DATASET_STATS,
        feature_importance: FEATURE_IMPORTANCE.to_vec(),
    })
}

/// GET /api/dataset/applications/:id/explanation
pub async fn application_explanation(
    State(state): State<AppState>,
    Path(sk_id_curr): Path<i64>,
    Query(query): Query<ExplanationQuery>,
) -> ApiResult<Json<ApplicationExplanation>> {
    let app = lock(&state.store)?
        .application(sk_id_curr)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("application {}", sk_id_curr)))?;

    let explanation = if query.ai {
        explain_default_risk(state.generator.as_ref(), &app).await
    } else {
        default_risk_explanation(&app)
    };

    Ok(Json(ApplicationExplanation {
        sk_id_curr: app.sk_id_curr,
        risk_score: app.risk_score,
        risk_level: app.risk_level,
        target: app.target,
        explanation,
    }))
}
