// 🔎 Analysis Endpoints - Fraud analysis, credit scoring, explanations
// Each endpoint keeps its own failure contract (status + body)

use crate::credit::{score_batch, score_batch_with_generator, SCORING_FAILED_MESSAGE};
use crate::dataset::HomeCreditApplication;
use crate::explain::{explain_default_risk, explain_fraud, DEFAULT_RISK_FALLBACK, EXPLANATION_FAILED_MESSAGE};
use crate::fraud::FraudAnalysis;
use crate::records::{Record, RiskLevel};
use crate::server::error::plain_error;
use crate::server::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditScoreRequest {
    pub applicants: Vec<Value>,
    #[serde(default)]
    pub generate_explanations: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainFraudRequest {
    pub transaction: Value,
    pub fraud_score: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Deserialize)]
pub struct ExplainDefaultRiskRequest {
    pub application: HomeCreditApplication,
}

#[derive(Debug, Serialize)]
pub struct ExplanationResponse {
    pub explanation: String,
}

/// Rows that are not JSON objects are scored as empty records
fn rows_to_records(rows: &[Value]) -> Vec<Record> {
    rows.iter()
        .map(|row| match row {
            Value::Object(fields) => Record::from(fields.clone()),
            _ => Record::new(),
        })
        .collect()
}

/// POST /api/analyze-fraud
///
/// Always 200: a missing `transactions` array gives an empty result,
/// an unreadable body gives the zeroed result with an error message.
pub async fn analyze_fraud(State(state): State<AppState>, body: Bytes) -> Json<FraudAnalysis> {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "unreadable fraud analysis request");
            return Json(FraudAnalysis::failed());
        }
    };

    let Some(rows) = payload.get("transactions").and_then(Value::as_array) else {
        return Json(FraudAnalysis::empty());
    };

    let records = rows_to_records(rows);

    match state.analyzer.lock() {
        Ok(mut analyzer) => Json(analyzer.analyze(&records)),
        Err(_) => {
            warn!("fraud analyzer unavailable");
            Json(FraudAnalysis::failed())
        }
    }
}

/// POST /api/credit-score
pub async fn credit_score(State(state): State<AppState>, body: Bytes) -> Response {
    let request: CreditScoreRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "invalid credit scoring request");
            return plain_error(StatusCode::INTERNAL_SERVER_ERROR, SCORING_FAILED_MESSAGE);
        }
    };

    debug!(
        applicants = request.applicants.len(),
        generated = request.generate_explanations,
        "scoring applicants"
    );

    let applicants = rows_to_records(&request.applicants);
    if !request.generate_explanations {
        return Json(score_batch(&applicants)).into_response();
    }

    match score_batch_with_generator(&applicants, state.generator.as_ref()).await {
        Ok(scoring) => Json(scoring).into_response(),
        Err(e) => {
            warn!(error = %e, "credit explanation generation failed");
            plain_error(StatusCode::INTERNAL_SERVER_ERROR, SCORING_FAILED_MESSAGE)
        }
    }
}

/// POST /api/explain-fraud
pub async fn explain_fraud_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request: ExplainFraudRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "invalid fraud explanation request");
            return plain_error(StatusCode::INTERNAL_SERVER_ERROR, EXPLANATION_FAILED_MESSAGE);
        }
    };

    match explain_fraud(
        state.generator.as_ref(),
        &request.transaction,
        request.fraud_score,
        request.risk_level,
    )
    .await
    {
        Ok(explanation) => Json(ExplanationResponse { explanation }).into_response(),
        Err(e) => {
            warn!(error = %e, "fraud explanation failed");
            plain_error(StatusCode::INTERNAL_SERVER_ERROR, EXPLANATION_FAILED_MESSAGE)
        }
    }
}

/// POST /api/explain-default-risk
///
/// Never fails: any problem degrades to the fixed fallback text.
pub async fn explain_default_risk_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<ExplanationResponse> {
    let explanation = match serde_json::from_slice::<ExplainDefaultRiskRequest>(&body) {
        Ok(request) => explain_default_risk(state.generator.as_ref(), &request.application).await,
        Err(e) => {
            warn!(error = %e, "invalid default-risk explanation request");
            DEFAULT_RISK_FALLBACK.to_string()
        }
    };

    Json(ExplanationResponse { explanation })
}
