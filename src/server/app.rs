// 🌐 Router - Routes, middleware and state wiring

use crate::server::routes::{analysis, dataset, health, samples, simulation};
use crate::server::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/api/health", get(health::health))
        // Upload analysis
        .route("/api/analyze-fraud", post(analysis::analyze_fraud))
        .route("/api/credit-score", post(analysis::credit_score))
        .route("/api/explain-fraud", post(analysis::explain_fraud_handler))
        .route("/api/explain-default-risk", post(analysis::explain_default_risk_handler))
        // Stored dataset
        .route("/api/dataset", get(dataset::get_dataset).delete(dataset::clear_dataset))
        .route("/api/dataset/generate", post(dataset::generate))
        .route("/api/dataset/analyze", post(dataset::analyze))
        .route("/api/dataset/score", post(dataset::score))
        .route("/api/dataset/insights", get(dataset::insights))
        .route("/api/dataset/reference", get(dataset::reference))
        .route(
            "/api/dataset/applications/:id/explanation",
            get(dataset::application_explanation),
        )
        // Demo rows
        .route("/api/samples/transactions", get(samples::transactions))
        .route("/api/samples/applicants", get(samples::applicants))
        // Live simulation
        .route("/api/simulation", get(simulation::snapshot))
        .route("/api/simulation/start", post(simulation::start))
        .route("/api/simulation/stop", post(simulation::stop))
        .route("/api/simulation/reset", post(simulation::reset))
        .route("/api/simulation/mode", post(simulation::set_mode))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::explain::{StaticGenerator, TextGenerator, DEFAULT_RISK_FALLBACK};
    use crate::store::DataStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(generator: Arc<dyn TextGenerator>) -> Router {
        let config = AppConfig {
            fraud_jitter: 0.0,
            ..AppConfig::default()
        };
        let state = AppState::with_seed(DataStore::in_memory().unwrap(), generator, &config, 42);
        create_app(state)
    }

    fn app() -> Router {
        app_with(Arc::new(StaticGenerator::new("Generated explanation.")))
    }

    async fn send_raw(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(text) => {
                builder = builder.header("content-type", "application/json");
                Body::from(text)
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send_raw(app, method, uri, body.map(|v| v.to_string())).await
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["dataLoaded"], false);
        assert_eq!(body["llmEnabled"], true);
    }

    #[tokio::test]
    async fn test_analyze_fraud() {
        let request = json!({
            "transactions": [
                {"id": "T1", "amount": 6000, "category": "electronics", "time": "2024-03-01T02:15:00Z"},
                {"amount": 25, "category": "grocery", "merchant": "Walmart"}
            ]
        });
        let (status, body) = send(&app(), "POST", "/api/analyze-fraud", Some(request)).await;

        assert_eq!(status, StatusCode::OK);
        let first = &body["transactions"][0];
        assert_eq!(first["id"], "T1");
        assert_eq!(first["riskLevel"], "High");
        assert_eq!(first["flagged"], true);
        assert_eq!(first["category"], "electronics");

        let second = &body["transactions"][1];
        assert!(second["id"].as_str().unwrap().starts_with("TXN-"));
        assert_eq!(second["riskLevel"], "Low");

        assert_eq!(body["summary"]["totalTransactions"], 2);
        assert_eq!(body["summary"]["fraudCount"], 1);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_analyze_fraud_without_transactions() {
        let (status, body) = send(&app(), "POST", "/api/analyze-fraud", Some(json!({"rows": []}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transactions"], json!([]));
        assert_eq!(body["summary"]["avgFraudScore"], 0.0);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_analyze_fraud_transactions_not_an_array() {
        let request = json!({"transactions": {"id": "T1", "amount": 9000}});
        let (status, body) = send(&app(), "POST", "/api/analyze-fraud", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transactions"], json!([]));
        assert_eq!(body["summary"]["totalTransactions"], 0);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_analyze_fraud_unreadable_body() {
        let (status, body) = send_raw(&app(), "POST", "/api/analyze-fraud", Some("{oops".to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "Analysis encountered an issue. Please try again.");
        assert_eq!(body["summary"]["totalTransactions"], 0);
    }

    #[tokio::test]
    async fn test_credit_score_rule_based() {
        let request = json!({
            "applicants": [{
                "id": "APP-1", "income": 120000, "loanAmount": 20000, "employmentLength": 12,
                "creditHistory": 760, "debtToIncome": 0.15, "ageOfCredit": 15, "numAccounts": 4
            }]
        });
        let (status, body) = send(&app(), "POST", "/api/credit-score", Some(request)).await;

        assert_eq!(status, StatusCode::OK);
        let applicant = &body["applicants"][0];
        assert_eq!(applicant["creditScore"], 850.0);
        assert_eq!(applicant["riskGroup"], "Prime");
        assert_eq!(applicant["approved"], true);
        assert_eq!(applicant["featureImportance"].as_array().unwrap().len(), 5);
        assert_eq!(body["distribution"]["approvalRate"], 100.0);
    }

    #[tokio::test]
    async fn test_credit_score_with_generated_explanations() {
        let request = json!({
            "applicants": [{"id": "APP-1", "income": 50000}],
            "generateExplanations": true
        });
        let (status, body) = send(&app(), "POST", "/api/credit-score", Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applicants"][0]["explanation"], "Generated explanation.");
    }

    #[tokio::test]
    async fn test_credit_score_tolerates_non_object_rows() {
        let request = json!({"applicants": [42, null, {"id": "APP-1", "income": 120000}]});
        let (status, body) = send(&app(), "POST", "/api/credit-score", Some(request)).await;

        assert_eq!(status, StatusCode::OK);
        let applicants = body["applicants"].as_array().unwrap();
        assert_eq!(applicants.len(), 3);
        // an empty row scores 500 + 50 - 50 + 60
        assert_eq!(applicants[0]["creditScore"], 560.0);
        assert_eq!(applicants[1]["creditScore"], 560.0);
        assert_eq!(applicants[2]["id"], "APP-1");
    }

    #[tokio::test]
    async fn test_credit_score_failures() {
        let (status, body) = send(&app(), "POST", "/api/credit-score", Some(json!({}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to score applicants"}));

        let failing = app_with(Arc::new(StaticGenerator::failing()));
        let request = json!({"applicants": [{"income": 1}], "generateExplanations": true});
        let (status, body) = send(&failing, "POST", "/api/credit-score", Some(request)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to score applicants"}));
    }

    #[tokio::test]
    async fn test_explain_fraud() {
        let request = json!({
            "transaction": {"amount": 9000, "category": "jewelry"},
            "fraudScore": 0.82,
            "riskLevel": "High"
        });
        let (status, body) = send(&app(), "POST", "/api/explain-fraud", Some(request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["explanation"], "Generated explanation.");

        let failing = app_with(Arc::new(StaticGenerator::failing()));
        let (status, body) = send(&failing, "POST", "/api/explain-fraud", Some(request)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to generate explanation"}));
    }

    #[tokio::test]
    async fn test_explain_default_risk_falls_back() {
        let failing = app_with(Arc::new(StaticGenerator::failing()));
        let (status, body) = send(&failing, "POST", "/api/explain-default-risk", Some(json!({"application": {}}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["explanation"], DEFAULT_RISK_FALLBACK);
    }

    #[tokio::test]
    async fn test_dataset_lifecycle() {
        let app = app();

        let (status, body) = send(&app, "POST", "/api/dataset/analyze", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);

        let (status, _) = send(&app, "GET", "/api/dataset/insights", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "POST", "/api/dataset/generate", Some(json!({"count": 12}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["recordCount"], 12);
        assert_eq!(body["status"]["dataSource"], "kaggle");
        assert_eq!(body["overview"]["totalApps"], 12);

        let (status, body) = send(&app, "GET", "/api/dataset/insights", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["weeklyForecast"].as_array().unwrap().len(), 7);
        assert_eq!(body["riskFactors"].as_array().unwrap().len(), 4);
        let counted: u64 = body["creditRatioRisk"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["count"].as_u64().unwrap())
            .sum();
        assert_eq!(counted, 12);

        let (status, body) = send(&app, "POST", "/api/dataset/analyze", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["totalTransactions"], 12);
        assert_eq!(body["results"]["analyzedCount"], 12);

        let (_, body) = send(&app, "GET", "/api/dataset", None).await;
        assert_eq!(body["status"]["analysisResults"]["analyzedCount"], 12);

        let (status, body) = send(&app, "POST", "/api/dataset/score", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applicants"].as_array().unwrap().len(), 12);

        let (status, body) = send(&app, "GET", "/api/dataset/applications/100000/explanation", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skIdCurr"], 100000);
        assert!(body["explanation"].as_str().unwrap().contains("EXT_SOURCE_2"));

        let (_, body) = send(&app, "GET", "/api/dataset/applications/100000/explanation?ai=true", None).await;
        assert_eq!(body["explanation"], "Generated explanation.");

        let (status, _) = send(&app, "GET", "/api/dataset/applications/1/explanation", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "DELETE", "/api/dataset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["dataLoaded"], false);
        assert_eq!(body["overview"], Value::Null);
    }

    #[tokio::test]
    async fn test_generate_rejects_bad_count() {
        let (status, body) = send(&app(), "POST", "/api/dataset/generate", Some(json!({"count": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_reference_tables() {
        let (status, body) = send(&app(), "GET", "/api/dataset/reference", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["totalApplications"], 307511);
        assert_eq!(body["featureImportance"][0]["feature"], "EXT_SOURCE_2");
    }

    #[tokio::test]
    async fn test_samples() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api/samples/transactions?count=3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[0]["id"], "TXN-00001");

        let (_, body) = send(&app, "GET", "/api/samples/applicants", None).await;
        assert_eq!(body.as_array().unwrap().len(), 20);

        let (status, _) = send(&app, "GET", "/api/samples/transactions?count=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_simulation_controls() {
        let app = app();

        let (_, body) = send(&app, "POST", "/api/simulation/mode", Some(json!({"mode": "kaggle"}))).await;
        assert_eq!(body["mode"], "kaggle");

        let (_, body) = send(&app, "POST", "/api/simulation/start", None).await;
        assert_eq!(body["running"], true);

        let (status, body) = send(&app, "POST", "/api/simulation/mode", Some(json!({"mode": "random"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], 409);

        let (_, body) = send(&app, "POST", "/api/simulation/reset", None).await;
        assert_eq!(body["running"], false);
        assert_eq!(body["stats"]["total"], 0);

        let (_, body) = send(&app, "GET", "/api/simulation", None).await;
        assert_eq!(body["mode"], "kaggle");
        assert_eq!(body["intervalMs"], 800);
    }
}
