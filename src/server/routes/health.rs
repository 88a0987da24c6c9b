// 💓 Health - Liveness check

use crate::server::error::{lock, ApiResult};
use crate::server::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub data_loaded: bool,
    pub simulation_running: bool,
    /// Whether generated explanations are available
    pub llm_enabled: bool,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let data_loaded = lock(&state.store)?.data_loaded();
    let simulation_running = lock(&state.simulation)?.is_running();

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        uptime_secs: state.uptime_secs(),
        data_loaded,
        simulation_running,
        llm_enabled: state.generator.is_enabled(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok",
            version: "0.1.0",
            uptime_secs: 5,
            data_loaded: false,
            simulation_running: true,
            llm_enabled: false,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"simulationRunning\":true"));
        assert!(json.contains("\"llmEnabled\":false"));
    }
}
