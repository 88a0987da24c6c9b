// ⏱️ Simulation Endpoints - Control the live transaction feed
// The background driver does the ticking; these only flip state

use crate::server::error::{lock, ApiResult};
use crate::server::state::AppState;
use crate::simulation::{DataMode, SimulationSnapshot};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: DataMode,
}

/// GET /api/simulation
pub async fn snapshot(State(state): State<AppState>) -> ApiResult<Json<SimulationSnapshot>> {
    Ok(Json(lock(&state.simulation)?.snapshot()))
}

/// POST /api/simulation/start
pub async fn start(State(state): State<AppState>) -> ApiResult<Json<SimulationSnapshot>> {
    let mut sim = lock(&state.simulation)?;
    sim.start();
    Ok(Json(sim.snapshot()))
}

/// POST /api/simulation/stop
pub async fn stop(State(state): State<AppState>) -> ApiResult<Json<SimulationSnapshot>> {
    let mut sim = lock(&state.simulation)?;
    sim.stop();
    Ok(Json(sim.snapshot()))
}

/// POST /api/simulation/reset
pub async fn reset(State(state): State<AppState>) -> ApiResult<Json<SimulationSnapshot>> {
    let mut sim = lock(&state.simulation)?;
    sim.reset();
    Ok(Json(sim.snapshot()))
}

/// POST /api/simulation/mode (409 while running)
pub async fn set_mode(
    State(state): State<AppState>,
    Json(request): Json<ModeRequest>,
) -> ApiResult<Json<SimulationSnapshot>> {
    let mut sim = lock(&state.simulation)?;
    sim.set_mode(request.mode)?;
    Ok(Json(sim.snapshot()))
}
