// HTTP API - Axum router, handlers and shared state
// Compiled only with the `server` feature

pub mod app;
pub mod error;
pub mod routes;
pub mod state;

pub use app::create_app;
pub use error::{ApiError, ApiResult};
pub use state::{spawn_simulation_driver, AppState};
