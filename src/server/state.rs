// 🧩 Shared State - Everything handlers need, behind Arc<Mutex<..>>
// Locks are never held across an await point

use crate::config::AppConfig;
use crate::explain::TextGenerator;
use crate::fraud::FraudAnalyzer;
use crate::simulation::SimulationEngine;
use crate::store::DataStore;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<DataStore>>,
    pub simulation: Arc<Mutex<SimulationEngine>>,
    pub analyzer: Arc<Mutex<FraudAnalyzer<StdRng>>>,
    /// Randomness for sample rows and synthetic datasets
    pub rng: Arc<Mutex<StdRng>>,
    pub generator: Arc<dyn TextGenerator>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: DataStore, generator: Arc<dyn TextGenerator>, config: &AppConfig) -> Self {
        Self::build(
            store,
            generator,
            config,
            StdRng::from_os_rng(),
            SimulationEngine::new(config.sim_interval_ms),
        )
    }

    /// Reproducible state for tests and demos
    pub fn with_seed(store: DataStore, generator: Arc<dyn TextGenerator>, config: &AppConfig, seed: u64) -> Self {
        Self::build(
            store,
            generator,
            config,
            StdRng::seed_from_u64(seed),
            SimulationEngine::with_seed(seed, config.sim_interval_ms),
        )
    }

    fn build(
        store: DataStore,
        generator: Arc<dyn TextGenerator>,
        config: &AppConfig,
        mut rng: StdRng,
        simulation: SimulationEngine,
    ) -> Self {
        let analyzer_rng = StdRng::from_rng(&mut rng);
        Self {
            store: Arc::new(Mutex::new(store)),
            simulation: Arc::new(Mutex::new(simulation)),
            analyzer: Arc::new(Mutex::new(FraudAnalyzer::new(analyzer_rng, config.fraud_jitter))),
            rng: Arc::new(Mutex::new(rng)),
            generator,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Advance the simulation by one transaction if it is running
    pub fn simulation_step(&self) -> bool {
        let (Ok(store), Ok(mut sim)) = (self.store.lock(), self.simulation.lock()) else {
            warn!("simulation step skipped: shared state is unavailable");
            return false;
        };
        if !sim.is_running() {
            return false;
        }
        sim.tick(store.applications(), Utc::now());
        true
    }
}

/// Background task that feeds the simulation at a fixed interval
pub fn spawn_simulation_driver(state: AppState, interval: Duration) -> JoinHandle<()> {
    info!(interval_ms = interval.as_millis() as u64, "simulation driver started");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            state.simulation_step();
        }
    })
}
