// ⏱️ Simulation Engine - Live feed of simulated credit transactions
// Random mode invents applications; dataset mode replays the loaded ones in order

use crate::dataset::HomeCreditApplication;
use crate::records::round_to;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, info};

/// Newest transactions kept in the feed
pub const FEED_CAPACITY: usize = 50;
/// Fraud-rate points kept in the history
pub const HISTORY_CAPACITY: usize = 20;
/// Transactions considered when computing a fraud-rate point
pub const RATE_WINDOW: usize = 20;
/// A rate point is recorded every N generated transactions
pub const SAMPLE_EVERY: u64 = 5;
pub const DEFAULT_INTERVAL_MS: u64 = 800;

const SIM_CONTRACT_TYPES: [&str; 2] = ["Cash loans", "Revolving loans"];
const SIM_INCOME_TYPES: [&str; 4] = ["Working", "Commercial associate", "Pensioner", "State servant"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("cannot change data mode while the simulation is running")]
    ModeChangeWhileRunning,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    #[default]
    Random,
    Kaggle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedTransaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub amount: f64,
    pub contract_type: String,
    pub income_type: String,
    pub is_fraud: bool,
    pub fraud_score: f64,
    pub ext_source2: f64,
    pub credit_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudRatePoint {
    /// Wall-clock label, `HH:MM:SS`
    pub time: String,
    /// Percent fraud among the newest transactions, one decimal
    pub rate: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStats {
    pub total: u64,
    pub fraudulent: u64,
    pub genuine: u64,
    pub avg_fraud_score: f64,
}

impl SimulationStats {
    fn record(&mut self, tx: &SimulatedTransaction) {
        let previous_total = self.total as f64;
        self.total += 1;
        if tx.is_fraud {
            self.fraudulent += 1;
        }
        self.genuine = self.total - self.fraudulent;
        self.avg_fraud_score = (self.avg_fraud_score * previous_total + tx.fraud_score) / self.total as f64;
    }

    /// Overall fraud percentage, one decimal
    pub fn fraud_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            round_to(self.fraudulent as f64 / self.total as f64 * 100.0, 1)
        }
    }
}

/// Serializable view of the engine for the dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    pub running: bool,
    pub mode: DataMode,
    pub interval_ms: u64,
    pub transactions: Vec<SimulatedTransaction>,
    pub fraud_rate_history: Vec<FraudRatePoint>,
    pub stats: SimulationStats,
    pub fraud_rate: f64,
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct SimulationEngine {
    rng: StdRng,
    running: bool,
    mode: DataMode,
    interval_ms: u64,
    /// Newest first
    feed: VecDeque<SimulatedTransaction>,
    history: VecDeque<FraudRatePoint>,
    stats: SimulationStats,
    transaction_count: u64,
    dataset_index: usize,
}

impl SimulationEngine {
    pub fn new(interval_ms: u64) -> Self {
        Self::with_rng(StdRng::from_os_rng(), interval_ms)
    }

    pub fn with_seed(seed: u64, interval_ms: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), interval_ms)
    }

    fn with_rng(rng: StdRng, interval_ms: u64) -> Self {
        SimulationEngine {
            rng,
            running: false,
            mode: DataMode::Random,
            interval_ms,
            feed: VecDeque::with_capacity(FEED_CAPACITY),
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            stats: SimulationStats::default(),
            transaction_count: 0,
            dataset_index: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn mode(&self) -> DataMode {
        self.mode
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    pub fn feed(&self) -> impl Iterator<Item = &SimulatedTransaction> {
        self.feed.iter()
    }

    pub fn history(&self) -> impl Iterator<Item = &FraudRatePoint> {
        self.history.iter()
    }

    pub fn start(&mut self) {
        if !self.running {
            info!(mode = ?self.mode, interval_ms = self.interval_ms, "simulation started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!(total = self.stats.total, "simulation stopped");
        }
        self.running = false;
    }

    /// Stop and forget everything generated so far
    pub fn reset(&mut self) {
        self.stop();
        self.feed.clear();
        self.history.clear();
        self.stats = SimulationStats::default();
        self.transaction_count = 0;
        self.dataset_index = 0;
    }

    pub fn set_mode(&mut self, mode: DataMode) -> Result<(), SimulationError> {
        if self.running {
            return Err(SimulationError::ModeChangeWhileRunning);
        }
        self.mode = mode;
        Ok(())
    }

    /// Generate one transaction and fold it into feed, stats and history.
    /// Dataset mode without loaded applications falls back to random mode.
    pub fn tick(&mut self, applications: &[HomeCreditApplication], now: DateTime<Utc>) -> SimulatedTransaction {
        self.transaction_count += 1;

        let tx = match (self.mode, applications.is_empty()) {
            (DataMode::Kaggle, false) => {
                let app = &applications[self.dataset_index % applications.len()];
                self.dataset_index += 1;
                from_application(app, now)
            }
            _ => self.random_transaction(now),
        };

        self.feed.push_front(tx.clone());
        self.feed.truncate(FEED_CAPACITY);
        self.stats.record(&tx);

        if self.transaction_count % SAMPLE_EVERY == 0 {
            self.record_rate_point(now);
        }

        debug!(id = %tx.id, fraud = tx.is_fraud, "simulated transaction");
        tx
    }

    fn random_transaction(&mut self, now: DateTime<Utc>) -> SimulatedTransaction {
        let rng = &mut self.rng;
        let is_fraud = rng.random::<f64>() > 0.88;
        let amount = if is_fraud {
            rng.random::<f64>() * 1_500_000.0 + 200_000.0
        } else {
            rng.random::<f64>() * 500_000.0 + 50_000.0
        };
        let fraud_score = if is_fraud {
            0.6 + rng.random::<f64>() * 0.4
        } else {
            rng.random::<f64>() * 0.4
        };

        SimulatedTransaction {
            id: format!("SIM-{:06}", self.transaction_count),
            timestamp: now,
            amount: amount.round(),
            contract_type: SIM_CONTRACT_TYPES.choose(rng).copied().unwrap_or_default().to_string(),
            income_type: SIM_INCOME_TYPES.choose(rng).copied().unwrap_or_default().to_string(),
            is_fraud,
            fraud_score,
            ext_source2: rng.random::<f64>(),
            credit_ratio: 2.0 + rng.random::<f64>() * 6.0,
        }
    }

    /// Fraud rate over the newest transactions of the current feed
    fn record_rate_point(&mut self, now: DateTime<Utc>) {
        let window: Vec<&SimulatedTransaction> = self.feed.iter().take(RATE_WINDOW).collect();
        let rate = if window.is_empty() {
            0.0
        } else {
            window.iter().filter(|t| t.is_fraud).count() as f64 / window.len() as f64 * 100.0
        };

        self.history.push_back(FraudRatePoint {
            time: now.format("%H:%M:%S").to_string(),
            rate: round_to(rate, 1),
            count: self.transaction_count,
        });
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            running: self.running,
            mode: self.mode,
            interval_ms: self.interval_ms,
            transactions: self.feed.iter().cloned().collect(),
            fraud_rate_history: self.history.iter().cloned().collect(),
            stats: self.stats.clone(),
            fraud_rate: self.stats.fraud_rate(),
        }
    }
}

/// Dataset rows count as fraud when they defaulted or score above 60
fn from_application(app: &HomeCreditApplication, now: DateTime<Utc>) -> SimulatedTransaction {
    SimulatedTransaction {
        id: format!("SIM-{}", app.sk_id_curr),
        timestamp: now,
        amount: app.amt_credit,
        contract_type: app.name_contract_type.clone(),
        income_type: app.name_income_type.clone(),
        is_fraud: app.target == 1 || app.risk_score > 60,
        fraud_score: app.risk_score as f64 / 100.0,
        ext_source2: app.ext_source_2,
        credit_ratio: app.credit_income_ratio,
    }
}

// ============================================================================
// TESTS
// ============================================================================
