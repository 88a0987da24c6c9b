// 💾 Data Store - Persisted dataset snapshot (SQLite key/value)
// One JSON document under a fixed key; the in-memory copy is the source of truth

use crate::dataset::{BureauRecord, GeneratedDataset, HomeCreditApplication, PreviousApplication};
use crate::insights::AnalysisResults;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

pub const STORAGE_KEY: &str = "fraud_detection_data_store";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Kaggle,
    Upload,
}

/// Everything that survives a restart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub applications: Vec<HomeCreditApplication>,
    pub bureau_records: Vec<BureauRecord>,
    pub previous_apps: Vec<PreviousApplication>,
    pub analysis_results: Option<AnalysisResults>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Summary of what is loaded, as reported by status endpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub data_loaded: bool,
    pub data_source: Option<DataSource>,
    pub record_count: usize,
    pub bureau_count: usize,
    pub previous_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub analysis_results: Option<AnalysisResults>,
}

pub struct DataStore {
    conn: Connection,
    snapshot: StoreSnapshot,
}

// ============================================================================
// SETUP
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

impl DataStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open data store: {:?}", path))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory data store")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        let snapshot = load_snapshot(&conn)?;
        if !snapshot.applications.is_empty() {
            info!(records = snapshot.applications.len(), "restored stored dataset");
        }
        Ok(DataStore { conn, snapshot })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// A stored snapshot without applications counts as nothing loaded
    pub fn data_loaded(&self) -> bool {
        !self.snapshot.applications.is_empty()
    }

    pub fn data_source(&self) -> Option<DataSource> {
        self.data_loaded().then_some(DataSource::Kaggle)
    }

    pub fn record_count(&self) -> usize {
        self.snapshot.applications.len()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.loaded_at
    }

    pub fn applications(&self) -> &[HomeCreditApplication] {
        &self.snapshot.applications
    }

    pub fn bureau_records(&self) -> &[BureauRecord] {
        &self.snapshot.bureau_records
    }

    pub fn previous_apps(&self) -> &[PreviousApplication] {
        &self.snapshot.previous_apps
    }

    pub fn analysis_results(&self) -> Option<&AnalysisResults> {
        self.snapshot.analysis_results.as_ref()
    }

    pub fn application(&self, sk_id_curr: i64) -> Option<&HomeCreditApplication> {
        self.snapshot
            .applications
            .iter()
            .find(|a| a.sk_id_curr == sk_id_curr)
    }

    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            data_loaded: self.data_loaded(),
            data_source: self.data_source(),
            record_count: self.record_count(),
            bureau_count: self.snapshot.bureau_records.len(),
            previous_count: self.snapshot.previous_apps.len(),
            loaded_at: self.snapshot.loaded_at,
            analysis_results: self.snapshot.analysis_results.clone(),
        }
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Replace the loaded dataset; earlier analysis results are kept
    pub fn set_dataset(&mut self, dataset: GeneratedDataset, loaded_at: DateTime<Utc>) -> Result<()> {
        self.snapshot.applications = dataset.applications;
        self.snapshot.bureau_records = dataset.bureau_records;
        self.snapshot.previous_apps = dataset.previous_apps;
        self.snapshot.loaded_at = Some(loaded_at);
        self.persist()?;

        info!(records = self.record_count(), "dataset stored");
        Ok(())
    }

    pub fn set_analysis_results(&mut self, results: AnalysisResults) -> Result<()> {
        self.snapshot.analysis_results = Some(results);
        self.persist()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.snapshot = StoreSnapshot::default();
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![STORAGE_KEY])
            .context("Failed to clear data store")?;

        info!("dataset cleared");
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.snapshot).context("Failed to serialize data store")?;
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![STORAGE_KEY, json],
            )
            .context("Failed to write data store")?;
        Ok(())
    }
}

/// Unreadable snapshots are logged and treated as empty
fn load_snapshot(conn: &Connection) -> Result<StoreSnapshot> {
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![STORAGE_KEY],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to read data store")?;

    let Some(json) = stored else {
        return Ok(StoreSnapshot::default());
    };

    match serde_json::from_str::<StoreSnapshot>(&json) {
        Ok(snapshot) if !snapshot.applications.is_empty() => Ok(snapshot),
        Ok(_) => Ok(StoreSnapshot::default()),
        Err(e) => {
            warn!(error = %e, "ignoring unreadable stored dataset");
            Ok(StoreSnapshot::default())
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::generate_dataset;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dataset(count: usize) -> GeneratedDataset {
        generate_dataset(&mut StdRng::seed_from_u64(77), count)
    }

    fn results() -> AnalysisResults {
        AnalysisResults {
            analyzed_count: 3,
            high_risk: 1,
            medium_risk: 1,
            low_risk: 1,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_store() {
        let store = DataStore::in_memory().unwrap();
        assert!(!store.data_loaded());
        assert_eq!(store.data_source(), None);
        assert_eq!(store.record_count(), 0);
        assert!(store.loaded_at().is_none());
    }

    #[test]
    fn test_set_dataset_and_lookup() {
        let mut store = DataStore::in_memory().unwrap();
        let data = dataset(5);
        let first_id = data.applications[0].sk_id_curr;
        let now = Utc::now();

        store.set_dataset(data, now).unwrap();
        assert!(store.data_loaded());
        assert_eq!(store.data_source(), Some(DataSource::Kaggle));
        assert_eq!(store.record_count(), 5);
        assert_eq!(store.loaded_at(), Some(now));
        assert!(store.application(first_id).is_some());
        assert!(store.application(-1).is_none());

        let status = serde_json::to_value(store.status()).unwrap();
        assert_eq!(status["dataSource"], "kaggle");
        assert_eq!(status["recordCount"], 5);
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let mut store = DataStore::open(&path).unwrap();
            store.set_dataset(dataset(4), Utc::now()).unwrap();
            store.set_analysis_results(results()).unwrap();
        }

        let store = DataStore::open(&path).unwrap();
        assert_eq!(store.record_count(), 4);
        assert_eq!(store.bureau_records().len(), 4 * crate::dataset::DEFAULT_BUREAU_COUNT);
        assert_eq!(store.analysis_results().map(|r| r.analyzed_count), Some(3));
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let mut store = DataStore::open(&path).unwrap();
            store.set_dataset(dataset(2), Utc::now()).unwrap();
            store.clear().unwrap();
            assert!(!store.data_loaded());
            assert!(store.analysis_results().is_none());
        }

        let store = DataStore::open(&path).unwrap();
        assert!(!store.data_loaded());
    }

    #[test]
    fn test_zero_applications_means_no_data() {
        let mut store = DataStore::in_memory().unwrap();
        store.set_analysis_results(results()).unwrap();

        // an analysis-only snapshot is not a loaded dataset
        let reloaded = load_snapshot(&store.conn).unwrap();
        assert_eq!(reloaded, StoreSnapshot::default());
        assert!(!store.data_loaded());
    }

    #[test]
    fn test_corrupt_snapshot_is_ignored() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)",
            params![STORAGE_KEY, "{not json"],
        )
        .unwrap();

        let store = DataStore::from_connection(conn).unwrap();
        assert!(!store.data_loaded());
    }
}
