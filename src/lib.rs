// FraudGuard - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod records;     // Loose row model shared by both engines
pub mod fraud;       // Transaction fraud scoring
pub mod credit;      // 300-850 applicant scorecard
pub mod explain;     // Prompt builders + text-generation client
pub mod dataset;     // Synthetic Home Credit data + reference tables
pub mod insights;    // Dataset-mode analysis over stored applications
pub mod samples;     // Demo rows for the upload screens
pub mod csv_import;  // CSV text -> records
pub mod simulation;  // Live transaction feed
pub mod store;       // SQLite-backed dataset persistence
pub mod config;      // Environment configuration

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use records::{FeatureImpact, Impact, Record, RiskLevel, MAX_BATCH_ROWS};
pub use fraud::{AnalyzedTransaction, FraudAnalysis, FraudAnalyzer, FraudSummary};
pub use credit::{score_batch, score_batch_with_generator, CreditScoring, RiskGroup, ScoreDistribution, ScoredApplicant};
pub use explain::{
    generator_from_config, DisabledGenerator, ExplainError, LlmConfig, OpenAiCompatClient, StaticGenerator,
    TextGenerator,
};
pub use dataset::{
    generate_dataset, BureauRecord, GeneratedDataset, HomeCreditApplication, PreviousApplication, DATASET_STATS,
    FEATURE_IMPORTANCE,
};
pub use insights::{
    analyze_applications, default_risk_explanation, score_applications, AnalysisResults, DatasetCreditScoring,
    DatasetFraudAnalysis, DatasetOverview, PortfolioInsights,
};
pub use csv_import::{load_csv, parse_csv, ParsedCsv};
pub use simulation::{DataMode, SimulationEngine, SimulationError, SimulationSnapshot};
pub use store::{DataSource, DataStore, StoreStatus};
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
