// 🛡️ FraudGuard CLI - Score CSV uploads, manage the stored dataset, run the feed
// Same engines the API server uses, driven from the terminal

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use fraudguard::{
    analyze_applications, default_risk_explanation, generate_dataset, generator_from_config, load_csv, score_batch,
    score_batch_with_generator, AppConfig, DataMode, DataStore, DatasetOverview, FraudAnalyzer, PortfolioInsights, SimulationEngine,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fraudguard")]
#[command(about = "Fraud detection and credit scoring over transaction and applicant data")]
#[command(version)]
struct Cli {
    /// SQLite file holding the stored dataset (overrides FRAUDGUARD_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic Home Credit dataset and store it
    Generate {
        #[arg(short, long, default_value_t = fraudguard::dataset::DEFAULT_APPLICATION_COUNT)]
        count: usize,

        /// Seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show what the store currently holds
    Status,
    /// Score a transaction CSV for fraud
    Analyze {
        #[arg(value_name = "CSV")]
        path: PathBuf,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score an applicant CSV on the 300-850 scale
    Score {
        #[arg(value_name = "CSV")]
        path: PathBuf,

        /// Ask the configured text generator for each explanation
        #[arg(long)]
        explain: bool,

        #[arg(long)]
        json: bool,
    },
    /// Run fraud analysis over the stored dataset and remember the results
    AnalyzeDataset,
    /// Explain one stored application's default risk
    Explain {
        #[arg(value_name = "SK_ID_CURR")]
        id: i64,

        /// Use the text generator instead of the rule-based narrative
        #[arg(long)]
        ai: bool,
    },
    /// Run the live feed for a fixed number of ticks
    Simulate {
        #[arg(short, long, default_value_t = 20)]
        ticks: usize,

        #[arg(short, long, value_enum, default_value_t = ModeArg::Random)]
        mode: ModeArg,

        #[arg(long)]
        seed: Option<u64>,
    },
    /// Delete the stored dataset
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Random,
    Kaggle,
}

impl From<ModeArg> for DataMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Random => DataMode::Random,
            ModeArg::Kaggle => DataMode::Kaggle,
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fraudguard=warn")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Commands::Generate { count, seed } => run_generate(&config, count, seed),
        Commands::Status => run_status(&config),
        Commands::Analyze { path, json } => run_analyze(&config, path, json),
        Commands::Score { path, explain, json } => run_score(&config, path, explain, json).await,
        Commands::AnalyzeDataset => run_analyze_dataset(&config),
        Commands::Explain { id, ai } => run_explain(&config, id, ai).await,
        Commands::Simulate { ticks, mode, seed } => run_simulate(&config, ticks, mode.into(), seed),
        Commands::Clear => run_clear(&config),
    }
}

// ============================================================================
// DATASET COMMANDS
// ============================================================================

fn run_generate(config: &AppConfig, count: usize, seed: Option<u64>) -> Result<()> {
    if count == 0 {
        bail!("count must be at least 1");
    }

    println!("🏦 Generating synthetic dataset");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let dataset = generate_dataset(&mut seeded_rng(seed), count);
    println!(
        "✓ {} applications, {} bureau records, {} previous applications",
        dataset.applications.len(),
        dataset.bureau_records.len(),
        dataset.previous_apps.len()
    );

    let mut store = DataStore::open(&config.db_path)?;
    store.set_dataset(dataset, Utc::now())?;
    println!("✓ Stored in {:?}", config.db_path);

    print_overview(store.applications());
    Ok(())
}

fn run_status(config: &AppConfig) -> Result<()> {
    let store = DataStore::open(&config.db_path)?;
    let status = store.status();

    println!("📊 Store: {:?}", config.db_path);
    if !status.data_loaded {
        println!("   No dataset loaded. Run: fraudguard generate");
        return Ok(());
    }

    println!("   Records:  {}", status.record_count);
    println!("   Bureau:   {}", status.bureau_count);
    println!("   Previous: {}", status.previous_count);
    if let Some(loaded_at) = status.loaded_at {
        println!("   Loaded:   {}", loaded_at.to_rfc3339());
    }
    if let Some(results) = &status.analysis_results {
        println!(
            "   Last analysis: {} analysed, {} high / {} medium / {} low",
            results.analyzed_count, results.high_risk, results.medium_risk, results.low_risk
        );
    }

    print_overview(store.applications());
    Ok(())
}

fn print_overview(apps: &[fraudguard::HomeCreditApplication]) {
    let Some(overview) = DatasetOverview::from_applications(apps) else {
        return;
    };

    println!("\n📈 Overview");
    println!("   Default rate: {:.2}%", overview.default_rate);
    println!("   Avg income:   ${:.0}", overview.avg_income);
    println!("   Avg credit:   ${:.0}", overview.avg_credit);
    println!(
        "   Risk:         {} high / {} medium / {} low",
        overview.high_risk, overview.medium_risk, overview.low_risk
    );
    for bucket in &overview.income_distribution {
        println!("   {:>9}  {}", bucket.range, bucket.count);
    }

    let Some(insights) = PortfolioInsights::from_applications(apps) else {
        return;
    };
    println!("\n🔮 Default forecast");
    for point in &insights.weekly_forecast {
        println!("   {:>7}  {:>5}  ({}% confidence)", point.week, point.predicted, point.confidence);
    }
    for factor in &insights.risk_factors {
        println!("   {:>3}%  {}", factor.percentage, factor.label);
    }
}

fn run_analyze_dataset(config: &AppConfig) -> Result<()> {
    let mut store = DataStore::open(&config.db_path)?;
    if !store.data_loaded() {
        bail!("no dataset loaded (run `fraudguard generate` first)");
    }

    let analysis = analyze_applications(store.applications(), Utc::now());
    store.set_analysis_results(analysis.results.clone())?;

    println!("🚨 Dataset fraud analysis");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Analysed: {}", analysis.results.analyzed_count);
    println!(
        "   High / Medium / Low: {} / {} / {}",
        analysis.results.high_risk, analysis.results.medium_risk, analysis.results.low_risk
    );
    println!("   Avg fraud score: {:.3}", analysis.summary.avg_fraud_score);

    for tx in analysis.transactions.iter().filter(|t| t.flagged).take(10) {
        println!("   🚩 {} score {:.2} ({})", tx.id, tx.fraud_score, tx.risk_level.as_str());
    }
    Ok(())
}

async fn run_explain(config: &AppConfig, id: i64, ai: bool) -> Result<()> {
    let store = DataStore::open(&config.db_path)?;
    let app = store
        .application(id)
        .with_context(|| format!("application {} is not in the stored dataset", id))?;

    let text = if ai {
        let generator = generator_from_config(&config.llm());
        fraudguard::explain::explain_default_risk(generator.as_ref(), app).await
    } else {
        default_risk_explanation(app)
    };

    println!("🗣️  Application {} (risk score {}, {})", app.sk_id_curr, app.risk_score, app.risk_level.as_str());
    println!("{}", text);
    Ok(())
}

fn run_clear(config: &AppConfig) -> Result<()> {
    DataStore::open(&config.db_path)?.clear()?;
    println!("✅ Stored dataset cleared");
    Ok(())
}

// ============================================================================
// UPLOAD COMMANDS
// ============================================================================

fn read_rows(path: &Path) -> Result<Vec<fraudguard::Record>> {
    let parsed = load_csv(path)?;
    for error in &parsed.errors {
        eprintln!("⚠️  {}", error);
    }
    if parsed.rows.is_empty() {
        bail!("no rows found in {:?}", path);
    }
    println!("📂 Loaded {} rows from {:?}", parsed.rows.len(), path);
    Ok(parsed.rows)
}

fn run_analyze(config: &AppConfig, path: PathBuf, json: bool) -> Result<()> {
    let rows = read_rows(&path)?;
    let mut analyzer = FraudAnalyzer::new(StdRng::from_os_rng(), config.fraud_jitter);
    let analysis = analyzer.analyze(&rows);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let summary = &analysis.summary;
    println!("\n🚨 Fraud analysis");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Transactions: {}", summary.total_transactions);
    println!("   Flagged:      {}", summary.fraud_count);
    println!("   Avg score:    {:.3}", summary.avg_fraud_score);
    println!(
        "   High / Medium / Low: {} / {} / {}",
        summary.high_risk_count, summary.medium_risk_count, summary.low_risk_count
    );

    for tx in analysis.transactions.iter().filter(|t| t.flagged) {
        println!("\n   🚩 {} score {:.2} ({})", tx.id, tx.fraud_score, tx.risk_level.as_str());
        println!("      {}", tx.explanation);
    }
    Ok(())
}

async fn run_score(config: &AppConfig, path: PathBuf, explain: bool, json: bool) -> Result<()> {
    let rows = read_rows(&path)?;

    let scoring = if explain {
        let generator = generator_from_config(&config.llm());
        score_batch_with_generator(&rows, generator.as_ref())
            .await
            .context("Failed to generate explanations")?
    } else {
        score_batch(&rows)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&scoring)?);
        return Ok(());
    }

    let dist = &scoring.distribution;
    println!("\n💳 Credit scoring");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Prime / Near-prime / Subprime: {} / {} / {}", dist.prime, dist.near_prime, dist.subprime);
    println!("   Avg score:     {:.0}", dist.avg_score);
    println!("   Approval rate: {:.1}%", dist.approval_rate);

    for (i, applicant) in scoring.applicants.iter().enumerate() {
        let id = applicant.fields.id().unwrap_or_else(|| format!("#{}", i + 1));
        let mark = if applicant.approved { "✓" } else { "✗" };
        println!(
            "\n   {} {} {:.0} ({})",
            mark,
            id,
            applicant.credit_score,
            applicant.risk_group.name()
        );
        println!("      {}", applicant.explanation);
    }
    Ok(())
}

// ============================================================================
// SIMULATION
// ============================================================================

fn run_simulate(config: &AppConfig, ticks: usize, mode: DataMode, seed: Option<u64>) -> Result<()> {
    let store = DataStore::open(&config.db_path)?;
    if mode == DataMode::Kaggle && !store.data_loaded() {
        println!("⚠️  No stored dataset; kaggle mode falls back to random transactions");
    }

    let mut engine = match seed {
        Some(seed) => SimulationEngine::with_seed(seed, config.sim_interval_ms),
        None => SimulationEngine::new(config.sim_interval_ms),
    };
    engine.set_mode(mode)?;
    engine.start();

    println!("⏱️  Simulating {} transactions", ticks);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for _ in 0..ticks {
        let tx = engine.tick(store.applications(), Utc::now());
        let mark = if tx.is_fraud { "🚩" } else { "  " };
        println!(
            "{} {:<12} ${:>10.2}  score {:.2}  {}",
            mark, tx.id, tx.amount, tx.fraud_score, tx.contract_type
        );
    }
    engine.stop();

    let stats = engine.stats();
    println!("\n   Total {} | fraudulent {} | genuine {}", stats.total, stats.fraudulent, stats.genuine);
    println!("   Fraud rate {:.1}% | avg score {:.3}", stats.fraud_rate(), stats.avg_fraud_score);
    Ok(())
}
