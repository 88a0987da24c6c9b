// 🚨 Fraud Scoring - Threshold rules over transaction rows
// Weighted rules map a transaction to a 0-1 fraud score plus a readable reason list

use crate::records::{format_amount, Record, RiskLevel, MAX_BATCH_ROWS};
use chrono::{DateTime, NaiveDateTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Categories that historically attract card fraud
pub const HIGH_RISK_CATEGORIES: [&str; 4] = ["electronics", "jewelry", "gift_cards", "cryptocurrency"];

/// Upper bound (exclusive) of the per-transaction random jitter
pub const DEFAULT_MAX_JITTER: f64 = 0.15;

/// Scores above this are flagged for review
pub const FLAG_THRESHOLD: f64 = 0.5;

pub const ANALYSIS_FAILED_MESSAGE: &str = "Analysis encountered an issue. Please try again.";

// ============================================================================
// SCORING RULES
// ============================================================================

/// Hour of day of the transaction's `time` field, in the timestamp's own offset
pub fn transaction_hour(record: &Record) -> Option<u32> {
    let raw = record.text("time");
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.hour());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.hour())
}

fn is_high_risk_category(record: &Record) -> bool {
    let category = record.text("category").to_lowercase();
    HIGH_RISK_CATEGORIES.contains(&category.as_str())
}

fn is_night_hour(hour: Option<u32>) -> bool {
    matches!(hour, Some(h) if h <= 5)
}

/// Fraud score in [0, 1]; `jitter` is added before capping
pub fn fraud_score(record: &Record, jitter: f64) -> f64 {
    let mut score = 0.0;

    let amount = record.number_or("amount", 0.0);
    if amount > 5000.0 {
        score += 0.3;
    } else if amount > 1000.0 {
        score += 0.15;
    } else if amount > 500.0 {
        score += 0.05;
    }

    if is_high_risk_category(record) {
        score += 0.2;
    }

    if is_night_hour(transaction_hour(record)) {
        score += 0.15;
    }

    let credit_ratio = record.number_or("creditRatio", 0.0);
    if credit_ratio > 0.5 {
        score += 0.2;
    } else if credit_ratio > 0.3 {
        score += 0.1;
    }

    let avg_ext = (record.number_or("extScore1", 0.5)
        + record.number_or("extScore2", 0.5)
        + record.number_or("extScore3", 0.5))
        / 3.0;
    if avg_ext < 0.3 {
        score += 0.25;
    }

    f64::min(score + jitter, 1.0)
}

pub fn risk_level(score: f64) -> RiskLevel {
    if score < 0.3 {
        RiskLevel::Low
    } else if score < 0.6 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Rule-based explanation of why a transaction scored the way it did
pub fn explain(record: &Record, score: f64) -> String {
    let mut reasons: Vec<String> = Vec::new();

    let amount = record.number_or("amount", 0.0);
    if amount > 5000.0 {
        reasons.push(format!(
            "Very high transaction amount (${}) significantly exceeds typical spending patterns",
            format_amount(amount)
        ));
    } else if amount > 1000.0 {
        reasons.push(format!(
            "Elevated transaction amount (${}) warrants additional scrutiny",
            format_amount(amount)
        ));
    }

    if is_high_risk_category(record) {
        reasons.push(format!(
            "Transaction category \"{}\" is commonly associated with fraudulent activity",
            record.text("category")
        ));
    }

    if let Some(h) = transaction_hour(record).filter(|h| *h <= 5) {
        reasons.push(format!(
            "Transaction occurred at {}:00 AM, an unusual time that may indicate compromised credentials",
            h
        ));
    }

    let credit_ratio = record.number_or("creditRatio", 0.0);
    if credit_ratio > 0.5 {
        reasons.push(format!(
            "Credit-to-income ratio of {:.1}% indicates potential overextension",
            credit_ratio * 100.0
        ));
    }

    // Only explain external scores the row actually carries
    let ext = [
        record.number_or("extScore1", 0.0),
        record.number_or("extScore2", 0.0),
        record.number_or("extScore3", 0.0),
    ];
    if ext.iter().any(|v| *v > 0.0) {
        let avg = ext.iter().sum::<f64>() / 3.0;
        if avg < 0.3 {
            reasons.push(format!(
                "Low external credit scores (avg: {:.0}%) suggest elevated risk profile",
                avg * 100.0
            ));
        }
    }

    if reasons.is_empty() {
        let fallback = if score > 0.6 {
            "Multiple minor risk indicators combine to create elevated risk profile"
        } else if score > 0.3 {
            "Some risk factors detected but within acceptable thresholds"
        } else {
            "Transaction appears normal with no significant risk indicators"
        };
        reasons.push(fallback.to_string());
    }

    format!("{}.", reasons.join(". "))
}

// ============================================================================
// BATCH ANALYSIS
// ============================================================================

/// Keys written by the analyzer; stale copies in the input row are dropped
const OUTPUT_KEYS: [&str; 5] = ["id", "fraudScore", "riskLevel", "explanation", "flagged"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedTransaction {
    #[serde(flatten)]
    pub fields: Record,
    pub id: String,
    pub fraud_score: f64,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub flagged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudSummary {
    pub total_transactions: usize,
    pub fraud_count: usize,
    pub genuine_count: usize,
    pub avg_fraud_score: f64,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
}

impl FraudSummary {
    /// Summarise `(fraud_score, risk_level, flagged)` triples
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = (f64, RiskLevel, bool)>,
    {
        let mut summary = FraudSummary::default();
        let mut score_sum = 0.0;

        for (score, level, flagged) in scores {
            summary.total_transactions += 1;
            score_sum += score;
            if flagged {
                summary.fraud_count += 1;
            } else {
                summary.genuine_count += 1;
            }
            match level {
                RiskLevel::High => summary.high_risk_count += 1,
                RiskLevel::Medium => summary.medium_risk_count += 1,
                RiskLevel::Low => summary.low_risk_count += 1,
            }
        }

        if summary.total_transactions > 0 {
            summary.avg_fraud_score = score_sum / summary.total_transactions as f64;
        }
        summary
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FraudAnalysis {
    pub transactions: Vec<AnalyzedTransaction>,
    pub summary: FraudSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FraudAnalysis {
    pub fn empty() -> Self {
        FraudAnalysis::default()
    }

    /// Zeroed result carrying the generic failure message
    pub fn failed() -> Self {
        FraudAnalysis {
            error: Some(ANALYSIS_FAILED_MESSAGE.to_string()),
            ..FraudAnalysis::default()
        }
    }
}

/// Scores transaction batches, drawing the jitter term from `rng`
pub struct FraudAnalyzer<R: Rng> {
    rng: R,
    max_jitter: f64,
}

impl<R: Rng> FraudAnalyzer<R> {
    pub fn new(rng: R, max_jitter: f64) -> Self {
        FraudAnalyzer {
            rng,
            max_jitter: max_jitter.max(0.0),
        }
    }

    fn jitter(&mut self) -> f64 {
        if self.max_jitter > 0.0 {
            self.rng.random_range(0.0..self.max_jitter)
        } else {
            0.0
        }
    }

    pub fn analyze_one(&mut self, record: &Record) -> AnalyzedTransaction {
        let score = fraud_score(record, self.jitter());
        let level = risk_level(score);
        let explanation = explain(record, score);

        let mut fields = record.clone();
        for key in OUTPUT_KEYS {
            fields.remove(key);
        }
        let id = record.id().unwrap_or_else(|| record.fingerprint("TXN"));

        AnalyzedTransaction {
            fields,
            id,
            fraud_score: score,
            risk_level: level,
            explanation,
            flagged: score > FLAG_THRESHOLD,
        }
    }

    /// Analyse the first `MAX_BATCH_ROWS` transactions
    pub fn analyze(&mut self, records: &[Record]) -> FraudAnalysis {
        let transactions: Vec<AnalyzedTransaction> = records
            .iter()
            .take(MAX_BATCH_ROWS)
            .map(|r| self.analyze_one(r))
            .collect();

        let summary = FraudSummary::from_scores(
            transactions
                .iter()
                .map(|t| (t.fraud_score, t.risk_level, t.flagged)),
        );

        debug!(
            analyzed = summary.total_transactions,
            flagged = summary.fraud_count,
            "fraud batch analysed"
        );

        FraudAnalysis {
            transactions,
            summary,
            error: None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
