// 📊 Dataset Insights - Analysis over loaded Home Credit applications
// Overview stats, portfolio aggregates, dataset-mode fraud flags, rule explanations, credit scores

use crate::credit::{RiskGroup, ScoreDistribution};
use crate::dataset::HomeCreditApplication;
use crate::fraud::{FraudSummary, FLAG_THRESHOLD};
use crate::records::{round_to, FeatureImpact, Impact, RiskLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dataset-mode approvals start here (uploads use `credit::APPROVAL_THRESHOLD`)
pub const DATASET_APPROVAL_THRESHOLD: f64 = 600.0;

const NO_RISK_INDICATORS: &str =
    "Standard risk profile with balanced factors across all assessment criteria. No major risk indicators detected.";

// ============================================================================
// OVERVIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeBucket {
    pub range: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOverview {
    pub total_apps: usize,
    /// Percent with TARGET = 1, two decimals
    pub default_rate: f64,
    pub avg_income: f64,
    pub avg_credit: f64,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub income_distribution: Vec<IncomeBucket>,
}

impl DatasetOverview {
    /// `None` when nothing is loaded
    pub fn from_applications(apps: &[HomeCreditApplication]) -> Option<Self> {
        if apps.is_empty() {
            return None;
        }

        let total = apps.len() as f64;
        let defaults = apps.iter().filter(|a| a.target == 1).count();
        let count_level = |level: RiskLevel| apps.iter().filter(|a| a.risk_level == level).count();
        let count_income = |min: f64, max: f64| {
            apps.iter()
                .filter(|a| a.amt_income_total >= min && a.amt_income_total < max)
                .count()
        };

        let bucket = |range: &str, count: usize| IncomeBucket {
            range: range.to_string(),
            count,
        };

        Some(DatasetOverview {
            total_apps: apps.len(),
            default_rate: round_to(defaults as f64 / total * 100.0, 2),
            avg_income: (apps.iter().map(|a| a.amt_income_total).sum::<f64>() / total).round(),
            avg_credit: (apps.iter().map(|a| a.amt_credit).sum::<f64>() / total).round(),
            high_risk: count_level(RiskLevel::High),
            medium_risk: count_level(RiskLevel::Medium),
            low_risk: count_level(RiskLevel::Low),
            income_distribution: vec![
                bucket("<50K", count_income(f64::MIN, 50_000.0)),
                bucket("50-100K", count_income(50_000.0, 100_000.0)),
                bucket("100-200K", count_income(100_000.0, 200_000.0)),
                bucket("200-300K", count_income(200_000.0, 300_000.0)),
                bucket(">300K", count_income(300_000.0, f64::MAX)),
            ],
        })
    }
}

// ============================================================================
// PORTFOLIO INSIGHTS
// ============================================================================

/// Growth applied to the current default count, week by week
const FORECAST_WEEKS: [(&str, f64, u8); 6] = [
    ("Week 1", 1.05, 95),
    ("Week 2", 1.08, 90),
    ("Week 3", 1.12, 85),
    ("Week 4", 1.15, 80),
    ("Week 5", 1.1, 75),
    ("Week 6", 1.07, 70),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub week: String,
    /// Observed defaults; only the current point has any
    pub defaults: usize,
    pub predicted: usize,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeRiskBracket {
    pub bracket: String,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
}

/// A bucket of applications with its default rate (percent, one decimal)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultRateBand {
    pub range: String,
    pub count: usize,
    pub default_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentShare {
    pub name: String,
    pub count: usize,
    pub default_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractIncome {
    pub name: String,
    pub avg_income: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorShare {
    pub label: String,
    pub description: String,
    /// Whole percent of applications showing the factor
    pub percentage: u32,
}

/// Dashboard aggregates over the loaded applications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInsights {
    pub default_count: usize,
    pub non_default_count: usize,
    /// Percent, one decimal
    pub default_rate: f64,
    pub avg_risk_score: f64,
    pub weekly_forecast: Vec<ForecastPoint>,
    pub income_risk: Vec<IncomeRiskBracket>,
    pub credit_ratio_risk: Vec<DefaultRateBand>,
    pub credit_ranges: Vec<DefaultRateBand>,
    pub ext_score_ranges: Vec<DefaultRateBand>,
    pub gender: Vec<SegmentShare>,
    pub income_by_contract: Vec<ContractIncome>,
    pub risk_factors: Vec<RiskFactorShare>,
}

fn ext_average(app: &HomeCreditApplication) -> f64 {
    (app.ext_source_1 + app.ext_source_2 + app.ext_source_3) / 3.0
}

/// Bucket `apps` by `value` into half-open `[min, max)` bands
fn default_rate_bands<F>(apps: &[HomeCreditApplication], bands: &[(&str, f64, f64)], value: F) -> Vec<DefaultRateBand>
where
    F: Fn(&HomeCreditApplication) -> f64,
{
    bands
        .iter()
        .map(|(range, min, max)| {
            let members: Vec<&HomeCreditApplication> = apps
                .iter()
                .filter(|a| {
                    let v = value(*a);
                    v >= *min && v < *max
                })
                .collect();
            let defaults = members.iter().filter(|a| a.target == 1).count();
            DefaultRateBand {
                range: range.to_string(),
                count: members.len(),
                default_rate: round_to(defaults as f64 / members.len().max(1) as f64 * 100.0, 1),
            }
        })
        .collect()
}

/// Group by a label in first-seen order
fn group_by_label<'a, F>(apps: &'a [HomeCreditApplication], label: F) -> Vec<(String, Vec<&'a HomeCreditApplication>)>
where
    F: Fn(&HomeCreditApplication) -> String,
{
    let mut groups: Vec<(String, Vec<&HomeCreditApplication>)> = Vec::new();
    for app in apps {
        let key = label(app);
        match groups.iter_mut().find(|(name, _)| *name == key) {
            Some((_, members)) => members.push(app),
            None => groups.push((key, vec![app])),
        }
    }
    groups
}

fn weekly_forecast(default_count: usize) -> Vec<ForecastPoint> {
    let current = ForecastPoint {
        week: "Current".to_string(),
        defaults: default_count,
        predicted: default_count,
        confidence: 100,
    };
    std::iter::once(current)
        .chain(FORECAST_WEEKS.iter().map(|(week, growth, confidence)| ForecastPoint {
            week: week.to_string(),
            defaults: 0,
            predicted: (default_count as f64 * growth).round() as usize,
            confidence: *confidence,
        }))
        .collect()
}

impl PortfolioInsights {
    /// `None` when nothing is loaded
    pub fn from_applications(apps: &[HomeCreditApplication]) -> Option<Self> {
        if apps.is_empty() {
            return None;
        }

        let total = apps.len() as f64;
        let default_count = apps.iter().filter(|a| a.target == 1).count();
        let share = |count: usize| (count as f64 / total * 100.0).round() as u32;

        let income_risk = [
            ("<50K", f64::MIN, 50_000.0),
            ("50-100K", 50_000.0, 100_000.0),
            ("100-200K", 100_000.0, 200_000.0),
            (">200K", 200_000.0, f64::INFINITY),
        ]
        .iter()
        .map(|(bracket, min, max)| {
            let count_level = |level: RiskLevel| {
                apps.iter()
                    .filter(|a| a.amt_income_total >= *min && a.amt_income_total < *max && a.risk_level == level)
                    .count()
            };
            IncomeRiskBracket {
                bracket: bracket.to_string(),
                high_risk: count_level(RiskLevel::High),
                medium_risk: count_level(RiskLevel::Medium),
                low_risk: count_level(RiskLevel::Low),
            }
        })
        .collect();

        let credit_ratio_risk = default_rate_bands(
            apps,
            &[
                ("<3x", f64::NEG_INFINITY, 3.0),
                ("3-5x", 3.0, 5.0),
                ("5-10x", 5.0, 10.0),
                (">10x", 10.0, f64::INFINITY),
            ],
            |a| a.credit_income_ratio,
        );
        let credit_ranges = default_rate_bands(
            apps,
            &[
                ("0-100K", 0.0, 100_000.0),
                ("100K-300K", 100_000.0, 300_000.0),
                ("300K-500K", 300_000.0, 500_000.0),
                ("500K-1M", 500_000.0, 1_000_000.0),
                ("1M+", 1_000_000.0, f64::INFINITY),
            ],
            |a| a.amt_credit,
        );
        let ext_score_ranges = default_rate_bands(
            apps,
            &[
                ("0.0-0.2", 0.0, 0.2),
                ("0.2-0.4", 0.2, 0.4),
                ("0.4-0.6", 0.4, 0.6),
                ("0.6-0.8", 0.6, 0.8),
                ("0.8-1.0", 0.8, 1.0),
            ],
            ext_average,
        );

        let gender = group_by_label(apps, |a| {
            let name = match a.code_gender.as_str() {
                "M" => "Male",
                "F" => "Female",
                _ => "Other",
            };
            name.to_string()
        })
        .into_iter()
        .map(|(name, members)| {
            let defaults = members.iter().filter(|a| a.target == 1).count();
            SegmentShare {
                name,
                count: members.len(),
                default_rate: round_to(defaults as f64 / members.len() as f64 * 100.0, 1),
            }
        })
        .collect();

        let income_by_contract = group_by_label(apps, |a| {
            if a.name_contract_type.is_empty() {
                "Unknown".to_string()
            } else {
                a.name_contract_type.clone()
            }
        })
        .into_iter()
        .map(|(name, members)| ContractIncome {
            avg_income: (members.iter().map(|a| a.amt_income_total).sum::<f64>() / members.len() as f64).round(),
            count: members.len(),
            name,
        })
        .collect();

        let factor = |label: &str, description: &str, count: usize| RiskFactorShare {
            label: label.to_string(),
            description: description.to_string(),
            percentage: share(count),
        };
        let risk_factors = vec![
            factor(
                "Low External Score (< 0.3)",
                "Applicants with poor external credit scores",
                apps.iter().filter(|a| ext_average(a) < 0.3).count(),
            ),
            factor(
                "High Credit-to-Income Ratio (> 5x)",
                "Credit amount exceeds 5x annual income",
                apps.iter().filter(|a| a.amt_credit / a.amt_income_total > 5.0).count(),
            ),
            factor(
                "Short Employment (< 1 year)",
                "Less than 1 year at current employment",
                apps.iter().filter(|a| a.days_employed.abs() < 365).count(),
            ),
            factor(
                "Young Age (< 25 years)",
                "Applicants under 25 years of age",
                apps.iter().filter(|a| (a.days_birth.abs() as f64) / 365.0 < 25.0).count(),
            ),
        ];

        Some(PortfolioInsights {
            default_count,
            non_default_count: apps.len() - default_count,
            default_rate: round_to(default_count as f64 / total * 100.0, 1),
            avg_risk_score: round_to(apps.iter().map(|a| a.risk_score as f64).sum::<f64>() / total, 1),
            weekly_forecast: weekly_forecast(default_count),
            income_risk,
            credit_ratio_risk,
            credit_ranges,
            ext_score_ranges,
            gender,
            income_by_contract,
            risk_factors,
        })
    }
}

// ============================================================================
// DATASET-MODE FRAUD ANALYSIS
// ============================================================================

/// Zero stands for "not recorded" in dataset rows and takes the default instead
fn or_default(value: f64, default: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        default
    } else {
        value
    }
}

fn or_default_int(value: i64, default: i64) -> i64 {
    if value == 0 {
        default
    } else {
        value
    }
}

/// Fraud flags straight from RISK_SCORE (no jitter, no categories); an unscored row counts as 50
pub fn dataset_fraud_score(app: &HomeCreditApplication) -> f64 {
    or_default(app.risk_score as f64, 50.0) / 100.0
}

pub fn dataset_risk_level(score: f64) -> RiskLevel {
    if score > 0.6 {
        RiskLevel::High
    } else if score > 0.3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetTransaction {
    pub id: String,
    pub sk_id_curr: i64,
    pub amount: f64,
    pub income: f64,
    pub contract_type: String,
    pub income_type: String,
    pub housing_type: String,
    pub fraud_score: f64,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub flagged: bool,
    pub ext_source1: f64,
    pub ext_source2: f64,
    pub ext_source3: f64,
    pub credit_income_ratio: f64,
    pub annuity_income_ratio: f64,
    pub age_years: i64,
    pub employed_years: i64,
    pub target: u8,
}

/// Per-row narrative used by the dataset fraud table, read from the defaulted row
pub fn detailed_explanation(tx: &DatasetTransaction) -> String {
    let mut parts: Vec<String> = Vec::new();
    let ext2 = tx.ext_source2;
    let ratio = tx.credit_income_ratio;
    let annuity_pct = tx.annuity_income_ratio * 100.0;
    let employed = tx.employed_years as f64;

    if ext2 < 0.3 {
        parts.push(format!(
            "Very low external credit score (EXT_SOURCE_2: {:.3}) indicates significant credit risk and limited positive credit history",
            ext2
        ));
    } else if ext2 < 0.5 {
        parts.push(format!(
            "Below average external credit score (EXT_SOURCE_2: {:.3}) suggests moderate credit concerns",
            ext2
        ));
    }

    if tx.ext_source1 < 0.3 {
        parts.push(format!(
            "Low EXT_SOURCE_1 score ({:.3}) indicates potential issues with primary credit bureau data",
            tx.ext_source1
        ));
    }
    if tx.ext_source3 < 0.3 {
        parts.push(format!(
            "Low EXT_SOURCE_3 score ({:.3}) reflects concerns from supplementary credit assessment",
            tx.ext_source3
        ));
    }

    if ratio > 10.0 {
        parts.push(format!(
            "Extremely high credit-to-income ratio ({:.1}x) significantly exceeds safe lending limits and indicates severe overextension",
            ratio
        ));
    } else if ratio > 5.0 {
        parts.push(format!(
            "High credit-to-income ratio ({:.1}x) exceeds typical debt capacity thresholds",
            ratio
        ));
    }

    if tx.annuity_income_ratio > 0.5 {
        parts.push(format!(
            "Annuity payment consumes {:.0}% of income, leaving limited capacity for financial emergencies",
            annuity_pct
        ));
    } else if tx.annuity_income_ratio > 0.35 {
        parts.push(format!(
            "Annuity burden of {:.0}% of income is above recommended 35% threshold",
            annuity_pct
        ));
    }

    if employed < 1.0 {
        parts.push(format!(
            "Very short employment history ({:.1} years) indicates income instability risk",
            employed
        ));
    } else if employed < 2.0 {
        parts.push(format!(
            "Limited employment tenure ({:.1} years) may affect repayment stability",
            employed
        ));
    }

    if tx.age_years < 25 {
        parts.push(format!(
            "Young applicant age ({} years) typically correlates with higher default probability",
            tx.age_years
        ));
    }

    // Positive factors
    if ext2 > 0.7 {
        parts.push(format!(
            "Strong external credit score (EXT_SOURCE_2: {:.3}) indicates solid credit history",
            ext2
        ));
    }
    if employed > 10.0 {
        parts.push(format!("Long-term employment stability ({:.0} years) is a positive factor", employed));
    }
    if ratio < 3.0 {
        parts.push(format!("Conservative credit-to-income ratio ({:.1}x) within safe limits", ratio));
    }

    if parts.is_empty() {
        return NO_RISK_INDICATORS.to_string();
    }
    format!("{}.", parts.join(". "))
}

/// Risk-level counts persisted alongside the loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResults {
    pub analyzed_count: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFraudAnalysis {
    pub transactions: Vec<DatasetTransaction>,
    pub summary: FraudSummary,
    pub results: AnalysisResults,
}

/// One application as a fraud-table row; unrecorded (zero) features take the table defaults
pub fn analyze_transaction(app: &HomeCreditApplication) -> DatasetTransaction {
    let fraud_score = dataset_fraud_score(app);

    let mut tx = DatasetTransaction {
        id: format!("HC-{}", app.sk_id_curr),
        sk_id_curr: app.sk_id_curr,
        amount: app.amt_credit,
        income: app.amt_income_total,
        contract_type: app.name_contract_type.clone(),
        income_type: app.name_income_type.clone(),
        housing_type: app.name_housing_type.clone(),
        fraud_score,
        risk_level: dataset_risk_level(fraud_score),
        explanation: String::new(),
        flagged: fraud_score > FLAG_THRESHOLD,
        ext_source1: or_default(app.ext_source_1, 0.5),
        ext_source2: or_default(app.ext_source_2, 0.5),
        ext_source3: or_default(app.ext_source_3, 0.5),
        credit_income_ratio: or_default(app.credit_income_ratio, 3.0),
        annuity_income_ratio: or_default(app.annuity_income_ratio, 0.3),
        age_years: or_default_int(app.age_years, 35),
        employed_years: or_default_int(app.employed_years, 5),
        target: app.target,
    };
    tx.explanation = detailed_explanation(&tx);
    tx
}

/// Analyze every loaded application (no batch cap in dataset mode)
pub fn analyze_applications(apps: &[HomeCreditApplication], now: DateTime<Utc>) -> DatasetFraudAnalysis {
    let transactions: Vec<DatasetTransaction> = apps.iter().map(analyze_transaction).collect();
    let summary = FraudSummary::from_scores(
        transactions
            .iter()
            .map(|t| (t.fraud_score, t.risk_level, t.flagged)),
    );

    let results = AnalysisResults {
        analyzed_count: transactions.len(),
        high_risk: summary.high_risk_count,
        medium_risk: summary.medium_risk_count,
        low_risk: summary.low_risk_count,
        timestamp: now,
    };

    DatasetFraudAnalysis {
        transactions,
        summary,
        results,
    }
}

// ============================================================================
// DEFAULT-RISK RULE EXPLANATION
// ============================================================================

/// Short rule-based narrative of one applicant's default risk
pub fn default_risk_explanation(app: &HomeCreditApplication) -> String {
    let mut parts: Vec<String> = Vec::new();
    let ext2 = app.ext_source_2;
    let ratio = app.credit_income_ratio;
    let employed = app.employed_years as f64;

    parts.push(if ext2 < 0.3 {
        format!(
            "Very low external credit score (EXT_SOURCE_2: {:.3}) indicates significant credit risk and limited positive credit history.",
            ext2
        )
    } else if ext2 < 0.5 {
        format!(
            "Below average external credit score (EXT_SOURCE_2: {:.3}) suggests moderate credit concerns.",
            ext2
        )
    } else {
        format!(
            "Good external credit score (EXT_SOURCE_2: {:.3}) indicates solid credit history.",
            ext2
        )
    });

    parts.push(if ratio > 10.0 {
        format!(
            "Extremely high credit-to-income ratio ({:.1}x) significantly exceeds safe lending limits.",
            ratio
        )
    } else if ratio > 5.0 {
        format!("High credit-to-income ratio ({:.1}x) exceeds typical debt capacity.", ratio)
    } else {
        format!("Conservative credit-to-income ratio ({:.1}x) within safe limits.", ratio)
    });

    if employed < 1.0 {
        parts.push(format!(
            "Very short employment history ({:.1} years) indicates income instability risk.",
            employed
        ));
    } else if employed > 5.0 {
        parts.push(format!("Stable employment history ({:.1} years) is a positive factor.", employed));
    }

    if app.target == 1 {
        parts.push("This applicant has a recorded default in the dataset, confirming the risk assessment.".to_string());
    }

    parts.join(" ")
}

// ============================================================================
// DATASET-MODE CREDIT SCORING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetScoredApplicant {
    pub id: String,
    pub sk_id_curr: i64,
    pub income: f64,
    pub loan_amount: f64,
    pub employment_length: f64,
    /// EXT_SOURCE_2 mapped onto the 300-850 range
    pub credit_history: f64,
    pub debt_to_income: f64,
    pub credit_score: f64,
    pub risk_group: RiskGroup,
    pub feature_importance: Vec<FeatureImpact>,
    pub explanation: String,
    pub approved: bool,
    pub ext_source1: f64,
    pub ext_source2: f64,
    pub ext_source3: f64,
    pub target: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetCreditScoring {
    pub applicants: Vec<DatasetScoredApplicant>,
    pub distribution: ScoreDistribution,
}

/// Inputs of the dataset-mode score; the annuity ratio stands in for debt-to-income.
/// Unrecorded (zero) values take the scoring defaults.
#[derive(Debug, Clone, Copy)]
struct ScoreInputs {
    income: f64,
    loan_amount: f64,
    employment: f64,
    debt_to_income: f64,
    ext: [f64; 3],
}

impl ScoreInputs {
    fn from_app(app: &HomeCreditApplication) -> Self {
        ScoreInputs {
            income: or_default(app.amt_income_total, 100_000.0),
            loan_amount: or_default(app.amt_credit, 200_000.0),
            employment: or_default(app.employed_years as f64, 3.0),
            debt_to_income: or_default(app.annuity_income_ratio, 0.3),
            ext: [
                or_default(app.ext_source_1, 0.5),
                or_default(app.ext_source_2, 0.5),
                or_default(app.ext_source_3, 0.5),
            ],
        }
    }

    fn loan_income_ratio(&self) -> f64 {
        if self.income > 0.0 {
            self.loan_amount / self.income
        } else {
            0.0
        }
    }
}

fn dataset_score(inputs: &ScoreInputs) -> f64 {
    let mut score = 550.0;
    score += inputs.ext.iter().map(|e| e * 100.0).sum::<f64>();
    score += (inputs.employment * 5.0).min(50.0);
    score -= inputs.debt_to_income * 100.0;
    if inputs.loan_income_ratio() > 5.0 {
        score -= 50.0;
    }
    score.round().clamp(300.0, 850.0)
}

/// Credit score of an application scored the dataset way
pub fn dataset_credit_score(app: &HomeCreditApplication) -> f64 {
    dataset_score(&ScoreInputs::from_app(app))
}

fn dataset_feature_importance(inputs: &ScoreInputs) -> Vec<FeatureImpact> {
    let [_, ext2, ext3] = inputs.ext;
    let ratio = inputs.loan_income_ratio();
    let direction = |good: bool| if good { Impact::Positive } else { Impact::Negative };

    vec![
        FeatureImpact::new("EXT_SOURCE_2", (ext2 * 100.0).round(), direction(ext2 > 0.5)),
        FeatureImpact::new("EXT_SOURCE_3", (ext3 * 100.0).round(), direction(ext3 > 0.5)),
        FeatureImpact::new(
            "Employment Years",
            (inputs.employment * 10.0).min(100.0),
            direction(inputs.employment > 2.0),
        ),
        FeatureImpact::new(
            "Debt-to-Income",
            (inputs.debt_to_income * 100.0).round(),
            direction(inputs.debt_to_income < 0.4),
        ),
        FeatureImpact::new("Credit-to-Income Ratio", (ratio * 20.0).round(), direction(ratio < 4.0)),
    ]
}

fn dataset_explanation(inputs: &ScoreInputs, score: f64) -> String {
    let mut parts: Vec<String> = Vec::new();
    let ext2 = inputs.ext[1];
    let employment = inputs.employment;
    let dti = inputs.debt_to_income;
    let dti_pct = dti * 100.0;
    let ratio = inputs.loan_income_ratio();
    let ratio_pct = ratio * 100.0;

    parts.push(if score >= 750.0 {
        format!("Excellent credit profile with a score of {}. Applicant qualifies as Prime tier with strong lending credentials.", score)
    } else if score >= 700.0 {
        format!("Good credit score of {} places applicant in Prime tier. Strong financial history indicates low default risk.", score)
    } else if score >= 600.0 {
        format!("Fair credit score of {} places applicant in Near-prime tier. Moderate risk with caution recommended.", score)
    } else {
        format!("Low credit score of {} indicates Subprime tier. High default risk - approval not recommended.", score)
    });

    if ext2 > 0.7 {
        parts.push("Strong external credit bureau evaluation (EXT_SOURCE_2) demonstrates excellent creditworthiness from third-party sources.".to_string());
    } else if ext2 > 0.5 {
        parts.push("Moderate external credit bureau score indicates acceptable credit history from third-party sources.".to_string());
    } else if ext2 < 0.3 {
        parts.push("Weak external credit bureau evaluation indicates credit challenges or limited credit history, increasing risk assessment.".to_string());
    }

    if employment > 5.0 {
        parts.push(format!("Stable employment history of {:.1} years demonstrates income reliability and reduced unemployment risk.", employment));
    } else if employment > 2.0 {
        parts.push(format!("Moderate employment tenure of {:.1} years shows reasonable job stability.", employment));
    } else if employment > 0.0 {
        parts.push(format!("Short employment history of {:.1} years is a risk factor - less time to demonstrate consistent income.", employment));
    }

    parts.push(if dti < 0.25 {
        format!("Excellent debt-to-income ratio of {:.1}% indicates strong repayment capacity with manageable obligations.", dti_pct)
    } else if dti < 0.4 {
        format!("Acceptable debt-to-income ratio of {:.1}% suggests moderate financial obligations with reasonable repayment capability.", dti_pct)
    } else if dti < 0.5 {
        format!("High debt-to-income ratio of {:.1}% indicates limited capacity to take on additional credit obligations.", dti_pct)
    } else {
        format!("Very high debt-to-income ratio of {:.1}% significantly limits borrowing capacity and increases default risk.", dti_pct)
    });

    parts.push(if ratio < 2.0 {
        format!("Favorable loan-to-income ratio of {:.1}% indicates the credit amount is conservative relative to income.", ratio_pct)
    } else if ratio < 4.0 {
        format!("Moderate loan-to-income ratio of {:.1}% is within acceptable lending guidelines.", ratio_pct)
    } else if ratio < 6.0 {
        format!("High loan-to-income ratio of {:.1}% suggests the credit request is substantial relative to income, increasing risk.", ratio_pct)
    } else {
        format!("Excessive loan-to-income ratio of {:.1}% indicates the credit amount far exceeds recommended thresholds - high default risk.", ratio_pct)
    });

    parts.push(
        if score >= 700.0 {
            "Overall Assessment: Strong financial profile supports loan approval with competitive terms."
        } else if score >= 600.0 {
            "Overall Assessment: Moderate risk profile - conditional approval recommended with higher interest rates or lower credit limits."
        } else {
            "Overall Assessment: Weak financial metrics recommend loan denial or alternative products like secured credit."
        }
        .to_string(),
    );

    parts.join(" ")
}

pub fn score_application(app: &HomeCreditApplication) -> DatasetScoredApplicant {
    let inputs = ScoreInputs::from_app(app);
    let credit_score = dataset_score(&inputs);

    DatasetScoredApplicant {
        id: format!("HC-{}", app.sk_id_curr),
        sk_id_curr: app.sk_id_curr,
        income: inputs.income,
        loan_amount: inputs.loan_amount,
        employment_length: inputs.employment,
        credit_history: (300.0 + app.ext_source_2 * 550.0).round(),
        debt_to_income: inputs.debt_to_income,
        credit_score,
        risk_group: RiskGroup::from_score(credit_score),
        feature_importance: dataset_feature_importance(&inputs),
        explanation: dataset_explanation(&inputs, credit_score),
        approved: credit_score >= DATASET_APPROVAL_THRESHOLD,
        ext_source1: inputs.ext[0],
        ext_source2: inputs.ext[1],
        ext_source3: inputs.ext[2],
        target: app.target,
    }
}

pub fn score_applications(apps: &[HomeCreditApplication]) -> DatasetCreditScoring {
    let applicants: Vec<DatasetScoredApplicant> = apps.iter().map(score_application).collect();
    let distribution = ScoreDistribution::from_scores(
        applicants
            .iter()
            .map(|a| (a.credit_score, a.risk_group, a.approved)),
    );

    DatasetCreditScoring {
        applicants,
        distribution,
    }
}

// ============================================================================
// TESTS
// ============================================================================
