// 💳 Credit Scoring - 300-850 scorecard over applicant rows
// Threshold scorecard + SHAP-style feature weights + optional generated prose

use crate::explain::{credit_prompt, ExplainError, TextGenerator, CREDIT_MAX_TOKENS};
use crate::records::{FeatureImpact, Impact, Record, MAX_BATCH_ROWS};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_SCORE: f64 = 300.0;
pub const MAX_SCORE: f64 = 850.0;

/// Minimum score for automatic approval
pub const APPROVAL_THRESHOLD: f64 = 620.0;

pub const SCORING_FAILED_MESSAGE: &str = "Failed to score applicants";

/// Feature weights (percent of total importance)
pub mod weights {
    pub const INCOME: f64 = 0.18;
    pub const LOAN_AMOUNT: f64 = 0.15;
    pub const EMPLOYMENT_LENGTH: f64 = 0.12;
    pub const CREDIT_HISTORY: f64 = 0.2;
    pub const DEBT_TO_INCOME: f64 = 0.18;
    pub const AGE_OF_CREDIT: f64 = 0.1;
    pub const NUM_ACCOUNTS: f64 = 0.07;
}

// ============================================================================
// RISK GROUP
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskGroup {
    Prime,
    #[serde(rename = "Near-prime")]
    NearPrime,
    Subprime,
}

impl RiskGroup {
    pub fn from_score(score: f64) -> Self {
        if score >= 700.0 {
            RiskGroup::Prime
        } else if score >= 600.0 {
            RiskGroup::NearPrime
        } else {
            RiskGroup::Subprime
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskGroup::Prime => "Prime",
            RiskGroup::NearPrime => "Near-prime",
            RiskGroup::Subprime => "Subprime",
        }
    }
}

// ============================================================================
// SCORECARD
// ============================================================================

pub fn credit_score(applicant: &Record) -> f64 {
    let mut score = 500.0;

    let income = applicant.number_or("income", 0.0);
    if income > 100_000.0 {
        score += 80.0;
    } else if income > 70_000.0 {
        score += 60.0;
    } else if income > 50_000.0 {
        score += 40.0;
    } else if income > 30_000.0 {
        score += 20.0;
    }

    let loan_amount = applicant.number_or("loanAmount", 0.0);
    let loan_to_income = if income > 0.0 { loan_amount / income } else { 1.0 };
    if loan_to_income < 2.0 {
        score += 50.0;
    } else if loan_to_income < 4.0 {
        score += 25.0;
    } else {
        score -= 30.0;
    }

    let employment = applicant.number_or("employmentLength", 0.0);
    score += f64::min(employment * 5.0, 50.0);

    let history = applicant.number_or("creditHistory", 0.0);
    if history >= 700.0 {
        score += 100.0;
    } else if history >= 650.0 {
        score += 60.0;
    } else if history >= 600.0 {
        score += 30.0;
    } else {
        score -= 50.0;
    }

    let dti = applicant.number_or("debtToIncome", 0.0);
    if dti < 0.2 {
        score += 60.0;
    } else if dti < 0.35 {
        score += 30.0;
    } else if dti > 0.5 {
        score -= 50.0;
    }

    let age_of_credit = applicant.number_or("ageOfCredit", 0.0);
    score += f64::min(age_of_credit * 3.0, 40.0);

    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Per-feature contribution, most important first
pub fn feature_importance(applicant: &Record) -> Vec<FeatureImpact> {
    let income = applicant.number_or("income", 0.0);
    let history = applicant.number_or("creditHistory", 0.0);
    let dti = applicant.number_or("debtToIncome", 0.0);
    let loan_amount = applicant.number_or("loanAmount", 0.0);
    let employment = applicant.number_or("employmentLength", 0.0);

    let band = |positive: bool, negative: bool| {
        if positive {
            Impact::Positive
        } else if negative {
            Impact::Negative
        } else {
            Impact::Neutral
        }
    };

    let mut factors = vec![
        FeatureImpact::new(
            "Annual Income",
            weights::INCOME * 100.0,
            band(income > 50_000.0, income < 30_000.0),
        ),
        FeatureImpact::new(
            "Credit History",
            weights::CREDIT_HISTORY * 100.0,
            band(history >= 650.0, history < 600.0),
        ),
        FeatureImpact::new(
            "Debt-to-Income",
            weights::DEBT_TO_INCOME * 100.0,
            band(dti < 0.35, dti > 0.5),
        ),
        FeatureImpact::new(
            "Loan Amount",
            weights::LOAN_AMOUNT * 100.0,
            band(income > 0.0 && loan_amount / income < 3.0, true),
        ),
        FeatureImpact::new(
            "Employment Length",
            weights::EMPLOYMENT_LENGTH * 100.0,
            band(employment >= 3.0, employment < 1.0),
        ),
    ];

    // stable: equal weights keep declaration order
    factors.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    factors
}

/// Summarise the top three factors
pub fn rule_explanation(factors: &[FeatureImpact]) -> String {
    let top = &factors[..factors.len().min(3)];
    let named = |impact: Impact| -> Vec<&str> {
        top.iter()
            .filter(|f| f.impact == impact)
            .map(|f| f.feature.as_str())
            .collect()
    };

    let positives = named(Impact::Positive);
    let negatives = named(Impact::Negative);

    let mut parts = Vec::new();
    if !positives.is_empty() {
        parts.push(format!("Strong factors: {}", positives.join(", ")));
    }
    if !negatives.is_empty() {
        parts.push(format!("Areas of concern: {}", negatives.join(", ")));
    }

    if parts.is_empty() {
        "Standard credit profile.".to_string()
    } else {
        parts.join(". ")
    }
}

// ============================================================================
// BATCH SCORING
// ============================================================================

/// Keys written by the scorer; stale copies in the input row are dropped
const OUTPUT_KEYS: [&str; 5] = ["creditScore", "riskGroup", "featureImportance", "explanation", "approved"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredApplicant {
    #[serde(flatten)]
    pub fields: Record,
    pub credit_score: f64,
    pub risk_group: RiskGroup,
    pub feature_importance: Vec<FeatureImpact>,
    pub explanation: String,
    pub approved: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDistribution {
    pub prime: usize,
    pub near_prime: usize,
    pub subprime: usize,
    pub avg_score: f64,
    /// Percent of applicants approved
    pub approval_rate: f64,
}

impl ScoreDistribution {
    /// Distribution over `(score, group, approved)` triples
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = (f64, RiskGroup, bool)>,
    {
        let mut dist = ScoreDistribution::default();
        let mut total = 0usize;
        let mut score_sum = 0.0;
        let mut approved = 0usize;

        for (score, group, is_approved) in scores {
            total += 1;
            score_sum += score;
            if is_approved {
                approved += 1;
            }
            match group {
                RiskGroup::Prime => dist.prime += 1,
                RiskGroup::NearPrime => dist.near_prime += 1,
                RiskGroup::Subprime => dist.subprime += 1,
            }
        }

        if total > 0 {
            dist.avg_score = score_sum / total as f64;
            dist.approval_rate = approved as f64 / total as f64 * 100.0;
        }
        dist
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditScoring {
    pub applicants: Vec<ScoredApplicant>,
    pub distribution: ScoreDistribution,
}

impl CreditScoring {
    fn from_applicants(applicants: Vec<ScoredApplicant>) -> Self {
        let distribution = ScoreDistribution::from_scores(
            applicants
                .iter()
                .map(|a| (a.credit_score, a.risk_group, a.approved)),
        );
        debug!(
            scored = applicants.len(),
            avg_score = distribution.avg_score,
            "credit batch scored"
        );
        CreditScoring {
            applicants,
            distribution,
        }
    }
}

/// Score one applicant with the rule-based explanation
pub fn score_applicant(applicant: &Record) -> ScoredApplicant {
    let score = credit_score(applicant);
    let factors = feature_importance(applicant);
    let explanation = rule_explanation(&factors);

    let mut fields = applicant.clone();
    for key in OUTPUT_KEYS {
        fields.remove(key);
    }

    ScoredApplicant {
        fields,
        credit_score: score,
        risk_group: RiskGroup::from_score(score),
        feature_importance: factors,
        explanation,
        approved: score >= APPROVAL_THRESHOLD,
    }
}

/// Score the first `MAX_BATCH_ROWS` applicants with rule-based explanations
pub fn score_batch(applicants: &[Record]) -> CreditScoring {
    CreditScoring::from_applicants(
        applicants
            .iter()
            .take(MAX_BATCH_ROWS)
            .map(score_applicant)
            .collect(),
    )
}

/// Score the first `MAX_BATCH_ROWS` applicants, asking `generator` for each explanation.
/// Any generation failure fails the whole batch.
pub async fn score_batch_with_generator(
    applicants: &[Record],
    generator: &dyn TextGenerator,
) -> Result<CreditScoring, ExplainError> {
    let mut scored = Vec::with_capacity(applicants.len().min(MAX_BATCH_ROWS));

    for applicant in applicants.iter().take(MAX_BATCH_ROWS) {
        let mut result = score_applicant(applicant);
        let prompt = credit_prompt(applicant, result.credit_score, result.risk_group);
        result.explanation = generator.generate(&prompt, CREDIT_MAX_TOKENS).await?;
        scored.push(result);
    }

    Ok(CreditScoring::from_applicants(scored))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::StaticGenerator;

    fn strong_applicant() -> Record {
        Record::new()
            .with("id", "APP-00001")
            .with("income", 120_000)
            .with("loanAmount", 20_000)
            .with("employmentLength", 12)
            .with("creditHistory", 760)
            .with("debtToIncome", 0.15)
            .with("ageOfCredit", 15)
            .with("numAccounts", 5)
    }

    fn weak_applicant() -> Record {
        Record::new()
            .with("id", "APP-00002")
            .with("income", 25_000)
            .with("loanAmount", 150_000)
            .with("employmentLength", 0)
            .with("creditHistory", 540)
            .with("debtToIncome", 0.6)
            .with("ageOfCredit", 1)
    }

    #[test]
    fn test_strong_applicant_is_capped() {
        // 500 + 80 + 50 + 50 + 100 + 60 + 40 = 880 -> 850
        assert_eq!(credit_score(&strong_applicant()), 850.0);
        assert_eq!(RiskGroup::from_score(850.0), RiskGroup::Prime);
    }

    #[test]
    fn test_weak_applicant_is_floored() {
        // 500 + 0 - 30 + 0 - 50 - 50 + 3 = 373
        assert_eq!(credit_score(&weak_applicant()), 373.0);

        let empty = Record::new();
        // 500 + 50 (ratio defaults to 1) - 50 + 60 = 560
        assert_eq!(credit_score(&empty), 560.0);
    }

    #[test]
    fn test_middle_bands() {
        let applicant = Record::new()
            .with("income", 60_000)
            .with("loanAmount", 180_000)
            .with("employmentLength", 2)
            .with("creditHistory", 620)
            .with("debtToIncome", 0.4)
            .with("ageOfCredit", 5);
        // 500 + 40 + 25 + 10 + 30 + 0 + 15 = 620
        let score = credit_score(&applicant);
        assert_eq!(score, 620.0);
        assert_eq!(RiskGroup::from_score(score), RiskGroup::NearPrime);
        assert!(score_applicant(&applicant).approved);
    }

    #[test]
    fn test_risk_group_boundaries() {
        assert_eq!(RiskGroup::from_score(699.0), RiskGroup::NearPrime);
        assert_eq!(RiskGroup::from_score(700.0), RiskGroup::Prime);
        assert_eq!(RiskGroup::from_score(599.0), RiskGroup::Subprime);
        assert_eq!(serde_json::to_string(&RiskGroup::NearPrime).unwrap(), "\"Near-prime\"");
    }

    #[test]
    fn test_feature_importance_order_and_impacts() {
        let factors = feature_importance(&strong_applicant());
        let names: Vec<&str> = factors.iter().map(|f| f.feature.as_str()).collect();
        assert_eq!(
            names,
            vec!["Credit History", "Annual Income", "Debt-to-Income", "Loan Amount", "Employment Length"]
        );
        assert!(factors.iter().all(|f| f.impact == Impact::Positive));

        let weak = feature_importance(&weak_applicant());
        assert!(weak.iter().all(|f| f.impact == Impact::Negative));
    }

    #[test]
    fn test_rule_explanation() {
        assert_eq!(
            score_applicant(&strong_applicant()).explanation,
            "Strong factors: Credit History, Annual Income, Debt-to-Income"
        );
        assert_eq!(
            score_applicant(&weak_applicant()).explanation,
            "Areas of concern: Credit History, Annual Income, Debt-to-Income"
        );

        let neutral = Record::new()
            .with("income", 40_000)
            .with("creditHistory", 620)
            .with("debtToIncome", 0.45);
        assert_eq!(score_applicant(&neutral).explanation, "Standard credit profile.");
    }

    #[test]
    fn test_batch_distribution() {
        let result = score_batch(&[strong_applicant(), weak_applicant()]);

        assert_eq!(result.applicants.len(), 2);
        assert_eq!(result.distribution.prime, 1);
        assert_eq!(result.distribution.subprime, 1);
        assert_eq!(result.distribution.near_prime, 0);
        assert_eq!(result.distribution.avg_score, (850.0 + 373.0) / 2.0);
        assert_eq!(result.distribution.approval_rate, 50.0);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["applicants"][0]["id"], "APP-00001");
        assert_eq!(json["applicants"][0]["riskGroup"], "Prime");
        assert_eq!(json["distribution"]["nearPrime"], 0);
    }

    #[test]
    fn test_stale_output_columns_are_replaced() {
        let applicant = strong_applicant()
            .with("creditScore", 300)
            .with("riskGroup", "Subprime")
            .with("featureImportance", "none")
            .with("explanation", "old")
            .with("approved", false);
        let text = serde_json::to_string(&score_applicant(&applicant)).unwrap();

        for key in ["\"creditScore\"", "\"riskGroup\"", "\"featureImportance\"", "\"explanation\"", "\"approved\""] {
            assert_eq!(text.matches(key).count(), 1, "{} repeated in {}", key, text);
        }
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["id"], "APP-00001");
        assert_eq!(json["creditScore"], 850.0);
        assert_eq!(json["riskGroup"], "Prime");
        assert_eq!(json["approved"], true);
        assert_eq!(json["featureImportance"].as_array().map(|f| f.len()), Some(5));
    }

    #[test]
    fn test_empty_batch_has_zero_distribution() {
        let result = score_batch(&[]);
        assert_eq!(result.distribution, ScoreDistribution::default());
    }

    #[tokio::test]
    async fn test_generated_explanations() {
        let generator = StaticGenerator::new("Generated by the model.");
        let result = score_batch_with_generator(&[strong_applicant()], &generator)
            .await
            .unwrap();
        assert_eq!(result.applicants[0].explanation, "Generated by the model.");

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Predicted Credit Score: 850"));
        assert!(prompts[0].contains("Risk Group: Prime"));
    }

    #[tokio::test]
    async fn test_generation_failure_fails_batch() {
        let generator = StaticGenerator::failing();
        let result = score_batch_with_generator(&[strong_applicant()], &generator).await;
        assert!(result.is_err());
    }
}
