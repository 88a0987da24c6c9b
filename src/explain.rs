// 🗣️ Explanations - Prompt builders + text-generation client
// Prose explanations come from an OpenAI-compatible chat-completions endpoint

use crate::credit::RiskGroup;
use crate::dataset::HomeCreditApplication;
use crate::records::{format_amount, Record, RiskLevel};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

pub const CREDIT_MAX_TOKENS: u32 = 150;
pub const FRAUD_MAX_TOKENS: u32 = 300;
pub const DEFAULT_RISK_MAX_TOKENS: u32 = 350;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub const EXPLANATION_FAILED_MESSAGE: &str = "Failed to generate explanation";

/// Returned (with HTTP 200) when a default-risk explanation cannot be generated
pub const DEFAULT_RISK_FALLBACK: &str = "Unable to generate AI explanation at this time. The risk assessment is based on credit-to-income ratio, employment stability, external credit scores, and historical patterns from the Home Credit dataset.";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    #[error("text generation is not configured (set FRAUDGUARD_LLM_API_KEY)")]
    NotConfigured,

    #[error("text generation request failed: {0}")]
    Request(String),

    #[error("text generation failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid text generation response: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// GENERATOR TRAIT
// ============================================================================

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`, bounded by `max_tokens`
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ExplainError>;

    /// Whether this generator can produce text at all
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Used when no API key is configured
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, ExplainError> {
        Err(ExplainError::NotConfigured)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Canned responses; records every prompt it receives.
/// Handy for offline demos and tests.
pub struct StaticGenerator {
    response: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StaticGenerator {
    pub fn new(response: &str) -> Self {
        StaticGenerator {
            response: Some(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Generator whose every call fails with a request error
    pub fn failing() -> Self {
        StaticGenerator {
            response: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String, ExplainError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.response
            .clone()
            .ok_or_else(|| ExplainError::Request("static generator configured to fail".to_string()))
    }
}

// ============================================================================
// OPENAI-COMPATIBLE CLIENT
// ============================================================================

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct OpenAiCompatClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    pub fn compile_request(&self, prompt: &str, max_tokens: u32) -> Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": max_tokens,
        })
    }
}

/// Extract `choices[0].message.content` from a chat-completions body
pub fn parse_completion(json: &Value) -> Result<String, ExplainError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| ExplainError::InvalidResponse("missing choices[0].message.content".to_string()))
}

#[async_trait]
impl TextGenerator for OpenAiCompatClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ExplainError> {
        let body = self.compile_request(prompt, max_tokens);
        debug!(model = %self.config.model, max_tokens, "requesting completion");

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExplainError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "completion request rejected");
            return Err(ExplainError::Status {
                status: status.as_u16(),
                body: text.trim().to_string(),
            });
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| ExplainError::InvalidResponse(e.to_string()))?;

        parse_completion(&json)
    }
}

/// Client for `config`, or the disabled generator when no key is set
pub fn generator_from_config(config: &LlmConfig) -> Box<dyn TextGenerator> {
    if config.api_key.trim().is_empty() {
        Box::new(DisabledGenerator)
    } else {
        Box::new(OpenAiCompatClient::new(config.clone()))
    }
}

// ============================================================================
// PROMPTS
// ============================================================================

/// Field text, or "Not provided" for missing / zero / blank values
fn provided(record: &Record, key: &str) -> String {
    match record.number(key) {
        Some(v) if v == 0.0 => "Not provided".to_string(),
        _ => {
            let text = record.text(key);
            if text.is_empty() {
                "Not provided".to_string()
            } else {
                text
            }
        }
    }
}

pub fn credit_prompt(applicant: &Record, credit_score: f64, risk_group: RiskGroup) -> String {
    format!(
        "You are a credit scoring AI expert. Provide a brief 2-3 sentence explanation for this credit assessment.

Applicant Profile:
- Income: ${}
- Loan Amount Requested: ${}
- Employment Length: {} years
- Credit History Score: {}
- Debt-to-Income Ratio: {:.1}%
- Predicted Credit Score: {}
- Risk Group: {}

Explain the key factors influencing this score in plain language.",
        provided(applicant, "income"),
        provided(applicant, "loanAmount"),
        provided(applicant, "employmentLength"),
        provided(applicant, "creditHistory"),
        applicant.number_or("debtToIncome", 0.0) * 100.0,
        credit_score,
        risk_group.name(),
    )
}

pub fn fraud_prompt(transaction: &Value, fraud_score: f64, risk_level: &str) -> String {
    let details = serde_json::to_string_pretty(transaction).unwrap_or_else(|_| transaction.to_string());
    format!(
        "You are an expert fraud detection analyst. Provide a detailed explanation for why this transaction has been flagged.

Transaction Details:
{}

Fraud Score: {:.1}%
Risk Level: {}

Provide:
1. A clear explanation of the risk factors identified
2. Specific patterns that triggered the alert
3. Recommended actions for the fraud team

Keep your response concise but informative (max 200 words).",
        details,
        fraud_score * 100.0,
        risk_level,
    )
}

pub fn default_risk_prompt(app: &HomeCreditApplication) -> String {
    format!(
        "You are an expert credit risk analyst using Explainable AI (XAI) techniques. Analyze this loan application from the Home Credit Default Risk dataset and explain why it has been flagged with its current risk level.

Application Details:
- Application ID: {}
- Contract Type: {}
- Gender: {}
- Age: {} years
- Income: ${}
- Credit Amount: ${}
- Annuity: ${}
- Credit/Income Ratio: {}x
- Annuity/Income Ratio: {:.1}%
- Employment: {} years ({})
- Occupation: {}
- Education: {}
- Family Status: {}
- Children: {}
- Owns Car: {}
- Owns Realty: {}
- External Score 1: {:.3}
- External Score 2: {:.3}
- External Score 3: {:.3}
- Risk Score: {}%
- Risk Level: {}
- Target (Default): {}

Provide an XAI-style explanation that includes:
1. The top 3 risk factors contributing to this assessment
2. How each factor impacts the default probability (positive or negative)
3. A brief recommendation for the credit decision

Keep your response concise (max 200 words) and professional.",
        app.sk_id_curr,
        app.name_contract_type,
        app.code_gender,
        app.age_years,
        format_amount(app.amt_income_total),
        format_amount(app.amt_credit),
        format_amount(app.amt_annuity),
        app.credit_income_ratio,
        app.annuity_income_ratio * 100.0,
        app.employed_years,
        app.name_income_type,
        app.occupation_type,
        app.name_education_type,
        app.name_family_status,
        app.cnt_children,
        app.flag_own_car,
        app.flag_own_realty,
        app.ext_source_1,
        app.ext_source_2,
        app.ext_source_3,
        app.risk_score,
        app.risk_level,
        if app.target == 1 {
            "Yes (Defaulted)"
        } else {
            "No (Did not default)"
        },
    )
}

/// Generated fraud explanation; errors propagate to the caller
pub async fn explain_fraud(
    generator: &dyn TextGenerator,
    transaction: &Value,
    fraud_score: f64,
    risk_level: RiskLevel,
) -> Result<String, ExplainError> {
    let prompt = fraud_prompt(transaction, fraud_score, risk_level.as_str());
    generator.generate(&prompt, FRAUD_MAX_TOKENS).await
}

/// Generated default-risk explanation; failures degrade to the fixed fallback text
pub async fn explain_default_risk(generator: &dyn TextGenerator, app: &HomeCreditApplication) -> String {
    match generator
        .generate(&default_risk_prompt(app), DEFAULT_RISK_MAX_TOKENS)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            warn!(sk_id_curr = app.sk_id_curr, error = %e, "default-risk explanation unavailable");
            DEFAULT_RISK_FALLBACK.to_string()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::generate_applications;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_parse_completion() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Looks risky.  " } }]
        });
        assert_eq!(parse_completion(&body).unwrap(), "Looks risky.");

        let bad = json!({ "choices": [] });
        assert!(matches!(parse_completion(&bad), Err(ExplainError::InvalidResponse(_))));
    }

    #[test]
    fn test_compile_request() {
        let client = OpenAiCompatClient::new(LlmConfig {
            api_key: "sk-test".to_string(),
            ..LlmConfig::default()
        });
        let body = client.compile_request("hello", 150);

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_generator_from_config() {
        assert!(!generator_from_config(&LlmConfig::default()).is_enabled());

        let configured = LlmConfig {
            api_key: "sk-test".to_string(),
            ..LlmConfig::default()
        };
        assert!(generator_from_config(&configured).is_enabled());
    }

    #[test]
    fn test_credit_prompt_marks_missing_fields() {
        let applicant = Record::new().with("income", 85000).with("debtToIncome", 0.25);
        let prompt = credit_prompt(&applicant, 712.0, RiskGroup::Prime);

        assert!(prompt.contains("- Income: $85000"));
        assert!(prompt.contains("- Loan Amount Requested: $Not provided"));
        assert!(prompt.contains("- Debt-to-Income Ratio: 25.0%"));
        assert!(prompt.contains("- Predicted Credit Score: 712"));
    }

    #[test]
    fn test_fraud_prompt() {
        let prompt = fraud_prompt(&json!({ "amount": 9000 }), 0.734, "High");
        assert!(prompt.contains("\"amount\": 9000"));
        assert!(prompt.contains("Fraud Score: 73.4%"));
        assert!(prompt.contains("Risk Level: High"));
    }

    #[tokio::test]
    async fn test_default_risk_falls_back() {
        let mut rng = StdRng::seed_from_u64(3);
        let app = generate_applications(&mut rng, 1).remove(0);

        let text = explain_default_risk(&DisabledGenerator, &app).await;
        assert_eq!(text, DEFAULT_RISK_FALLBACK);

        let generator = StaticGenerator::new("Top factors: ...");
        let text = explain_default_risk(&generator, &app).await;
        assert_eq!(text, "Top factors: ...");
        assert!(generator.prompts()[0].contains(&format!("Application ID: {}", app.sk_id_curr)));
    }

    #[tokio::test]
    async fn test_fraud_explanation_propagates_errors() {
        let result = explain_fraud(&DisabledGenerator, &json!({}), 0.5, RiskLevel::Medium).await;
        assert!(matches!(result, Err(ExplainError::NotConfigured)));
    }
}
