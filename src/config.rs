// ⚙️ Configuration - Environment-driven settings with defaults
// CLI flags override these; everything has a working default

use crate::explain::{LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::fraud::DEFAULT_MAX_JITTER;
use crate::simulation::DEFAULT_INTERVAL_MS;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_PATH: &str = "fraudguard.db";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Empty when text generation is disabled
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub sim_interval_ms: u64,
    /// Upper bound of the random term added to fraud scores
    pub fraud_jitter: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            llm_api_key: String::new(),
            llm_base_url: DEFAULT_BASE_URL.to_string(),
            llm_model: DEFAULT_MODEL.to_string(),
            sim_interval_ms: DEFAULT_INTERVAL_MS,
            fraud_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl AppConfig {
    /// Read `FRAUDGUARD_*` variables (API key falls back to `OPENAI_API_KEY`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let fraud_jitter = get("FRAUDGUARD_FRAUD_JITTER")
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|j| j.is_finite() && *j >= 0.0)
            .unwrap_or(defaults.fraud_jitter);

        Self {
            host: get("FRAUDGUARD_HOST").unwrap_or(defaults.host),
            port: get("FRAUDGUARD_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            db_path: get("FRAUDGUARD_DB").map(PathBuf::from).unwrap_or(defaults.db_path),
            llm_api_key: get("FRAUDGUARD_LLM_API_KEY")
                .or_else(|| get("OPENAI_API_KEY"))
                .unwrap_or_default(),
            llm_base_url: get("FRAUDGUARD_LLM_BASE_URL").unwrap_or(defaults.llm_base_url),
            llm_model: get("FRAUDGUARD_LLM_MODEL").unwrap_or(defaults.llm_model),
            sim_interval_ms: get("FRAUDGUARD_SIM_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.sim_interval_ms),
            fraud_jitter,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn llm(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.llm_api_key.clone(),
            model: self.llm_model.clone(),
            base_url: self.llm_base_url.clone(),
            ..LlmConfig::default()
        }
    }

    pub fn sim_interval(&self) -> Duration {
        Duration::from_millis(self.sim_interval_ms)
    }
}
