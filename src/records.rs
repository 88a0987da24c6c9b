// 🧾 Records - Loose input rows + shared scoring vocabulary
// Uploaded rows arrive as arbitrary JSON objects; scoring reads them by key

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Maximum rows processed by any batch operation
pub const MAX_BATCH_ROWS: usize = 50;

// ============================================================================
// RECORD
// ============================================================================

/// One uploaded transaction or applicant row.
/// Keys are kept verbatim so scored output can echo every input column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Map::new() }
    }

    /// Builder-style insert, mostly used by tests and generators
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Numeric view of a field: numbers as-is, numeric strings parsed,
    /// blank strings and null count as zero, anything else is not a number.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
                }
            }
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Null => Some(0.0),
            _ => None,
        }
    }

    /// Numeric field with a fallback for missing, non-numeric, or zero values
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        match self.number(key) {
            Some(v) if v != 0.0 => v,
            _ => default,
        }
    }

    /// Text view of a field (numbers are rendered, null/missing is empty)
    pub fn text(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Non-empty identifier of the row, if it carries one
    pub fn id(&self) -> Option<String> {
        match self.fields.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Content-derived identifier for rows without an `id`
    pub fn fingerprint(&self, prefix: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(Value::Object(self.fields.clone()).to_string());
        let digest = format!("{:x}", hasher.finalize());
        format!("{}-{}", prefix, &digest[..9].to_uppercase())
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Record { fields }
    }
}

// ============================================================================
// SHARED VOCABULARY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction in which a feature pushes an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImpact {
    pub feature: String,
    pub importance: f64,
    pub impact: Impact,
}

impl FeatureImpact {
    pub fn new(feature: &str, importance: f64, impact: Impact) -> Self {
        FeatureImpact {
            feature: feature.to_string(),
            importance,
            impact,
        }
    }
}

// ============================================================================
// FORMATTING HELPERS
// ============================================================================

/// Render an amount with thousands separators, dropping a zero fraction
/// (1234.5 -> "1,234.5", 5000 -> "5,000")
pub fn format_amount(value: f64) -> String {
    let negative = value < 0.0;
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let whole = rounded.trunc() as u64;
    let fraction = format!("{:.3}", rounded.fract());
    let fraction = fraction.trim_start_matches('0').trim_end_matches('0');
    let fraction = if fraction == "." { "" } else { fraction };

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}{}", if negative { "-" } else { "" }, grouped, fraction)
}

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_coercion() {
        let record = Record::new()
            .with("amount", 120.5)
            .with("ratio", "0.45")
            .with("blank", "")
            .with("word", "abc")
            .with("zero", 0);

        assert_eq!(record.number("amount"), Some(120.5));
        assert_eq!(record.number("ratio"), Some(0.45));
        assert_eq!(record.number("blank"), Some(0.0));
        assert_eq!(record.number("word"), None);
        assert_eq!(record.number("missing"), None);

        // zero and junk fall back to the default
        assert_eq!(record.number_or("zero", 0.5), 0.5);
        assert_eq!(record.number_or("word", 0.5), 0.5);
        assert_eq!(record.number_or("ratio", 0.5), 0.45);
    }

    #[test]
    fn test_text_and_id() {
        let record: Record = serde_json::from_value(json!({
            "id": "TXN-1",
            "category": "electronics",
            "amount": 10
        }))
        .unwrap();

        assert_eq!(record.text("category"), "electronics");
        assert_eq!(record.text("amount"), "10");
        assert_eq!(record.text("missing"), "");
        assert_eq!(record.id(), Some("TXN-1".to_string()));

        let anonymous = Record::new().with("id", "");
        assert_eq!(anonymous.id(), None);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = Record::new().with("amount", 10).with("merchant", "Amazon");
        let b = Record::new().with("amount", 10).with("merchant", "Amazon");
        let c = Record::new().with("amount", 11).with("merchant", "Amazon");

        assert_eq!(a.fingerprint("TXN"), b.fingerprint("TXN"));
        assert_ne!(a.fingerprint("TXN"), c.fingerprint("TXN"));
        assert_eq!(a.fingerprint("TXN").len(), "TXN-".len() + 9);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(5000.0), "5,000");
        assert_eq!(format_amount(1234.5), "1,234.5");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1_000_000.25), "1,000,000.25");
    }

    #[test]
    fn test_risk_level_serialization() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"High\"");
        assert_eq!(serde_json::to_string(&Impact::Neutral).unwrap(), "\"neutral\"");
    }
}
