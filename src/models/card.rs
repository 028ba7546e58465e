use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// CardRecord: One row of the price view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub set_number: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub card_number: String,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default, deserialize_with = "price")]
    pub min_price: f64,
    #[serde(default, deserialize_with = "price")]
    pub avg_price: f64,
    #[serde(default, deserialize_with = "price")]
    pub max_price: f64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub scraped_at: String,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id_simple: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CardRecord {
    /// Card number as an integer for ordering; non-numeric numbers sort as 0.
    pub fn card_number_value(&self) -> u64 {
        leading_number(&self.card_number).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse the leading run of ASCII digits, ignoring surrounding whitespace.
///
/// `"099"` -> 99, `"12a"` -> 12, `"abc"` -> None.
pub fn leading_number(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Accept a JSON string, number or null where a string is expected.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Optional variant of [`string_or_number`]; null and blank become `None`.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = string_or_number(deserializer)?;
    Ok(if s.trim().is_empty() { None } else { Some(s) })
}

/// Prices arrive as numbers, numeric strings (Postgres `numeric`) or null.
fn price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}
