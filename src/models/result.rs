use serde::{Deserialize, Serialize};

use super::card::CardRecord;
use super::query::{CardQuery, LegacyCard};
use crate::error::LookupError;

// ---------------------------------------------------------------------------
// SearchResult: Outcome of one query in a batch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: CardQuery,
    #[serde(default)]
    pub records: Vec<CardRecord>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResult {
    pub fn found(query: CardQuery, records: Vec<CardRecord>) -> Self {
        Self {
            query,
            records,
            success: true,
            error: None,
        }
    }

    pub fn failed(query: CardQuery, error: &LookupError) -> Self {
        Self {
            query,
            records: Vec::new(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// LegacyResult: Legacy card echoed back with its price rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyResult {
    #[serde(flatten)]
    pub card: LegacyCard,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase_data: Option<Vec<CardRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
