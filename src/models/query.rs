use serde::{Deserialize, Serialize};

use super::card::{leading_number, opt_string_or_number};

// ---------------------------------------------------------------------------
// SearchMode
// ---------------------------------------------------------------------------

/// Which surface issued a query and whether it is pinned to one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Normal,
    SetSpecific,
    HoverNormal,
    HoverSetSpecific,
}

impl SearchMode {
    /// True for the modes that restrict every strategy to one chosen set.
    pub fn is_set_specific(self) -> bool {
        matches!(self, SearchMode::SetSpecific | SearchMode::HoverSetSpecific)
    }
}

// ---------------------------------------------------------------------------
// CardQuery: Partial structured description of a card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CardQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_number: Option<String>,
    #[serde(
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    pub search_mode: SearchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_number: Option<usize>,
}

impl CardQuery {
    pub fn new(search_mode: SearchMode) -> Self {
        Self {
            search_mode,
            ..Default::default()
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn set_number(mut self, set_number: &str) -> Self {
        self.set_number = Some(set_number.to_string());
        self
    }

    pub fn card_number(mut self, card_number: &str) -> Self {
        self.card_number = Some(card_number.to_string());
        self
    }

    pub fn card_type(mut self, card_type: &str) -> Self {
        self.card_type = Some(card_type.to_string());
        self
    }

    pub fn row_number(mut self, row: usize) -> Self {
        self.row_number = Some(row);
        self
    }

    /// Return the store-ready form of this query.
    ///
    /// Blank fields become `None`, `set_number` and `card_type` are trimmed
    /// and lowercased, `name` is trimmed and `card_number` loses its leading
    /// zeros (`"098"` -> `"98"`).
    pub fn normalized(&self) -> CardQuery {
        CardQuery {
            name: non_blank(self.name.as_deref()).map(str::to_string),
            set_number: non_blank(self.set_number.as_deref()).map(str::to_lowercase),
            card_number: non_blank(self.card_number.as_deref()).map(normalize_card_number),
            card_type: non_blank(self.card_type.as_deref()).map(str::to_lowercase),
            search_mode: self.search_mode,
            row_number: self.row_number,
        }
    }

    /// True if at least one searchable field is present.
    pub fn is_actionable(&self) -> bool {
        let q = self.normalized();
        q.name.is_some() || q.set_number.is_some() || q.card_number.is_some() || q.card_type.is_some()
    }

    /// Short human-readable label used in logs and error messages.
    pub fn label(&self) -> String {
        let parts: Vec<String> = [
            self.set_number.as_deref(),
            self.card_number.as_deref(),
            self.name.as_deref(),
            self.card_type.as_deref(),
        ]
        .iter()
        .flatten()
        .map(|s| s.to_string())
        .collect();
        match self.row_number {
            Some(row) => format!("row {} [{}]", row, parts.join(" ")),
            None => format!("[{}]", parts.join(" ")),
        }
    }
}

/// Strip leading zeros by round-tripping through an integer.
///
/// Non-numeric input is returned trimmed but otherwise unchanged.
pub fn normalize_card_number(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        if let Some(n) = leading_number(trimmed) {
            return n.to_string();
        }
    }
    trimmed.to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// LegacyCard: Loosely typed card object from older callers
// ---------------------------------------------------------------------------

/// Card shape accepted by the legacy `querySupabase` action.
///
/// Unknown fields are kept in `extra` so they can be echoed back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_number: Option<String>,
    #[serde(
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_rarity: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LegacyCard {
    /// Convert to a hover-mode query; `card_rarity` stands in for a missing type.
    pub fn to_query(&self) -> CardQuery {
        CardQuery {
            name: self.name.clone(),
            set_number: self.set_number.clone(),
            card_number: self.card_number.clone(),
            card_type: self.card_type.clone().or_else(|| self.card_rarity.clone()),
            search_mode: SearchMode::HoverNormal,
            row_number: None,
        }
    }
}
