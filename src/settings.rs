//! Hover settings and the content-script configuration they drive.
//!
//! Settings persist in the extension's synced key-value storage under
//! `hoverEnabled`, `hoverSetSpecific` and `hoverSetNumber`. The popup writes
//! them and pushes each change to open pages as a `toggleHover` or
//! `updateHoverSetMode` message, which the page applies to its [`HoverState`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{LookupError, Result};
use crate::models::{CardQuery, SearchMode};
use crate::parser;

pub const TOGGLE_HOVER: &str = "toggleHover";
pub const UPDATE_HOVER_SET_MODE: &str = "updateHoverSetMode";

// ---------------------------------------------------------------------------
// HoverSettings: Persisted form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoverSettings {
    pub hover_enabled: bool,
    pub hover_set_specific: bool,
    pub hover_set_number: String,
}

impl Default for HoverSettings {
    fn default() -> Self {
        Self {
            hover_enabled: true,
            hover_set_specific: false,
            hover_set_number: String::new(),
        }
    }
}

impl HoverSettings {
    /// Read settings from a storage snapshot; missing keys take their defaults.
    pub fn from_storage(values: &Value) -> Result<Self> {
        Ok(serde_json::from_value(values.clone())?)
    }

    /// Message telling content scripts to enable or disable hover lookups.
    pub fn toggle_message(&self) -> Value {
        json!({ "action": TOGGLE_HOVER, "enabled": self.hover_enabled })
    }

    /// Message telling content scripts which set, if any, hover lookups are pinned to.
    pub fn set_mode_message(&self) -> Value {
        json!({
            "action": UPDATE_HOVER_SET_MODE,
            "setSpecific": self.hover_set_specific,
            "setNumber": self.hover_set_number,
        })
    }
}

// ---------------------------------------------------------------------------
// HoverState: Live configuration of one content script
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverState {
    pub enabled: bool,
    pub set_specific: bool,
    /// Lowercased set code used in set-specific mode.
    pub set_number: Option<String>,
}

impl Default for HoverState {
    fn default() -> Self {
        HoverState::from(&HoverSettings::default())
    }
}

impl From<&HoverSettings> for HoverState {
    fn from(settings: &HoverSettings) -> Self {
        Self {
            enabled: settings.hover_enabled,
            set_specific: settings.hover_set_specific,
            set_number: clean_set(&settings.hover_set_number),
        }
    }
}

impl HoverState {
    /// Apply a settings message.
    ///
    /// Returns `Ok(false)` for actions that are not hover settings, and an
    /// error if a settings message is missing its fields.
    pub fn apply(&mut self, message: &Value) -> Result<bool> {
        match message.get("action").and_then(Value::as_str) {
            Some(TOGGLE_HOVER) => {
                self.enabled = message
                    .get("enabled")
                    .and_then(Value::as_bool)
                    .ok_or_else(|| LookupError::InvalidRequest("toggleHover needs 'enabled'".into()))?;
                tracing::info!(enabled = self.enabled, "hover detection toggled");
                Ok(true)
            }
            Some(UPDATE_HOVER_SET_MODE) => {
                self.set_specific = message
                    .get("setSpecific")
                    .and_then(Value::as_bool)
                    .ok_or_else(|| {
                        LookupError::InvalidRequest("updateHoverSetMode needs 'setSpecific'".into())
                    })?;
                self.set_number = message
                    .get("setNumber")
                    .and_then(Value::as_str)
                    .and_then(clean_set);
                tracing::info!(
                    set_specific = self.set_specific,
                    set = ?self.set_number,
                    "hover set mode updated"
                );
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Turn hovered text into a query under the current configuration.
    ///
    /// `None` when hover lookups are off, the text is out of bounds, nothing
    /// card-like was found, or set-specific mode has no set to pin to.
    pub fn query_for(&self, text: &str) -> Option<CardQuery> {
        if !self.enabled || !parser::is_parseable_length(text) {
            return None;
        }
        let mut query = parser::parse(text)?;
        if self.set_specific {
            query.set_number = Some(self.set_number.clone()?);
            query.search_mode = SearchMode::HoverSetSpecific;
        }
        Some(query)
    }
}

fn clean_set(raw: &str) -> Option<String> {
    let set = raw.trim();
    (!set.is_empty()).then(|| set.to_lowercase())
}
