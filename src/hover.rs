//! Debounced hover lookups for a page.
//!
//! The detector turns hover events into at most one price search per
//! settled element. Each hover arms a timer on its own tokio task; hovering
//! somewhere else or leaving aborts it. When the timer fires, the text is
//! parsed under the current [`HoverState`] and searched through a
//! [`MessageClient`], and the outcome is pushed onto an mpsc channel.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config;
use crate::error::Result;
use crate::models::{CardQuery, CardRecord};
use crate::router::{MessageClient, MessageRouter};
use crate::settings::HoverState;

/// What a settled hover produced.
#[derive(Debug, Clone, PartialEq)]
pub enum HoverOutcome {
    /// Rows to show in the price tooltip.
    Prices {
        element_id: String,
        query: CardQuery,
        records: Vec<CardRecord>,
    },
    /// The text held no card information, or the search came back empty.
    NoMatch { element_id: String },
    Failed { element_id: String, error: String },
}

impl HoverOutcome {
    pub fn element_id(&self) -> &str {
        match self {
            HoverOutcome::Prices { element_id, .. }
            | HoverOutcome::NoMatch { element_id }
            | HoverOutcome::Failed { element_id, .. } => element_id,
        }
    }
}

pub struct HoverDetector {
    state: HoverState,
    client: MessageClient,
    debounce: Duration,
    outcomes: mpsc::UnboundedSender<HoverOutcome>,
    pending: Option<(String, JoinHandle<()>)>,
    /// Element whose timer fired most recently. Written by the timer task.
    last_element: Arc<Mutex<Option<String>>>,
}

impl HoverDetector {
    /// Create a detector and the receiver its outcomes arrive on.
    pub fn new(
        router: Arc<MessageRouter>,
        state: HoverState,
    ) -> (Self, mpsc::UnboundedReceiver<HoverOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let detector = Self {
            state,
            client: MessageClient::with_timeout(router, config::HOVER_TIMEOUT),
            debounce: config::HOVER_DEBOUNCE,
            outcomes: tx,
            pending: None,
            last_element: Arc::new(Mutex::new(None)),
        };
        (detector, rx)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = MessageClient::with_timeout(self.client.router(), timeout);
        self
    }

    pub fn state(&self) -> &HoverState {
        &self.state
    }

    /// Apply a `toggleHover` or `updateHoverSetMode` message.
    ///
    /// Disabling hover lookups also cancels a pending timer.
    pub fn handle_message(&mut self, message: &Value) -> Result<bool> {
        let handled = self.state.apply(message)?;
        if handled && !self.state.enabled {
            self.leave();
        }
        Ok(handled)
    }

    /// Pointer entered `element_id` showing `text`.
    ///
    /// Returns `true` if a timer was armed. Must be called inside a tokio
    /// runtime.
    pub fn hover(&mut self, element_id: &str, text: &str) -> bool {
        if !self.state.enabled {
            return false;
        }
        let is_pending = self.pending.as_ref().is_some_and(|(id, _)| id == element_id);
        if is_pending || self.last_handled().as_deref() == Some(element_id) {
            tracing::trace!(element = element_id, "same element, skipping");
            return false;
        }

        self.leave();

        let element = element_id.to_string();
        let text = text.to_string();
        let state = self.state.clone();
        let client = self.client.clone();
        let outcomes = self.outcomes.clone();
        let last_element = self.last_element.clone();
        let debounce = self.debounce;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if let Ok(mut last) = last_element.lock() {
                *last = Some(element.clone());
            }
            let outcome = resolve(&client, &state, element, &text).await;
            if outcomes.send(outcome).is_err() {
                tracing::debug!("hover outcome receiver dropped");
            }
        });
        self.pending = Some((element_id.to_string(), handle));
        true
    }

    /// Pointer left: cancel a timer that has not fired yet.
    ///
    /// A lookup already in flight runs to completion and still reports.
    pub fn leave(&mut self) {
        if let Some((element, handle)) = self.pending.take() {
            if self.last_handled().as_deref() != Some(element.as_str()) {
                handle.abort();
                tracing::trace!(element = %element, "hover cancelled");
            }
        }
    }

    fn last_handled(&self) -> Option<String> {
        self.last_element.lock().ok().and_then(|last| last.clone())
    }
}

async fn resolve(
    client: &MessageClient,
    state: &HoverState,
    element_id: String,
    text: &str,
) -> HoverOutcome {
    let Some(query) = state.query_for(text) else {
        tracing::debug!(element = %element_id, "no card information in hovered text");
        return HoverOutcome::NoMatch { element_id };
    };

    match client.search_cards(&query, false).await {
        Ok(records) if records.is_empty() => {
            tracing::debug!(query = %query.label(), "no prices for hovered card");
            HoverOutcome::NoMatch { element_id }
        }
        Ok(records) => {
            tracing::debug!(query = %query.label(), rows = records.len(), "hover prices found");
            HoverOutcome::Prices {
                element_id,
                query,
                records,
            }
        }
        Err(e) => {
            tracing::warn!(query = %query.label(), error = %e, "hover lookup failed");
            HoverOutcome::Failed {
                element_id,
                error: e.to_string(),
            }
        }
    }
}
