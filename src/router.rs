//! Request/response channel between UI surfaces and the lookup worker.
//!
//! A request is a JSON object with an `action` field. [`MessageRouter`]
//! validates it, answers `test` on the spot and spawns one tokio task per
//! network action. Every request gets exactly one [`Response`] through its
//! [`Responder`]. [`MessageClient`] is the calling side: it sends a request,
//! waits with a watchdog timeout and unwraps the tagged response.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::error::{LookupError, Result};
use crate::models::{CardQuery, CardRecord, LegacyCard, LegacyResult, SearchResult};
use crate::{config, AsyncCardPriceClient, SearchOptions};

pub const SEARCH_CARDS: &str = "searchCards";
pub const SEARCH_MULTIPLE_CARDS: &str = "searchMultipleCards";
pub const QUERY_LEGACY: &str = "querySupabase";
pub const TEST: &str = "test";

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// Tagged reply: `data` on success, `error` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result.and_then(|value| Ok(serde_json::to_value(value)?)) {
            Ok(data) => Response::ok(data),
            Err(e) => Response::err(e.to_string()),
        }
    }

    /// Unwrap into the payload, or a [`LookupError::Remote`] carrying the error text.
    pub fn into_result(self) -> Result<Value> {
        if self.success {
            Ok(self.data.unwrap_or(Value::Null))
        } else {
            Err(LookupError::Remote(
                self.error.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Responder
// ---------------------------------------------------------------------------

/// One-shot reply handle. Consumed by [`respond`](Responder::respond), so a
/// request can never be answered twice.
pub struct Responder {
    tx: oneshot::Sender<Response>,
}

impl Responder {
    /// A responder and the receiver its reply arrives on.
    pub fn channel() -> (Responder, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        (Responder { tx }, rx)
    }

    pub fn respond(self, response: Response) {
        if self.tx.send(response).is_err() {
            tracing::debug!("requester went away before the reply");
        }
    }
}

// ---------------------------------------------------------------------------
// MessageRouter
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Action {
    Test,
    Job(Job),
}

/// Actions that hit the network and run on their own task.
#[derive(Debug)]
enum Job {
    SearchCards {
        query: CardQuery,
        options: SearchOptions,
    },
    SearchMultipleCards {
        queries: Vec<CardQuery>,
        options: SearchOptions,
    },
    QueryLegacy {
        cards: Vec<LegacyCard>,
    },
}

impl Job {
    fn name(&self) -> &'static str {
        match self {
            Job::SearchCards { .. } => SEARCH_CARDS,
            Job::SearchMultipleCards { .. } => SEARCH_MULTIPLE_CARDS,
            Job::QueryLegacy { .. } => QUERY_LEGACY,
        }
    }

    async fn run(self, client: AsyncCardPriceClient) -> Response {
        match self {
            Job::SearchCards { query, options } => {
                Response::from_result(client.search(query, options).await)
            }
            Job::SearchMultipleCards { queries, options } => {
                Response::from_result(client.search_many(queries, options).await)
            }
            Job::QueryLegacy { cards } => {
                Response::from_result(client.search_legacy(cards, SearchOptions::default()).await)
            }
        }
    }
}

/// Dispatches action messages to the lookup client.
pub struct MessageRouter {
    client: AsyncCardPriceClient,
}

impl MessageRouter {
    pub fn new(client: AsyncCardPriceClient) -> Self {
        Self { client }
    }

    /// Handle one request.
    ///
    /// Returns `true` when the reply will arrive later from a spawned task,
    /// `false` when it has already been sent. Must be called inside a tokio
    /// runtime.
    ///
    /// A worker that panics still answers with an error response. A spawned
    /// task cancelled before it answers (runtime shutdown) drops the
    /// responder instead, which the caller sees as
    /// [`LookupError::NotResponding`].
    pub fn handle(&self, request: Value, responder: Responder) -> bool {
        let action = match parse_action(&request) {
            Ok(action) => action,
            Err(e) => {
                tracing::warn!(error = %e, "rejected request");
                responder.respond(Response::err(e.to_string()));
                return false;
            }
        };
        let job = match action {
            Action::Test => {
                tracing::debug!(action = TEST, "dispatching");
                responder.respond(Response::ok(json!({
                    "message": "Background worker is active",
                    "timestamp": now_millis(),
                })));
                return false;
            }
            Action::Job(job) => job,
        };

        let name = job.name();
        tracing::debug!(action = name, "dispatching");
        let client = self.client.clone();
        tokio::spawn(async move {
            let response = job.run(client).await;
            if let Some(error) = &response.error {
                tracing::warn!(action = name, error = %error, "request failed");
            }
            responder.respond(response);
        });
        true
    }
}

fn parse_action(request: &Value) -> Result<Action> {
    let invalid = LookupError::InvalidRequest;

    let action = request
        .as_object()
        .and_then(|obj| obj.get("action"))
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("Invalid request format".into()))?;

    let options = SearchOptions::default().include_product_categories(
        request
            .get("includeProductCategories")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    );

    match action {
        TEST => Ok(Action::Test),
        SEARCH_CARDS => {
            let raw = request
                .get("query")
                .ok_or_else(|| invalid("Invalid query: missing 'query'".into()))?;
            let query = serde_json::from_value(raw.clone())
                .map_err(|e| invalid(format!("Invalid query: {e}")))?;
            Ok(Action::Job(Job::SearchCards { query, options }))
        }
        SEARCH_MULTIPLE_CARDS => {
            let raw = request
                .get("queries")
                .filter(|q| q.is_array())
                .ok_or_else(|| invalid("Invalid queries format".into()))?;
            let queries = serde_json::from_value(raw.clone())
                .map_err(|e| invalid(format!("Invalid query: {e}")))?;
            Ok(Action::Job(Job::SearchMultipleCards { queries, options }))
        }
        QUERY_LEGACY => {
            let raw = request
                .get("cards")
                .filter(|c| c.is_array())
                .ok_or_else(|| invalid("Invalid cards format".into()))?;
            let cards = serde_json::from_value(raw.clone())
                .map_err(|e| invalid(format!("Invalid cards format: {e}")))?;
            Ok(Action::Job(Job::QueryLegacy { cards }))
        }
        other => Err(invalid(format!("Unknown action: {other}"))),
    }
}

/// Wait up to `timeout` for the reply on `rx`.
///
/// A responder dropped without answering maps to
/// [`LookupError::NotResponding`]; a failed reply maps to
/// [`LookupError::Remote`].
pub async fn await_reply(rx: oneshot::Receiver<Response>, timeout: Duration) -> Result<Value> {
    match tokio::time::timeout(timeout, rx).await {
        Err(_) => Err(LookupError::Timeout(timeout)),
        Ok(Err(_)) => Err(LookupError::NotResponding),
        Ok(Ok(response)) => response.into_result(),
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// MessageClient
// ---------------------------------------------------------------------------

/// Sending side of the router channel, with a watchdog timeout.
///
/// A timeout rejects the pending call only; the spawned work keeps running.
#[derive(Clone)]
pub struct MessageClient {
    router: Arc<MessageRouter>,
    timeout: Duration,
}

impl MessageClient {
    /// A client with the popup timeout.
    pub fn new(router: Arc<MessageRouter>) -> Self {
        Self::with_timeout(router, config::POPUP_TIMEOUT)
    }

    pub fn with_timeout(router: Arc<MessageRouter>, timeout: Duration) -> Self {
        Self { router, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn router(&self) -> Arc<MessageRouter> {
        self.router.clone()
    }

    /// Send a raw request and return the `data` of a successful reply.
    pub async fn send(&self, request: Value) -> Result<Value> {
        let (responder, rx) = Responder::channel();
        self.router.handle(request, responder);
        await_reply(rx, self.timeout).await
    }

    /// Liveness probe.
    pub async fn ping(&self) -> Result<Value> {
        self.send(json!({ "action": TEST })).await
    }

    pub async fn search_cards(
        &self,
        query: &CardQuery,
        include_product_categories: bool,
    ) -> Result<Vec<CardRecord>> {
        let data = self
            .send(json!({
                "action": SEARCH_CARDS,
                "query": query,
                "includeProductCategories": include_product_categories,
            }))
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn search_multiple_cards(
        &self,
        queries: &[CardQuery],
        include_product_categories: bool,
    ) -> Result<Vec<SearchResult>> {
        let data = self
            .send(json!({
                "action": SEARCH_MULTIPLE_CARDS,
                "queries": queries,
                "includeProductCategories": include_product_categories,
            }))
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn query_legacy(&self, cards: &[LegacyCard]) -> Result<Vec<LegacyResult>> {
        let data = self
            .send(json!({ "action": QUERY_LEGACY, "cards": cards }))
            .await?;
        Ok(serde_json::from_value(data)?)
    }
}
