//! Async wrapper around [`CardPriceClient`] for use in async runtimes (Tokio).
//!
//! Runs all client operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! the blocking HTTP store walks a strategy ladder.
//!
//! # Example
//!
//! ```no_run
//! use card_price_lookup::models::{CardQuery, SearchMode};
//! use card_price_lookup::{AsyncCardPriceClient, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AsyncCardPriceClient::builder()
//!         .api_key("public-anon-key")
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let query = CardQuery::new(SearchMode::Normal).set_number("sv10").card_number("99");
//!     let rows = client.search(query, SearchOptions::default()).await.unwrap();
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::error::{LookupError, Result};
use crate::models::{CardQuery, CardRecord, LegacyCard, LegacyResult, SearchResult};
use crate::{config, CardPriceClient, CardStore, SearchOptions};

// ---------------------------------------------------------------------------
// AsyncCardPriceClientBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncCardPriceClient`].
pub struct AsyncCardPriceClientBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    store: Option<Box<dyn CardStore>>,
}

impl Default for AsyncCardPriceClientBuilder {
    fn default() -> Self {
        Self {
            base_url: config::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: config::HTTP_TIMEOUT,
            store: None,
        }
    }
}

impl AsyncCardPriceClientBuilder {
    /// Set the project URL.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Set the public read-only key.
    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom store instead of the hosted REST view.
    pub fn store<S: CardStore + 'static>(mut self, store: S) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Build the async client.
    ///
    /// The blocking HTTP client is constructed on the blocking thread pool,
    /// since it must not be created inside the async event loop.
    pub async fn build(self) -> Result<AsyncCardPriceClient> {
        tokio::task::spawn_blocking(move || {
            let mut builder = CardPriceClient::builder()
                .base_url(&self.base_url)
                .timeout(self.timeout);
            if let Some(key) = self.api_key {
                builder = builder.api_key(&key);
            }
            if let Some(store) = self.store {
                builder.store = Some(store);
            }
            Ok(AsyncCardPriceClient::from_client(builder.build()?))
        })
        .await
        .map_err(|e| LookupError::Task(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncCardPriceClient
// ---------------------------------------------------------------------------

/// Async wrapper around [`CardPriceClient`].
///
/// Cheap to clone: clones share one underlying client. Every operation is
/// dispatched to the blocking pool, so concurrent callers each get their own
/// thread while a ladder is running.
#[derive(Clone)]
pub struct AsyncCardPriceClient {
    inner: Arc<CardPriceClient>,
}

impl AsyncCardPriceClient {
    /// Create a new builder for configuring the async client.
    pub fn builder() -> AsyncCardPriceClientBuilder {
        AsyncCardPriceClientBuilder::default()
    }

    /// Wrap an already built client.
    pub fn from_client(client: CardPriceClient) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    /// Run a sync client operation on the blocking thread pool.
    ///
    /// A panic inside `f` surfaces as [`LookupError::Task`].
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&CardPriceClient) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.inner.clone();
        tokio::task::spawn_blocking(move || f(&client))
            .await
            .map_err(|e| LookupError::Task(format!("Task join error: {e}")))?
    }

    /// Search for one query asynchronously.
    pub async fn search(&self, query: CardQuery, options: SearchOptions) -> Result<Vec<CardRecord>> {
        self.run(move |c| c.search(&query, &options)).await
    }

    /// Search a batch asynchronously; rows are still resolved one after another.
    pub async fn search_many(
        &self,
        queries: Vec<CardQuery>,
        options: SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        self.run(move |c| Ok(c.search_many(&queries, &options))).await
    }

    /// Serve legacy card objects asynchronously.
    pub async fn search_legacy(
        &self,
        cards: Vec<LegacyCard>,
        options: SearchOptions,
    ) -> Result<Vec<LegacyResult>> {
        self.run(move |c| Ok(c.search_legacy(&cards, &options))).await
    }

    /// Borrow the wrapped sync client.
    pub fn client(&self) -> &CardPriceClient {
        &self.inner
    }
}
