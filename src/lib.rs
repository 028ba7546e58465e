//! Trading card price lookup.
//!
//! Maps loosely structured card text onto filtered reads against a hosted
//! PostgREST price view. A query is expanded into an ordered ladder of filter
//! strategies, and the first strategy that returns rows wins.
//!
//! # Quick start
//!
//! ```no_run
//! use card_price_lookup::models::{CardQuery, SearchMode};
//! use card_price_lookup::{CardPriceClient, SearchOptions};
//!
//! let client = CardPriceClient::builder()
//!     .api_key("public-anon-key")
//!     .build()
//!     .unwrap();
//!
//! // Popup row: set + card number
//! let query = CardQuery::new(SearchMode::Normal).set_number("sv7a").card_number("125");
//! let rows = client.search(&query, &SearchOptions::default()).unwrap();
//!
//! // Hovered page text
//! let rows = client
//!     .search_text("Team Rocket's Wanaider AR SV10 099/098", &SearchOptions::default())
//!     .unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod error;
pub mod executor;
pub mod filter_builder;
#[cfg(feature = "async")]
pub mod hover;
pub mod models;
pub mod parser;
#[cfg(feature = "async")]
pub mod router;
pub mod settings;
pub mod store;
pub mod strategy;

#[cfg(feature = "async")]
pub use async_client::AsyncCardPriceClient;
pub use error::{LookupError, Result};
pub use executor::{SearchExecutor, SearchOptions};
pub use filter_builder::FilterBuilder;
pub use store::{CardStore, RestStore, StoreRequest};

use std::fmt;
use std::time::Duration;

use models::{CardQuery, CardRecord, LegacyCard, LegacyResult, SearchResult};
use strategy::QueryStrategy;

// ---------------------------------------------------------------------------
// CardPriceClientBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`CardPriceClient`].
///
/// Use [`CardPriceClient::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](CardPriceClientBuilder::build).
pub struct CardPriceClientBuilder {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    store: Option<Box<dyn CardStore>>,
}

impl Default for CardPriceClientBuilder {
    fn default() -> Self {
        Self {
            base_url: config::DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: config::HTTP_TIMEOUT,
            store: None,
        }
    }
}

impl CardPriceClientBuilder {
    /// Set the project URL the `/rest/v1/...` paths are appended to.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Set the public read-only key sent as `apikey` and bearer token.
    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Set the per-request HTTP timeout.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom store instead of the hosted REST view.
    ///
    /// When set, `base_url`, `api_key` and `timeout` are ignored.
    pub fn store<S: CardStore + 'static>(mut self, store: S) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Build the client.
    ///
    /// Fails with [`LookupError::InvalidArgument`] if neither an API key nor
    /// a custom store was supplied.
    pub fn build(self) -> Result<CardPriceClient> {
        let store = match self.store {
            Some(store) => store,
            None => {
                let key = self
                    .api_key
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| {
                        LookupError::InvalidArgument(
                            "an API key is required for the hosted price view".into(),
                        )
                    })?;
                Box::new(RestStore::new(&self.base_url, &key, self.timeout)?)
            }
        };
        Ok(CardPriceClient {
            store,
            base_url: self.base_url,
        })
    }
}

// ---------------------------------------------------------------------------
// CardPriceClient
// ---------------------------------------------------------------------------

/// The main entry point: parses, plans and runs card price searches.
///
/// Created via [`CardPriceClient::builder()`]. All methods take `&self` and
/// the client is `Send + Sync`, so one instance can serve concurrent callers.
pub struct CardPriceClient {
    store: Box<dyn CardStore>,
    base_url: String,
}

impl CardPriceClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> CardPriceClientBuilder {
        CardPriceClientBuilder::default()
    }

    /// Access the strategy executor bound to this client's store.
    pub fn executor(&self) -> SearchExecutor<'_> {
        SearchExecutor::new(self.store.as_ref())
    }

    /// The strategy ladder that [`search`](Self::search) would run for `query`.
    pub fn strategies(&self, query: &CardQuery) -> Vec<QueryStrategy> {
        strategy::build_strategies(query)
    }

    /// Search for one query, walking its strategy ladder.
    pub fn search(&self, query: &CardQuery, options: &SearchOptions) -> Result<Vec<CardRecord>> {
        self.executor().execute_query(query, options)
    }

    /// Search a batch sequentially; one failing row never aborts the others.
    pub fn search_many(&self, queries: &[CardQuery], options: &SearchOptions) -> Vec<SearchResult> {
        self.executor().execute_many(queries, options)
    }

    /// Parse hovered text and search for the card it describes.
    ///
    /// Text that yields no card information is a
    /// [`LookupError::NoSearchCriteria`] error.
    pub fn search_text(&self, text: &str, options: &SearchOptions) -> Result<Vec<CardRecord>> {
        let query = parser::parse(text).ok_or_else(|| {
            LookupError::NoSearchCriteria("no card information found in text".into())
        })?;
        self.search(&query, options)
    }

    /// Serve the legacy card shape: each card comes back with its rows
    /// under `supabase_data`, or with an `error`.
    pub fn search_legacy(&self, cards: &[LegacyCard], options: &SearchOptions) -> Vec<LegacyResult> {
        cards
            .iter()
            .map(|card| match self.search(&card.to_query(), options) {
                Ok(rows) => LegacyResult {
                    card: card.clone(),
                    supabase_data: Some(rows),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(card = ?card.original, error = %e, "legacy lookup failed");
                    LegacyResult {
                        card: card.clone(),
                        supabase_data: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect()
    }

    /// Return the underlying store for advanced usage.
    pub fn store(&self) -> &dyn CardStore {
        self.store.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Display / Debug
// ---------------------------------------------------------------------------

impl fmt::Debug for CardPriceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardPriceClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for CardPriceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CardPriceClient(base_url={}, view={})",
            self.base_url,
            config::PRICE_VIEW
        )
    }
}
