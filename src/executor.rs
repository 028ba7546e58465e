//! Runs a strategy ladder against a [`CardStore`].

use crate::config;
use crate::error::{LookupError, Result};
use crate::filter_builder::FilterBuilder;
use crate::models::{CardQuery, CardRecord, SearchResult};
use crate::store::{CardStore, StoreRequest};
use crate::strategy::{build_strategies, QueryStrategy, PRODUCT_CATEGORY, SET_NUMBER};

// ---------------------------------------------------------------------------
// SearchOptions
// ---------------------------------------------------------------------------

/// Per-call knobs shared by every request of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Row cap appended to each request.
    pub limit: usize,
    /// When false, rows tagged with a product category (sealed product,
    /// accessories) are filtered out.
    pub include_product_categories: bool,
    /// Probe the set on an empty result and log what it holds.
    pub diagnostics: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: config::DEFAULT_LIMIT,
            include_product_categories: false,
            diagnostics: false,
        }
    }
}

impl SearchOptions {
    pub fn include_product_categories(mut self, include: bool) -> Self {
        self.include_product_categories = include;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

/// Render one strategy as a store request.
pub fn request_for(strategy: &QueryStrategy, options: &SearchOptions) -> StoreRequest {
    let mut qb = FilterBuilder::new(config::PRICE_VIEW);
    qb.select(config::select_columns());
    if !options.include_product_categories {
        qb.is_null(PRODUCT_CATEGORY);
    }
    strategy.apply(&mut qb);
    qb.limit(options.limit);
    StoreRequest::from(&qb)
}

/// Order by set code, then card number numerically, then name.
pub fn sort_records(records: &mut [CardRecord]) {
    records.sort_by(|a, b| {
        a.set_number
            .cmp(&b.set_number)
            .then_with(|| a.card_number_value().cmp(&b.card_number_value()))
            .then_with(|| a.name.cmp(&b.name))
    });
}

// ---------------------------------------------------------------------------
// SearchExecutor
// ---------------------------------------------------------------------------

/// Walks strategy ladders against a borrowed store.
pub struct SearchExecutor<'a> {
    store: &'a dyn CardStore,
}

impl<'a> SearchExecutor<'a> {
    /// Create a new `SearchExecutor` bound to the given store.
    pub fn new(store: &'a dyn CardStore) -> Self {
        Self { store }
    }

    /// Try `strategies` in order and return the rows of the first one that
    /// yields any.
    ///
    /// A failed request only disqualifies its own strategy. The call fails
    /// only if every strategy failed; if some came back empty the result is
    /// an empty list.
    pub fn execute(
        &self,
        strategies: &[QueryStrategy],
        options: &SearchOptions,
    ) -> Result<Vec<CardRecord>> {
        let mut failures = 0;
        let mut last_error: Option<LookupError> = None;

        for (index, strategy) in strategies.iter().enumerate() {
            let request = request_for(strategy, options);
            tracing::debug!(
                strategy = %strategy.name,
                attempt = index + 1,
                of = strategies.len(),
                "trying strategy"
            );

            match self.store.fetch(&request) {
                Ok(mut rows) if !rows.is_empty() => {
                    sort_records(&mut rows);
                    tracing::info!(strategy = %strategy.name, rows = rows.len(), "strategy matched");
                    return Ok(rows);
                }
                Ok(_) => {
                    tracing::debug!(strategy = %strategy.name, "strategy returned no rows");
                }
                Err(e) => {
                    tracing::warn!(strategy = %strategy.name, error = %e, "strategy failed");
                    failures += 1;
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) if failures == strategies.len() => Err(LookupError::StrategiesExhausted {
                attempts: failures,
                last: last.to_string(),
            }),
            _ => Ok(Vec::new()),
        }
    }

    /// Build the ladder for `query` and run it.
    pub fn execute_query(
        &self,
        query: &CardQuery,
        options: &SearchOptions,
    ) -> Result<Vec<CardRecord>> {
        let strategies = build_strategies(query);
        if strategies.is_empty() {
            return Err(LookupError::NoSearchCriteria(no_criteria_message(query)));
        }

        let records = self.execute(&strategies, options)?;
        if records.is_empty() && options.diagnostics {
            if let Some(set) = query.normalized().set_number {
                self.probe_set(&set, options);
            }
        }
        Ok(records)
    }

    /// Resolve each query in turn, keeping errors attached to their row.
    pub fn execute_many(&self, queries: &[CardQuery], options: &SearchOptions) -> Vec<SearchResult> {
        tracing::info!(queries = queries.len(), "searching batch");
        queries
            .iter()
            .map(|query| match self.execute_query(query, options) {
                Ok(records) => {
                    tracing::debug!(query = %query.label(), rows = records.len(), "row resolved");
                    SearchResult::found(query.clone(), records)
                }
                Err(e) => {
                    tracing::warn!(query = %query.label(), error = %e, "row failed");
                    SearchResult::failed(query.clone(), &e)
                }
            })
            .collect()
    }

    /// Log how many rows the set holds at all. Never affects the outcome.
    fn probe_set(&self, set: &str, options: &SearchOptions) {
        let probe = QueryStrategy::new("set_probe").eq(SET_NUMBER, set);
        let request = request_for(&probe, &options.clone().limit(config::DEBUG_LIMIT));
        match self.store.fetch(&request) {
            Ok(rows) if rows.is_empty() => {
                tracing::debug!(set, "set not found in price view");
            }
            Ok(rows) => {
                tracing::debug!(
                    set,
                    sample = rows.len(),
                    "set exists but no row matched the query"
                );
            }
            Err(e) => tracing::debug!(set, error = %e, "set probe failed"),
        }
    }
}

fn no_criteria_message(query: &CardQuery) -> String {
    if query.search_mode.is_set_specific() {
        if query.normalized().set_number.is_none() {
            "No search criteria: no set selected for set-specific search".to_string()
        } else {
            "No search criteria: need a card number or a name longer than 2 characters"
                .to_string()
        }
    } else {
        "No searchable information in query".to_string()
    }
}
