//! Shared test fixtures for the card price lookup integration tests.
//!
//! Provides [`FakeStore`], an in-memory [`CardStore`] whose answers are
//! scripted per test and which records every request it receives, plus a
//! handful of sample price rows.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use card_price_lookup::models::CardRecord;
use card_price_lookup::{CardStore, LookupError, Result, StoreRequest};

type Responder = Box<dyn Fn(&StoreRequest) -> Result<Vec<CardRecord>> + Send + Sync>;

/// In-memory store with scripted answers and a request log.
pub struct FakeStore {
    respond: Responder,
    calls: Mutex<Vec<StoreRequest>>,
}

impl FakeStore {
    /// Answer every request with `f(request)`.
    pub fn with<F>(f: F) -> Arc<Self>
    where
        F: Fn(&StoreRequest) -> Result<Vec<CardRecord>> + Send + Sync + 'static,
    {
        Arc::new(Self {
            respond: Box::new(f),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Answer requests from `script` in order, then with empty results.
    pub fn scripted(script: Vec<Result<Vec<CardRecord>>>) -> Arc<Self> {
        let script = Mutex::new(VecDeque::from(script));
        Self::with(move |_| {
            script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        })
    }

    /// Answer every request with the same rows.
    pub fn returning(rows: Vec<CardRecord>) -> Arc<Self> {
        Self::with(move |_| Ok(rows.clone()))
    }

    /// Answer every request with the rows of `table` that match its `eq` filters.
    pub fn table(table: Vec<CardRecord>) -> Arc<Self> {
        Self::with(move |req| Ok(table.iter().filter(|r| matches(r, req)).cloned().collect()))
    }

    /// Fail every request with an HTTP 500.
    pub fn failing() -> Arc<Self> {
        Self::with(|_| Err(server_error()))
    }

    pub fn calls(&self) -> Vec<StoreRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CardStore for FakeStore {
    fn fetch(&self, request: &StoreRequest) -> Result<Vec<CardRecord>> {
        self.calls.lock().unwrap().push(request.clone());
        (self.respond)(request)
    }
}

pub fn server_error() -> LookupError {
    LookupError::Status {
        status: 500,
        body: "Internal Server Error".to_string(),
    }
}

/// True if `record` satisfies every `eq.` and `is.null` pair of `request`.
fn matches(record: &CardRecord, request: &StoreRequest) -> bool {
    request.query.iter().all(|(key, value)| {
        let field = match key.as_str() {
            "set_number" => Some(record.set_number.clone()),
            "card_number" => Some(record.card_number.clone()),
            "name" => Some(record.name.clone()),
            "card_type" => Some(record.card_type.clone().unwrap_or_default()),
            "product_category" => {
                return value != "is.null" || record.product_category.is_none();
            }
            _ => None,
        };
        match (field, value.strip_prefix("eq.")) {
            (Some(field), Some(expected)) => field == expected,
            _ => true,
        }
    })
}

// ---------------------------------------------------------------------------
// Sample rows
// ---------------------------------------------------------------------------

pub fn record(set: &str, number: &str, name: &str) -> CardRecord {
    CardRecord {
        set_number: set.to_string(),
        name: name.to_string(),
        card_number: number.to_string(),
        card_type: None,
        min_price: 100.0,
        avg_price: 150.0,
        max_price: 200.0,
        scraped_at: "2025-05-01T12:00:00Z".to_string(),
        product_category: None,
        card_id_simple: None,
        url: None,
    }
}

pub fn typed(set: &str, number: &str, name: &str, card_type: &str) -> CardRecord {
    CardRecord {
        card_type: Some(card_type.to_string()),
        ..record(set, number, name)
    }
}

/// A small slice of the price view.
pub fn sample_rows() -> Vec<CardRecord> {
    vec![
        typed("sv7a", "125", "charizard", "sar"),
        typed("sv10", "99", "team rocket's wanaider", "ar"),
        typed("sv10", "130", "team rocket's mewtwo ex", "sar"),
        record("sv1a", "5", "tropius  "),
        CardRecord {
            product_category: Some("booster box".to_string()),
            ..record("sv10", "0", "glory of team rocket booster box")
        },
    ]
}
