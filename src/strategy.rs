//! Ordered query strategies for one card query.
//!
//! The fallback ladder is plain data: [`build_strategies`] lists every filter
//! combination worth trying, most specific first, and the executor walks the
//! list until something comes back.
//!
//! The price view stores some names with two trailing spaces, and there is no
//! trim operator to lean on, so every exact-name strategy is followed by a
//! twin whose name carries [`NAME_PADDING`].

use crate::filter_builder::FilterBuilder;
use crate::models::CardQuery;
use crate::parser::RARITY_TOKENS;

pub const SET_NUMBER: &str = "set_number";
pub const CARD_NUMBER: &str = "card_number";
pub const NAME: &str = "name";
pub const CARD_TYPE: &str = "card_type";
pub const PRODUCT_CATEGORY: &str = "product_category";

/// Suffix found on the padded rows of the name column.
pub const NAME_PADDING: &str = "  ";

// ---------------------------------------------------------------------------
// Filter / QueryStrategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column=eq.value`
    Eq { column: &'static str, value: String },
    /// `or=(column.eq.a,column.eq.b,...)`
    AnyOf {
        column: &'static str,
        values: Vec<String>,
    },
}

impl Filter {
    pub fn column(&self) -> &'static str {
        match self {
            Filter::Eq { column, .. } | Filter::AnyOf { column, .. } => *column,
        }
    }
}

/// One concrete filter combination to try against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStrategy {
    /// Diagnostic label, e.g. `set_card_number` or `name_padded`.
    pub name: String,
    pub filters: Vec<Filter>,
}

impl QueryStrategy {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            filters: Vec::new(),
        }
    }

    pub fn eq(mut self, column: &'static str, value: &str) -> Self {
        self.filters.push(Filter::Eq {
            column,
            value: value.to_string(),
        });
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Value of the first equality filter on `column`.
    pub fn value_of(&self, column: &str) -> Option<&str> {
        self.filters.iter().find_map(|f| match f {
            Filter::Eq { column: c, value } if *c == column => Some(value.as_str()),
            _ => None,
        })
    }

    /// Columns this strategy filters on, in order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.filters.iter().map(Filter::column).collect()
    }

    /// Add this strategy's filters to a request under construction.
    pub fn apply(&self, qb: &mut FilterBuilder) {
        for filter in &self.filters {
            match filter {
                Filter::Eq { column, value } => {
                    qb.eq(column, value);
                }
                Filter::AnyOf { column, values } => {
                    let values: Vec<&str> = values.iter().map(String::as_str).collect();
                    qb.any_eq(column, &values);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// List the strategies for `query`, most specific first.
///
/// The query is normalized before use. An empty list means the query carries
/// nothing searchable for its mode.
///
/// ```rust
/// use card_price_lookup::models::{CardQuery, SearchMode};
/// use card_price_lookup::strategy::build_strategies;
///
/// let q = CardQuery::new(SearchMode::Normal)
///     .name("charizard")
///     .set_number("SV7a")
///     .card_number("125");
/// let strategies = build_strategies(&q);
/// assert_eq!(strategies.len(), 1);
/// assert_eq!(strategies[0].value_of("set_number"), Some("sv7a"));
/// assert_eq!(strategies[0].value_of("card_number"), Some("125"));
/// ```
pub fn build_strategies(query: &CardQuery) -> Vec<QueryStrategy> {
    let q = query.normalized();
    if q.search_mode.is_set_specific() {
        set_specific(&q)
    } else {
        normal(&q)
    }
}

/// Every strategy stays inside the chosen set.
fn set_specific(q: &CardQuery) -> Vec<QueryStrategy> {
    let Some(set) = q.set_number.as_deref() else {
        return Vec::new();
    };
    let mut out = Vec::new();

    if let Some(number) = q.card_number.as_deref() {
        out.push(
            QueryStrategy::new("set_card_number")
                .eq(SET_NUMBER, set)
                .eq(CARD_NUMBER, number),
        );
    }
    if let Some(name) = q.name.as_deref().filter(|n| n.chars().count() > 2) {
        out.extend(name_pair(QueryStrategy::new("set_name").eq(SET_NUMBER, set), name));
    }
    out
}

fn normal(q: &CardQuery) -> Vec<QueryStrategy> {
    let set = q.set_number.as_deref();
    let number = q.card_number.as_deref();
    let name = q.name.as_deref();
    let card_type = q.card_type.as_deref();
    let mut out = Vec::new();

    match (set, number) {
        // A set-scoped number pins down a single card.
        (Some(set), Some(number)) => {
            out.push(
                QueryStrategy::new("set_card_number")
                    .eq(SET_NUMBER, set)
                    .eq(CARD_NUMBER, number),
            );
        }
        (Some(set), None) => {
            if let Some(t) = card_type {
                let base = QueryStrategy::new("set_card_type")
                    .eq(SET_NUMBER, set)
                    .filter(type_filter(t));
                match name {
                    Some(n) => out.extend(name_pair(base, n)),
                    None => out.push(base),
                }
            }
            if let Some(n) = name {
                out.extend(name_pair(QueryStrategy::new("set_name").eq(SET_NUMBER, set), n));
            }
            if out.is_empty() {
                out.push(QueryStrategy::new("set_only").eq(SET_NUMBER, set));
            }
        }
        (None, _) => match (name, number, card_type) {
            (None, None, None) => {}
            (Some(n), None, None) => out.extend(name_pair(QueryStrategy::new("name"), n)),
            (Some(n), Some(number), _) => {
                out.extend(name_pair(QueryStrategy::new("name"), n));
                out.extend(name_pair(
                    QueryStrategy::new("name_card_number").eq(CARD_NUMBER, number),
                    n,
                ));
            }
            (None, Some(number), None) => {
                out.push(QueryStrategy::new("card_number").eq(CARD_NUMBER, number));
            }
            // Remaining shapes all involve a type without a set: search on
            // everything that is there in one go.
            (n, number, t) => {
                let mut base = QueryStrategy::new("combined");
                if let Some(number) = number {
                    base = base.eq(CARD_NUMBER, number);
                }
                if let Some(t) = t {
                    base = base.filter(type_filter(t));
                }
                match n {
                    Some(n) => out.extend(name_pair(base, n)),
                    None => out.push(base),
                }
            }
        },
    }
    out
}

/// `base` + exact name, then `base` + padded name.
fn name_pair(base: QueryStrategy, name: &str) -> [QueryStrategy; 2] {
    let padded_label = format!("{}_padded", base.name);
    let plain = base.clone().eq(NAME, name);
    let mut padded = base.eq(NAME, &format!("{}{}", name, NAME_PADDING));
    padded.name = padded_label;
    [plain, padded]
}

/// A known rarity or single word matches exactly; several words match any of them.
fn type_filter(card_type: &str) -> Filter {
    let words: Vec<&str> = card_type.split_whitespace().collect();
    if words.len() <= 1 || RARITY_TOKENS.contains(&card_type) {
        Filter::Eq {
            column: CARD_TYPE,
            value: card_type.to_string(),
        }
    } else {
        Filter::AnyOf {
            column: CARD_TYPE,
            values: words.into_iter().map(str::to_string).collect(),
        }
    }
}
