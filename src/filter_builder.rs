//! PostgREST filter builder.
//!
//! Produces the path and the query pairs for one filtered read against a view.
//! Values are never spliced into a URL by hand: the pairs are handed to
//! reqwest, which percent-encodes them. Builder methods return `&mut Self`
//! for chaining.
//!
//! # Example
//!
//! ```rust
//! use card_price_lookup::FilterBuilder;
//! let (path, pairs) = FilterBuilder::new("card_prices_view")
//!     .select(&["name", "set_number"])
//!     .eq("set_number", "sv10")
//!     .is_null("product_category")
//!     .limit(10)
//!     .build();
//! assert_eq!(path, "/rest/v1/card_prices_view");
//! assert_eq!(pairs[1], ("set_number".to_string(), "eq.sv10".to_string()));
//! ```

use crate::config;

/// Builds PostgREST filter queries.
pub struct FilterBuilder {
    view: String,
    select_cols: Vec<String>,
    filters: Vec<(String, String)>,
    limit_val: Option<usize>,
}

impl FilterBuilder {
    /// Create a builder targeting the given view.
    pub fn new(view: &str) -> Self {
        Self {
            view: view.to_string(),
            select_cols: vec!["*".to_string()],
            filters: Vec::new(),
            limit_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add an equality filter: `{column}=eq.{value}`.
    pub fn eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    /// Add a null check: `{column}=is.null`.
    pub fn is_null(&mut self, column: &str) -> &mut Self {
        self.filters
            .push((column.to_string(), "is.null".to_string()));
        self
    }

    /// Add OR-combined conditions: `or=(cond1,cond2,...)`.
    ///
    /// Each condition is a `(column, "op.value")` tuple. An empty list is a no-op.
    pub fn or(&mut self, conditions: &[(&str, &str)]) -> &mut Self {
        if conditions.is_empty() {
            return self;
        }
        let parts: Vec<String> = conditions
            .iter()
            .map(|(col, cond)| format!("{}.{}", col, quote_condition(cond)))
            .collect();
        self.filters
            .push(("or".to_string(), format!("({})", parts.join(","))));
        self
    }

    /// Match any of `values` exactly.
    ///
    /// One value becomes a plain `eq` filter, several become an `or=(...)`
    /// disjunction, and an empty list adds nothing.
    pub fn any_eq(&mut self, column: &str, values: &[&str]) -> &mut Self {
        match values {
            [] => self,
            [single] => self.eq(column, single),
            many => {
                let conds: Vec<String> = many.iter().map(|v| format!("eq.{}", v)).collect();
                let pairs: Vec<(&str, &str)> =
                    conds.iter().map(|c| (column, c.as_str())).collect();
                self.or(&pairs)
            }
        }
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the request path and the ordered query pairs.
    ///
    /// `select` always comes first and `limit`, when set, always comes last.
    pub fn build(&self) -> (String, Vec<(String, String)>) {
        let mut pairs = Vec::with_capacity(self.filters.len() + 2);
        pairs.push(("select".to_string(), self.select_cols.join(",")));
        pairs.extend(self.filters.iter().cloned());
        if let Some(n) = self.limit_val {
            pairs.push(("limit".to_string(), n.to_string()));
        }
        (config::view_path(&self.view), pairs)
    }
}

/// Values inside `or=(...)` must be double-quoted when they contain
/// PostgREST reserved characters.
fn quote_condition(cond: &str) -> String {
    match cond.split_once('.') {
        Some((op, value)) if value.contains([',', '(', ')', ':', '"']) => {
            format!("{}.\"{}\"", op, value.replace('"', "\\\""))
        }
        _ => cond.to_string(),
    }
}
