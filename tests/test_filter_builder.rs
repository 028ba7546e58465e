//! Unit tests for the PostgREST FilterBuilder.

use card_price_lookup::FilterBuilder;

fn pairs(qb: &FilterBuilder) -> Vec<(String, String)> {
    qb.build().1
}

fn pair(k: &str, v: &str) -> (String, String) {
    (k.to_string(), v.to_string())
}

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_selects_star_from_view_path() {
    let (path, query) = FilterBuilder::new("card_prices_view").build();
    assert_eq!(path, "/rest/v1/card_prices_view");
    assert_eq!(query, vec![pair("select", "*")]);
}

#[test]
fn select_replaces_default_star() {
    let mut qb = FilterBuilder::new("card_prices_view");
    qb.select(&["name", "set_number"]);
    assert_eq!(pairs(&qb)[0], pair("select", "name,set_number"));
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[test]
fn eq_adds_equality_pair() {
    let mut qb = FilterBuilder::new("v");
    qb.eq("set_number", "sv10");
    assert_eq!(pairs(&qb)[1], pair("set_number", "eq.sv10"));
}

#[test]
fn eq_keeps_raw_value_for_reqwest_to_encode() {
    let mut qb = FilterBuilder::new("v");
    qb.eq("name", "team rocket's mewtwo ex  ");
    assert_eq!(pairs(&qb)[1], pair("name", "eq.team rocket's mewtwo ex  "));
}

#[test]
fn is_null_adds_null_check() {
    let mut qb = FilterBuilder::new("v");
    qb.is_null("product_category");
    assert_eq!(pairs(&qb)[1], pair("product_category", "is.null"));
}

#[test]
fn or_joins_conditions() {
    let mut qb = FilterBuilder::new("v");
    qb.or(&[("card_type", "eq.ar"), ("card_type", "eq.sar")]);
    assert_eq!(pairs(&qb)[1], pair("or", "(card_type.eq.ar,card_type.eq.sar)"));
}

#[test]
fn or_empty_is_noop() {
    let mut qb = FilterBuilder::new("v");
    qb.or(&[]);
    assert_eq!(pairs(&qb).len(), 1);
}

#[test]
fn or_quotes_reserved_characters() {
    let mut qb = FilterBuilder::new("v");
    qb.or(&[("name", "eq.mewtwo (promo)"), ("name", "eq.mew")]);
    assert_eq!(pairs(&qb)[1], pair("or", "(name.eq.\"mewtwo (promo)\",name.eq.mew)"));
}

#[test]
fn any_eq_single_value_is_plain_eq() {
    let mut qb = FilterBuilder::new("v");
    qb.any_eq("card_type", &["ar"]);
    assert_eq!(pairs(&qb)[1], pair("card_type", "eq.ar"));
}

#[test]
fn any_eq_many_values_is_disjunction() {
    let mut qb = FilterBuilder::new("v");
    qb.any_eq("card_type", &["holo", "rare"]);
    assert_eq!(pairs(&qb)[1], pair("or", "(card_type.eq.holo,card_type.eq.rare)"));
}

#[test]
fn any_eq_empty_adds_nothing() {
    let mut qb = FilterBuilder::new("v");
    qb.any_eq("card_type", &[]);
    assert_eq!(pairs(&qb).len(), 1);
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[test]
fn select_first_filters_in_order_limit_last() {
    let mut qb = FilterBuilder::new("card_prices_view");
    qb.limit(1000)
        .select(&["name"])
        .eq("set_number", "sv7a")
        .is_null("product_category")
        .eq("card_number", "125");
    assert_eq!(
        pairs(&qb),
        vec![
            pair("select", "name"),
            pair("set_number", "eq.sv7a"),
            pair("product_category", "is.null"),
            pair("card_number", "eq.125"),
            pair("limit", "1000"),
        ]
    );
}

#[test]
fn build_is_repeatable() {
    let mut qb = FilterBuilder::new("v");
    qb.eq("a", "1").limit(5);
    assert_eq!(qb.build(), qb.build());
}
