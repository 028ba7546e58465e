use std::time::Duration;

/// Hosted project serving the price view.
pub const DEFAULT_BASE_URL: &str = "https://buapbvrzrzkholjkzizo.supabase.co";
pub const REST_PREFIX: &str = "/rest/v1";
pub const PRICE_VIEW: &str = "card_prices_view";

/// Row cap appended to every store request.
pub const DEFAULT_LIMIT: usize = 1000;
/// Row cap for diagnostic probes.
pub const DEBUG_LIMIT: usize = 10;

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
pub const POPUP_TIMEOUT: Duration = Duration::from_secs(30);
pub const HOVER_TIMEOUT: Duration = Duration::from_secs(5);
pub const HOVER_DEBOUNCE: Duration = Duration::from_millis(300);

/// Hover text outside `(MIN_HOVER_TEXT, MAX_HOVER_TEXT)` characters is ignored.
pub const MIN_HOVER_TEXT: usize = 2;
pub const MAX_HOVER_TEXT: usize = 200;

/// Columns requested from the price view.
pub fn select_columns() -> &'static [&'static str] {
    &[
        "set_number",
        "name",
        "card_number",
        "card_id_simple",
        "min_price",
        "avg_price",
        "max_price",
        "scraped_at",
        "card_type",
        "url",
        "product_category",
    ]
}

/// Path of the price view relative to the base URL.
pub fn view_path(view: &str) -> String {
    format!("{}/{}", REST_PREFIX, view)
}
