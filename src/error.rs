use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NoSearchCriteria(String),

    #[error("All {attempts} search strategies failed; last error: {last}")]
    StrategiesExhausted { attempts: usize, last: String },

    #[error("Request timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Extension not responding")]
    NotResponding,

    #[error("{0}")]
    Remote(String),

    #[error("Task error: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, LookupError>;
