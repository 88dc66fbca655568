use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GaugesError {
    #[error("missing credentials: cookie or csrf token must be set")]
    MissingCredentials,

    #[error("invalid config file at line {line}: {message}")]
    InvalidConfig { line: usize, message: String },

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("not authorized ({0}), the session cookie or csrf token has probably expired")]
    Unauthorized(reqwest::StatusCode),

    #[error("unexpected http status: {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid or unexpected response format: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid date {value:?}: expected YYYY-MM-DD")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
