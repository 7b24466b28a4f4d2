use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Could not interpret date format '{value}'. Available options are: {options}")]
    InvalidDateFormat { value: String, options: String },

    #[error("invalid date '{value}', expected format {pattern}")]
    InvalidDate { value: String, pattern: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Slack API error in {method}: {error}")]
    SlackApi { method: String, error: String },

    #[error("pagination of {method} exceeded {max_pages} pages")]
    PaginationLimit { method: String, max_pages: usize },

    #[error("failed to download {name}: {reason}")]
    Download { name: String, reason: String },

    #[error("failed to read file at {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write file at {path}: {source}")]
    WriteFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("JSON serialization error: {0}")]
    JsonSerialize(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
