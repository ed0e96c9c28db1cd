use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Every failure the tracker can run into. All of them are fatal: the run stops and nothing is
/// written to the workbook.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("missing required configuration: {}", .missing.join(", "))]
    Config { missing: Vec<&'static str> },

    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("unsupported date format: {0:?}. Use YYYY-MM-DD, DD/MM/YYYY or DD/MM/YY")]
    Input(String),
}

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("workbook not found at {0:?}. Run `ghtracker init` first")]
    NotFound(PathBuf),

    #[error("workbook {path:?} could not be read ({reason}). Restore a backup or run `ghtracker init --force`")]
    Unreadable { path: PathBuf, reason: String },

    #[error("sheet {0:?} is missing from the workbook. Run `ghtracker init` or fix the sheet name")]
    MissingSheet(String),

    #[error("workbook already exists at {0:?}. Pass --force to overwrite it")]
    AlreadyExists(PathBuf),

    #[error("failed to save workbook to {path:?}: {reason}")]
    Save { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("GitHub rejected the token (401). Check GITHUB_TOKEN and its scopes")]
    Unauthorized,

    #[error("GitHub rate limit hit{}", .reset.map(|r| format!(", resets at {r}")).unwrap_or_default())]
    RateLimited { reset: Option<DateTime<Utc>> },

    #[error("GitHub returned {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
