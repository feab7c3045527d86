use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by the Gen3 session and its building blocks
#[derive(Debug, Error)]
pub enum Gen3Error {
    /// Credentials file could not be read
    #[error("credentials file '{}' could not be read: {source}", .path.display())]
    CredentialFileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Credentials file is neither JSON nor lenient JSON
    #[error("credentials file '{}' could not be parsed: {message}", .path.display())]
    CredentialParse { path: PathBuf, message: String },

    /// `api_key` is not a decodable three-part JWT
    #[error("malformed api key: {0}")]
    MalformedToken(String),

    /// Token exchange failed
    #[error("authentication failed ({}): {message}", status_label(.status))]
    Authentication {
        status: Option<StatusCode>,
        message: String,
    },

    /// Export request failed
    #[error("fetch of '{key}' failed ({}): {message}", status_label(.status))]
    Fetch {
        key: String,
        status: Option<StatusCode>,
        message: String,
    },

    /// Run configuration is invalid
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Records could not be turned into a table
    #[error("failed to build table: {0}")]
    Table(String),

    #[error("failed to write output '{}': {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Gen3Error {
    /// HTTP status attached to authentication and fetch failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Gen3Error::Authentication { status, .. } | Gen3Error::Fetch { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<polars::prelude::PolarsError> for Gen3Error {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Gen3Error::Table(err.to_string())
    }
}

fn status_label(status: &Option<StatusCode>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "no response".to_owned())
}

pub type Result<T> = std::result::Result<T, Gen3Error>;
