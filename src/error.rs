//! Crate-wide error type.

use std::io;

use crate::config::ConfigError;

/// Errors that abort an ingestion or calculation run.
///
/// Row-level problems (a short line, an unparsable date) never show up here;
/// they are dropped by the ingestion layer and only reduce the record count.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("input is empty or the header line is missing")]
    MissingHeader,

    #[error("no valid data records found in input")]
    NoValidRows,

    #[error("column mapping is invalid, unmapped required columns: {}", .missing.join(", "))]
    InvalidMapping { missing: Vec<&'static str> },

    #[error("invalid parameter `{field}`: {message}")]
    InvalidParameter {
        field: &'static str,
        message: String,
    },

    #[error("battery price is unknown for `{model}`, set `battery.price` in the config")]
    UnknownBatteryPrice { model: String },

    #[error("price lookup for `{url}` failed: {message}")]
    PriceFetch { url: String, message: String },

    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    Config(Vec<ConfigError>),

    #[error("failed to read `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Self {
        Self::Config(vec![error])
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
