//! Error types for every stage of the pipeline.
//!
//! Per-item failures (a bad details lookup, a bad distance element) are not
//! errors at all: they are absorbed into the data. What lives here is fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration problems. Nothing is written when one occurs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Set GOOGLE_MAPS_API_KEY in .env or environment.")]
    MissingApiKey,

    #[error("Batch size must be between 1 and {max}, got {got}")]
    InvalidBatchSize { got: usize, max: usize },
}

/// Malformed boundary file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Cannot read boundary file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed KML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("No <coordinates> in KML")]
    MissingCoordinates,

    #[error("<coordinates> element is empty")]
    EmptyCoordinates,

    #[error("Invalid coordinate value in token '{token}'")]
    InvalidNumber { token: String },
}

/// A remote call that failed at the transport or HTTP level.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} returned HTTP {code}")]
    Status { service: &'static str, code: u16 },

    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned an unreadable response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ServiceError {
    /// Classify a ureq failure for the named service.
    pub fn from_ureq(service: &'static str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => Self::Status { service, code },
            ureq::Error::Transport(t) => Self::Transport {
                service,
                message: t.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Cannot write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Anything that stops the pipeline before a report exists.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Report(#[from] ReportError),
}
