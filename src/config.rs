//! Run configuration, built once at startup and passed to every stage.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BOUNDARY_PATH: &str = "myMap.kml";
pub const DEFAULT_OUTPUT_PATH: &str = "myMap.xlsx";
pub const DEFAULT_ORIGIN: &str = "Bowral, NSW, Australia";

/// Distance Matrix accepts at most 25 destinations per request.
pub const MAX_BATCH_SIZE: usize = 25;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub boundary_path: PathBuf,
    pub output_path: PathBuf,
    /// Free-text address distances are measured from.
    pub origin: String,
    pub pacing: Pacing,
    pub timeouts: Timeouts,
    pub endpoints: Endpoints,
}

/// Fixed rate-limiting delays and batch sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Slept before every Place Details lookup.
    pub detail_delay: Duration,
    /// Slept after every Distance Matrix batch.
    pub batch_delay: Duration,
    pub batch_size: usize,
    /// Log resolver progress every this many items.
    pub progress_every: usize,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            detail_delay: Duration::from_millis(50),
            batch_delay: Duration::from_millis(200),
            batch_size: MAX_BATCH_SIZE,
            progress_every: 20,
        }
    }
}

impl Pacing {
    /// No sleeping at all; same batching.
    pub fn immediate() -> Self {
        Self {
            detail_delay: Duration::ZERO,
            batch_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Place Details and Geocoding.
    pub lookup: Duration,
    /// Places Aggregate and Distance Matrix.
    pub bulk: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            lookup: Duration::from_secs(10),
            bulk: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub aggregate: String,
    /// Base URL; the place id is appended as a path segment.
    pub place_details: String,
    pub geocode: String,
    pub distance_matrix: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            aggregate: "https://areainsights.googleapis.com/v1:computeInsights".into(),
            place_details: "https://places.googleapis.com/v1/places".into(),
            geocode: "https://maps.googleapis.com/maps/api/geocode/json".into(),
            distance_matrix: "https://maps.googleapis.com/maps/api/distancematrix/json".into(),
        }
    }
}

impl Config {
    /// Defaults for everything except the credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            boundary_path: PathBuf::from(DEFAULT_BOUNDARY_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            origin: DEFAULT_ORIGIN.to_string(),
            pacing: Pacing::default(),
            timeouts: Timeouts::default(),
            endpoints: Endpoints::default(),
        }
    }

    /// Build from an optional credential, rejecting a missing or blank one.
    pub fn from_api_key(api_key: Option<&str>) -> Result<Self, ConfigError> {
        let key = api_key.map(str::trim).unwrap_or_default();
        if key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self::with_api_key(key))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let size = self.pacing.batch_size;
        if size == 0 || size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize {
                got: size,
                max: MAX_BATCH_SIZE,
            });
        }
        Ok(())
    }
}
