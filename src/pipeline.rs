//! The polygon-to-report pipeline as an explicit state machine.
//!
//! ```text
//! Start → PolygonParsed → PlacesAggregated → LocalitiesResolved
//!       → OriginGeocoded → DistancesAnnotated ─┐
//!       → OriginGeocodeFailed → BlankDistances ┴→ ReportWritten → Done
//! ```
//!
//! Failure policy per transition:
//! - parse, aggregate, geocode and matrix transport errors are fatal;
//! - an empty aggregate result ends the run with [`Outcome::NoPlaces`];
//! - a failed details lookup becomes an unresolved locality;
//! - an origin the geocoder cannot place blanks every distance;
//! - once localities are resolved a report is always attempted.

use crate::boundary::{self, Vertex};
use crate::config::Config;
use crate::distance::{self, DistanceResult};
use crate::error::PipelineError;
use crate::google::{GeoServices, LatLng};
use crate::localities::{self, Locality};
use crate::report::{self, ReportRow};
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum Phase {
    Start,
    PolygonParsed(Vec<Vertex>),
    PlacesAggregated(Vec<String>),
    LocalitiesResolved(Vec<Locality>),
    OriginGeocoded { localities: Vec<Locality>, origin: LatLng },
    OriginGeocodeFailed(Vec<Locality>),
    DistancesAnnotated(Vec<DistanceResult>),
    BlankDistances(Vec<DistanceResult>),
    ReportWritten { path: PathBuf, rows: Vec<ReportRow>, distances_annotated: bool },
    Done(Outcome),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::PolygonParsed(_) => "PolygonParsed",
            Self::PlacesAggregated(_) => "PlacesAggregated",
            Self::LocalitiesResolved(_) => "LocalitiesResolved",
            Self::OriginGeocoded { .. } => "OriginGeocoded",
            Self::OriginGeocodeFailed(_) => "OriginGeocodeFailed",
            Self::DistancesAnnotated(_) => "DistancesAnnotated",
            Self::BlankDistances(_) => "BlankDistances",
            Self::ReportWritten { .. } => "ReportWritten",
            Self::Done(_) => "Done",
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The aggregate service found nothing inside the boundary; no file written.
    NoPlaces,
    Written {
        path: PathBuf,
        rows: Vec<ReportRow>,
        /// False when the origin could not be geocoded.
        distances_annotated: bool,
    },
}

pub struct Pipeline<'a, S: GeoServices + ?Sized> {
    config: &'a Config,
    services: &'a S,
}

impl<'a, S: GeoServices + ?Sized> Pipeline<'a, S> {
    pub fn new(config: &'a Config, services: &'a S) -> Self {
        Self { config, services }
    }

    /// Drive the machine from `Start` to `Done`.
    pub fn run(&self) -> Result<Outcome, PipelineError> {
        self.config.validate()?;
        let mut phase = Phase::Start;
        loop {
            debug!(phase = phase.name(), "pipeline");
            phase = match self.advance(phase)? {
                Phase::Done(outcome) => return Ok(outcome),
                next => next,
            };
        }
    }

    /// One transition.
    pub fn advance(&self, phase: Phase) -> Result<Phase, PipelineError> {
        let config = self.config;
        let next = match phase {
            Phase::Start => {
                info!("Parsing KML...");
                Phase::PolygonParsed(boundary::parse_kml_file(&config.boundary_path)?)
            }

            Phase::PolygonParsed(vertices) => {
                info!("Calling Places Aggregate API (localities in polygon)...");
                info!("This can take a minute or so, depending on how big your map boundary is.");
                Phase::PlacesAggregated(localities::aggregate_place_ids(self.services, &vertices)?)
            }

            Phase::PlacesAggregated(ids) if ids.is_empty() => {
                warn!("No place insights returned.");
                Phase::Done(Outcome::NoPlaces)
            }

            Phase::PlacesAggregated(ids) => {
                info!("Got {} place IDs. Resolving names and locations...", ids.len());
                Phase::LocalitiesResolved(localities::resolve_localities(
                    self.services,
                    &ids,
                    &config.pacing,
                )?)
            }

            Phase::LocalitiesResolved(localities) => {
                info!("Geocoding origin ({})...", config.origin);
                match distance::geocode_origin(self.services, &config.origin)? {
                    Some(origin) => Phase::OriginGeocoded { localities, origin },
                    None => {
                        warn!("Could not geocode {}. Skipping distance matrix.", config.origin);
                        Phase::OriginGeocodeFailed(localities)
                    }
                }
            }

            Phase::OriginGeocoded { localities, origin } => {
                info!("Fetching driving distances from {}...", config.origin);
                Phase::DistancesAnnotated(distance::annotate(
                    self.services,
                    origin,
                    &localities,
                    &config.pacing,
                )?)
            }

            Phase::OriginGeocodeFailed(localities) => Phase::BlankDistances(distance::blank_results(&localities)),

            Phase::DistancesAnnotated(results) => self.write(&results, true)?,

            Phase::BlankDistances(results) => self.write(&results, false)?,

            Phase::ReportWritten { path, rows, distances_annotated } => Phase::Done(Outcome::Written {
                path,
                rows,
                distances_annotated,
            }),

            Phase::Done(outcome) => Phase::Done(outcome),
        };
        Ok(next)
    }

    fn write(&self, results: &[DistanceResult], distances_annotated: bool) -> Result<Phase, PipelineError> {
        let rows = report::build_rows(results);
        let path = self.config.output_path.clone();
        report::write_workbook(&path, &rows)?;
        Ok(Phase::ReportWritten { path, rows, distances_annotated })
    }
}
