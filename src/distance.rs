//! Driving distance annotation from a fixed origin.
//!
//! Destinations are sent in order-preserving batches and the matrix
//! elements are matched back by position: element `i` of the first row
//! belongs to destination `i` of the batch.

use crate::config::Pacing;
use crate::error::ServiceError;
use crate::google::{DistanceMatrixResponse, GeoServices, LatLng};
use crate::localities::Locality;
use std::thread;
use tracing::{info, warn};

/// One origin-to-destination result. Blank when the route is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Leg {
    pub distance_text: String,
    pub duration_minutes: Option<u32>,
}

impl Leg {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_blank(&self) -> bool {
        self.distance_text.is_empty() && self.duration_minutes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceResult {
    pub locality_name: String,
    pub distance_text: String,
    pub duration_minutes: Option<u32>,
}

impl DistanceResult {
    pub fn new(locality_name: String, leg: Leg) -> Self {
        Self {
            locality_name,
            distance_text: leg.distance_text,
            duration_minutes: leg.duration_minutes,
        }
    }
}

/// Whole minutes, rounding half up: 89 s → 1, 90 s → 2. Saturates at `u32::MAX`.
pub fn minutes_from_seconds(seconds: u64) -> u32 {
    u32::try_from(seconds.saturating_add(30) / 60).unwrap_or(u32::MAX)
}

/// Resolve the origin address. `Ok(None)` means the service answered but
/// could not geocode it; annotation is then skipped, not aborted.
pub fn geocode_origin<S: GeoServices + ?Sized>(
    services: &S,
    address: &str,
) -> Result<Option<LatLng>, ServiceError> {
    let response = services.geocode(address)?;
    if response.location().is_none() {
        warn!(
            status = %response.status,
            message = response.error_message.as_deref().unwrap_or(""),
            "origin geocode returned no location"
        );
    }
    Ok(response.location())
}

/// Every locality with a blank leg, in order.
pub fn blank_results(localities: &[Locality]) -> Vec<DistanceResult> {
    localities
        .iter()
        .map(|l| DistanceResult::new(l.display_name(), Leg::blank()))
        .collect()
}

/// Map one matrix response onto `expected` destinations.
///
/// The result always has exactly `expected` legs: a failed request or a
/// missing row blanks the whole batch, a failed element blanks one leg, and
/// a short or long element list is padded or truncated.
pub fn legs_for_batch(response: &DistanceMatrixResponse, expected: usize) -> Vec<Leg> {
    if response.status != "OK" {
        warn!(
            status = %response.status,
            message = response.error_message.as_deref().unwrap_or(""),
            "distance matrix batch failed"
        );
        return vec![Leg::blank(); expected];
    }
    let Some(row) = response.rows.first() else {
        return vec![Leg::blank(); expected];
    };
    if row.elements.len() != expected {
        warn!(
            expected,
            got = row.elements.len(),
            "distance matrix element count mismatch"
        );
    }

    let mut legs: Vec<Leg> = row
        .elements
        .iter()
        .take(expected)
        .map(|el| {
            if el.status != "OK" {
                return Leg::blank();
            }
            Leg {
                distance_text: el.distance.as_ref().map(|d| d.text.clone()).unwrap_or_default(),
                duration_minutes: el.duration.as_ref().and_then(|d| d.value).map(minutes_from_seconds),
            }
        })
        .collect();
    legs.resize(expected, Leg::blank());
    legs
}

/// Distances from `origin` to every locality, batch by batch.
pub fn annotate<S: GeoServices + ?Sized>(
    services: &S,
    origin: LatLng,
    localities: &[Locality],
    pacing: &Pacing,
) -> Result<Vec<DistanceResult>, ServiceError> {
    let batch_size = pacing.batch_size.max(1);
    let total_batches = localities.len().div_ceil(batch_size);
    let mut results = Vec::with_capacity(localities.len());

    for (index, batch) in localities.chunks(batch_size).enumerate() {
        let destinations: Vec<LatLng> = batch.iter().map(Locality::coordinates).collect();
        let response = services.distance_matrix(origin, &destinations)?;
        let legs = legs_for_batch(&response, batch.len());
        results.extend(
            batch
                .iter()
                .zip(legs)
                .map(|(locality, leg)| DistanceResult::new(locality.display_name(), leg)),
        );
        thread::sleep(pacing.batch_delay);
        info!("  Batch {}/{} done.", index + 1, total_batches);
    }

    Ok(results)
}
