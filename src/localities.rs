//! Locality resolution.
//!
//! Aggregate query (polygon → place ids), then one Place Details lookup
//! per id. Lookups that come back without usable data still produce a
//! [`Locality`], tagged [`Resolution::Unresolved`], so the report keeps a
//! row for every place the aggregate returned.

use crate::boundary::Vertex;
use crate::config::Pacing;
use crate::error::ServiceError;
use crate::google::{AggregateRequest, AggregateResponse, DetailsReply, GeoServices, LatLng, PlaceDetails};
use std::thread;
use tracing::{debug, info};

/// Why a place could not be fully resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    HttpStatus(u16),
    /// 200 response, but the name or location (or both) was absent.
    MissingFields { display_name: bool, location: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved {
        name: String,
        location: LatLng,
    },
    Unresolved {
        reason: UnresolvedReason,
        name: Option<String>,
        location: Option<LatLng>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Locality {
    pub place_id: String,
    pub resolution: Resolution,
}

impl Locality {
    /// Resolved name, or `(place_id: <id>)` when none came back.
    pub fn display_name(&self) -> String {
        match &self.resolution {
            Resolution::Resolved { name, .. } | Resolution::Unresolved { name: Some(name), .. } => name.clone(),
            Resolution::Unresolved { name: None, .. } => placeholder_name(&self.place_id),
        }
    }

    /// Resolved coordinates, or (0, 0) when none came back.
    pub fn coordinates(&self) -> LatLng {
        match &self.resolution {
            Resolution::Resolved { location, .. } | Resolution::Unresolved { location: Some(location), .. } => {
                *location
            }
            Resolution::Unresolved { location: None, .. } => LatLng::ZERO,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.resolution, Resolution::Resolved { .. })
    }

    /// Interpret one details reply.
    pub fn from_reply(place_id: &str, reply: DetailsReply) -> Self {
        let resolution = match reply {
            DetailsReply::Failed { status } => Resolution::Unresolved {
                reason: UnresolvedReason::HttpStatus(status),
                name: None,
                location: None,
            },
            DetailsReply::Found(details) => resolution_from_details(details),
        };
        Self {
            place_id: place_id.to_string(),
            resolution,
        }
    }
}

pub fn placeholder_name(place_id: &str) -> String {
    format!("(place_id: {})", place_id)
}

fn resolution_from_details(details: PlaceDetails) -> Resolution {
    let name = details
        .display_name
        .and_then(|d| d.text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let location = details.location.and_then(|l| l.complete());

    match (name, location) {
        (Some(name), Some(location)) => Resolution::Resolved { name, location },
        (name, location) => Resolution::Unresolved {
            reason: UnresolvedReason::MissingFields {
                display_name: name.is_none(),
                location: location.is_none(),
            },
            name,
            location,
        },
    }
}

// ─── Aggregate query ────────────────────────────────────────────

/// Convert a boundary into the `{latitude, longitude}` ring the aggregate
/// service expects, closing it if needed.
pub fn polygon_ring(vertices: &[Vertex]) -> Vec<LatLng> {
    let mut ring: Vec<LatLng> = vertices.iter().map(|v| LatLng::new(v.lat, v.lon)).collect();
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

/// Bare place ids from an aggregate response: `places/` stripped, blanks dropped.
pub fn place_ids(response: &AggregateResponse) -> Vec<String> {
    response
        .place_insights
        .iter()
        .filter_map(|p| p.place.as_deref())
        .map(|p| p.strip_prefix("places/").unwrap_or(p).to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Ask the aggregate service for every locality inside the boundary.
pub fn aggregate_place_ids<S: GeoServices + ?Sized>(
    services: &S,
    vertices: &[Vertex],
) -> Result<Vec<String>, ServiceError> {
    let request = AggregateRequest::localities_in(polygon_ring(vertices));
    let response = services.aggregate(&request)?;
    Ok(place_ids(&response))
}

// ─── Details resolution ─────────────────────────────────────────

/// Resolve every id, then sort by name (case-insensitive, stable).
pub fn resolve_localities<S: GeoServices + ?Sized>(
    services: &S,
    place_ids: &[String],
    pacing: &Pacing,
) -> Result<Vec<Locality>, ServiceError> {
    let total = place_ids.len();
    let mut localities = Vec::with_capacity(total);

    for (i, place_id) in place_ids.iter().enumerate() {
        thread::sleep(pacing.detail_delay);
        let reply = services.place_details(place_id)?;
        let locality = Locality::from_reply(place_id, reply);
        if let Resolution::Unresolved { reason, .. } = &locality.resolution {
            debug!(place_id = %place_id, ?reason, "place not fully resolved");
        }
        localities.push(locality);

        if pacing.progress_every > 0 && (i + 1) % pacing.progress_every == 0 {
            info!("  {}/{}", i + 1, total);
        }
    }

    sort_by_name(&mut localities);
    Ok(localities)
}

pub fn sort_by_name(localities: &mut [Locality]) {
    localities.sort_by_key(|l| l.display_name().to_lowercase());
}
