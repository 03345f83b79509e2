//! Wire types for the Google Maps Platform services.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Coordinate pair as the Places services spell it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub const ZERO: LatLng = LatLng { latitude: 0.0, longitude: 0.0 };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// `lat,lng` as the Distance Matrix query string expects.
impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A missing field and an explicit `null` both read as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ─── Places Aggregate (Area Insights) ───────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AggregateRequest {
    pub insights: Vec<String>,
    pub filter: AggregateFilter,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateFilter {
    pub location_filter: LocationFilter,
    pub type_filter: TypeFilter,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFilter {
    pub custom_area: CustomArea,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomArea {
    pub polygon: Polygon,
}

#[derive(Debug, Clone, Serialize)]
pub struct Polygon {
    pub coordinates: Vec<LatLng>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeFilter {
    pub included_types: Vec<String>,
}

impl AggregateRequest {
    /// Ask for every `locality` place inside the (closed) ring.
    pub fn localities_in(ring: Vec<LatLng>) -> Self {
        Self {
            insights: vec!["INSIGHT_PLACES".to_string()],
            filter: AggregateFilter {
                location_filter: LocationFilter {
                    custom_area: CustomArea {
                        polygon: Polygon { coordinates: ring },
                    },
                },
                type_filter: TypeFilter {
                    included_types: vec!["locality".to_string()],
                },
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub place_insights: Vec<PlaceInsight>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceInsight {
    /// Resource name, `places/<id>`.
    #[serde(default)]
    pub place: Option<String>,
}

// ─── Place Details ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    #[serde(default)]
    pub display_name: Option<LocalizedText>,
    #[serde(default)]
    pub location: Option<PartialLatLng>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PartialLatLng {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PartialLatLng {
    pub fn complete(&self) -> Option<LatLng> {
        Some(LatLng::new(self.latitude?, self.longitude?))
    }
}

/// Outcome of one details lookup that reached the server.
#[derive(Debug, Clone)]
pub enum DetailsReply {
    Found(PlaceDetails),
    /// Non-success HTTP status; the body is ignored.
    Failed { status: u16 },
}

// ─── Geocoding ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: GeocodeLocation,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeocodeLocation {
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeResponse {
    /// First result's location, only when the service said `OK`.
    pub fn location(&self) -> Option<LatLng> {
        if self.status != "OK" {
            return None;
        }
        self.results
            .first()
            .map(|r| LatLng::new(r.geometry.location.lat, r.geometry.location.lng))
    }
}

// ─── Distance Matrix ────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DistanceMatrixResponse {
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rows: Vec<MatrixRow>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatrixRow {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub elements: Vec<MatrixElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatrixElement {
    pub status: String,
    #[serde(default)]
    pub distance: Option<Measure>,
    #[serde(default)]
    pub duration: Option<Measure>,
}

/// A `{text, value}` pair; metres for distance, seconds for duration.
#[derive(Debug, Clone, Deserialize)]
pub struct Measure {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: Option<u64>,
}
