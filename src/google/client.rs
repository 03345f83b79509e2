//! Blocking HTTP client for the four Google services the pipeline uses.

use super::types::{
    AggregateRequest, AggregateResponse, DetailsReply, DistanceMatrixResponse, GeocodeResponse, LatLng,
};
use crate::config::{Config, Endpoints, Timeouts};
use crate::error::ServiceError;
use serde::de::DeserializeOwned;
use tracing::debug;

const AGGREGATE: &str = "Places Aggregate";
const PLACE_DETAILS: &str = "Place Details";
const GEOCODING: &str = "Geocoding";
const DISTANCE_MATRIX: &str = "Distance Matrix";

/// Fields requested from Place Details.
pub const DETAILS_FIELD_MASK: &str = "displayName,location";

const USER_AGENT: &str = concat!("PolygonLocalities/", env!("CARGO_PKG_VERSION"));

/// The remote calls the pipeline depends on.
///
/// Implementations report transport-level trouble (timeouts, refused
/// connections, non-2xx on the bulk endpoints) as `Err`. Service-level
/// statuses inside a 200 body are left for the caller to interpret.
pub trait GeoServices {
    fn aggregate(&self, request: &AggregateRequest) -> Result<AggregateResponse, ServiceError>;

    /// A non-success HTTP status is not an error here: it comes back as
    /// [`DetailsReply::Failed`] so one bad identifier cannot sink the run.
    fn place_details(&self, place_id: &str) -> Result<DetailsReply, ServiceError>;

    fn geocode(&self, address: &str) -> Result<GeocodeResponse, ServiceError>;

    fn distance_matrix(
        &self,
        origin: LatLng,
        destinations: &[LatLng],
    ) -> Result<DistanceMatrixResponse, ServiceError>;
}

pub struct GoogleMapsClient {
    agent: ureq::Agent,
    api_key: String,
    endpoints: Endpoints,
    timeouts: Timeouts,
}

impl GoogleMapsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().user_agent(USER_AGENT).build(),
            api_key: config.api_key.clone(),
            endpoints: config.endpoints.clone(),
            timeouts: config.timeouts,
        }
    }
}

fn read_json<T: DeserializeOwned>(service: &'static str, response: ureq::Response) -> Result<T, ServiceError> {
    response
        .into_json()
        .map_err(|source| ServiceError::Decode { service, source })
}

/// `a|b|c` destination list.
fn join_destinations(destinations: &[LatLng]) -> String {
    destinations
        .iter()
        .map(LatLng::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

impl GeoServices for GoogleMapsClient {
    fn aggregate(&self, request: &AggregateRequest) -> Result<AggregateResponse, ServiceError> {
        let response = self
            .agent
            .post(&self.endpoints.aggregate)
            .set("X-Goog-Api-Key", &self.api_key)
            .timeout(self.timeouts.bulk)
            .send_json(request)
            .map_err(|e| ServiceError::from_ureq(AGGREGATE, e))?;

        // Keep the raw body around for debugging empty results.
        let raw: serde_json::Value = read_json(AGGREGATE, response)?;
        debug!(response = %raw, "aggregate response");
        serde_json::from_value(raw).map_err(|e| ServiceError::Decode {
            service: AGGREGATE,
            source: e.into(),
        })
    }

    fn place_details(&self, place_id: &str) -> Result<DetailsReply, ServiceError> {
        let url = format!("{}/{}", self.endpoints.place_details.trim_end_matches('/'), place_id);
        let result = self
            .agent
            .get(&url)
            .set("X-Goog-Api-Key", &self.api_key)
            .set("X-Goog-FieldMask", DETAILS_FIELD_MASK)
            .timeout(self.timeouts.lookup)
            .call();

        match result {
            Ok(response) => Ok(DetailsReply::Found(read_json(PLACE_DETAILS, response)?)),
            Err(ureq::Error::Status(status, _)) => Ok(DetailsReply::Failed { status }),
            Err(e) => Err(ServiceError::from_ureq(PLACE_DETAILS, e)),
        }
    }

    fn geocode(&self, address: &str) -> Result<GeocodeResponse, ServiceError> {
        let response = self
            .agent
            .get(&self.endpoints.geocode)
            .query("address", address)
            .query("key", &self.api_key)
            .timeout(self.timeouts.lookup)
            .call()
            .map_err(|e| ServiceError::from_ureq(GEOCODING, e))?;
        read_json(GEOCODING, response)
    }

    fn distance_matrix(
        &self,
        origin: LatLng,
        destinations: &[LatLng],
    ) -> Result<DistanceMatrixResponse, ServiceError> {
        let response = self
            .agent
            .get(&self.endpoints.distance_matrix)
            .query("origins", &origin.to_string())
            .query("destinations", &join_destinations(destinations))
            .query("mode", "driving")
            .query("key", &self.api_key)
            .timeout(self.timeouts.bulk)
            .call()
            .map_err(|e| ServiceError::from_ureq(DISTANCE_MATRIX, e))?;
        read_json(DISTANCE_MATRIX, response)
    }
}
