//! Google Maps Platform access: Places Aggregate, Place Details,
//! Geocoding and Distance Matrix.

pub mod client;
pub mod types;

pub use client::{GeoServices, GoogleMapsClient, DETAILS_FIELD_MASK};
pub use types::{
    AggregateRequest, AggregateResponse, DetailsReply, DistanceMatrixResponse, GeocodeResponse, LatLng,
    PlaceDetails,
};
