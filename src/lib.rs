//! Polygon Localities: which settlements lie inside a drawn map boundary,
//! and how far is each one by road from a fixed origin.
//!
//! The crate is a thin, sequential pipeline over three Google Maps Platform
//! services. See [`pipeline`] for the stage ordering and failure policy.

pub mod boundary;
pub mod config;
pub mod distance;
pub mod error;
pub mod google;
pub mod localities;
pub mod pipeline;
pub mod report;
