#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP boundary of the landscope client.
//!
//! The four consumed endpoints are modelled as the [`ZoningApi`] trait so
//! the ledger, session, and tests can run against fakes. The real
//! implementation is [`http::HttpLookupClient`], a thin `reqwest` client
//! that unwraps the server's [`ApiEnvelope`] and maps non-2xx statuses to
//! [`LookupError::Status`] carrying the status code and any server
//! message.
//!
//! [`ApiEnvelope`]: landscope_models::ApiEnvelope

pub mod http;
pub mod poi_geojson;

use landscope_models::{AddressPointRecord, IntersectResult, NearbyAnalysis, PoiCollection};
use thiserror::Error;

/// What to geocode: a free-form address, or a raw coordinate pair (the
/// "current location" path).
#[derive(Debug, Clone, PartialEq)]
pub enum LookupQuery {
    /// Free-form address string.
    Address(String),
    /// Explicit coordinates, resolved server-side with
    /// `use_coordinates=true`.
    Coordinates {
        /// Latitude.
        lat: f64,
        /// Longitude.
        lng: f64,
    },
}

/// Errors from the lookup endpoints.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be interpreted.
    #[error("parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Server answered with a non-2xx status.
    #[error("server returned status {code}{}", .message.as_ref().map_or_else(String::new, |m| format!(": {m}")))]
    Status {
        /// HTTP status code.
        code: u16,
        /// Server-provided message, if the envelope carried one.
        message: Option<String>,
    },
}

/// The consumed endpoints as one async capability trait.
#[async_trait::async_trait]
pub trait ZoningApi: Send + Sync {
    /// Geocode + zoning lookup for an address or coordinate pair.
    async fn intersect(&self, query: &LookupQuery) -> Result<IntersectResult, LookupError>;

    /// Nearby POIs around a coordinate. An empty collection is a valid
    /// outcome, never an error.
    async fn nearby_poi(&self, lat: f64, lng: f64) -> Result<PoiCollection, LookupError>;

    /// AI nearby-analysis for a composed record.
    async fn nearby_analysis(
        &self,
        record: &AddressPointRecord,
    ) -> Result<NearbyAnalysis, LookupError>;

    /// AI comparative summary over two or more composed records.
    async fn compare_points(&self, records: &[AddressPointRecord]) -> Result<String, LookupError>;
}
