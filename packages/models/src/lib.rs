#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared domain types for the landscope client.
//!
//! A completed lookup is an [`AddressPointRecord`]: the resolved address,
//! its coordinates, the municipal zoning attributes (zone, floor-area
//! ratio, building coverage ratio, public-land flag), the nearby POIs, and
//! the optional AI nearby-analysis that is attached after the record is
//! first created.
//!
//! The backend serves Taipei zoning data and speaks Chinese; display values
//! such as the no-data sentinel (`無資料`) and the public-land tri-state
//! (`是`/`否`/`無資料`) are kept verbatim as wire/display strings.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The fixed placeholder substituted whenever a queried attribute is
/// unavailable ("no data").
pub const NO_DATA: &str = "無資料";

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl Coordinates {
    /// Whether this point can be placed on the map.
    ///
    /// A point that resolves outside the serviced zoning area comes back
    /// as NaN or exactly (0, 0); neither gets a marker.
    #[must_use]
    pub fn is_displayable(self) -> bool {
        !self.lat.is_nan() && !self.lng.is_nan() && !(self.lat == 0.0 && self.lng == 0.0)
    }
}

/// Zoning attributes as returned by the intersect endpoint.
///
/// All fields are optional: a point outside the serviced area resolves
/// with every field absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zoning {
    /// Municipal land-use zone name.
    pub zone: Option<String>,
    /// Floor-area ratio, percent.
    pub far: Option<f64>,
    /// Building coverage ratio, percent.
    pub bcr: Option<f64>,
    /// Raw public-land flag ("Y" or anything else).
    pub is_public_land: Option<String>,
}

/// Tri-state public-land classification.
///
/// Only ever [`Yes`](Self::Yes) or [`No`](Self::No) when the zone itself
/// is known; unknown zoning forces [`Unknown`](Self::Unknown) regardless
/// of the raw flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicLand {
    /// Publicly owned land.
    #[serde(rename = "是")]
    Yes,
    /// Privately owned land.
    #[serde(rename = "否")]
    No,
    /// Zoning unknown, so ownership is unknown too.
    #[serde(rename = "無資料")]
    Unknown,
}

impl PublicLand {
    /// Resolves the tri-state from raw zoning attributes.
    #[must_use]
    pub fn from_zoning(zoning: &Zoning) -> Self {
        match (&zoning.zone, &zoning.is_public_land) {
            (Some(_), Some(flag)) => {
                if flag == "Y" {
                    Self::Yes
                } else {
                    Self::No
                }
            }
            _ => Self::Unknown,
        }
    }

    /// Display string (`是` / `否` / `無資料`).
    #[must_use]
    pub const fn display(self) -> &'static str {
        match self {
            Self::Yes => "是",
            Self::No => "否",
            Self::Unknown => NO_DATA,
        }
    }
}

impl std::fmt::Display for PublicLand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display())
    }
}

/// POI category tag carried by each nearby feature.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PoiCategory {
    /// Restaurants, cafes, fast food.
    Food,
    /// Hospitals, clinics, pharmacies.
    Health,
    /// Parks, libraries, community centres.
    Public,
    /// Anything else, including unrecognized tags.
    Other,
}

impl PoiCategory {
    /// Parses a wire tag, mapping anything unrecognized to
    /// [`Other`](Self::Other).
    #[must_use]
    pub fn parse_lossy(tag: &str) -> Self {
        tag.parse().unwrap_or(Self::Other)
    }
}

/// A single nearby point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiFeature {
    /// Category tag.
    #[serde(rename = "poi_type")]
    pub category: PoiCategory,
    /// Display name.
    pub name: String,
    /// Full address.
    pub address: String,
    /// Distance from the looked-up point, in metres.
    pub distance: f64,
    /// Feature latitude.
    pub lat: f64,
    /// Feature longitude.
    pub lng: f64,
}

/// The nearby POIs of one record. An empty collection is a valid, distinct
/// outcome of a lookup, not an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoiCollection {
    /// Features in server order.
    pub features: Vec<PoiFeature>,
}

impl PoiCollection {
    /// An empty collection.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    /// Number of features.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the lookup found no POIs at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Advantages and disadvantages for one POI category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    /// Category label as produced by the analysis endpoint (e.g. `餐飲`).
    pub poi_type: String,
    /// Advantage bullet points.
    pub advantages: Vec<String>,
    /// Disadvantage bullet points.
    pub disadvantages: Vec<String>,
}

/// The AI nearby-analysis for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearbyAnalysis {
    /// Per-category advantages/disadvantages.
    pub analysis: Vec<CategoryAnalysis>,
    /// Free-text summary.
    pub summary: String,
}

/// One completed lookup, as kept in the session ledger.
///
/// Created once the zoning step resolves; `nearby_analysis` is attached
/// later when the asynchronous analysis step resolves, after the record
/// may already be rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressPointRecord {
    /// Display address.
    pub address: String,
    /// Latitude; NaN or 0 when the point is outside the serviced area.
    pub lat: f64,
    /// Longitude; NaN or 0 when the point is outside the serviced area.
    pub lng: f64,
    /// Zone name or the no-data sentinel.
    pub zoning: String,
    /// Floor-area ratio as a display string, or the sentinel.
    pub far: String,
    /// Building coverage ratio as a display string, or the sentinel.
    pub bcr: String,
    /// Public-land tri-state.
    pub is_public_land: PublicLand,
    /// Nearby POIs.
    pub nearby_poi: PoiCollection,
    /// AI analysis, attached after creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearby_analysis: Option<NearbyAnalysis>,
}

impl AddressPointRecord {
    /// Composes a record from resolved lookup results, substituting the
    /// no-data sentinel for every absent zoning attribute.
    #[must_use]
    pub fn from_lookup(
        address: String,
        coordinates: Coordinates,
        zoning: &Zoning,
        nearby_poi: PoiCollection,
    ) -> Self {
        Self {
            address,
            lat: coordinates.lat,
            lng: coordinates.lng,
            zoning: zoning.zone.clone().unwrap_or_else(|| NO_DATA.to_string()),
            far: zoning
                .far
                .map_or_else(|| NO_DATA.to_string(), |v| v.to_string()),
            bcr: zoning
                .bcr
                .map_or_else(|| NO_DATA.to_string(), |v| v.to_string()),
            is_public_land: PublicLand::from_zoning(zoning),
            nearby_poi,
            nearby_analysis: None,
        }
    }

    /// The record's coordinate pair.
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }

    /// Number of nearby POIs.
    #[must_use]
    pub const fn poi_count(&self) -> usize {
        self.nearby_poi.len()
    }
}

/// Appends `%` to a ratio value unless it is the no-data sentinel.
#[must_use]
pub fn percent_display(value: &str) -> String {
    if value == NO_DATA {
        value.to_string()
    } else {
        format!("{value}%")
    }
}

/// The response envelope every endpoint uses: a payload field plus an
/// optional server message (populated on errors and some successes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Payload, absent on failures.
    pub data: Option<T>,
    /// Human-readable server message, if any.
    pub message: Option<String>,
}

/// The intersect endpoint's payload: resolved address, coordinates, and
/// zoning attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectResult {
    /// Resolved display address.
    pub address: String,
    /// Resolved coordinates.
    pub coordinates: Coordinates,
    /// Zoning attributes, all optional.
    pub zoning: Zoning,
}
