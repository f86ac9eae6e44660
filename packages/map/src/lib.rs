#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map rendering seam.
//!
//! The mapping library's drawing primitives are consumed through the
//! minimal [`MapSurface`] capability trait. [`MapAdapter`] layers the
//! single-slot policy on top: one marker, one walking-radius circle, one
//! POI overlay, each mutation a full remove-then-add so overlays never
//! accumulate or orphan.

use landscope_models::{Coordinates, PoiCategory, PoiCollection};

/// Zoom level used when focusing on a looked-up point.
pub const FOCUS_ZOOM: u8 = 16;

/// Opaque handle to a drawn layer, issued by the [`MapSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub u64);

/// A POI dot ready for drawing: position, category color, popup text.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiMarker {
    /// Where to draw the dot.
    pub at: Coordinates,
    /// Fill color derived from the POI category.
    pub color: &'static str,
    /// POI display name.
    pub name: String,
    /// POI address for the popup.
    pub address: String,
}

/// Minimal capability interface over the mapping surface.
///
/// Implementations own layer bookkeeping and hand out [`LayerId`]s; they
/// never decide *which* layers exist — that is [`MapAdapter`]'s job.
pub trait MapSurface {
    /// Draws a marker with a popup label.
    fn place_marker(&mut self, at: Coordinates, label: &str) -> LayerId;

    /// Draws a circle of `radius_m` metres around `center`.
    fn draw_circle(&mut self, center: Coordinates, radius_m: f64) -> LayerId;

    /// Draws a set of POI dots as one layer.
    fn add_poi_layer(&mut self, markers: &[PoiMarker]) -> LayerId;

    /// Removes a previously drawn layer.
    fn remove_layer(&mut self, id: LayerId);

    /// Recenters and zooms the view.
    fn focus(&mut self, at: Coordinates, zoom: u8);
}

/// Fill color for a POI category dot.
///
/// Unrecognized categories already collapse to [`PoiCategory::Other`]
/// during parsing, so the fallback color is stable.
#[must_use]
pub const fn category_color(category: PoiCategory) -> &'static str {
    match category {
        PoiCategory::Food => "lightblue",
        PoiCategory::Health => "lightgreen",
        PoiCategory::Public => "orange",
        PoiCategory::Other => "black",
    }
}

/// Owns the three overlay slots on top of a [`MapSurface`].
pub struct MapAdapter {
    surface: Box<dyn MapSurface + Send>,
    marker: Option<LayerId>,
    circle: Option<LayerId>,
    poi_layer: Option<LayerId>,
}

impl MapAdapter {
    /// Wraps a surface with empty slots.
    #[must_use]
    pub fn new(surface: Box<dyn MapSurface + Send>) -> Self {
        Self {
            surface,
            marker: None,
            circle: None,
            poi_layer: None,
        }
    }

    /// Replaces the marker and refocuses the view on it.
    pub fn show_marker(&mut self, at: Coordinates, label: &str) {
        if let Some(old) = self.marker.take() {
            self.surface.remove_layer(old);
        }
        self.marker = Some(self.surface.place_marker(at, label));
        self.surface.focus(at, FOCUS_ZOOM);
    }

    /// Removes the marker, if any.
    pub fn clear_marker(&mut self) {
        if let Some(old) = self.marker.take() {
            self.surface.remove_layer(old);
        }
    }

    /// Replaces the walking-radius circle.
    pub fn show_radius(&mut self, center: Coordinates, radius_m: f64) {
        if let Some(old) = self.circle.take() {
            self.surface.remove_layer(old);
        }
        self.circle = Some(self.surface.draw_circle(center, radius_m));
    }

    /// Removes the walking-radius circle, if any.
    pub fn clear_radius(&mut self) {
        if let Some(old) = self.circle.take() {
            self.surface.remove_layer(old);
        }
    }

    /// Replaces the POI overlay with `pois`, color-coded by category.
    /// An empty collection just clears the slot.
    pub fn show_poi(&mut self, pois: &PoiCollection) {
        if let Some(old) = self.poi_layer.take() {
            self.surface.remove_layer(old);
        }
        if pois.is_empty() {
            return;
        }
        let markers: Vec<PoiMarker> = pois
            .features
            .iter()
            .map(|f| PoiMarker {
                at: Coordinates {
                    lat: f.lat,
                    lng: f.lng,
                },
                color: category_color(f.category),
                name: f.name.clone(),
                address: f.address.clone(),
            })
            .collect();
        self.poi_layer = Some(self.surface.add_poi_layer(&markers));
    }

    /// Removes every overlay.
    pub fn clear_all(&mut self) {
        self.clear_marker();
        self.clear_radius();
        if let Some(old) = self.poi_layer.take() {
            self.surface.remove_layer(old);
        }
    }

    /// Whether a marker is currently drawn.
    #[must_use]
    pub const fn has_marker(&self) -> bool {
        self.marker.is_some()
    }

    /// Whether a POI overlay is currently drawn.
    #[must_use]
    pub const fn has_poi_layer(&self) -> bool {
        self.poi_layer.is_some()
    }
}

/// A [`MapSurface`] that draws nothing. Useful headless and in tests.
pub struct NullMap {
    next_id: u64,
}

impl NullMap {
    /// Creates a surface that swallows every draw call.
    #[must_use]
    pub const fn new() -> Self {
        Self { next_id: 0 }
    }

    fn issue(&mut self) -> LayerId {
        self.next_id += 1;
        LayerId(self.next_id)
    }
}

impl Default for NullMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for NullMap {
    fn place_marker(&mut self, _at: Coordinates, _label: &str) -> LayerId {
        self.issue()
    }

    fn draw_circle(&mut self, _center: Coordinates, _radius_m: f64) -> LayerId {
        self.issue()
    }

    fn add_poi_layer(&mut self, _markers: &[PoiMarker]) -> LayerId {
        self.issue()
    }

    fn remove_layer(&mut self, _id: LayerId) {}

    fn focus(&mut self, _at: Coordinates, _zoom: u8) {}
}
