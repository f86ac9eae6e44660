#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result presentation.
//!
//! [`Presenter::present`] is the single entry point that re-synchronizes
//! the textual result panel, the map overlays, and the nearby-analysis
//! panel with whichever record is currently displayed — a fresh lookup or
//! one replayed from the ledger. Every call is a full replace: the map
//! never holds more than one marker, one walking-radius circle, and one
//! POI overlay, and only the presenter mutates them.

use landscope_map::MapAdapter;
use landscope_models::{AddressPointRecord, NearbyAnalysis, percent_display};

/// Walking radius drawn around a displayed point, in metres.
pub const WALK_RADIUS_M: f64 = 500.0;

/// One collapsible per-category block of the analysis panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisBlock {
    /// Category label (e.g. `餐飲`).
    pub title: String,
    /// Advantage bullet points.
    pub advantages: Vec<String>,
    /// Disadvantage bullet points.
    pub disadvantages: Vec<String>,
    /// Collapsible state; every block starts expanded.
    pub expanded: bool,
}

/// What the analysis panel should display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisView {
    /// No analysis has been attached to the record (yet).
    NotAvailable,
    /// The analysis step failed.
    Failed {
        /// User-facing failure message.
        message: String,
    },
    /// A resolved analysis: category blocks plus the summary.
    Ready {
        /// Per-category blocks, independently collapsible.
        blocks: Vec<AnalysisBlock>,
        /// Free-text summary.
        summary: String,
    },
}

impl AnalysisView {
    fn from_record(analysis: Option<&NearbyAnalysis>) -> Self {
        analysis.map_or(Self::NotAvailable, |a| Self::Ready {
            blocks: a
                .analysis
                .iter()
                .map(|c| AnalysisBlock {
                    title: c.poi_type.clone(),
                    advantages: c.advantages.clone(),
                    disadvantages: c.disadvantages.clone(),
                    expanded: true,
                })
                .collect(),
            summary: a.summary.clone(),
        })
    }
}

/// The textual result panel and the analysis panel.
pub trait ResultPanel: Send + Sync {
    /// Replaces the result panel text.
    fn show_result(&self, lines: &[String]);

    /// Shows a lookup failure in the result panel.
    fn show_error(&self, message: &str);

    /// Shows the distinct "no POIs found nearby" notice.
    fn show_poi_empty(&self);

    /// Replaces the analysis panel.
    fn show_analysis(&self, view: &AnalysisView);
}

/// Pushes a record into the panels and map overlays.
pub struct Presenter {
    map: MapAdapter,
    panel: std::sync::Arc<dyn ResultPanel>,
    walk_radius_m: f64,
}

impl Presenter {
    /// Creates a presenter over `map` and `panel` with the default
    /// walking radius.
    #[must_use]
    pub fn new(map: MapAdapter, panel: std::sync::Arc<dyn ResultPanel>) -> Self {
        Self::with_radius(map, panel, WALK_RADIUS_M)
    }

    /// Same, with an explicit walking radius in metres.
    #[must_use]
    pub const fn with_radius(
        map: MapAdapter,
        panel: std::sync::Arc<dyn ResultPanel>,
        walk_radius_m: f64,
    ) -> Self {
        Self {
            map,
            panel,
            walk_radius_m,
        }
    }

    /// Displays `record`: result panel text, then marker, walking-radius
    /// circle, POI overlay, and finally the analysis panel.
    pub fn present(&mut self, record: &AddressPointRecord) {
        self.panel.show_result(&result_lines(record));

        let coordinates = record.coordinates();
        if coordinates.is_displayable() {
            self.map.show_marker(coordinates, &record.address);
            self.map.show_radius(coordinates, self.walk_radius_m);
        } else {
            // Outside the serviced area: no marker, and any previous
            // point's overlays go away.
            log::debug!("record {:?} has no displayable coordinates", record.address);
            self.map.clear_marker();
            self.map.clear_radius();
        }
        self.map.show_poi(&record.nearby_poi);
        if record.nearby_poi.is_empty() {
            self.panel.show_poi_empty();
        }

        self.panel
            .show_analysis(&AnalysisView::from_record(record.nearby_analysis.as_ref()));
    }

    /// Updates only the analysis panel, for when the analysis resolves
    /// after the record is already displayed.
    pub fn show_analysis(&self, analysis: Option<&NearbyAnalysis>) {
        self.panel.show_analysis(&AnalysisView::from_record(analysis));
    }

    /// Surfaces an analysis failure on the analysis panel.
    pub fn show_analysis_error(&self, message: &str) {
        self.panel.show_analysis(&AnalysisView::Failed {
            message: message.to_string(),
        });
    }

    /// Surfaces a lookup failure in the result panel.
    pub fn show_error(&self, message: &str) {
        self.panel.show_error(message);
    }
}

/// The result panel lines for a record, with sentinel substitution and
/// the `%`-suffix rule applied.
#[must_use]
pub fn result_lines(record: &AddressPointRecord) -> Vec<String> {
    vec![
        record.address.clone(),
        format!("經度：{}", record.lng),
        format!("緯度：{}", record.lat),
        format!("使用分區：{}", record.zoning),
        format!("容積率：{}", percent_display(&record.far)),
        format!("建蔽率：{}", percent_display(&record.bcr)),
        format!("是否為公有地：{}", record.is_public_land),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};

    use landscope_map::{LayerId, MapSurface, PoiMarker};
    use landscope_models::{
        CategoryAnalysis, Coordinates, PoiCategory, PoiCollection, PoiFeature, Zoning,
    };

    use super::*;

    #[derive(Default)]
    struct Shared {
        live_markers: BTreeSet<u64>,
        live_circles: BTreeSet<u64>,
        live_poi_layers: BTreeSet<u64>,
        focused: Vec<(Coordinates, u8)>,
        last_poi_colors: Vec<&'static str>,
    }

    struct FakeSurface {
        next_id: u64,
        shared: Arc<Mutex<Shared>>,
    }

    impl FakeSurface {
        fn new() -> (Self, Arc<Mutex<Shared>>) {
            let shared = Arc::new(Mutex::new(Shared::default()));
            (
                Self {
                    next_id: 0,
                    shared: shared.clone(),
                },
                shared,
            )
        }

        fn issue(&mut self) -> u64 {
            self.next_id += 1;
            self.next_id
        }
    }

    impl MapSurface for FakeSurface {
        fn place_marker(&mut self, _at: Coordinates, _label: &str) -> LayerId {
            let id = self.issue();
            self.shared.lock().unwrap().live_markers.insert(id);
            LayerId(id)
        }

        fn draw_circle(&mut self, _center: Coordinates, _radius_m: f64) -> LayerId {
            let id = self.issue();
            self.shared.lock().unwrap().live_circles.insert(id);
            LayerId(id)
        }

        fn add_poi_layer(&mut self, markers: &[PoiMarker]) -> LayerId {
            let id = self.issue();
            let mut shared = self.shared.lock().unwrap();
            shared.live_poi_layers.insert(id);
            shared.last_poi_colors = markers.iter().map(|m| m.color).collect();
            LayerId(id)
        }

        fn remove_layer(&mut self, id: LayerId) {
            let mut shared = self.shared.lock().unwrap();
            shared.live_markers.remove(&id.0);
            shared.live_circles.remove(&id.0);
            shared.live_poi_layers.remove(&id.0);
        }

        fn focus(&mut self, at: Coordinates, zoom: u8) {
            self.shared.lock().unwrap().focused.push((at, zoom));
        }
    }

    #[derive(Default)]
    struct FakePanel {
        results: Mutex<Vec<Vec<String>>>,
        errors: Mutex<Vec<String>>,
        poi_empty_notices: Mutex<usize>,
        analyses: Mutex<Vec<AnalysisView>>,
    }

    impl ResultPanel for FakePanel {
        fn show_result(&self, lines: &[String]) {
            self.results.lock().unwrap().push(lines.to_vec());
        }

        fn show_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }

        fn show_poi_empty(&self) {
            *self.poi_empty_notices.lock().unwrap() += 1;
        }

        fn show_analysis(&self, view: &AnalysisView) {
            self.analyses.lock().unwrap().push(view.clone());
        }
    }

    fn presenter() -> (Presenter, Arc<Mutex<Shared>>, Arc<FakePanel>) {
        let (surface, shared) = FakeSurface::new();
        let panel = Arc::new(FakePanel::default());
        (
            Presenter::new(MapAdapter::new(Box::new(surface)), panel.clone()),
            shared,
            panel,
        )
    }

    fn in_area_record(address: &str) -> AddressPointRecord {
        AddressPointRecord::from_lookup(
            address.to_string(),
            Coordinates {
                lat: 25.0375,
                lng: 121.5637,
            },
            &Zoning {
                zone: Some("商3".to_string()),
                far: Some(560.0),
                bcr: Some(65.0),
                is_public_land: Some("Y".to_string()),
            },
            PoiCollection {
                features: vec![
                    PoiFeature {
                        category: PoiCategory::Food,
                        name: "餐廳".to_string(),
                        address: "某路1號".to_string(),
                        distance: 80.0,
                        lat: 25.0376,
                        lng: 121.5639,
                    },
                    PoiFeature {
                        category: PoiCategory::Other,
                        name: "其他".to_string(),
                        address: "某路2號".to_string(),
                        distance: 200.0,
                        lat: 25.0379,
                        lng: 121.5641,
                    },
                ],
            },
        )
    }

    fn out_of_area_record() -> AddressPointRecord {
        AddressPointRecord::from_lookup(
            "外縣市某地".to_string(),
            Coordinates { lat: 0.0, lng: 0.0 },
            &Zoning {
                zone: None,
                far: None,
                bcr: None,
                is_public_land: Some("Y".to_string()),
            },
            PoiCollection::empty(),
        )
    }

    #[test]
    fn present_places_one_marker_circle_and_overlay() {
        let (mut presenter, shared, panel) = presenter();
        presenter.present(&in_area_record("台北市信義區市府路1號"));

        let state = shared.lock().unwrap();
        assert_eq!(state.live_markers.len(), 1);
        assert_eq!(state.live_circles.len(), 1);
        assert_eq!(state.live_poi_layers.len(), 1);
        assert_eq!(state.focused.last().unwrap().1, landscope_map::FOCUS_ZOOM);
        assert_eq!(state.last_poi_colors, vec!["lightblue", "black"]);
        drop(state);

        let results = panel.results.lock().unwrap();
        let lines = &results[0];
        assert_eq!(lines[0], "台北市信義區市府路1號");
        assert_eq!(lines[4], "容積率：560%");
        assert_eq!(lines[6], "是否為公有地：是");
    }

    #[test]
    fn repeated_present_replaces_instead_of_accumulating() {
        let (mut presenter, shared, _panel) = presenter();
        presenter.present(&in_area_record("甲"));
        presenter.present(&in_area_record("乙"));
        presenter.present(&in_area_record("丙"));

        let state = shared.lock().unwrap();
        assert_eq!(state.live_markers.len(), 1);
        assert_eq!(state.live_circles.len(), 1);
        assert_eq!(state.live_poi_layers.len(), 1);
    }

    #[test]
    fn out_of_area_record_shows_sentinels_and_no_marker() {
        let (mut presenter, shared, panel) = presenter();
        // A previously displayed record left overlays behind.
        presenter.present(&in_area_record("甲"));
        presenter.present(&out_of_area_record());

        let state = shared.lock().unwrap();
        assert!(state.live_markers.is_empty());
        assert!(state.live_circles.is_empty());
        assert!(state.live_poi_layers.is_empty());
        drop(state);

        let results = panel.results.lock().unwrap();
        let lines = results.last().unwrap();
        assert_eq!(lines[3], "使用分區：無資料");
        assert_eq!(lines[4], "容積率：無資料");
        assert_eq!(lines[5], "建蔽率：無資料");
        // Raw public-land flag was present, but the zone is unknown.
        assert_eq!(lines[6], "是否為公有地：無資料");
        assert_eq!(*panel.poi_empty_notices.lock().unwrap(), 1);
    }

    #[test]
    fn analysis_panel_defaults_to_placeholder() {
        let (mut presenter, _shared, panel) = presenter();
        presenter.present(&in_area_record("甲"));
        assert_eq!(
            panel.analyses.lock().unwrap().as_slice(),
            &[AnalysisView::NotAvailable]
        );
    }

    #[test]
    fn resolved_analysis_renders_expanded_blocks() {
        let (mut presenter, _shared, panel) = presenter();
        let mut record = in_area_record("甲");
        record.nearby_analysis = Some(NearbyAnalysis {
            analysis: vec![CategoryAnalysis {
                poi_type: "餐飲".to_string(),
                advantages: vec!["選擇多".to_string()],
                disadvantages: vec!["夜間吵雜".to_string()],
            }],
            summary: "生活機能佳。".to_string(),
        });
        presenter.present(&record);

        let analyses = panel.analyses.lock().unwrap();
        match analyses.last().unwrap() {
            AnalysisView::Ready { blocks, summary } => {
                assert_eq!(blocks.len(), 1);
                assert_eq!(blocks[0].title, "餐飲");
                assert!(blocks[0].expanded);
                assert_eq!(summary, "生活機能佳。");
            }
            _ => panic!("expected a resolved analysis"),
        }
    }

    #[test]
    fn analysis_failure_reaches_the_analysis_panel() {
        let (presenter, _shared, panel) = presenter();
        presenter.show_analysis_error("server returned status 500");
        assert_eq!(
            panel.analyses.lock().unwrap().as_slice(),
            &[AnalysisView::Failed {
                message: "server returned status 500".to_string()
            }]
        );
    }
}
