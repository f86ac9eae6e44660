#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The lookup flow.
//!
//! One lookup runs three strictly sequential, dependent network steps:
//! geocode+zoning, nearby POIs (needs the resolved coordinates), and the
//! AI nearby-analysis (needs the POI results). The search control is
//! disabled and the progress gate held for the entire chain, and both are
//! restored on every exit path — success, transport failure, or early
//! validation return.
//!
//! Re-entrancy is handled by disabling the triggering control for the
//! flow's duration; the ledger itself takes no guard.

use std::sync::Arc;

use landscope_ledger::ledger::Ledger;
use landscope_lookup::{LookupError, LookupQuery, ZoningApi};
use landscope_models::{AddressPointRecord, PoiCollection};
use landscope_presenter::Presenter;
use landscope_progress::ProgressGate;
use thiserror::Error;

/// Errors aborting a lookup flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The address field was empty; nothing was sent.
    #[error("請輸入地址")]
    EmptyAddress,

    /// A network step failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// The control that triggers lookups (the search button), disabled while
/// a flow is running.
pub trait SearchControl: Send + Sync {
    /// Toggles the busy/disabled state.
    fn set_busy(&self, busy: bool);
}

/// A [`SearchControl`] with no visible surface.
pub struct NullControl;

impl SearchControl for NullControl {
    fn set_busy(&self, _busy: bool) {}
}

/// What the user asked to look up.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupRequest {
    /// Free-form address from the search field.
    Address(String),
    /// The device's current position (the geolocate path).
    CurrentLocation {
        /// Latitude.
        lat: f64,
        /// Longitude.
        lng: f64,
    },
}

/// Runs lookup chains against the API, feeding the ledger and presenter.
pub struct LookupFlow {
    api: Arc<dyn ZoningApi>,
    progress: Arc<ProgressGate>,
    control: Arc<dyn SearchControl>,
}

impl LookupFlow {
    /// Creates a flow over the given collaborators.
    pub fn new(
        api: Arc<dyn ZoningApi>,
        progress: Arc<ProgressGate>,
        control: Arc<dyn SearchControl>,
    ) -> Self {
        Self {
            api,
            progress,
            control,
        }
    }

    /// Runs one complete lookup.
    ///
    /// On success the composed record is appended to the ledger and fully
    /// presented. The search control and progress indicator are restored
    /// no matter how the flow exits.
    ///
    /// # Errors
    ///
    /// [`FlowError::EmptyAddress`] before any network call for a blank
    /// address; [`FlowError::Lookup`] when a network step fails.
    pub async fn run(
        &self,
        request: LookupRequest,
        ledger: &mut Ledger,
        presenter: &mut Presenter,
    ) -> Result<(), FlowError> {
        let query = match request {
            LookupRequest::Address(address) => {
                let trimmed = address.trim();
                if trimmed.is_empty() {
                    return Err(FlowError::EmptyAddress);
                }
                LookupQuery::Address(trimmed.to_string())
            }
            LookupRequest::CurrentLocation { lat, lng } => LookupQuery::Coordinates { lat, lng },
        };

        self.control.set_busy(true);
        self.progress.show();

        let result = self.run_chain(&query, ledger, presenter).await;

        // Restored on every exit path.
        self.progress.hide().await;
        self.control.set_busy(false);

        result
    }

    async fn run_chain(
        &self,
        query: &LookupQuery,
        ledger: &mut Ledger,
        presenter: &mut Presenter,
    ) -> Result<(), FlowError> {
        let intersect = match self.api.intersect(query).await {
            Ok(resolved) => resolved,
            Err(err) => {
                presenter.show_error(&err.to_string());
                return Err(err.into());
            }
        };

        let coordinates = intersect.coordinates;
        let mut record = AddressPointRecord::from_lookup(
            intersect.address,
            coordinates,
            &intersect.zoning,
            PoiCollection::empty(),
        );
        // Zoning is on screen before the POI step starts.
        presenter.present(&record);

        let pois = match self.api.nearby_poi(coordinates.lat, coordinates.lng).await {
            Ok(pois) => pois,
            Err(err) => {
                presenter.show_error(&err.to_string());
                return Err(err.into());
            }
        };

        if pois.is_empty() {
            log::info!("no POIs near {}; skipping analysis", record.address);
            presenter.present(&record);
            ledger.add(record);
            return Ok(());
        }

        record.nearby_poi = pois;
        presenter.present(&record);
        ledger.add(record.clone());
        let index = ledger.len() - 1;

        match self.api.nearby_analysis(&record).await {
            Ok(analysis) => {
                presenter.show_analysis(Some(&analysis));
                if let Err(err) = ledger.attach_analysis(index, analysis) {
                    log::error!("failed to attach analysis: {err}");
                }
                Ok(())
            }
            Err(err) => {
                presenter.show_analysis_error(&err.to_string());
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use landscope_ledger::ledger::{RecordListView, RecordRow};
    use landscope_map::{MapAdapter, NullMap};
    use landscope_models::{
        CategoryAnalysis, Coordinates, IntersectResult, NearbyAnalysis, PoiCategory, PoiFeature,
        Zoning,
    };
    use landscope_presenter::{AnalysisView, ResultPanel};
    use landscope_progress::{NullSink, ProgressGate};

    use super::*;

    struct NullView;

    impl RecordListView for NullView {
        fn render(&self, _rows: &[RecordRow], _compare_enabled: bool) {}
        fn render_empty(&self) {}
        fn set_compare_enabled(&self, _enabled: bool) {}
    }

    #[derive(Default)]
    struct RecordingControl {
        transitions: Mutex<Vec<bool>>,
    }

    impl SearchControl for RecordingControl {
        fn set_busy(&self, busy: bool) {
            self.transitions.lock().unwrap().push(busy);
        }
    }

    #[derive(Default)]
    struct RecordingPanel {
        errors: Mutex<Vec<String>>,
        analyses: Mutex<Vec<AnalysisView>>,
    }

    impl ResultPanel for RecordingPanel {
        fn show_result(&self, _lines: &[String]) {}
        fn show_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
        fn show_poi_empty(&self) {}
        fn show_analysis(&self, view: &AnalysisView) {
            self.analyses.lock().unwrap().push(view.clone());
        }
    }

    /// Scripted API that records the call order.
    struct ScriptedApi {
        calls: Mutex<Vec<&'static str>>,
        intersect: Mutex<Option<Result<IntersectResult, LookupError>>>,
        poi: Mutex<Option<Result<PoiCollection, LookupError>>>,
        analysis: Mutex<Option<Result<NearbyAnalysis, LookupError>>>,
    }

    impl ScriptedApi {
        fn new(
            intersect: Result<IntersectResult, LookupError>,
            poi: Result<PoiCollection, LookupError>,
            analysis: Result<NearbyAnalysis, LookupError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                intersect: Mutex::new(Some(intersect)),
                poi: Mutex::new(Some(poi)),
                analysis: Mutex::new(Some(analysis)),
            })
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ZoningApi for ScriptedApi {
        async fn intersect(&self, _query: &LookupQuery) -> Result<IntersectResult, LookupError> {
            self.calls.lock().unwrap().push("intersect");
            self.intersect.lock().unwrap().take().unwrap()
        }

        async fn nearby_poi(&self, _lat: f64, _lng: f64) -> Result<PoiCollection, LookupError> {
            self.calls.lock().unwrap().push("poi");
            self.poi.lock().unwrap().take().unwrap()
        }

        async fn nearby_analysis(
            &self,
            _record: &AddressPointRecord,
        ) -> Result<NearbyAnalysis, LookupError> {
            self.calls.lock().unwrap().push("analysis");
            self.analysis.lock().unwrap().take().unwrap()
        }

        async fn compare_points(
            &self,
            _records: &[AddressPointRecord],
        ) -> Result<String, LookupError> {
            unimplemented!("not part of the lookup flow")
        }
    }

    fn resolved() -> IntersectResult {
        IntersectResult {
            address: "台北市信義區市府路1號".to_string(),
            coordinates: Coordinates {
                lat: 25.0375,
                lng: 121.5637,
            },
            zoning: Zoning {
                zone: Some("商3".to_string()),
                far: Some(560.0),
                bcr: Some(65.0),
                is_public_land: Some("Y".to_string()),
            },
        }
    }

    fn one_poi() -> PoiCollection {
        PoiCollection {
            features: vec![PoiFeature {
                category: PoiCategory::Food,
                name: "餐廳".to_string(),
                address: "某路1號".to_string(),
                distance: 80.0,
                lat: 25.0376,
                lng: 121.5639,
            }],
        }
    }

    fn analysis() -> NearbyAnalysis {
        NearbyAnalysis {
            analysis: vec![CategoryAnalysis {
                poi_type: "餐飲".to_string(),
                advantages: vec!["選擇多".to_string()],
                disadvantages: Vec::new(),
            }],
            summary: "生活機能佳。".to_string(),
        }
    }

    fn status(code: u16) -> LookupError {
        LookupError::Status {
            code,
            message: None,
        }
    }

    struct Harness {
        flow: LookupFlow,
        api: Arc<ScriptedApi>,
        control: Arc<RecordingControl>,
        panel: Arc<RecordingPanel>,
        ledger: Ledger,
        presenter: Presenter,
    }

    fn harness(
        intersect: Result<IntersectResult, LookupError>,
        poi: Result<PoiCollection, LookupError>,
        analysis: Result<NearbyAnalysis, LookupError>,
    ) -> Harness {
        let api = ScriptedApi::new(intersect, poi, analysis);
        let control = Arc::new(RecordingControl::default());
        let panel = Arc::new(RecordingPanel::default());
        Harness {
            flow: LookupFlow::new(
                api.clone(),
                Arc::new(ProgressGate::new(Arc::new(NullSink))),
                control.clone(),
            ),
            api,
            control,
            panel: panel.clone(),
            ledger: Ledger::new(Arc::new(NullView)),
            presenter: Presenter::new(MapAdapter::new(Box::new(NullMap::new())), panel),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_address_aborts_before_any_network_call() {
        let mut h = harness(Ok(resolved()), Ok(one_poi()), Ok(analysis()));
        let err = h
            .flow
            .run(
                LookupRequest::Address("   ".to_string()),
                &mut h.ledger,
                &mut h.presenter,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::EmptyAddress));
        assert!(h.api.calls().is_empty());
        assert!(h.control.transitions.lock().unwrap().is_empty());
        assert!(h.ledger.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn chain_runs_strictly_sequentially_and_attaches_analysis() {
        let mut h = harness(Ok(resolved()), Ok(one_poi()), Ok(analysis()));
        h.flow
            .run(
                LookupRequest::Address("台北市信義區市府路1號".to_string()),
                &mut h.ledger,
                &mut h.presenter,
            )
            .await
            .unwrap();

        assert_eq!(h.api.calls(), vec!["intersect", "poi", "analysis"]);
        assert_eq!(h.ledger.len(), 1);
        let record = h.ledger.record_at(0).unwrap();
        assert_eq!(record.poi_count(), 1);
        assert_eq!(
            record.nearby_analysis.as_ref().unwrap().summary,
            "生活機能佳。"
        );
        assert_eq!(*h.control.transitions.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn coordinate_lookup_skips_address_validation() {
        let mut h = harness(Ok(resolved()), Ok(one_poi()), Ok(analysis()));
        h.flow
            .run(
                LookupRequest::CurrentLocation {
                    lat: 25.0375,
                    lng: 121.5637,
                },
                &mut h.ledger,
                &mut h.presenter,
            )
            .await
            .unwrap();
        assert_eq!(h.ledger.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_pois_skip_analysis_but_complete_the_flow() {
        let mut h = harness(Ok(resolved()), Ok(PoiCollection::empty()), Ok(analysis()));
        h.flow
            .run(
                LookupRequest::Address("郊區某地".to_string()),
                &mut h.ledger,
                &mut h.presenter,
            )
            .await
            .unwrap();

        // Analysis is never requested.
        assert_eq!(h.api.calls(), vec!["intersect", "poi"]);
        let record = h.ledger.record_at(0).unwrap();
        assert!(record.nearby_poi.is_empty());
        assert!(record.nearby_analysis.is_none());
        // The search control is still restored.
        assert_eq!(*h.control.transitions.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn intersect_failure_restores_ui_and_adds_nothing() {
        let mut h = harness(Err(status(500)), Ok(one_poi()), Ok(analysis()));
        let err = h
            .flow
            .run(
                LookupRequest::Address("台北市".to_string()),
                &mut h.ledger,
                &mut h.presenter,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::Lookup(LookupError::Status { code: 500, .. })));
        assert!(h.ledger.is_empty());
        assert_eq!(*h.control.transitions.lock().unwrap(), vec![true, false]);
        assert!(h.panel.errors.lock().unwrap()[0].contains("500"));
    }

    #[tokio::test(start_paused = true)]
    async fn analysis_failure_keeps_the_record() {
        let mut h = harness(Ok(resolved()), Ok(one_poi()), Err(status(502)));
        let err = h
            .flow
            .run(
                LookupRequest::Address("台北市".to_string()),
                &mut h.ledger,
                &mut h.presenter,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::Lookup(_)));
        // The record was already composed and stored; only the analysis
        // is missing.
        assert_eq!(h.ledger.len(), 1);
        assert!(h.ledger.record_at(0).unwrap().nearby_analysis.is_none());
        assert_eq!(*h.control.transitions.lock().unwrap(), vec![true, false]);
        let analyses = h.panel.analyses.lock().unwrap();
        assert!(matches!(
            analyses.last().unwrap(),
            AnalysisView::Failed { .. }
        ));
    }
}
