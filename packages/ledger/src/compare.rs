//! The comparison engine.
//!
//! Each invocation snapshots the selected records, renders the comparison
//! table synchronously into the (single, reused) modal, then fetches the
//! AI summary. Invocations are keyed by a monotonically increasing id;
//! a response whose id has been superseded, or whose modal slot is gone,
//! is discarded silently.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use landscope_lookup::ZoningApi;
use landscope_models::{AddressPointRecord, percent_display};

use crate::CompareError;
use crate::highlight::{self, FormattedSummary};

/// One row of the comparison table: a fixed label plus one value per
/// selected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRow {
    /// Row label (使用分區, 容積率, ...).
    pub label: &'static str,
    /// One value per column, in column order.
    pub values: Vec<String>,
}

/// The synchronously rendered comparison table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareTable {
    /// Column headers: the selected addresses in ascending ledger-index
    /// order.
    pub columns: Vec<String>,
    /// Fixed rows, in order: zoning, FAR, BCR, public land, POI count.
    pub rows: Vec<CompareRow>,
}

impl CompareTable {
    /// Builds the table from a selection snapshot.
    #[must_use]
    pub fn build(selected: &[AddressPointRecord]) -> Self {
        let columns = selected.iter().map(|r| r.address.clone()).collect();
        let row = |label: &'static str, value: fn(&AddressPointRecord) -> String| CompareRow {
            label,
            values: selected.iter().map(value).collect(),
        };
        Self {
            columns,
            rows: vec![
                row("使用分區", |r| r.zoning.clone()),
                row("容積率", |r| percent_display(&r.far)),
                row("建蔽率", |r| percent_display(&r.bcr)),
                row("公有地", |r| r.is_public_land.display().to_string()),
                row("周邊POI數量", |r| r.poi_count().to_string()),
            ],
        }
    }
}

/// The single persistent modal surface receiving comparison output.
///
/// `open` replaces the modal content with a fresh table and a loading
/// slot keyed by `compare_id`; the `resolve_*` calls target that slot and
/// report whether it was still there to receive the result.
pub trait CompareModal: Send + Sync {
    /// Shows the modal with the rendered table and a loading summary slot
    /// keyed by `compare_id`. Reuses the one modal instance; only content
    /// is replaced. Takes the page scroll lock.
    fn open(&self, compare_id: u64, table: &CompareTable);

    /// Replaces the loading slot keyed by `compare_id` with the summary.
    /// Returns `false` when the slot no longer exists (superseded or the
    /// modal is gone), in which case nothing was shown.
    fn resolve_summary(&self, compare_id: u64, summary: &FormattedSummary) -> bool;

    /// Same targeting rule, but renders an error notice.
    fn resolve_error(&self, compare_id: u64, message: &str) -> bool;

    /// Hides the modal and releases the scroll lock. In-flight requests
    /// are not cancelled; their late responses fall to the targeting
    /// rule.
    fn close(&self);
}

/// Runs comparisons over selection snapshots.
pub struct ComparisonEngine {
    api: Arc<dyn ZoningApi>,
    modal: Arc<dyn CompareModal>,
    latest_id: AtomicU64,
}

impl ComparisonEngine {
    /// Creates an engine fetching summaries through `api` and rendering
    /// into `modal`.
    pub fn new(api: Arc<dyn ZoningApi>, modal: Arc<dyn CompareModal>) -> Self {
        Self {
            api,
            modal,
            latest_id: AtomicU64::new(0),
        }
    }

    /// Compares a selection snapshot.
    ///
    /// The table is rendered into the modal before any network wait; the
    /// summary arrives asynchronously and is applied only while this
    /// invocation is still the latest. Later ledger mutations cannot
    /// affect the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::NotEnoughSelected`] synchronously when the
    /// snapshot holds fewer than two records.
    pub async fn compare(&self, selected: Vec<AddressPointRecord>) -> Result<(), CompareError> {
        if selected.len() < 2 {
            return Err(CompareError::NotEnoughSelected {
                selected: selected.len(),
            });
        }

        let compare_id = self.latest_id.fetch_add(1, Ordering::SeqCst) + 1;
        let table = CompareTable::build(&selected);
        self.modal.open(compare_id, &table);

        match self.api.compare_points(&selected).await {
            Ok(summary) => {
                if self.is_current(compare_id) {
                    let formatted = highlight::format_summary(&summary);
                    if !self.modal.resolve_summary(compare_id, &formatted) {
                        log::debug!("comparison {compare_id}: summary slot gone, discarded");
                    }
                } else {
                    log::debug!("comparison {compare_id}: superseded, summary discarded");
                }
            }
            Err(err) => {
                if self.is_current(compare_id) {
                    if !self.modal.resolve_error(compare_id, &err.to_string()) {
                        log::debug!("comparison {compare_id}: error slot gone, discarded");
                    }
                } else {
                    log::debug!("comparison {compare_id}: superseded, failure discarded");
                }
            }
        }
        Ok(())
    }

    /// Hides the modal. Never cancels an in-flight request.
    pub fn close_modal(&self) {
        self.modal.close();
    }

    fn is_current(&self, compare_id: u64) -> bool {
        self.latest_id.load(Ordering::SeqCst) == compare_id
    }
}
