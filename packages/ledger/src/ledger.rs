//! The ordered collection of completed lookups and its selection set.

use std::collections::BTreeSet;
use std::sync::Arc;

use landscope_models::{AddressPointRecord, NearbyAnalysis, percent_display};

use crate::LedgerError;

/// One row of the rendered record list.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRow {
    /// Position in the ledger (identity).
    pub index: usize,
    /// Whether the row is in the selection set.
    pub selected: bool,
    /// Record address (row title).
    pub title: String,
    /// Zone name or sentinel.
    pub zoning: String,
    /// Floor-area ratio, `%`-suffixed unless it is the sentinel.
    pub far: String,
    /// Building coverage ratio, `%`-suffixed unless it is the sentinel.
    pub bcr: String,
    /// Public-land display value.
    pub public_land: String,
}

/// Render surface for the record list.
///
/// The ledger pushes a full row model on structural changes and only the
/// compare-button enablement on pure selection changes.
pub trait RecordListView: Send + Sync {
    /// Renders the full list. `compare_enabled` reflects the ≥2 rule.
    fn render(&self, rows: &[RecordRow], compare_enabled: bool);

    /// Renders the "no records yet" placeholder; compare is forced
    /// disabled.
    fn render_empty(&self);

    /// Updates only the compare-control enablement.
    fn set_compare_enabled(&self, enabled: bool);
}

/// Blocking yes/no confirmation, answered by the user.
pub trait ConfirmGuard {
    /// Asks the question; `true` means proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// The session's ordered collection of [`AddressPointRecord`]s plus the
/// selection set used for comparison.
pub struct Ledger {
    records: Vec<AddressPointRecord>,
    selected: BTreeSet<usize>,
    view: Arc<dyn RecordListView>,
}

impl Ledger {
    /// Creates an empty ledger rendering through `view`.
    pub fn new(view: Arc<dyn RecordListView>) -> Self {
        let ledger = Self {
            records: Vec::new(),
            selected: BTreeSet::new(),
            view,
        };
        ledger.render();
        ledger
    }

    /// Number of records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a completed lookup. Duplicates are allowed; there is no
    /// identity check across records.
    pub fn add(&mut self, record: AddressPointRecord) {
        self.records.push(record);
        self.render();
    }

    /// Attaches the asynchronously resolved analysis to an existing
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IndexOutOfBounds`] for an invalid index.
    pub fn attach_analysis(
        &mut self,
        index: usize,
        analysis: NearbyAnalysis,
    ) -> Result<(), LedgerError> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(LedgerError::IndexOutOfBounds { index, len })?;
        record.nearby_analysis = Some(analysis);
        Ok(())
    }

    /// Deletes the record at `index`, re-mapping the selection set: the
    /// deleted index is dropped, every selected index above it shifts
    /// down by one.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::IndexOutOfBounds`] for an invalid index.
    pub fn delete_at(&mut self, index: usize) -> Result<(), LedgerError> {
        if index >= self.records.len() {
            return Err(LedgerError::IndexOutOfBounds {
                index,
                len: self.records.len(),
            });
        }
        self.records.remove(index);
        self.selected = self
            .selected
            .iter()
            .filter_map(|&i| match i.cmp(&index) {
                std::cmp::Ordering::Less => Some(i),
                std::cmp::Ordering::Equal => None,
                std::cmp::Ordering::Greater => Some(i - 1),
            })
            .collect();
        self.render();
        Ok(())
    }

    /// Adds `index` to the selection set. No-op when already selected or
    /// out of bounds. Only the compare enablement is re-rendered.
    pub fn select(&mut self, index: usize) {
        if index >= self.records.len() {
            log::warn!("ignoring selection of missing record {index}");
            return;
        }
        if self.selected.insert(index) {
            self.view.set_compare_enabled(self.compare_enabled());
        }
    }

    /// Removes `index` from the selection set. No-op when not selected.
    pub fn deselect(&mut self, index: usize) {
        if self.selected.remove(&index) {
            self.view.set_compare_enabled(self.compare_enabled());
        }
    }

    /// Selects every record.
    pub fn select_all(&mut self) {
        self.selected = (0..self.records.len()).collect();
        self.render();
    }

    /// Empties the selection set.
    pub fn deselect_all(&mut self) {
        self.selected.clear();
        self.render();
    }

    /// Clears every record and the selection set, after confirmation.
    /// Returns whether anything was cleared. An empty ledger is a no-op
    /// that never prompts.
    pub fn clear_all(&mut self, confirm: &dyn ConfirmGuard) -> bool {
        if self.records.is_empty() {
            return false;
        }
        if !confirm.confirm("確定要清除全部記錄嗎？") {
            return false;
        }
        self.records.clear();
        self.selected.clear();
        self.render();
        true
    }

    /// The record at `index`, for replaying through the presenter.
    /// Reading a record never changes selection state.
    #[must_use]
    pub fn record_at(&self, index: usize) -> Option<&AddressPointRecord> {
        self.records.get(index)
    }

    /// Snapshot of the selected records in ascending index order,
    /// regardless of the order they were selected in.
    #[must_use]
    pub fn get_selected(&self) -> Vec<AddressPointRecord> {
        self.selected
            .iter()
            .filter_map(|&i| self.records.get(i).cloned())
            .collect()
    }

    /// The selected indices in ascending order.
    #[must_use]
    pub fn selected_indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Comparison requires at least two selected records.
    #[must_use]
    pub fn compare_enabled(&self) -> bool {
        self.selected.len() >= 2
    }

    fn render(&self) {
        if self.records.is_empty() {
            self.view.render_empty();
            return;
        }
        let rows: Vec<RecordRow> = self
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| RecordRow {
                index,
                selected: self.selected.contains(&index),
                title: record.address.clone(),
                zoning: record.zoning.clone(),
                far: percent_display(&record.far),
                bcr: percent_display(&record.bcr),
                public_land: record.is_public_land.display().to_string(),
            })
            .collect();
        self.view.render(&rows, self.compare_enabled());
    }
}
