//! Terminal implementations of the render surfaces.
//!
//! Each capability trait the core crates expose for their UI seams gets a
//! console-backed implementation here: panels print through `console`
//! styling, the busy indicator is an `indicatif` spinner, and the map is
//! reduced to log lines describing what would be drawn.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use landscope_ledger::compare::{CompareModal, CompareTable};
use landscope_ledger::highlight::{FormattedSummary, Sentiment, SummarySegment};
use landscope_ledger::ledger::{ConfirmGuard, RecordListView, RecordRow};
use landscope_map::{LayerId, MapSurface, PoiMarker};
use landscope_models::Coordinates;
use landscope_presenter::{AnalysisView, ResultPanel};
use landscope_progress::ProgressSink;

/// Prints lookup results, the record list, and analysis blocks.
pub struct TerminalPanel;

impl ResultPanel for TerminalPanel {
    fn show_result(&self, lines: &[String]) {
        println!();
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                println!("{}", style(line).bold());
            } else {
                println!("  {line}");
            }
        }
    }

    fn show_error(&self, message: &str) {
        println!("{}", style(message).red());
    }

    fn show_poi_empty(&self) {
        println!("  {}", style("周邊無POI資料").dim());
    }

    fn show_analysis(&self, view: &AnalysisView) {
        match view {
            AnalysisView::NotAvailable => {}
            AnalysisView::Failed { message } => {
                println!("  {}", style(format!("周邊分析失敗：{message}")).red());
            }
            AnalysisView::Ready { blocks, summary } => {
                for block in blocks {
                    println!("  {}", style(&block.title).bold());
                    for advantage in &block.advantages {
                        println!("    {} {advantage}", style("+").green());
                    }
                    for disadvantage in &block.disadvantages {
                        println!("    {} {disadvantage}", style("-").red());
                    }
                }
                println!("  {summary}");
            }
        }
    }
}

impl RecordListView for TerminalPanel {
    fn render(&self, rows: &[RecordRow], compare_enabled: bool) {
        println!();
        println!("{}", style("已儲存記錄").bold());
        for row in rows {
            let mark = if row.selected { "[x]" } else { "[ ]" };
            println!(
                "  {mark} {}. {} | {} | 容積率 {} | 建蔽率 {} | 公有地 {}",
                row.index + 1,
                row.title,
                row.zoning,
                row.far,
                row.bcr,
                row.public_land
            );
        }
        self.set_compare_enabled(compare_enabled);
    }

    fn render_empty(&self) {
        println!("  {}", style("尚無記錄").dim());
    }

    fn set_compare_enabled(&self, enabled: bool) {
        if enabled {
            println!("  {}", style("已選2筆以上，可進行比較").green());
        }
    }
}

/// The comparison "modal": a printed table plus a summary slot keyed by
/// the comparison id, so late responses from superseded comparisons can
/// be told apart and dropped.
#[derive(Default)]
pub struct TerminalModal {
    slot: Mutex<Option<u64>>,
}

impl TerminalModal {
    fn slot(&self) -> std::sync::MutexGuard<'_, Option<u64>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CompareModal for TerminalModal {
    fn open(&self, compare_id: u64, table: &CompareTable) {
        *self.slot() = Some(compare_id);
        println!();
        println!("{}", style("比較結果").bold());
        for (i, column) in table.columns.iter().enumerate() {
            println!("  {}. {column}", i + 1);
        }
        for row in &table.rows {
            println!("  {}：{}", row.label, row.values.join(" / "));
        }
        println!("  {}", style("AI總結產生中…").dim());
    }

    fn resolve_summary(&self, compare_id: u64, summary: &FormattedSummary) -> bool {
        if *self.slot() != Some(compare_id) {
            return false;
        }
        print!("  ");
        for segment in &summary.segments {
            match segment {
                SummarySegment::Text(text) => print!("{text}"),
                SummarySegment::Highlight { text, sentiment } => {
                    let styled = match sentiment {
                        Sentiment::Positive => style(text.as_str()).green().bold(),
                        Sentiment::Negative => style(text.as_str()).red().bold(),
                        Sentiment::Neutral => style(text.as_str()).yellow(),
                    };
                    print!("{styled}");
                }
                SummarySegment::ParagraphBreak => {
                    println!();
                    print!("  ");
                }
            }
        }
        println!();
        true
    }

    fn resolve_error(&self, compare_id: u64, message: &str) -> bool {
        if *self.slot() != Some(compare_id) {
            return false;
        }
        println!("  {}", style(format!("AI總結失敗：{message}")).red());
        true
    }

    fn close(&self) {
        *self.slot() = None;
    }
}

/// Busy indicator rendered as an `indicatif` spinner.
pub struct IndicatifSink {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
}

impl IndicatifSink {
    /// Creates a sink adding its spinner to `multi`.
    #[must_use]
    pub const fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            bar: Mutex::new(None),
        }
    }
}

impl ProgressSink for IndicatifSink {
    fn show(&self) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("查詢中…");
        *self.bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(bar);
    }

    fn hide(&self) {
        if let Some(bar) = self
            .bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            bar.finish_and_clear();
        }
    }
}

/// Headless map: placements become log lines.
pub struct TextMap {
    next_id: u64,
}

impl TextMap {
    /// Creates an empty text map.
    #[must_use]
    pub const fn new() -> Self {
        Self { next_id: 0 }
    }

    fn issue(&mut self) -> LayerId {
        self.next_id += 1;
        LayerId(self.next_id)
    }
}

impl Default for TextMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for TextMap {
    fn place_marker(&mut self, at: Coordinates, label: &str) -> LayerId {
        log::info!("map: marker \"{label}\" at ({}, {})", at.lat, at.lng);
        self.issue()
    }

    fn draw_circle(&mut self, center: Coordinates, radius_m: f64) -> LayerId {
        log::info!(
            "map: {radius_m}m radius around ({}, {})",
            center.lat,
            center.lng
        );
        self.issue()
    }

    fn add_poi_layer(&mut self, markers: &[PoiMarker]) -> LayerId {
        log::info!("map: POI layer with {} markers", markers.len());
        self.issue()
    }

    fn remove_layer(&mut self, id: LayerId) {
        log::trace!("map: removed layer {}", id.0);
    }

    fn focus(&mut self, at: Coordinates, zoom: u8) {
        log::trace!("map: focus ({}, {}) zoom {zoom}", at.lat, at.lng);
    }
}

/// Yes/no confirmation through a `dialoguer` prompt.
pub struct DialoguerConfirm;

impl ConfirmGuard for DialoguerConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
