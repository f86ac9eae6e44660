#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive terminal client for the landscope zoning lookup service.
//!
//! Drives the full lookup flow (geocode + zoning, nearby POIs, AI
//! analysis) against a landscope-compatible backend, keeps the session's
//! record ledger, and runs multi-record comparisons — all through a
//! `dialoguer` menu loop.
//!
//! Uses `indicatif-log-bridge` (via [`init_logger`]) to route `log`
//! output through `indicatif::MultiProgress` so that log lines and the
//! busy spinner never fight for the terminal.

mod surfaces;

use std::sync::Arc;

use clap::Parser;
use console::style;
use dialoguer::{Input, Select};
use indicatif::MultiProgress;
use landscope_ledger::compare::ComparisonEngine;
use landscope_ledger::ledger::Ledger;
use landscope_lookup::ZoningApi;
use landscope_lookup::http::HttpLookupClient;
use landscope_map::MapAdapter;
use landscope_presenter::{Presenter, WALK_RADIUS_M};
use landscope_progress::ProgressGate;
use landscope_session::{FlowError, LookupFlow, LookupRequest, NullControl};

use crate::surfaces::{DialoguerConfirm, IndicatifSink, TerminalModal, TerminalPanel, TextMap};

/// Terminal client for a landscope-compatible zoning lookup backend.
#[derive(Parser)]
#[command(name = "landscope", version, about)]
struct Args {
    /// Base URL of the backend.
    #[arg(long, env = "LANDSCOPE_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Walking radius drawn around looked-up points, in metres.
    #[arg(long, default_value_t = WALK_RADIUS_M)]
    walk_radius: f64,
}

/// Top-level menu actions.
enum Action {
    SearchAddress,
    SearchCoordinates,
    ShowRecord,
    ToggleSelection,
    SelectAll,
    DeselectAll,
    CompareSelected,
    DeleteRecord,
    ClearAll,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::SearchAddress,
        Self::SearchCoordinates,
        Self::ShowRecord,
        Self::ToggleSelection,
        Self::SelectAll,
        Self::DeselectAll,
        Self::CompareSelected,
        Self::DeleteRecord,
        Self::ClearAll,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::SearchAddress => "查詢地址",
            Self::SearchCoordinates => "查詢座標",
            Self::ShowRecord => "顯示已儲存記錄",
            Self::ToggleSelection => "切換記錄選取",
            Self::SelectAll => "全選",
            Self::DeselectAll => "取消全選",
            Self::CompareSelected => "比較選取記錄",
            Self::DeleteRecord => "刪除記錄",
            Self::ClearAll => "清除全部記錄",
            Self::Quit => "離開",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let multi = init_logger();

    let api: Arc<dyn ZoningApi> = Arc::new(HttpLookupClient::new(&args.api_url));
    let panel = Arc::new(TerminalPanel);
    let modal = Arc::new(TerminalModal::default());
    let progress = Arc::new(ProgressGate::new(Arc::new(IndicatifSink::new(multi))));

    // The menu loop is sequential, so the flow cannot be re-entered and
    // the search control has nothing to disable.
    let flow = LookupFlow::new(api.clone(), progress, Arc::new(NullControl));
    let engine = ComparisonEngine::new(api, modal);
    let mut ledger = Ledger::new(panel.clone());
    let mut presenter = Presenter::with_radius(
        MapAdapter::new(Box::new(TextMap::new())),
        panel,
        args.walk_radius,
    );

    println!("Landscope 土地使用分區查詢");

    loop {
        println!();
        let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();
        let idx = Select::new()
            .with_prompt("操作")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::SearchAddress => {
                let address: String = Input::new()
                    .with_prompt("地址")
                    .allow_empty(true)
                    .interact_text()?;
                run_lookup(
                    &flow,
                    LookupRequest::Address(address),
                    &mut ledger,
                    &mut presenter,
                )
                .await;
            }
            Action::SearchCoordinates => {
                let lat: f64 = Input::new().with_prompt("緯度").interact_text()?;
                let lng: f64 = Input::new().with_prompt("經度").interact_text()?;
                run_lookup(
                    &flow,
                    LookupRequest::CurrentLocation { lat, lng },
                    &mut ledger,
                    &mut presenter,
                )
                .await;
            }
            Action::ShowRecord => {
                if let Some(index) = choose_record(&ledger, "顯示哪一筆記錄？")? {
                    if let Some(record) = ledger.record_at(index) {
                        presenter.present(record);
                    }
                }
            }
            Action::ToggleSelection => {
                if let Some(index) = choose_record(&ledger, "切換哪一筆記錄？")? {
                    if ledger.selected_indices().contains(&index) {
                        ledger.deselect(index);
                    } else {
                        ledger.select(index);
                    }
                }
            }
            Action::SelectAll => ledger.select_all(),
            Action::DeselectAll => ledger.deselect_all(),
            Action::CompareSelected => match engine.compare(ledger.get_selected()).await {
                Ok(()) => {
                    let _: String = Input::new()
                        .with_prompt("按 Enter 關閉比較")
                        .allow_empty(true)
                        .interact_text()?;
                    engine.close_modal();
                }
                Err(err) => println!("{}", style(err.to_string()).red()),
            },
            Action::DeleteRecord => {
                if let Some(index) = choose_record(&ledger, "刪除哪一筆記錄？")? {
                    if let Err(err) = ledger.delete_at(index) {
                        log::error!("delete failed: {err}");
                    }
                }
            }
            Action::ClearAll => {
                ledger.clear_all(&DialoguerConfirm);
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

/// Runs one lookup; network failures have already been surfaced through
/// the presenter, so only validation errors need printing here.
async fn run_lookup(
    flow: &LookupFlow,
    request: LookupRequest,
    ledger: &mut Ledger,
    presenter: &mut Presenter,
) {
    if let Err(err) = flow.run(request, ledger, presenter).await {
        match err {
            FlowError::EmptyAddress => println!("{}", style(err.to_string()).red()),
            FlowError::Lookup(err) => log::debug!("lookup failed: {err}"),
        }
    }
}

/// Picks a ledger record by address, or `None` when the ledger is empty.
fn choose_record(ledger: &Ledger, prompt: &str) -> Result<Option<usize>, dialoguer::Error> {
    if ledger.is_empty() {
        println!("{}", style("尚無記錄").dim());
        return Ok(None);
    }
    let labels: Vec<String> = (0..ledger.len())
        .filter_map(|i| ledger.record_at(i).map(|r| r.address.clone()))
        .collect();
    let index = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Some(index))
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so
/// that `log::info!` and friends are suspended while the spinner redraws.
///
/// Returns the [`MultiProgress`] the spinner must be added to.
#[must_use]
fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    // Build the pretty-env-logger logger manually so we can wrap it.
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set

    log::set_max_level(level);

    multi
}
