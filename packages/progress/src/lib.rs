#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reentrant busy-indicator gate.
//!
//! Every async flow brackets its work with [`ProgressGate::show`] /
//! [`ProgressGate::hide`]. The indicator stays visible while any
//! outstanding `show` lacks a matching `hide`, and the final `hide` is
//! deferred to the next whole-second boundary of elapsed visible time so
//! fast responses never produce an imperceptible flash.
//!
//! Rendering is decoupled behind the [`ProgressSink`] trait (an
//! `indicatif` spinner in the CLI, [`NullSink`] in tests).

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Minimum settle delay applied on the final hide even when the elapsed
/// visible time is already past a whole-second boundary.
const MIN_SETTLE: Duration = Duration::from_millis(100);

/// Trait for rendering the busy indicator.
pub trait ProgressSink: Send + Sync {
    /// Make the indicator visible.
    fn show(&self);

    /// Hide the indicator.
    fn hide(&self);
}

/// A no-op [`ProgressSink`] for tests and headless use.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn show(&self) {}
    fn hide(&self) {}
}

struct GateState {
    /// Outstanding `show` calls without a matching `hide`.
    active: u32,
    /// When the indicator last became visible.
    shown_at: Option<Instant>,
    /// Bumped on every `show`; a pending deferred hide aborts if the
    /// epoch moved underneath it.
    epoch: u64,
}

/// Reentrant show/hide gate in front of a [`ProgressSink`].
pub struct ProgressGate {
    sink: Arc<dyn ProgressSink>,
    state: Mutex<GateState>,
}

impl ProgressGate {
    /// Creates a gate rendering through `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            state: Mutex::new(GateState {
                active: 0,
                shown_at: None,
                epoch: 0,
            }),
        }
    }

    /// Registers one outstanding flow; makes the indicator visible if it
    /// was not already. Returns the outstanding count, for tracing.
    pub fn show(&self) -> u32 {
        let mut state = self.lock();
        state.epoch += 1;
        state.active += 1;
        if state.shown_at.is_none() {
            state.shown_at = Some(Instant::now());
            self.sink.show();
        }
        state.active
    }

    /// Releases one outstanding flow. When the last one is released, the
    /// actual hide is deferred to the next whole-second boundary of
    /// elapsed visible time (at least [`MIN_SETTLE`]); a `show` arriving
    /// during the deferral cancels the hide.
    pub async fn hide(&self) {
        let (epoch, delay) = {
            let mut state = self.lock();
            if state.active == 0 {
                return;
            }
            state.active -= 1;
            if state.active > 0 {
                return;
            }
            let elapsed = state
                .shown_at
                .map_or(Duration::ZERO, |shown| shown.elapsed());
            (state.epoch, settle_delay(elapsed))
        };

        tokio::time::sleep(delay).await;

        let mut state = self.lock();
        if state.active == 0 && state.epoch == epoch {
            state.shown_at = None;
            self.sink.hide();
        } else {
            log::trace!("deferred hide cancelled by a newer show");
        }
    }

    /// Forces the indicator hidden regardless of the outstanding count.
    pub fn force_hide(&self) {
        let mut state = self.lock();
        state.active = 0;
        state.epoch += 1;
        if state.shown_at.take().is_some() {
            self.sink.hide();
        }
    }

    /// Whether the indicator is currently visible.
    pub fn is_visible(&self) -> bool {
        self.lock().shown_at.is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// How long the final hide must wait: up to the next whole second of
/// elapsed visible time, never less than [`MIN_SETTLE`].
fn settle_delay(elapsed: Duration) -> Duration {
    let boundary = Duration::from_secs(elapsed.as_secs() + 1);
    (boundary - elapsed).max(MIN_SETTLE)
}
