#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The address point ledger and comparison engine.
//!
//! [`ledger::Ledger`] owns the ordered collection of completed lookups
//! for the session and the selection set used for multi-way comparison.
//! Records have no stable identifier: position is identity, and every
//! deletion re-maps the selection indices so they keep pointing at the
//! same logical records.
//!
//! [`compare::ComparisonEngine`] turns a selection snapshot into a
//! comparison table plus an asynchronously fetched AI summary, guarding
//! against stale responses from superseded comparisons with a monotonic
//! request id.

pub mod compare;
pub mod highlight;
pub mod ledger;

use thiserror::Error;

/// Errors from ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A record index was out of bounds.
    #[error("record index {index} out of bounds (ledger holds {len})")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Current ledger length.
        len: usize,
    },
}

/// Errors from comparison invocations.
#[derive(Debug, Error)]
pub enum CompareError {
    /// Fewer than two records were selected.
    #[error("at least two records must be selected to compare ({selected} selected)")]
    NotEnoughSelected {
        /// How many were selected.
        selected: usize,
    },
}
