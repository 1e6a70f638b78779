//! # Engine Module
//!
//! This module implements the stateful incremental layer of cljff: the
//! pairwise-energy cache that tracks exactly what changed between energy
//! evaluations and recomputes the total either from scratch or through a
//! delta that avoids the O(n²) pass.
//!
//! ## Overview
//!
//! Every mutation (`add`, `change`, `remove`) produces a [`record::ChangeRecord`]
//! by diffing the stored [`crate::core::models::view::MoleculeView`] against a
//! freshly built one. The record updates the authoritative [`store::MoleculeStore`]
//! immediately and is merged into the [`log::ChangeLog`]; the log's entries are
//! what the delta algorithm walks at the next energy query. A successful
//! evaluation commits by clearing the log atomically.
//!
//! ## Architecture
//!
//! - **Change Tracking** ([`record`], [`log`]) - Whole-molecule and
//!   changed-parts diffs, round-trip pruning, removal bookkeeping
//! - **State** ([`store`]) - The current set of molecule views per group
//! - **Recompute Control** ([`forcefield`]) - Full vs. delta evaluation for
//!   single-group and two-group topologies, commit semantics
//! - **Configuration** ([`config`]) - Validated settings with TOML loading
//! - **Error Handling** ([`error`]) - The typed error taxonomy; a failed
//!   mutation leaves store and log untouched

pub mod config;
pub mod error;
pub mod forcefield;
pub mod log;
pub mod record;
pub mod store;
