//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent
//! molecules and their parameterized snapshots in cljff.
//!
//! ## Overview
//!
//! The models module defines the value types the energy engine operates on.
//! A [`molecule::Molecule`] is the caller-facing description of a molecule:
//! rigid coordinate subgroups, named properties (partial charges,
//! Lennard-Jones parameters), and a pair of version counters that distinguish
//! topology/parameter edits from coordinate-only moves. An
//! [`view::MoleculeView`] is the engine-facing snapshot: coordinates and
//! per-atom parameters resolved against an [`selection::AtomSelection`],
//! grouped by subgroup, immutable once built.
//!
//! ## Key Components
//!
//! - [`ids`] - Unique identifier types for molecules, subgroups, and
//!   forcefield groups
//! - [`selection`] - Which atoms of a molecule participate, at per-subgroup
//!   granularity
//! - [`molecule`] - The authoritative molecule description with versioning
//! - [`view`] - Immutable parameterized snapshots and their masking operations

pub mod ids;
pub mod molecule;
pub mod selection;
pub mod view;
