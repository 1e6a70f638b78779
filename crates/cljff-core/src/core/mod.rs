//! # Core Module
//!
//! This module provides the fundamental building blocks for pairwise nonbonded
//! energy evaluation in cljff, serving as the stateless computational core of
//! the library.
//!
//! ## Overview
//!
//! The core module implements the data structures and pure mathematics required
//! to evaluate Coulomb and Lennard-Jones interaction energies between
//! parameterized groups of atoms. Nothing in this layer tracks history or
//! caches totals; everything here is a value type or a pure function over
//! value types, which is what makes the incremental layer above it auditable.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules:
//!
//! - **Molecular Representation** ([`models`]) - Molecule snapshots, atom
//!   selections, and parameterized per-subgroup views
//! - **Geometry Providers** ([`space`]) - Distance computation under open or
//!   periodic boundaries, plus cutoff/switching functions
//! - **Energy Calculations** ([`forcefield`]) - Pair potentials, interaction
//!   kernels, and the group-pair energy evaluator
//!
//! ## Key Capabilities
//!
//! - **Subgroup-granular molecule views** with neutral-parameter masking for
//!   partially selected subgroups
//! - **Pluggable geometry** via the `Space` trait (open boundary or
//!   orthorhombic minimum-image)
//! - **Component-resolved energies** (Coulomb and Lennard-Jones accumulated
//!   separately in one pass)
//! - **Kernel-generic evaluation** so one evaluator serves the Coulomb-only,
//!   LJ-only, and combined forcefields

pub mod forcefield;
pub mod models;
pub mod space;
