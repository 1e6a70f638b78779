//! # cljff Core Library
//!
//! An incremental pairwise nonbonded energy engine (Coulomb + Lennard-Jones)
//! for molecular-simulation forcefields.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict two-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (molecules,
//!   selections, parameterized `MoleculeView` snapshots), geometry providers
//!   (`Space`, switching functions), and the pure forcefield mathematics
//!   (pair potentials, interaction kernels, the pair evaluator).
//!
//! - **[`engine`]: The Logic Core.** This stateful layer owns the incremental
//!   pairwise-energy cache. It tracks mutations as `ChangeRecord`s in a
//!   `ChangeLog`, keeps the authoritative `MoleculeStore`, and recomputes the
//!   total interaction energy either from scratch or through a delta that
//!   touches only changed molecules and their partners. Its `ForceField` type
//!   is the public entry point for end-users of the library.

pub mod core;
pub mod engine;
