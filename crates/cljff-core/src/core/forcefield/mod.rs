//! # Force Field Module
//!
//! Pure energy mathematics for pairwise nonbonded interactions: parameters,
//! potentials, interaction kernels, and the group-pair evaluator.
//!
//! ## Overview
//!
//! Everything in this module is stateless. The single seam between "what
//! physics" and "how it is summed" is the [`kernel::PairKernel`] trait: a
//! kernel turns two per-atom parameter sets and an inverse distance into a
//! component-resolved [`term::EnergyTerm`]. The [`evaluator::PairEvaluator`]
//! owns the summation pattern (cutoff prefilter, distance matrix, switching
//! scale, atom-pair loop) and is generic over the kernel, which is what lets
//! one engine serve the Coulomb-only, LJ-only, and combined forcefields
//! without a type per combination.
//!
//! ## Key Components
//!
//! - [`params`] - Per-atom parameters, dummy values, and LJ combining rules
//! - `potentials` - The raw Coulomb and 12-6 pair functions
//! - [`term`] - Component-resolved energy accumulation
//! - [`kernel`] - The `PairKernel` trait and its three implementations
//! - [`evaluator`] - Group-pair, view-pair, and self-energy summation

pub mod evaluator;
pub mod kernel;
pub mod params;
pub(crate) mod potentials;
pub mod term;

pub use potentials::COULOMB_CONSTANT;
