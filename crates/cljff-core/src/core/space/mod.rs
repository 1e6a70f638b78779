//! # Space Module
//!
//! Geometry providers for pairwise distance computation, and the smooth
//! cutoff machinery that scales pair energies near the edge of the
//! interaction range.
//!
//! ## Overview
//!
//! All distance mathematics goes through the [`Space`] trait so the energy
//! evaluator is agnostic to boundary conditions: [`Cartesian`] is an open,
//! infinite box; [`Cuboid`] applies the orthorhombic minimum-image
//! convention. A [`DistanceMatrix`] is the reusable buffer of inverse
//! distances filled per group pair, and [`switching`] hosts the
//! distance-to-scale-factor functions applied on top of the raw kernels.

pub mod switching;

use crate::core::models::view::CoordGroup;
use nalgebra::{DMatrix, Point3, Vector3};
use std::fmt;

/// Squared-distance floor. Overlapping atoms are clamped to 1e-6 Angstrom
/// separation so the energy blows up to a large finite value instead of
/// dividing by zero.
const MIN_DISTANCE2: f64 = 1e-12;

/// Reusable buffer of inverse distances between two coordinate groups.
///
/// The buffer is resized (reusing its allocation where possible) and fully
/// overwritten by every `Space::inv_distances` call.
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    inv: DMatrix<f64>,
}

impl DistanceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, rows: usize, cols: usize) {
        self.inv.resize_mut(rows, cols, 0.0);
    }

    pub fn rows(&self) -> usize {
        self.inv.nrows()
    }

    pub fn cols(&self) -> usize {
        self.inv.ncols()
    }

    #[inline]
    pub fn inv_distance(&self, row: usize, col: usize) -> f64 {
        self.inv[(row, col)]
    }

    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, inv_distance: f64) {
        self.inv[(row, col)] = inv_distance;
    }
}

/// Distance computation under a choice of boundary conditions.
///
/// Implementors only have to supply `distance2`; the group-level operations
/// are derived from it. `beyond` is the cheap prefilter: it compares the
/// bounding spheres of two coordinate groups against the cutoff and never
/// looks at individual atoms.
pub trait Space: fmt::Debug + Send + Sync {
    /// Squared distance between two points under these boundary conditions.
    fn distance2(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64;

    fn distance(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        self.distance2(a, b).sqrt()
    }

    /// Whether two groups are certainly farther apart than `cutoff`.
    ///
    /// May return false negatives (the pair loop re-checks through the
    /// switching function), never false positives.
    fn beyond(&self, cutoff: f64, group0: &CoordGroup, group1: &CoordGroup) -> bool {
        if !cutoff.is_finite() {
            return false;
        }
        let reach = cutoff + group0.radius() + group1.radius();
        self.distance2(group0.center(), group1.center()) > reach * reach
    }

    /// Fills `out` with the inverse distance of every atom pair between the
    /// two groups and returns the minimum pair distance.
    fn inv_distances(
        &self,
        group0: &CoordGroup,
        group1: &CoordGroup,
        out: &mut DistanceMatrix,
    ) -> f64 {
        out.reset(group0.len(), group1.len());
        let mut min_dist2 = f64::INFINITY;
        for (i, a) in group0.coords().iter().enumerate() {
            for (j, b) in group1.coords().iter().enumerate() {
                let dist2 = self.distance2(a, b).max(MIN_DISTANCE2);
                min_dist2 = min_dist2.min(dist2);
                out.set(i, j, 1.0 / dist2.sqrt());
            }
        }
        min_dist2.sqrt()
    }
}

/// Open boundary conditions: plain Euclidean distances, no images.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cartesian;

impl Space for Cartesian {
    #[inline]
    fn distance2(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        (a - b).norm_squared()
    }
}

/// Orthorhombic periodic box with the minimum-image convention.
#[derive(Debug, Clone, Copy)]
pub struct Cuboid {
    lengths: Vector3<f64>,
}

impl Cuboid {
    /// Box side lengths in Angstroms. Validation of positivity happens in the
    /// settings builder; a zero or negative length here is a caller bug.
    pub fn new(lx: f64, ly: f64, lz: f64) -> Self {
        Self {
            lengths: Vector3::new(lx, ly, lz),
        }
    }

    pub fn lengths(&self) -> &Vector3<f64> {
        &self.lengths
    }
}

impl Space for Cuboid {
    #[inline]
    fn distance2(&self, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
        let mut delta = a - b;
        for k in 0..3 {
            let l = self.lengths[k];
            delta[k] -= l * (delta[k] / l).round();
        }
        delta.norm_squared()
    }
}
