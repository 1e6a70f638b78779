use super::params::{CljParams, CombiningRule, ParamRequirements};
use super::potentials;
use super::term::EnergyTerm;
use std::fmt;

/// A pairwise interaction kernel: two per-atom parameter sets and an inverse
/// distance in, a component-resolved energy out.
///
/// The kernel is the only seam between the physics and the summation
/// machinery; everything else (cutoff prefilter, switching scale, delta
/// bookkeeping) is generic over it.
pub trait PairKernel: fmt::Debug + Clone + Send + Sync {
    /// Which molecule properties views built for this kernel must resolve.
    const REQUIRES: ParamRequirements;

    fn pair_energy(&self, p0: &CljParams, p1: &CljParams, inv_dist: f64) -> EnergyTerm;
}

/// Charge-charge interactions only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoulombKernel {
    pub dielectric: f64,
}

impl CoulombKernel {
    pub fn new(dielectric: f64) -> Self {
        Self { dielectric }
    }
}

impl Default for CoulombKernel {
    fn default() -> Self {
        Self { dielectric: 1.0 }
    }
}

impl PairKernel for CoulombKernel {
    const REQUIRES: ParamRequirements = ParamRequirements {
        charges: true,
        lj: false,
    };

    #[inline]
    fn pair_energy(&self, p0: &CljParams, p1: &CljParams, inv_dist: f64) -> EnergyTerm {
        EnergyTerm {
            coulomb: potentials::coulomb(inv_dist, p0.charge, p1.charge, self.dielectric),
            lj: 0.0,
        }
    }
}

/// Lennard-Jones 12-6 interactions only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LjKernel {
    pub rule: CombiningRule,
}

impl LjKernel {
    pub fn new(rule: CombiningRule) -> Self {
        Self { rule }
    }
}

impl PairKernel for LjKernel {
    const REQUIRES: ParamRequirements = ParamRequirements {
        charges: false,
        lj: true,
    };

    #[inline]
    fn pair_energy(&self, p0: &CljParams, p1: &CljParams, inv_dist: f64) -> EnergyTerm {
        let well = self.rule.combine(&p0.lj, &p1.lj);
        EnergyTerm {
            coulomb: 0.0,
            lj: potentials::lennard_jones_12_6(inv_dist, well.sigma, well.epsilon),
        }
    }
}

/// Combined Coulomb + Lennard-Jones in a single pass over the pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CljKernel {
    pub dielectric: f64,
    pub rule: CombiningRule,
}

impl CljKernel {
    pub fn new(dielectric: f64, rule: CombiningRule) -> Self {
        Self { dielectric, rule }
    }
}

impl Default for CljKernel {
    fn default() -> Self {
        Self {
            dielectric: 1.0,
            rule: CombiningRule::default(),
        }
    }
}

impl PairKernel for CljKernel {
    const REQUIRES: ParamRequirements = ParamRequirements {
        charges: true,
        lj: true,
    };

    #[inline]
    fn pair_energy(&self, p0: &CljParams, p1: &CljParams, inv_dist: f64) -> EnergyTerm {
        let well = self.rule.combine(&p0.lj, &p1.lj);
        EnergyTerm {
            coulomb: potentials::coulomb(inv_dist, p0.charge, p1.charge, self.dielectric),
            lj: potentials::lennard_jones_12_6(inv_dist, well.sigma, well.epsilon),
        }
    }
}
