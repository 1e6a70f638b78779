use serde::Deserialize;
use std::str::FromStr;

/// Lennard-Jones parameters of a single atom, in the sigma/epsilon form.
///
/// `sigma` is the zero-crossing distance in Angstroms, `epsilon` the well
/// depth in kcal/mol. An all-zero pair is the neutral ("dummy") parameter:
/// it contributes exactly nothing to any pair term, which is how unselected
/// atoms inside a partially selected subgroup are silenced without being
/// removed from the coordinate block.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LjParams {
    pub sigma: f64,
    pub epsilon: f64,
}

impl LjParams {
    pub fn new(sigma: f64, epsilon: f64) -> Self {
        Self { sigma, epsilon }
    }

    pub fn zero() -> Self {
        Self {
            sigma: 0.0,
            epsilon: 0.0,
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.sigma == 0.0 && self.epsilon == 0.0
    }
}

/// Combined per-atom nonbonded parameters: partial charge plus LJ well.
///
/// Every view stores one of these per atom regardless of which kernel the
/// forcefield runs; a Coulomb-only forcefield simply leaves the LJ half at
/// zero and vice versa.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CljParams {
    /// Partial charge in elementary charge units.
    pub charge: f64,
    pub lj: LjParams,
}

impl CljParams {
    pub fn new(charge: f64, lj: LjParams) -> Self {
        Self { charge, lj }
    }

    /// The neutral parameter carried by unselected atoms.
    pub fn dummy() -> Self {
        Self {
            charge: 0.0,
            lj: LjParams::zero(),
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.charge == 0.0 && self.lj.is_dummy()
    }
}

/// How the LJ parameters of two unlike atoms are combined into a pair well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombiningRule {
    /// Lorentz-Berthelot: arithmetic mean of sigmas, geometric mean of epsilons.
    #[default]
    Arithmetic,
    /// Geometric mean of both sigmas and epsilons.
    Geometric,
}

impl CombiningRule {
    pub fn combine(&self, a: &LjParams, b: &LjParams) -> LjParams {
        if a == b {
            return *a;
        }
        match self {
            CombiningRule::Arithmetic => LjParams {
                sigma: 0.5 * (a.sigma + b.sigma),
                epsilon: (a.epsilon * b.epsilon).sqrt(),
            },
            CombiningRule::Geometric => LjParams {
                sigma: (a.sigma * b.sigma).sqrt(),
                epsilon: (a.epsilon * b.epsilon).sqrt(),
            },
        }
    }
}

impl FromStr for CombiningRule {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arithmetic" | "lorentz-berthelot" => Ok(CombiningRule::Arithmetic),
            "geometric" => Ok(CombiningRule::Geometric),
            _ => Err(()),
        }
    }
}

/// Which parameter kinds a kernel consumes.
///
/// View construction fetches only the properties a kernel needs: a missing
/// charge property is an error for a Coulomb forcefield but irrelevant to a
/// pure LJ one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRequirements {
    pub charges: bool,
    pub lj: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn dummy_params_are_recognized() {
        assert!(CljParams::dummy().is_dummy());
        assert!(LjParams::zero().is_dummy());
        assert!(!CljParams::new(0.1, LjParams::zero()).is_dummy());
        assert!(!LjParams::new(3.4, 0.0).is_dummy());
    }

    #[test]
    fn arithmetic_rule_averages_sigma_and_takes_geometric_epsilon() {
        let a = LjParams::new(3.0, 0.1);
        let b = LjParams::new(4.0, 0.4);
        let c = CombiningRule::Arithmetic.combine(&a, &b);
        assert!((c.sigma - 3.5).abs() < TOLERANCE);
        assert!((c.epsilon - 0.2).abs() < TOLERANCE);
    }

    #[test]
    fn geometric_rule_takes_geometric_means_of_both() {
        let a = LjParams::new(2.0, 0.1);
        let b = LjParams::new(8.0, 0.4);
        let c = CombiningRule::Geometric.combine(&a, &b);
        assert!((c.sigma - 4.0).abs() < TOLERANCE);
        assert!((c.epsilon - 0.2).abs() < TOLERANCE);
    }

    #[test]
    fn combining_identical_params_is_exact() {
        let a = LjParams::new(3.15, 0.152);
        let c = CombiningRule::Geometric.combine(&a, &a);
        assert_eq!(c, a);
    }

    #[test]
    fn combining_with_a_dummy_kills_the_well_depth() {
        let a = LjParams::new(3.0, 0.5);
        let c = CombiningRule::Arithmetic.combine(&a, &LjParams::zero());
        assert_eq!(c.epsilon, 0.0);
    }

    #[test]
    fn combining_rule_parses_from_known_names() {
        assert_eq!(
            CombiningRule::from_str("arithmetic"),
            Ok(CombiningRule::Arithmetic)
        );
        assert_eq!(
            CombiningRule::from_str("Lorentz-Berthelot"),
            Ok(CombiningRule::Arithmetic)
        );
        assert_eq!(
            CombiningRule::from_str("GEOMETRIC"),
            Ok(CombiningRule::Geometric)
        );
        assert_eq!(CombiningRule::from_str("cubic"), Err(()));
    }
}
