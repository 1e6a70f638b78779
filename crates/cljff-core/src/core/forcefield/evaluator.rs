use super::kernel::PairKernel;
use super::params::CljParams;
use super::term::EnergyTerm;
use crate::core::models::view::{CoordGroup, MoleculeView};
use crate::core::space::switching::SwitchingFunction;
use crate::core::space::{DistanceMatrix, Space};
use itertools::iproduct;

/// Stateless pairwise energy evaluator.
///
/// Borrows the kernel, geometry provider, and switching function for the
/// duration of one evaluation pass. All methods are pure: the same inputs
/// always produce the same energy, and nothing here reads or writes
/// forcefield state.
pub struct PairEvaluator<'a, K: PairKernel> {
    kernel: &'a K,
    space: &'a dyn Space,
    switch: &'a dyn SwitchingFunction,
}

impl<'a, K: PairKernel> PairEvaluator<'a, K> {
    pub fn new(kernel: &'a K, space: &'a dyn Space, switch: &'a dyn SwitchingFunction) -> Self {
        Self {
            kernel,
            space,
            switch,
        }
    }

    /// Interaction energy between two parameterized coordinate groups.
    ///
    /// Groups certainly beyond the cutoff short-circuit to zero before any
    /// per-atom distance is computed; otherwise the switching scale is
    /// sampled at the minimum pair distance and multiplies the summed kernel
    /// terms.
    pub fn group_pair_energy(
        &self,
        group0: &CoordGroup,
        params0: &[CljParams],
        group1: &CoordGroup,
        params1: &[CljParams],
        workspace: &mut DistanceMatrix,
    ) -> EnergyTerm {
        if group0.is_empty() || group1.is_empty() {
            return EnergyTerm::default();
        }
        if self.space.beyond(self.switch.cutoff(), group0, group1) {
            return EnergyTerm::default();
        }

        let min_dist = self.space.inv_distances(group0, group1, workspace);
        let scale = self.switch.scale(min_dist);
        if scale == 0.0 {
            return EnergyTerm::default();
        }

        let mut energy = EnergyTerm::default();
        for (i, p0) in params0.iter().enumerate() {
            for (j, p1) in params1.iter().enumerate() {
                energy += self
                    .kernel
                    .pair_energy(p0, p1, workspace.inv_distance(i, j));
            }
        }
        energy * scale
    }

    /// Whole-molecule interaction energy between two views: the sum of
    /// `group_pair_energy` over the Cartesian product of their non-empty
    /// subgroups.
    pub fn view_pair_energy(&self, view0: &MoleculeView, view1: &MoleculeView) -> EnergyTerm {
        let mut workspace = DistanceMatrix::new();

        // single-subgroup molecules are by far the common case
        if view0.n_groups() == 1 && view1.n_groups() == 1 {
            let (g0, p0) = (view0.coord_group(0), view0.param_group(0));
            let (g1, p1) = (view1.coord_group(0), view1.param_group(0));
            let (Ok(g0), Ok(p0), Ok(g1), Ok(p1)) = (g0, p0, g1, p1) else {
                return EnergyTerm::default();
            };
            return self.group_pair_energy(g0, p0, g1, p1, &mut workspace);
        }

        iproduct!(view0.groups(), view1.groups()).fold(
            EnergyTerm::default(),
            |sum, ((g0, p0), (g1, p1))| {
                sum + self.group_pair_energy(g0, p0, g1, p1, &mut workspace)
            },
        )
    }

    /// Energy of one view with itself: every distinct unordered subgroup pair,
    /// plus each subgroup's own upper-triangular atom pairs.
    pub fn view_self_energy(&self, view: &MoleculeView) -> EnergyTerm {
        let mut workspace = DistanceMatrix::new();
        let mut energy = EnergyTerm::default();

        let groups: Vec<_> = view.groups().collect();
        for (i, &(g0, p0)) in groups.iter().enumerate() {
            for &(g1, p1) in groups.iter().skip(i + 1) {
                energy += self.group_pair_energy(g0, p0, g1, p1, &mut workspace);
            }
        }
        for &(group, params) in &groups {
            energy += self.intra_group_energy(group, params);
        }
        energy
    }

    /// Upper-triangular atom pairs within one subgroup. The switching scale
    /// is sampled at the minimum intra-group pair distance, mirroring the
    /// group-pair convention.
    fn intra_group_energy(&self, group: &CoordGroup, params: &[CljParams]) -> EnergyTerm {
        let n = group.len();
        if n < 2 {
            return EnergyTerm::default();
        }

        let coords = group.coords();
        let mut pairs = Vec::with_capacity(n * (n - 1) / 2);
        let mut min_dist2 = f64::INFINITY;
        for i in 0..n {
            for j in (i + 1)..n {
                let dist2 = self.space.distance2(&coords[i], &coords[j]).max(1e-12);
                min_dist2 = min_dist2.min(dist2);
                pairs.push((i, j, 1.0 / dist2.sqrt()));
            }
        }

        let scale = self.switch.scale(min_dist2.sqrt());
        if scale == 0.0 {
            return EnergyTerm::default();
        }

        let mut energy = EnergyTerm::default();
        for (i, j, inv_dist) in pairs {
            energy += self.kernel.pair_energy(&params[i], &params[j], inv_dist);
        }
        energy * scale
    }
}
