use super::ids::SubgroupId;
use std::collections::BTreeSet;

/// Which atoms of a molecule participate in a forcefield, at per-subgroup
/// granularity.
///
/// A selection always carries the full shape of its molecule (one flag slot
/// per atom of every subgroup), so deselecting atoms never loses the
/// information of how many atoms the subgroup has. This is what lets a
/// partially selected subgroup keep its full coordinate block while the
/// unselected atoms are neutralized at parameterization time.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomSelection {
    flags: Vec<Vec<bool>>,
    n_selected: usize,
}

impl AtomSelection {
    /// Selects every atom of a molecule with the given per-subgroup atom counts.
    pub fn select_all(shape: &[usize]) -> Self {
        let flags: Vec<Vec<bool>> = shape.iter().map(|&n| vec![true; n]).collect();
        let n_selected = shape.iter().sum();
        Self { flags, n_selected }
    }

    /// Selects no atoms, keeping the molecule's shape.
    pub fn select_none(shape: &[usize]) -> Self {
        let flags: Vec<Vec<bool>> = shape.iter().map(|&n| vec![false; n]).collect();
        Self {
            flags,
            n_selected: 0,
        }
    }

    /// Builds a selection from explicit per-subgroup flags.
    pub fn from_flags(flags: Vec<Vec<bool>>) -> Self {
        let n_selected = flags.iter().flatten().filter(|&&f| f).count();
        Self { flags, n_selected }
    }

    pub fn n_subgroups(&self) -> usize {
        self.flags.len()
    }

    /// Per-subgroup atom counts of the underlying molecule.
    pub fn shape(&self) -> Vec<usize> {
        self.flags.iter().map(Vec::len).collect()
    }

    pub fn n_atoms(&self, subgroup: SubgroupId) -> Option<usize> {
        self.flags.get(subgroup.index()).map(Vec::len)
    }

    pub fn n_selected(&self) -> usize {
        self.n_selected
    }

    /// Whether every atom of every subgroup is selected.
    pub fn selected_all(&self) -> bool {
        self.n_selected == self.flags.iter().map(Vec::len).sum()
    }

    /// Whether no atom is selected.
    pub fn selected_none(&self) -> bool {
        self.n_selected == 0
    }

    pub fn n_selected_in(&self, subgroup: SubgroupId) -> usize {
        self.flags
            .get(subgroup.index())
            .map_or(0, |sub| sub.iter().filter(|&&f| f).count())
    }

    pub fn selected_all_in(&self, subgroup: SubgroupId) -> bool {
        self.flags
            .get(subgroup.index())
            .is_some_and(|sub| sub.iter().all(|&f| f))
    }

    pub fn is_selected(&self, subgroup: SubgroupId, atom: usize) -> bool {
        self.flags
            .get(subgroup.index())
            .and_then(|sub| sub.get(atom))
            .copied()
            .unwrap_or(false)
    }

    /// Ids of the subgroups with at least one selected atom.
    pub fn selected_subgroups(&self) -> BTreeSet<SubgroupId> {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, sub)| sub.iter().any(|&f| f))
            .map(|(i, _)| SubgroupId(i as u32))
            .collect()
    }

    pub fn deselect_subgroup(&mut self, subgroup: SubgroupId) {
        if let Some(sub) = self.flags.get_mut(subgroup.index()) {
            self.n_selected -= sub.iter().filter(|&&f| f).count();
            sub.fill(false);
        }
    }

    /// Re-derives the selection restricted to `subset`: every subgroup outside
    /// the set is wholly deselected, subgroups inside keep their flags. This is
    /// the masking operation used to build the "changed parts" of a change
    /// record.
    pub fn retain_subgroups(&self, subset: &BTreeSet<SubgroupId>) -> Self {
        let mut masked = self.clone();
        for i in 0..masked.n_subgroups() {
            let id = SubgroupId(i as u32);
            if !subset.contains(&id) {
                masked.deselect_subgroup(id);
            }
        }
        masked
    }

    /// Whether this selection describes a molecule of the same shape.
    pub fn shape_matches(&self, shape: &[usize]) -> bool {
        self.flags.len() == shape.len()
            && self.flags.iter().zip(shape).all(|(sub, &n)| sub.len() == n)
    }
}
