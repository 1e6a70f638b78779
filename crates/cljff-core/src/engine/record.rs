use super::error::FfError;
use crate::core::models::ids::{MoleculeId, SubgroupId};
use crate::core::models::view::MoleculeView;
use std::collections::BTreeSet;

/// A diff between two snapshots of the same molecule identity.
///
/// `old` and `new` are the whole-molecule views before and after the change;
/// `old_parts`/`new_parts` are the minimal restriction to the subgroups that
/// actually differ. The invariant tying them together: `changed_subgroups`
/// is empty exactly when the whole molecule changed, in which case the parts
/// views are the full views. Keeping the whole-molecule case as an empty set
/// makes the "changed everything" test a cheap emptiness check downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    old: MoleculeView,
    new: MoleculeView,
    old_parts: MoleculeView,
    new_parts: MoleculeView,
    changed_subgroups: BTreeSet<SubgroupId>,
}

impl ChangeRecord {
    /// Diffs two views of one molecule.
    ///
    /// Returns `Ok(None)` when nothing changed (same versions, selection, and
    /// parameter source). `touched` restricts the diff to the named
    /// subgroups; `None` means the whole molecule changed. A touched set that
    /// covers every subgroup collapses to the whole-molecule form.
    pub fn diff(
        old: MoleculeView,
        new: MoleculeView,
        touched: Option<&BTreeSet<SubgroupId>>,
    ) -> Result<Option<Self>, FfError> {
        if old.id() != new.id() {
            return Err(FfError::IncompatibleMolecule {
                id: old.id(),
                reason: format!("cannot diff against a view of {}", new.id()),
            });
        }

        if old.major_version() == new.major_version()
            && old.minor_version() == new.minor_version()
            && old.selection() == new.selection()
            && old.param_source() == new.param_source()
        {
            return Ok(None);
        }

        let record = match touched {
            Some(set) if !covers_all_subgroups(&old, set) => Self {
                old_parts: old.mask(set),
                new_parts: new.mask(set),
                changed_subgroups: set.clone(),
                old,
                new,
            },
            _ => Self {
                old_parts: old.clone(),
                new_parts: new.clone(),
                changed_subgroups: BTreeSet::new(),
                old,
                new,
            },
        };
        Ok(Some(record))
    }

    /// Chains this record with a `later` one for the same molecule,
    /// producing the net record relative to this record's `old` state.
    ///
    /// Returns `None` when the molecule has round-tripped back to the
    /// earlier `old` state, which is the signal to prune the log entry.
    pub fn merge(&self, later: &ChangeRecord) -> Option<ChangeRecord> {
        debug_assert_eq!(self.id(), later.id());

        if later.new == self.old || (later.new.is_empty() && self.old.is_empty()) {
            return None;
        }

        if self.changed_all() || later.changed_all() {
            return Some(ChangeRecord {
                old: self.old.clone(),
                new: later.new.clone(),
                old_parts: self.old.clone(),
                new_parts: later.new.clone(),
                changed_subgroups: BTreeSet::new(),
            });
        }

        let union: BTreeSet<SubgroupId> = self
            .changed_subgroups
            .union(&later.changed_subgroups)
            .copied()
            .collect();
        if covers_all_subgroups(&self.old, &union) {
            return Some(ChangeRecord {
                old: self.old.clone(),
                new: later.new.clone(),
                old_parts: self.old.clone(),
                new_parts: later.new.clone(),
                changed_subgroups: BTreeSet::new(),
            });
        }

        Some(ChangeRecord {
            old_parts: self.old.mask(&union),
            new_parts: later.new.mask(&union),
            changed_subgroups: union,
            old: self.old.clone(),
            new: later.new.clone(),
        })
    }

    pub fn id(&self) -> MoleculeId {
        self.old.id()
    }

    pub fn old(&self) -> &MoleculeView {
        &self.old
    }

    pub fn new(&self) -> &MoleculeView {
        &self.new
    }

    pub fn old_parts(&self) -> &MoleculeView {
        &self.old_parts
    }

    pub fn new_parts(&self) -> &MoleculeView {
        &self.new_parts
    }

    pub fn changed_subgroups(&self) -> &BTreeSet<SubgroupId> {
        &self.changed_subgroups
    }

    /// Whether the whole molecule changed.
    pub fn changed_all(&self) -> bool {
        self.changed_subgroups.is_empty()
    }

    /// Whether the net effect is the molecule leaving the forcefield.
    pub fn is_removal(&self) -> bool {
        self.new.is_empty() && !self.old.is_empty()
    }

    /// Whether the net effect is the molecule entering the forcefield.
    pub fn is_addition(&self) -> bool {
        self.old.is_empty() && !self.new.is_empty()
    }
}

fn covers_all_subgroups(view: &MoleculeView, set: &BTreeSet<SubgroupId>) -> bool {
    (0..view.selection().n_subgroups()).all(|i| set.contains(&SubgroupId(i as u32)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::kernel::{CljKernel, PairKernel};
    use crate::core::forcefield::params::LjParams;
    use crate::core::models::molecule::{Molecule, Property};
    use crate::core::models::selection::AtomSelection;
    use crate::core::models::view::ParameterMap;
    use nalgebra::{Point3, Vector3};

    fn two_group_molecule(id: u64) -> Molecule {
        let mut mol = Molecule::new(
            MoleculeId(id),
            vec![
                vec![Point3::new(0.0, 0.0, 0.0)],
                vec![Point3::new(3.0, 0.0, 0.0)],
            ],
        );
        mol.set_property("charges", Property::Charges(vec![vec![0.4], vec![-0.4]]));
        mol.set_property(
            "lj",
            Property::LennardJones(vec![vec![LjParams::new(3.0, 0.1)]; 2]),
        );
        mol
    }

    fn view_of(mol: &Molecule) -> MoleculeView {
        let sel = AtomSelection::select_all(&mol.shape());
        MoleculeView::build(mol, &sel, &ParameterMap::default(), CljKernel::REQUIRES).unwrap()
    }

    #[test]
    fn diff_of_identical_views_is_empty() {
        let mol = two_group_molecule(1);
        let view = view_of(&mol);
        let record = ChangeRecord::diff(view.clone(), view, None).unwrap();
        assert!(record.is_none());
    }

    #[test]
    fn diff_across_identities_is_rejected() {
        let old = view_of(&two_group_molecule(1));
        let new = view_of(&two_group_molecule(2));
        let result = ChangeRecord::diff(old, new, None);
        assert!(matches!(
            result,
            Err(FfError::IncompatibleMolecule { id, .. }) if id == MoleculeId(1)
        ));
    }

    #[test]
    fn whole_molecule_diff_has_full_parts_and_empty_set() {
        let mut mol = two_group_molecule(1);
        let old = view_of(&mol);
        mol.translate(&Vector3::new(1.0, 0.0, 0.0));
        let new = view_of(&mol);

        let record = ChangeRecord::diff(old.clone(), new.clone(), None)
            .unwrap()
            .unwrap();
        assert!(record.changed_all());
        assert_eq!(record.old_parts(), &old);
        assert_eq!(record.new_parts(), &new);
    }

    #[test]
    fn partial_diff_masks_the_parts_to_the_touched_subgroups() {
        let mut mol = two_group_molecule(1);
        let old = view_of(&mol);
        mol.translate_subgroup(SubgroupId(1), &Vector3::new(0.5, 0.0, 0.0));
        let new = view_of(&mol);

        let touched = BTreeSet::from([SubgroupId(1)]);
        let record = ChangeRecord::diff(old, new, Some(&touched)).unwrap().unwrap();

        assert!(!record.changed_all());
        assert_eq!(record.changed_subgroups(), &touched);
        assert_eq!(record.old_parts().n_groups(), 1);
        assert_eq!(record.new_parts().n_groups(), 1);
        assert_eq!(record.old_parts().subgroup_ids(), &[SubgroupId(1)]);
    }

    #[test]
    fn touched_set_covering_everything_collapses_to_the_full_form() {
        let mut mol = two_group_molecule(1);
        let old = view_of(&mol);
        mol.translate(&Vector3::new(0.5, 0.0, 0.0));
        let new = view_of(&mol);

        let touched = BTreeSet::from([SubgroupId(0), SubgroupId(1)]);
        let record = ChangeRecord::diff(old, new, Some(&touched)).unwrap().unwrap();
        assert!(record.changed_all());
    }

    #[test]
    fn removal_and_addition_are_recognized() {
        let mol = two_group_molecule(1);
        let view = view_of(&mol);

        let removal = ChangeRecord::diff(view.clone(), view.emptied(), None)
            .unwrap()
            .unwrap();
        assert!(removal.is_removal());
        assert!(!removal.is_addition());

        let addition = ChangeRecord::diff(view.emptied(), view, None)
            .unwrap()
            .unwrap();
        assert!(addition.is_addition());
        assert!(!addition.is_removal());
    }

    #[test]
    fn merge_detects_a_round_trip_back_to_the_old_state() {
        let mut mol = two_group_molecule(1);
        let before = view_of(&mol);
        mol.translate(&Vector3::new(1.0, 0.0, 0.0));
        let after = view_of(&mol);

        let forward = ChangeRecord::diff(before.clone(), after.clone(), None)
            .unwrap()
            .unwrap();
        let backward = ChangeRecord::diff(after, before, None).unwrap().unwrap();
        assert!(forward.merge(&backward).is_none());
    }

    #[test]
    fn merge_of_addition_and_removal_cancels() {
        let mol = two_group_molecule(1);
        let view = view_of(&mol);
        let addition = ChangeRecord::diff(view.emptied(), view.clone(), None)
            .unwrap()
            .unwrap();
        let removal = ChangeRecord::diff(view.clone(), view.emptied(), None)
            .unwrap()
            .unwrap();
        assert!(addition.merge(&removal).is_none());
    }

    #[test]
    fn merge_unions_partial_changed_sets() {
        let mut mol = Molecule::new(
            MoleculeId(1),
            vec![
                vec![Point3::new(0.0, 0.0, 0.0)],
                vec![Point3::new(3.0, 0.0, 0.0)],
                vec![Point3::new(6.0, 0.0, 0.0)],
            ],
        );
        mol.set_property(
            "charges",
            Property::Charges(vec![vec![0.1], vec![0.2], vec![0.3]]),
        );
        mol.set_property(
            "lj",
            Property::LennardJones(vec![vec![LjParams::new(3.0, 0.1)]; 3]),
        );

        let v0 = view_of(&mol);
        mol.translate_subgroup(SubgroupId(0), &Vector3::new(0.1, 0.0, 0.0));
        let v1 = view_of(&mol);
        mol.translate_subgroup(SubgroupId(2), &Vector3::new(0.1, 0.0, 0.0));
        let v2 = view_of(&mol);

        let first = ChangeRecord::diff(v0.clone(), v1.clone(), Some(&BTreeSet::from([SubgroupId(0)])))
            .unwrap()
            .unwrap();
        let second = ChangeRecord::diff(v1, v2.clone(), Some(&BTreeSet::from([SubgroupId(2)])))
            .unwrap()
            .unwrap();

        let merged = first.merge(&second).unwrap();
        assert_eq!(
            merged.changed_subgroups(),
            &BTreeSet::from([SubgroupId(0), SubgroupId(2)])
        );
        assert_eq!(merged.old(), &v0);
        assert_eq!(merged.new(), &v2);
        assert_eq!(merged.old_parts().n_groups(), 2);
    }

    #[test]
    fn merge_collapses_when_the_union_covers_every_subgroup() {
        let mut mol = two_group_molecule(1);
        let v0 = view_of(&mol);
        mol.translate_subgroup(SubgroupId(0), &Vector3::new(0.1, 0.0, 0.0));
        let v1 = view_of(&mol);
        mol.translate_subgroup(SubgroupId(1), &Vector3::new(0.1, 0.0, 0.0));
        let v2 = view_of(&mol);

        let first = ChangeRecord::diff(v0, v1.clone(), Some(&BTreeSet::from([SubgroupId(0)])))
            .unwrap()
            .unwrap();
        let second = ChangeRecord::diff(v1, v2, Some(&BTreeSet::from([SubgroupId(1)])))
            .unwrap()
            .unwrap();
        let merged = first.merge(&second).unwrap();
        assert!(merged.changed_all());
    }

    #[test]
    fn merge_with_a_whole_molecule_change_stays_whole() {
        let mut mol = two_group_molecule(1);
        let v0 = view_of(&mol);
        mol.translate_subgroup(SubgroupId(0), &Vector3::new(0.1, 0.0, 0.0));
        let v1 = view_of(&mol);
        mol.translate(&Vector3::new(0.0, 1.0, 0.0));
        let v2 = view_of(&mol);

        let partial = ChangeRecord::diff(v0, v1.clone(), Some(&BTreeSet::from([SubgroupId(0)])))
            .unwrap()
            .unwrap();
        let whole = ChangeRecord::diff(v1, v2, None).unwrap().unwrap();
        let merged = partial.merge(&whole).unwrap();
        assert!(merged.changed_all());
    }
}
