use super::record::ChangeRecord;
use crate::core::models::ids::MoleculeId;
use std::collections::{BTreeSet, HashMap};

/// The set of pending change records since the last committed evaluation.
///
/// At most one entry exists per molecule id, holding the net change relative
/// to the state at the last commit. Records that cancel back to that state
/// are pruned on arrival, so an entry's presence always means "this molecule
/// really differs from what the cached total was computed against" — the
/// delta formulas rely on that. Ids whose net effect is removal are
/// additionally tracked in `removed`.
///
/// Entries are kept in log-insertion order; the delta algorithm visits
/// unordered entry pairs by this order, never by store order.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    entries: Vec<ChangeRecord>,
    index: HashMap<MoleculeId, usize>,
    removed: BTreeSet<MoleculeId>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: MoleculeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: MoleculeId) -> Option<&ChangeRecord> {
        self.index.get(&id).map(|&slot| &self.entries[slot])
    }

    /// Entries in log-insertion order.
    pub fn entries(&self) -> &[ChangeRecord] {
        &self.entries
    }

    /// Ids whose net pending effect is removal from the forcefield.
    pub fn removed(&self) -> &BTreeSet<MoleculeId> {
        &self.removed
    }

    /// Merges a record into the log.
    ///
    /// An existing entry for the same molecule is chained with the incoming
    /// record; if the chain cancels (the molecule is back to its state at the
    /// last commit) the entry is deleted. Otherwise the net record replaces
    /// the entry, or is appended for a first-time id.
    pub fn apply(&mut self, record: ChangeRecord) {
        let id = record.id();
        match self.index.get(&id) {
            Some(&slot) => match self.entries[slot].merge(&record) {
                Some(merged) => {
                    if merged.is_removal() {
                        self.removed.insert(id);
                    } else {
                        self.removed.remove(&id);
                    }
                    self.entries[slot] = merged;
                }
                None => {
                    self.entries.remove(slot);
                    self.removed.remove(&id);
                    self.index = self
                        .entries
                        .iter()
                        .enumerate()
                        .map(|(i, e)| (e.id(), i))
                        .collect();
                }
            },
            None => {
                if record.is_removal() {
                    self.removed.insert(id);
                }
                self.index.insert(id, self.entries.len());
                self.entries.push(record);
            }
        }
    }

    /// Commits: forgets every pending record and removal.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.removed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::kernel::{CljKernel, PairKernel};
    use crate::core::forcefield::params::LjParams;
    use crate::core::models::molecule::{Molecule, Property};
    use crate::core::models::selection::AtomSelection;
    use crate::core::models::view::{MoleculeView, ParameterMap};
    use nalgebra::{Point3, Vector3};

    fn molecule(id: u64) -> Molecule {
        let mut mol = Molecule::new(MoleculeId(id), vec![vec![Point3::origin()]]);
        mol.set_property("charges", Property::Charges(vec![vec![0.5]]));
        mol.set_property(
            "lj",
            Property::LennardJones(vec![vec![LjParams::new(3.0, 0.1)]]),
        );
        mol
    }

    fn view_of(mol: &Molecule) -> MoleculeView {
        let sel = AtomSelection::select_all(&mol.shape());
        MoleculeView::build(mol, &sel, &ParameterMap::default(), CljKernel::REQUIRES).unwrap()
    }

    fn change_record(mol: &mut Molecule) -> ChangeRecord {
        let before = view_of(mol);
        mol.translate(&Vector3::new(1.0, 0.0, 0.0));
        let after = view_of(mol);
        ChangeRecord::diff(before, after, None).unwrap().unwrap()
    }

    #[test]
    fn apply_appends_one_entry_per_molecule() {
        let mut log = ChangeLog::new();
        let mut mol1 = molecule(1);
        let mut mol2 = molecule(2);

        log.apply(change_record(&mut mol1));
        log.apply(change_record(&mut mol2));
        assert_eq!(log.len(), 2);
        assert!(log.contains(MoleculeId(1)));

        // a second change to molecule 1 merges, it does not append
        log.apply(change_record(&mut mol1));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn merged_entry_spans_from_first_old_to_last_new() {
        let mut log = ChangeLog::new();
        let mut mol = molecule(1);
        let original = view_of(&mol);

        log.apply(change_record(&mut mol));
        log.apply(change_record(&mut mol));

        let entry = log.get(MoleculeId(1)).unwrap();
        assert_eq!(entry.old(), &original);
        assert_eq!(entry.new(), &view_of(&mol));
    }

    #[test]
    fn round_trip_prunes_the_entry() {
        let mut log = ChangeLog::new();
        let mut mol = molecule(1);
        let before = view_of(&mol);

        mol.translate(&Vector3::new(2.0, 0.0, 0.0));
        let moved = view_of(&mol);
        log.apply(
            ChangeRecord::diff(before.clone(), moved.clone(), None)
                .unwrap()
                .unwrap(),
        );
        assert_eq!(log.len(), 1);

        log.apply(ChangeRecord::diff(moved, before, None).unwrap().unwrap());
        assert!(log.is_empty());
        assert!(!log.contains(MoleculeId(1)));
    }

    #[test]
    fn add_then_remove_cancels_without_a_trace() {
        let mut log = ChangeLog::new();
        let mol = molecule(1);
        let view = view_of(&mol);

        log.apply(
            ChangeRecord::diff(view.emptied(), view.clone(), None)
                .unwrap()
                .unwrap(),
        );
        log.apply(
            ChangeRecord::diff(view.clone(), view.emptied(), None)
                .unwrap()
                .unwrap(),
        );
        assert!(log.is_empty());
        assert!(log.removed().is_empty());
    }

    #[test]
    fn removal_entries_are_tracked_in_the_removed_set() {
        let mut log = ChangeLog::new();
        let mol = molecule(1);
        let view = view_of(&mol);

        log.apply(
            ChangeRecord::diff(view.clone(), view.emptied(), None)
                .unwrap()
                .unwrap(),
        );
        assert!(log.removed().contains(&MoleculeId(1)));

        // re-adding the identical molecule cancels the removal entirely
        log.apply(
            ChangeRecord::diff(view.emptied(), view, None).unwrap().unwrap(),
        );
        assert!(log.is_empty());
        assert!(log.removed().is_empty());
    }

    #[test]
    fn change_then_remove_keeps_a_removal_entry_from_the_committed_state() {
        let mut log = ChangeLog::new();
        let mut mol = molecule(1);
        let committed = view_of(&mol);

        log.apply(change_record(&mut mol));
        let current = view_of(&mol);
        log.apply(
            ChangeRecord::diff(current.clone(), current.emptied(), None)
                .unwrap()
                .unwrap(),
        );

        let entry = log.get(MoleculeId(1)).unwrap();
        assert!(entry.is_removal());
        assert_eq!(entry.old(), &committed);
        assert!(log.removed().contains(&MoleculeId(1)));
    }

    #[test]
    fn pruning_reindexes_later_entries() {
        let mut log = ChangeLog::new();
        let mut mol1 = molecule(1);
        let mut mol2 = molecule(2);
        let mol1_before = view_of(&mol1);

        log.apply(change_record(&mut mol1));
        log.apply(change_record(&mut mol2));

        // molecule 1 returns to its committed state; entry 2 must stay reachable
        log.apply(
            ChangeRecord::diff(view_of(&mol1), mol1_before, None)
                .unwrap()
                .unwrap(),
        );
        assert_eq!(log.len(), 1);
        assert!(log.get(MoleculeId(2)).is_some());
        assert!(!log.contains(MoleculeId(1)));
    }

    #[test]
    fn clear_commits_everything() {
        let mut log = ChangeLog::new();
        let mut mol = molecule(1);
        log.apply(change_record(&mut mol));
        let view = view_of(&mol);
        log.apply(
            ChangeRecord::diff(view.clone(), view.emptied(), None)
                .unwrap()
                .unwrap(),
        );

        log.clear();
        assert!(log.is_empty());
        assert!(log.removed().is_empty());
    }
}
