use super::config::FfSettings;
use super::error::FfError;
use super::log::ChangeLog;
use super::record::ChangeRecord;
use super::store::MoleculeStore;
use crate::core::forcefield::evaluator::PairEvaluator;
use crate::core::forcefield::kernel::PairKernel;
use crate::core::forcefield::term::{Component, EnergyTerm};
use crate::core::models::ids::{GroupId, MoleculeId, SubgroupId};
use crate::core::models::molecule::Molecule;
use crate::core::models::selection::AtomSelection;
use crate::core::models::view::{MoleculeView, ParameterMap};
use crate::core::space::switching::SwitchingFunction;
use crate::core::space::Space;
use itertools::iproduct;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The first (or only) molecule group of a forcefield.
pub const GROUP_A: GroupId = GroupId(0);
/// The second molecule group of a two-group forcefield.
pub const GROUP_B: GroupId = GroupId(1);

/// One group's share of forcefield state: its current views and pending log.
#[derive(Debug, Clone, Default)]
struct GroupState {
    store: MoleculeStore,
    log: ChangeLog,
}

/// Which pairs a forcefield sums over.
#[derive(Debug, Clone)]
enum Topology {
    /// All unordered pairs within one molecule set.
    Single(GroupState),
    /// Only A-B pairs across two disjoint sets; no intra-group energy.
    Pair { a: GroupState, b: GroupState },
}

/// Incremental pairwise nonbonded forcefield, generic over the interaction
/// kernel.
///
/// Mutations (`add`, `change`, `remove`) update the molecule store
/// immediately and record their net effect in the change log. `energy()`
/// consults the log: an empty log returns the cached total; a non-empty log
/// triggers the delta recompute; the first evaluation, or any setting change
/// that touches every pair (space, switching function, kernel), forces the
/// full O(n²) pass. Every successful evaluation commits by clearing the log.
///
/// A failed mutation leaves the store and log exactly as they were: all
/// fallible work (view construction, diffing) happens before any state is
/// touched.
#[derive(Debug)]
pub struct ForceField<K: PairKernel> {
    kernel: K,
    space: Box<dyn Space>,
    switch: Box<dyn SwitchingFunction>,
    topology: Topology,
    total: Option<EnergyTerm>,
    needs_full: bool,
}

impl<K: PairKernel> ForceField<K> {
    /// A forcefield summing all unordered molecule pairs of one group.
    pub fn single(kernel: K, space: Box<dyn Space>, switch: Box<dyn SwitchingFunction>) -> Self {
        Self {
            kernel,
            space,
            switch,
            topology: Topology::Single(GroupState::default()),
            total: None,
            needs_full: false,
        }
    }

    /// A forcefield summing only A-B pairs across two disjoint groups.
    pub fn two_group(kernel: K, space: Box<dyn Space>, switch: Box<dyn SwitchingFunction>) -> Self {
        Self {
            kernel,
            space,
            switch,
            topology: Topology::Pair {
                a: GroupState::default(),
                b: GroupState::default(),
            },
            total: None,
            needs_full: false,
        }
    }

    pub fn single_with_settings(kernel: K, settings: &FfSettings) -> Self {
        Self::single(kernel, settings.space(), settings.switching())
    }

    pub fn two_group_with_settings(kernel: K, settings: &FfSettings) -> Self {
        Self::two_group(kernel, settings.space(), settings.switching())
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    fn group_state(&self, group: GroupId) -> Result<&GroupState, FfError> {
        match (&self.topology, group) {
            (Topology::Single(state), GROUP_A) => Ok(state),
            (Topology::Pair { a, .. }, GROUP_A) => Ok(a),
            (Topology::Pair { b, .. }, GROUP_B) => Ok(b),
            _ => Err(FfError::InvalidGroup(group)),
        }
    }

    fn group_state_mut(&mut self, group: GroupId) -> Result<&mut GroupState, FfError> {
        match (&mut self.topology, group) {
            (Topology::Single(state), GROUP_A) => Ok(state),
            (Topology::Pair { a, .. }, GROUP_A) => Ok(a),
            (Topology::Pair { b, .. }, GROUP_B) => Ok(b),
            _ => Err(FfError::InvalidGroup(group)),
        }
    }

    fn locate(&self, id: MoleculeId) -> Option<GroupId> {
        match &self.topology {
            Topology::Single(state) => state.store.contains(id).then_some(GROUP_A),
            Topology::Pair { a, b } => {
                if a.store.contains(id) {
                    Some(GROUP_A)
                } else if b.store.contains(id) {
                    Some(GROUP_B)
                } else {
                    None
                }
            }
        }
    }

    /// Adds a whole molecule to the first group.
    ///
    /// Returns whether the forcefield is now dirty. Adding an id that is
    /// already present replaces the stored snapshot, exactly as a `change`
    /// would.
    pub fn add(&mut self, molecule: &Molecule, map: ParameterMap) -> Result<bool, FfError> {
        self.add_to(GROUP_A, molecule, map)
    }

    /// Adds a whole molecule to the named group.
    pub fn add_to(
        &mut self,
        group: GroupId,
        molecule: &Molecule,
        map: ParameterMap,
    ) -> Result<bool, FfError> {
        let selection = AtomSelection::select_all(&molecule.shape());
        self.add_selected_to(group, molecule, &selection, map)
    }

    /// Adds the selected part of a molecule to the named group.
    pub fn add_selected_to(
        &mut self,
        group: GroupId,
        molecule: &Molecule,
        selection: &AtomSelection,
        map: ParameterMap,
    ) -> Result<bool, FfError> {
        self.group_state(group)?;
        if let Topology::Pair { a, b } = &self.topology {
            let other = if group == GROUP_A { b } else { a };
            if other.store.contains(molecule.id()) || other.log.contains(molecule.id()) {
                return Err(FfError::IncompatibleMolecule {
                    id: molecule.id(),
                    reason: "already present in the other group".to_string(),
                });
            }
        }

        let new_view = MoleculeView::build(molecule, selection, &map, K::REQUIRES)?;
        let state = self.group_state_mut(group)?;
        let old_view = state
            .store
            .get(molecule.id())
            .cloned()
            .unwrap_or_else(|| new_view.emptied());
        let record = ChangeRecord::diff(old_view, new_view.clone(), None)?;

        if let Some(record) = record {
            state.store.upsert(new_view);
            state.log.apply(record);
        }
        Ok(self.is_dirty())
    }

    /// Records a whole-molecule change to an already-present molecule.
    pub fn change(&mut self, molecule: &Molecule) -> Result<bool, FfError> {
        self.change_with(molecule, None)
    }

    /// Records a change restricted to the named subgroups.
    ///
    /// The caller asserts that only those subgroups differ from the stored
    /// snapshot; the delta algorithm exploits the restriction to compare
    /// changed parts instead of whole molecules.
    pub fn change_subgroups(
        &mut self,
        molecule: &Molecule,
        touched: &BTreeSet<SubgroupId>,
    ) -> Result<bool, FfError> {
        self.change_with(molecule, Some(touched))
    }

    fn change_with(
        &mut self,
        molecule: &Molecule,
        touched: Option<&BTreeSet<SubgroupId>>,
    ) -> Result<bool, FfError> {
        let id = molecule.id();
        let group = self.locate(id).ok_or(FfError::MissingMolecule(id))?;
        let old_view = self
            .group_state(group)?
            .store
            .get(id)
            .cloned()
            .ok_or(FfError::MissingMolecule(id))?;

        // a minor-version-only change cannot have invalidated the cached
        // parameters, so only the coordinates are re-derived
        let new_view = if molecule.major_version() == old_view.major_version() {
            MoleculeView::update_coords(&old_view, molecule)?
        } else {
            MoleculeView::build(
                molecule,
                old_view.selection(),
                old_view.param_source(),
                K::REQUIRES,
            )?
        };
        let record = ChangeRecord::diff(old_view, new_view.clone(), touched)?;

        if let Some(record) = record {
            let state = self.group_state_mut(group)?;
            state.store.upsert(new_view);
            state.log.apply(record);
        }
        Ok(self.is_dirty())
    }

    /// Removes a molecule from whichever group holds it.
    pub fn remove(&mut self, id: MoleculeId) -> Result<bool, FfError> {
        let group = self.locate(id).ok_or(FfError::MissingMolecule(id))?;
        let state = self.group_state_mut(group)?;
        let old_view = state
            .store
            .get(id)
            .cloned()
            .ok_or(FfError::MissingMolecule(id))?;
        let record = ChangeRecord::diff(old_view.clone(), old_view.emptied(), None)?;

        state.store.remove(id);
        if let Some(record) = record {
            state.log.apply(record);
        }
        Ok(self.is_dirty())
    }

    pub fn contains(&self, id: MoleculeId) -> bool {
        self.locate(id).is_some()
    }

    /// The stored snapshot of a molecule.
    pub fn molecule(&self, id: MoleculeId) -> Result<&MoleculeView, FfError> {
        let view = match &self.topology {
            Topology::Single(state) => state.store.get(id),
            Topology::Pair { a, b } => a.store.get(id).or_else(|| b.store.get(id)),
        };
        view.ok_or(FfError::MissingMolecule(id))
    }

    /// Current snapshots of every molecule, across all groups.
    pub fn contents(&self) -> HashMap<MoleculeId, MoleculeView> {
        let mut map = HashMap::new();
        let mut collect = |state: &GroupState| {
            for view in state.store.iter() {
                map.insert(view.id(), view.clone());
            }
        };
        match &self.topology {
            Topology::Single(state) => collect(state),
            Topology::Pair { a, b } => {
                collect(a);
                collect(b);
            }
        }
        map
    }

    /// Current snapshots of one group's molecules.
    pub fn contents_of(&self, group: GroupId) -> Result<HashMap<MoleculeId, MoleculeView>, FfError> {
        let state = self.group_state(group)?;
        Ok(state
            .store
            .iter()
            .map(|view| (view.id(), view.clone()))
            .collect())
    }

    /// Whether the next energy query has any work to do.
    pub fn is_dirty(&self) -> bool {
        self.needs_full || self.total.is_none() || self.has_pending_changes()
    }

    fn has_pending_changes(&self) -> bool {
        match &self.topology {
            Topology::Single(state) => !state.log.is_empty(),
            Topology::Pair { a, b } => !a.log.is_empty() || !b.log.is_empty(),
        }
    }

    /// Swaps the geometry provider. Every pair is affected, so the next
    /// energy query recomputes from scratch.
    pub fn set_space(&mut self, space: Box<dyn Space>) {
        self.space = space;
        self.needs_full = true;
    }

    /// Swaps the switching function, forcing a full recompute.
    pub fn set_switching_function(&mut self, switch: Box<dyn SwitchingFunction>) {
        self.switch = switch;
        self.needs_full = true;
    }

    /// Swaps the interaction kernel, forcing a full recompute.
    pub fn set_kernel(&mut self, kernel: K) {
        self.kernel = kernel;
        self.needs_full = true;
    }

    /// Total interaction energy in kcal/mol.
    pub fn energy(&mut self) -> f64 {
        self.energy_components().total()
    }

    /// One component of the total interaction energy.
    pub fn energy_component(&mut self, component: Component) -> f64 {
        self.energy_components().component(component)
    }

    /// Component-resolved total, recomputing only as much as the change log
    /// requires. Commits (clears the log) on completion.
    pub fn energy_components(&mut self) -> EnergyTerm {
        if self.needs_full || self.total.is_none() {
            self.recalculate_from_scratch();
        } else if self.has_pending_changes() {
            self.recalculate_via_delta();
        }
        self.total
            .expect("recompute always leaves a cached total")
    }

    fn recalculate_from_scratch(&mut self) {
        let (total, n_pairs) = {
            let evaluator =
                PairEvaluator::new(&self.kernel, self.space.as_ref(), self.switch.as_ref());
            match &self.topology {
                Topology::Single(state) => {
                    let views: Vec<&MoleculeView> = state.store.iter().collect();
                    let pairs: Vec<(usize, usize)> = (0..views.len())
                        .flat_map(|i| ((i + 1)..views.len()).map(move |j| (i, j)))
                        .collect();
                    (pair_sum(&evaluator, &views, &views, &pairs), pairs.len())
                }
                Topology::Pair { a, b } => {
                    let views_a: Vec<&MoleculeView> = a.store.iter().collect();
                    let views_b: Vec<&MoleculeView> = b.store.iter().collect();
                    let pairs: Vec<(usize, usize)> =
                        iproduct!(0..views_a.len(), 0..views_b.len()).collect();
                    (pair_sum(&evaluator, &views_a, &views_b, &pairs), pairs.len())
                }
            }
        };
        info!(n_pairs, total = total.total(), "full nonbonded recompute");
        self.total = Some(total);
        self.clear_logs();
        self.needs_full = false;
    }

    fn recalculate_via_delta(&mut self) {
        let n_pending = match &self.topology {
            Topology::Single(state) => state.log.len(),
            Topology::Pair { a, b } => a.log.len() + b.log.len(),
        };
        let delta = {
            let evaluator =
                PairEvaluator::new(&self.kernel, self.space.as_ref(), self.switch.as_ref());
            match &self.topology {
                Topology::Single(state) => single_group_delta(&evaluator, state),
                Topology::Pair { a, b } => two_group_delta(&evaluator, a, b),
            }
        };
        let total = self
            .total
            .expect("the delta path runs only with a cached total")
            + delta;
        trace!(
            n_pending,
            delta = delta.total(),
            total = total.total(),
            "delta nonbonded recompute"
        );
        self.total = Some(total);
        self.clear_logs();
    }

    fn clear_logs(&mut self) {
        match &mut self.topology {
            Topology::Single(state) => state.log.clear(),
            Topology::Pair { a, b } => {
                a.log.clear();
                b.log.clear();
            }
        }
    }
}

/// Sums independent pair terms, across the thread pool when the `parallel`
/// feature is on. Reduction order is unspecified under rayon, so totals may
/// differ at the ULP level between parallelism settings; compare energies
/// with a relative tolerance, never bit-exactly.
fn pair_sum<K: PairKernel>(
    evaluator: &PairEvaluator<'_, K>,
    left: &[&MoleculeView],
    right: &[&MoleculeView],
    pairs: &[(usize, usize)],
) -> EnergyTerm {
    #[cfg(not(feature = "parallel"))]
    let total = pairs
        .iter()
        .map(|&(i, j)| evaluator.view_pair_energy(left[i], right[j]))
        .sum();

    #[cfg(feature = "parallel")]
    let total = pairs
        .par_iter()
        .map(|&(i, j)| evaluator.view_pair_energy(left[i], right[j]))
        .sum();

    total
}

/// Delta contribution of one unchanged molecule against every pending entry.
fn unchanged_vs_entries<K: PairKernel>(
    evaluator: &PairEvaluator<'_, K>,
    view: &MoleculeView,
    entries: &[ChangeRecord],
) -> EnergyTerm {
    entries
        .iter()
        .map(|entry| {
            evaluator.view_pair_energy(view, entry.new_parts())
                - evaluator.view_pair_energy(view, entry.old_parts())
        })
        .sum()
}

/// Delta contribution of a pair of pending entries.
///
/// Removal entries carry an empty new side, so both branches degrade to the
/// pure subtraction of the old-old interaction without special-casing.
fn entry_pair_delta<K: PairKernel>(
    evaluator: &PairEvaluator<'_, K>,
    entry_i: &ChangeRecord,
    entry_j: &ChangeRecord,
) -> EnergyTerm {
    if entry_i.changed_all() || entry_j.changed_all() {
        // a full-vs-anything comparison is exact with whole views on both sides
        evaluator.view_pair_energy(entry_i.new(), entry_j.new())
            - evaluator.view_pair_energy(entry_i.old(), entry_j.old())
    } else {
        // four-term inclusion-exclusion: the overlap bracket removes what the
        // first two count twice
        let left = evaluator.view_pair_energy(entry_i.new_parts(), entry_j.new())
            - evaluator.view_pair_energy(entry_i.old_parts(), entry_j.old());
        let right = evaluator.view_pair_energy(entry_i.new(), entry_j.new_parts())
            - evaluator.view_pair_energy(entry_i.old(), entry_j.old_parts());
        let overlap = evaluator.view_pair_energy(entry_i.new_parts(), entry_j.new_parts())
            - evaluator.view_pair_energy(entry_i.old_parts(), entry_j.old_parts());
        left + right - overlap
    }
}

fn single_group_delta<K: PairKernel>(
    evaluator: &PairEvaluator<'_, K>,
    state: &GroupState,
) -> EnergyTerm {
    let entries = state.log.entries();
    let unchanged: Vec<&MoleculeView> = state
        .store
        .iter()
        .filter(|view| !state.log.contains(view.id()))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let unchanged_delta: EnergyTerm = unchanged
        .iter()
        .map(|&view| unchanged_vs_entries(evaluator, view, entries))
        .sum();

    #[cfg(feature = "parallel")]
    let unchanged_delta: EnergyTerm = unchanged
        .par_iter()
        .map(|&view| unchanged_vs_entries(evaluator, view, entries))
        .sum();

    // changed-changed pairs, visited once each in log-insertion order
    let mut changed_delta = EnergyTerm::default();
    for (i, entry_i) in entries.iter().enumerate() {
        for entry_j in &entries[i + 1..] {
            changed_delta += entry_pair_delta(evaluator, entry_i, entry_j);
        }
    }

    unchanged_delta + changed_delta
}

fn two_group_delta<K: PairKernel>(
    evaluator: &PairEvaluator<'_, K>,
    a: &GroupState,
    b: &GroupState,
) -> EnergyTerm {
    // each side's entries against the other side's unchanged molecules;
    // partners that changed too are left to the cross-log pass below
    let mut delta = half_delta(evaluator, &a.log, b);
    delta += half_delta(evaluator, &b.log, a);

    // changed-changed across the two logs; A and B are disjoint so every
    // ordered pair is one unordered pair
    for entry_a in a.log.entries() {
        for entry_b in b.log.entries() {
            delta += entry_pair_delta(evaluator, entry_a, entry_b);
        }
    }
    delta
}

fn half_delta<K: PairKernel>(
    evaluator: &PairEvaluator<'_, K>,
    log: &ChangeLog,
    other: &GroupState,
) -> EnergyTerm {
    other
        .store
        .iter()
        .filter(|view| !other.log.contains(view.id()))
        .map(|view| unchanged_vs_entries(evaluator, view, log.entries()))
        .sum()
}
