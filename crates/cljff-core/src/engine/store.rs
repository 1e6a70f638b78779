use crate::core::models::ids::MoleculeId;
use crate::core::models::view::MoleculeView;
use std::collections::HashMap;

/// The authoritative set of current molecule views for one forcefield group.
///
/// Views live in a dense slab in insertion order; the index maps molecule
/// identity to its slot. The index is a bijection onto the slab at all times.
#[derive(Debug, Clone, Default)]
pub struct MoleculeStore {
    views: Vec<MoleculeView>,
    index: HashMap<MoleculeId, usize>,
}

impl MoleculeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn contains(&self, id: MoleculeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: MoleculeId) -> Option<&MoleculeView> {
        self.index.get(&id).map(|&slot| &self.views[slot])
    }

    /// Replaces the stored view for the molecule's id, or appends it.
    /// Returns whether an existing view was replaced.
    pub fn upsert(&mut self, view: MoleculeView) -> bool {
        match self.index.get(&view.id()) {
            Some(&slot) => {
                self.views[slot] = view;
                true
            }
            None => {
                self.index.insert(view.id(), self.views.len());
                self.views.push(view);
                false
            }
        }
    }

    /// Removes a molecule and rebuilds the whole index.
    ///
    /// The reindex makes removal O(n). Swap-removal would be O(1) but changes
    /// iteration order; the linear cost is a deliberate simplicity tradeoff,
    /// and the place to optimize if removal ever shows up in profiles.
    pub fn remove(&mut self, id: MoleculeId) -> Option<MoleculeView> {
        let slot = self.index.remove(&id)?;
        let view = self.views.remove(slot);
        self.index = self
            .views
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id(), i))
            .collect();
        Some(view)
    }

    /// Views in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MoleculeView> {
        self.views.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = MoleculeId> + '_ {
        self.views.iter().map(MoleculeView::id)
    }
}
