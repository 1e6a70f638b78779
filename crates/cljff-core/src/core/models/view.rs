use super::ids::{MoleculeId, SubgroupId};
use super::molecule::{Molecule, Property};
use super::selection::AtomSelection;
use crate::core::forcefield::params::{CljParams, LjParams, ParamRequirements};
use nalgebra::Point3;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("molecule has no property named '{name}'")]
    MissingProperty { name: String },

    #[error("property '{name}' cannot be used as {expected}: {found}")]
    InvalidCast {
        name: String,
        expected: &'static str,
        found: String,
    },

    #[error("index {index} is out of range (length {len})")]
    InvalidIndex { index: usize, len: usize },
}

/// Names of the molecule properties that feed each kernel component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMap {
    pub charges: String,
    pub lj: String,
}

impl Default for ParameterMap {
    fn default() -> Self {
        Self {
            charges: "charges".to_string(),
            lj: "lj".to_string(),
        }
    }
}

/// The coordinates of one subgroup, with its bounding sphere.
///
/// The sphere (centroid plus maximum atom distance from it) is computed once
/// at construction and is what makes the `Space::beyond` cutoff prefilter a
/// constant-time test per group pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordGroup {
    coords: Vec<Point3<f64>>,
    center: Point3<f64>,
    radius: f64,
}

impl CoordGroup {
    pub fn new(coords: Vec<Point3<f64>>) -> Self {
        let center = if coords.is_empty() {
            Point3::origin()
        } else {
            let sum = coords
                .iter()
                .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
            Point3::from(sum / coords.len() as f64)
        };
        let radius = coords
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0_f64, f64::max);
        Self {
            coords,
            center,
            radius,
        }
    }

    pub fn coords(&self) -> &[Point3<f64>] {
        &self.coords
    }

    pub fn center(&self) -> &Point3<f64> {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Immutable per-molecule snapshot: selected atoms' coordinates and per-atom
/// parameters, grouped by rigid subgroup.
///
/// A view is built once per mutation and never modified afterward; the
/// engine replaces views wholesale. Slots hold one `CoordGroup` and one
/// parallel parameter block per subgroup that has at least one selected atom.
/// Atoms of a partially selected subgroup that are not selected stay in the
/// coordinate block but carry the neutral parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeView {
    id: MoleculeId,
    major_version: u32,
    minor_version: u32,
    selection: AtomSelection,
    coords: Vec<CoordGroup>,
    params: Vec<Vec<CljParams>>,
    subgroup_ids: Vec<SubgroupId>,
    /// Maps subgroup id to slot. `None` means the identity mapping (the view
    /// holds every subgroup, in molecule order).
    index: Option<HashMap<SubgroupId, usize>>,
    param_source: ParameterMap,
}

impl MoleculeView {
    /// Builds a parameterized snapshot of `molecule` restricted to
    /// `selection`, fetching the properties named by `map` that `requires`
    /// asks for.
    ///
    /// Fully selected molecules take the wholesale path: every subgroup is
    /// copied and no subgroup-index map is allocated. An empty selection
    /// produces an empty view (no subgroups, zero energy against anything).
    pub fn build(
        molecule: &Molecule,
        selection: &AtomSelection,
        map: &ParameterMap,
        requires: ParamRequirements,
    ) -> Result<Self, ViewError> {
        let shape = molecule.shape();
        if !selection.shape_matches(&shape) {
            return Err(ViewError::InvalidIndex {
                index: selection.n_subgroups(),
                len: shape.len(),
            });
        }

        let charges = fetch_charges(molecule, &map.charges, requires.charges, &shape)?;
        let ljs = fetch_lj(molecule, &map.lj, requires.lj, &shape)?;

        if selection.selected_none() {
            return Ok(Self {
                id: molecule.id(),
                major_version: molecule.major_version(),
                minor_version: molecule.minor_version(),
                selection: selection.clone(),
                coords: Vec::new(),
                params: Vec::new(),
                subgroup_ids: Vec::new(),
                index: Some(HashMap::new()),
                param_source: map.clone(),
            });
        }

        let whole = selection.selected_all();
        let mut coords = Vec::new();
        let mut params = Vec::new();
        let mut subgroup_ids = Vec::new();
        let mut index = HashMap::new();

        for sub in 0..shape.len() {
            let id = SubgroupId(sub as u32);
            if !whole && selection.n_selected_in(id) == 0 {
                continue;
            }

            let group_coords = molecule
                .subgroup_coords(id)
                .expect("shape was validated against the molecule")
                .to_vec();

            let mut group_params = Vec::with_capacity(group_coords.len());
            for atom in 0..group_coords.len() {
                if whole || selection.is_selected(id, atom) {
                    let charge = charges.map_or(0.0, |c| c[sub][atom]);
                    let lj = ljs.map_or(LjParams::zero(), |l| l[sub][atom]);
                    group_params.push(CljParams::new(charge, lj));
                } else {
                    group_params.push(CljParams::dummy());
                }
            }

            index.insert(id, coords.len());
            subgroup_ids.push(id);
            coords.push(CoordGroup::new(group_coords));
            params.push(group_params);
        }

        Ok(Self {
            id: molecule.id(),
            major_version: molecule.major_version(),
            minor_version: molecule.minor_version(),
            selection: selection.clone(),
            coords,
            params,
            subgroup_ids,
            index: if whole { None } else { Some(index) },
            param_source: map.clone(),
        })
    }

    /// Rebuilds only the coordinate blocks of `old` from `molecule`, reusing
    /// its parameters, selection, and slot layout.
    ///
    /// This is the minor-version fast path for coordinate-only changes. It is
    /// an optimization, not a correctness requirement: the caller must have
    /// checked that the molecule's major version, selection, and parameter
    /// source are unchanged, and a full `build` would produce an identical
    /// view apart from this shortcut's cost.
    pub fn update_coords(old: &Self, molecule: &Molecule) -> Result<Self, ViewError> {
        let shape = molecule.shape();
        if !old.selection.shape_matches(&shape) {
            return Err(ViewError::InvalidIndex {
                index: old.selection.n_subgroups(),
                len: shape.len(),
            });
        }

        let mut updated = old.clone();
        updated.minor_version = molecule.minor_version();
        for (slot, &id) in old.subgroup_ids.iter().enumerate() {
            let group_coords = molecule
                .subgroup_coords(id)
                .expect("shape was validated against the molecule")
                .to_vec();
            updated.coords[slot] = CoordGroup::new(group_coords);
        }
        Ok(updated)
    }

    /// A view of the same molecule with nothing selected. Used to express
    /// additions (old side) and removals (new side) as ordinary diffs.
    pub fn emptied(&self) -> Self {
        Self {
            id: self.id,
            major_version: self.major_version,
            minor_version: self.minor_version,
            selection: AtomSelection::select_none(&self.selection.shape()),
            coords: Vec::new(),
            params: Vec::new(),
            subgroup_ids: Vec::new(),
            index: Some(HashMap::new()),
            param_source: self.param_source.clone(),
        }
    }

    /// Restricts the view to the subgroups in `subset`, re-deriving the
    /// selection by deselecting everything outside it. This is the operation
    /// that builds the "changed parts" of a change record.
    pub fn mask(&self, subset: &BTreeSet<SubgroupId>) -> Self {
        if self.subgroup_ids.iter().all(|id| subset.contains(id)) {
            return self.clone();
        }

        let selection = self.selection.retain_subgroups(subset);
        let mut coords = Vec::new();
        let mut params = Vec::new();
        let mut subgroup_ids = Vec::new();
        let mut index = HashMap::new();

        for (slot, &id) in self.subgroup_ids.iter().enumerate() {
            if !subset.contains(&id) {
                continue;
            }
            index.insert(id, coords.len());
            subgroup_ids.push(id);
            coords.push(self.coords[slot].clone());
            params.push(self.params[slot].clone());
        }

        Self {
            id: self.id,
            major_version: self.major_version,
            minor_version: self.minor_version,
            selection,
            coords,
            params,
            subgroup_ids,
            index: Some(index),
            param_source: self.param_source.clone(),
        }
    }

    pub fn id(&self) -> MoleculeId {
        self.id
    }

    pub fn major_version(&self) -> u32 {
        self.major_version
    }

    pub fn minor_version(&self) -> u32 {
        self.minor_version
    }

    pub fn selection(&self) -> &AtomSelection {
        &self.selection
    }

    pub fn param_source(&self) -> &ParameterMap {
        &self.param_source
    }

    /// Number of subgroup slots held by the view.
    pub fn n_groups(&self) -> usize {
        self.coords.len()
    }

    /// Whether the view holds no atoms at all.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn coord_group(&self, slot: usize) -> Result<&CoordGroup, ViewError> {
        self.coords.get(slot).ok_or(ViewError::InvalidIndex {
            index: slot,
            len: self.coords.len(),
        })
    }

    pub fn param_group(&self, slot: usize) -> Result<&[CljParams], ViewError> {
        self.params
            .get(slot)
            .map(Vec::as_slice)
            .ok_or(ViewError::InvalidIndex {
                index: slot,
                len: self.params.len(),
            })
    }

    /// Pairs of coordinate and parameter blocks, in slot order.
    pub fn groups(&self) -> impl Iterator<Item = (&CoordGroup, &[CljParams])> + Clone {
        self.coords
            .iter()
            .zip(self.params.iter().map(Vec::as_slice))
    }

    /// Ids of the subgroups the view holds, in slot order.
    pub fn subgroup_ids(&self) -> &[SubgroupId] {
        &self.subgroup_ids
    }

    pub fn slot_of(&self, subgroup: SubgroupId) -> Option<usize> {
        match &self.index {
            None => {
                let slot = subgroup.index();
                (slot < self.coords.len()).then_some(slot)
            }
            Some(map) => map.get(&subgroup).copied(),
        }
    }
}

fn fetch_charges<'a>(
    molecule: &'a Molecule,
    name: &str,
    required: bool,
    shape: &[usize],
) -> Result<Option<&'a Vec<Vec<f64>>>, ViewError> {
    if !required {
        return Ok(None);
    }
    match molecule.property(name) {
        None => Err(ViewError::MissingProperty {
            name: name.to_string(),
        }),
        Some(prop @ Property::Charges(charges)) => {
            check_shape(name, prop.shape_matches(shape), shape)?;
            Ok(Some(charges))
        }
        Some(other) => Err(ViewError::InvalidCast {
            name: name.to_string(),
            expected: "charges",
            found: other.kind().to_string(),
        }),
    }
}

fn fetch_lj<'a>(
    molecule: &'a Molecule,
    name: &str,
    required: bool,
    shape: &[usize],
) -> Result<Option<&'a Vec<Vec<LjParams>>>, ViewError> {
    if !required {
        return Ok(None);
    }
    match molecule.property(name) {
        None => Err(ViewError::MissingProperty {
            name: name.to_string(),
        }),
        Some(prop @ Property::LennardJones(ljs)) => {
            check_shape(name, prop.shape_matches(shape), shape)?;
            Ok(Some(ljs))
        }
        Some(other) => Err(ViewError::InvalidCast {
            name: name.to_string(),
            expected: "lennard-jones",
            found: other.kind().to_string(),
        }),
    }
}

fn check_shape(name: &str, ok: bool, shape: &[usize]) -> Result<(), ViewError> {
    if ok {
        Ok(())
    } else {
        Err(ViewError::InvalidCast {
            name: name.to_string(),
            expected: "one value per atom of every subgroup",
            found: format!("shape mismatch against {shape:?}"),
        })
    }
}
