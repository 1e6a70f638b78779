use super::ids::{MoleculeId, SubgroupId};
use crate::core::forcefield::params::LjParams;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// A named per-atom property of a molecule, shaped per subgroup.
///
/// Properties are typed: asking a charge-shaped question of an LJ-shaped
/// property is an `InvalidCast` at view-construction time, not a silent
/// reinterpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    /// Partial charges in elementary charge units, one per atom per subgroup.
    Charges(Vec<Vec<f64>>),
    /// Lennard-Jones parameters, one per atom per subgroup.
    LennardJones(Vec<Vec<LjParams>>),
}

impl Property {
    pub fn kind(&self) -> &'static str {
        match self {
            Property::Charges(_) => "charges",
            Property::LennardJones(_) => "lennard-jones",
        }
    }

    /// Whether the property has one value per atom of every subgroup.
    pub fn shape_matches(&self, shape: &[usize]) -> bool {
        match self {
            Property::Charges(v) => {
                v.len() == shape.len() && v.iter().zip(shape).all(|(sub, &n)| sub.len() == n)
            }
            Property::LennardJones(v) => {
                v.len() == shape.len() && v.iter().zip(shape).all(|(sub, &n)| sub.len() == n)
            }
        }
    }
}

/// The caller-facing description of a molecule: rigid coordinate subgroups,
/// named properties, and a pair of version counters.
///
/// The major version counts topology and parameter edits (anything that can
/// invalidate cached per-atom parameters); the minor version counts
/// coordinate-only moves. A major bump resets the minor counter. The
/// incremental engine uses the pair to decide whether a changed molecule
/// needs full re-parameterization or only a coordinate refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    id: MoleculeId,
    major_version: u32,
    minor_version: u32,
    subgroups: Vec<Vec<Point3<f64>>>,
    properties: HashMap<String, Property>,
}

impl Molecule {
    pub fn new(id: MoleculeId, subgroups: Vec<Vec<Point3<f64>>>) -> Self {
        Self {
            id,
            major_version: 1,
            minor_version: 0,
            subgroups,
            properties: HashMap::new(),
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

    pub fn n_subgroups(&self) -> usize {
        self.subgroups.len()
    }

    /// Per-subgroup atom counts.
    pub fn shape(&self) -> Vec<usize> {
        self.subgroups.iter().map(Vec::len).collect()
    }

    pub fn subgroup_coords(&self, subgroup: SubgroupId) -> Option<&[Point3<f64>]> {
        self.subgroups.get(subgroup.index()).map(Vec::as_slice)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Sets or replaces a named property. Parameter edits invalidate cached
    /// parameterizations downstream, so this bumps the major version.
    pub fn set_property(&mut self, name: &str, property: Property) {
        self.properties.insert(name.to_string(), property);
        self.major_version += 1;
        self.minor_version = 0;
    }

    /// Translates every subgroup. Coordinate-only move: minor version bump.
    pub fn translate(&mut self, delta: &Vector3<f64>) {
        for subgroup in &mut self.subgroups {
            for coord in subgroup.iter_mut() {
                *coord += *delta;
            }
        }
        self.minor_version += 1;
    }

    /// Translates a single subgroup. Returns false if the subgroup does not
    /// exist, in which case the molecule is untouched.
    pub fn translate_subgroup(&mut self, subgroup: SubgroupId, delta: &Vector3<f64>) -> bool {
        match self.subgroups.get_mut(subgroup.index()) {
            Some(coords) => {
                for coord in coords.iter_mut() {
                    *coord += *delta;
                }
                self.minor_version += 1;
                true
            }
            None => false,
        }
    }
}
