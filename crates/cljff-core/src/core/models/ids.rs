use std::fmt;

/// Stable identity of a molecule, independent of its content version.
///
/// Two snapshots of the same physical molecule share a `MoleculeId` even when
/// their coordinates, parameters, or selections differ. Identity is supplied
/// by the caller (it usually comes from the surrounding simulation's molecule
/// registry) and is never reused for a different molecule within one
/// forcefield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoleculeId(pub u64);

/// Identifier of a rigid coordinate/parameter subgroup within a molecule.
///
/// Subgroups are the unit of granularity for change tracking: a partial
/// change record lists the `SubgroupId`s that differ between two snapshots.
/// Ids are indices into the molecule's subgroup list and are dense from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubgroupId(pub u32);

/// Identifier of a molecule group within a forcefield topology.
///
/// A single-group forcefield has exactly one group; a two-group forcefield
/// has two disjoint sides whose mutual interaction is the quantity of
/// interest. Operations referencing a group the topology does not have fail
/// with `FfError::InvalidGroup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

impl SubgroupId {
    /// The subgroup's position in its molecule's subgroup list.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MoleculeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "molecule:{}", self.0)
    }
}

impl fmt::Display for SubgroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subgroup:{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group:{}", self.0)
    }
}
