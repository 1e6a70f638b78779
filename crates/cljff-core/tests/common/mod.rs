use cljff::core::forcefield::params::LjParams;
use cljff::core::models::ids::MoleculeId;
use cljff::core::models::molecule::{Molecule, Property};
use nalgebra::Point3;

/// A rigid three-site molecule in a single subgroup, loosely water-shaped.
pub fn water_like(id: u64, origin: [f64; 3]) -> Molecule {
    let [x, y, z] = origin;
    let mut mol = Molecule::new(
        MoleculeId(id),
        vec![vec![
            Point3::new(x, y, z),
            Point3::new(x + 0.96, y, z),
            Point3::new(x - 0.24, y + 0.93, z),
        ]],
    );
    mol.set_property("charges", Property::Charges(vec![vec![-0.82, 0.41, 0.41]]));
    mol.set_property(
        "lj",
        Property::LennardJones(vec![vec![
            LjParams::new(3.15, 0.152),
            LjParams::new(0.4, 0.046),
            LjParams::new(0.4, 0.046),
        ]]),
    );
    mol
}

/// A multi-subgroup molecule: `n_subgroups` rigid pairs of atoms strung out
/// along x, with deterministic per-atom charges and LJ wells.
pub fn chain(id: u64, n_subgroups: usize, origin: [f64; 3]) -> Molecule {
    let [x, y, z] = origin;
    let mut subgroups = Vec::with_capacity(n_subgroups);
    let mut charges = Vec::with_capacity(n_subgroups);
    let mut ljs = Vec::with_capacity(n_subgroups);

    for i in 0..n_subgroups {
        let base = x + 3.0 * i as f64;
        subgroups.push(vec![
            Point3::new(base, y, z),
            Point3::new(base + 1.2, y + 0.4, z),
        ]);
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        charges.push(vec![0.3 * sign, -0.2 * sign]);
        ljs.push(vec![
            LjParams::new(3.0, 0.05 + 0.01 * i as f64),
            LjParams::new(2.6, 0.03),
        ]);
    }

    let mut mol = Molecule::new(MoleculeId(id), subgroups);
    mol.set_property("charges", Property::Charges(charges));
    mol.set_property("lj", Property::LennardJones(ljs));
    mol
}
