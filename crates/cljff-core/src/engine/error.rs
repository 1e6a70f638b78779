use thiserror::Error;

use crate::core::models::ids::{GroupId, MoleculeId};
use crate::core::models::view::ViewError;

#[derive(Debug, Error)]
pub enum FfError {
    #[error("molecule {id} is incompatible with the stored state: {reason}")]
    IncompatibleMolecule { id: MoleculeId, reason: String },

    #[error("molecule {0} is not present in this forcefield")]
    MissingMolecule(MoleculeId),

    #[error("{0} does not exist in this forcefield topology")]
    InvalidGroup(GroupId),

    #[error(transparent)]
    View(#[from] ViewError),
}
