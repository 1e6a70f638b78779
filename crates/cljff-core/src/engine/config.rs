use crate::core::forcefield::params::CombiningRule;
use crate::core::space::switching::{HarmonicSwitch, NoCutoff, SwitchingFunction};
use crate::core::space::{Cartesian, Cuboid, Space};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Boundary conditions of the simulation volume.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Boundary {
    /// Open, infinite volume.
    Open,
    /// Orthorhombic periodic box with the given side lengths in Angstroms.
    Cuboid { lengths: [f64; 3] },
}

/// Forcefield-wide settings: cutoff geometry, dielectric, and combining rule.
///
/// A settings value is always valid once obtained through the builder or
/// `load`; the `space()` and `switching()` accessors hand the assembled
/// geometry providers to the forcefield constructors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FfSettings {
    /// Interaction cutoff in Angstroms; `None` disables the cutoff entirely.
    pub cutoff: Option<f64>,
    /// Width of the harmonic feathering region below the cutoff.
    pub feather: f64,
    /// Relative dielectric constant for the Coulomb component.
    pub dielectric: f64,
    pub combining_rule: CombiningRule,
    pub boundary: Boundary,
}

impl Default for FfSettings {
    fn default() -> Self {
        Self {
            cutoff: None,
            feather: 0.5,
            dielectric: 1.0,
            combining_rule: CombiningRule::default(),
            boundary: Boundary::Open,
        }
    }
}

impl FfSettings {
    pub fn builder() -> FfSettingsBuilder {
        FfSettingsBuilder::default()
    }

    /// Loads and validates settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let settings: FfSettings =
            toml::from_str(&content).map_err(|e| SettingsError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(cutoff) = self.cutoff {
            if !cutoff.is_finite() || cutoff <= 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "cutoff must be a positive finite distance, got {cutoff}"
                )));
            }
            if self.feather < 0.0 || self.feather > cutoff {
                return Err(SettingsError::Invalid(format!(
                    "feather width must lie in [0, cutoff], got {} against cutoff {cutoff}",
                    self.feather
                )));
            }
        }
        if !self.dielectric.is_finite() || self.dielectric <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "dielectric must be positive, got {}",
                self.dielectric
            )));
        }
        if let Boundary::Cuboid { lengths } = self.boundary {
            if lengths.iter().any(|&l| !l.is_finite() || l <= 0.0) {
                return Err(SettingsError::Invalid(format!(
                    "periodic box lengths must be positive, got {lengths:?}"
                )));
            }
            if let Some(cutoff) = self.cutoff {
                let half_min = 0.5 * lengths.iter().cloned().fold(f64::INFINITY, f64::min);
                if cutoff > half_min {
                    return Err(SettingsError::Invalid(format!(
                        "cutoff {cutoff} exceeds half the smallest box length {half_min}; \
                         the minimum-image convention would miss nearer images"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn space(&self) -> Box<dyn Space> {
        match self.boundary {
            Boundary::Open => Box::new(Cartesian),
            Boundary::Cuboid { lengths } => {
                Box::new(Cuboid::new(lengths[0], lengths[1], lengths[2]))
            }
        }
    }

    pub fn switching(&self) -> Box<dyn SwitchingFunction> {
        match self.cutoff {
            None => Box::new(NoCutoff),
            Some(cutoff) => Box::new(HarmonicSwitch::new(cutoff, self.feather)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FfSettingsBuilder {
    settings: FfSettings,
}

impl FfSettingsBuilder {
    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.settings.cutoff = Some(cutoff);
        self
    }

    pub fn no_cutoff(mut self) -> Self {
        self.settings.cutoff = None;
        self
    }

    pub fn feather(mut self, feather: f64) -> Self {
        self.settings.feather = feather;
        self
    }

    pub fn dielectric(mut self, dielectric: f64) -> Self {
        self.settings.dielectric = dielectric;
        self
    }

    pub fn combining_rule(mut self, rule: CombiningRule) -> Self {
        self.settings.combining_rule = rule;
        self
    }

    pub fn open_boundary(mut self) -> Self {
        self.settings.boundary = Boundary::Open;
        self
    }

    pub fn periodic(mut self, lx: f64, ly: f64, lz: f64) -> Self {
        self.settings.boundary = Boundary::Cuboid {
            lengths: [lx, ly, lz],
        };
        self
    }

    pub fn build(self) -> Result<FfSettings, SettingsError> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}
