//! Tunables for the derived-computation passes.
//!
//! Every struct deserializes from TOML with all fields optional, so a configuration
//! file only needs to name the values it changes:
//!
//! ```toml
//! [bonds]
//! ligand_radius = 3.5
//!
//! [secondary_structure]
//! mode = "geometry"
//! ```

use crate::ops::error::Error;
use serde::Deserialize;

/// Switches and limits for covalent bond inference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BondConfig {
    /// Residues with more atoms than this are skipped by the within-residue pass.
    pub max_residue_atoms: usize,
    /// Residues with more atoms than this use a k-d tree instead of all pairs.
    pub kdtree_threshold: usize,
    /// Search radius around ligand atoms for bonds into other residues, in Å.
    pub ligand_radius: f64,
    pub calculate_ligand_bonds: bool,
    pub calculate_rung_bonds: bool,
    /// Caches each residue type's bonds from its first instance after bonding.
    pub assign_residue_type_bonds: bool,
    /// Only adds the backbone and rung pseudo-bonds, leaving `bond_store` untouched.
    ///
    /// Meant for inputs whose connectivity is fully supplied by the source file.
    pub pseudo_bonds_only: bool,
    /// Treats an existing bond between two backbone atoms as proof of connection,
    /// even when the distance test fails.
    pub use_existing_bonds: bool,
}

impl Default for BondConfig {
    fn default() -> Self {
        Self {
            max_residue_atoms: 500,
            kdtree_threshold: 50,
            ligand_radius: 4.0,
            calculate_ligand_bonds: true,
            calculate_rung_bonds: true,
            assign_residue_type_bonds: true,
            pseudo_bonds_only: false,
            use_existing_bonds: false,
        }
    }
}

impl BondConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_residue_atoms(mut self, value: usize) -> Self {
        self.max_residue_atoms = value;
        self
    }

    pub fn kdtree_threshold(mut self, value: usize) -> Self {
        self.kdtree_threshold = value;
        self
    }

    pub fn ligand_radius(mut self, value: f64) -> Self {
        self.ligand_radius = value;
        self
    }

    pub fn calculate_ligand_bonds(mut self, value: bool) -> Self {
        self.calculate_ligand_bonds = value;
        self
    }

    pub fn calculate_rung_bonds(mut self, value: bool) -> Self {
        self.calculate_rung_bonds = value;
        self
    }

    pub fn assign_residue_type_bonds(mut self, value: bool) -> Self {
        self.assign_residue_type_bonds = value;
        self
    }

    pub fn pseudo_bonds_only(mut self, value: bool) -> Self {
        self.pseudo_bonds_only = value;
        self
    }

    pub fn use_existing_bonds(mut self, value: bool) -> Self {
        self.use_existing_bonds = value;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if !(self.ligand_radius.is_finite() && self.ligand_radius > 0.0) {
            return Err(Error::invalid_config(format!(
                "bonds.ligand_radius must be a positive number, got {}",
                self.ligand_radius
            )));
        }
        if self.max_residue_atoms == 0 {
            return Err(Error::invalid_config(
                "bonds.max_residue_atoms must be at least 1",
            ));
        }
        Ok(())
    }
}

/// How secondary structure is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondaryStructureMode {
    /// Annotation records when present, otherwise geometry unless residues already
    /// carry codes.
    #[default]
    Auto,
    Annotation,
    Geometry,
    Off,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecondaryStructureConfig {
    pub mode: SecondaryStructureMode,
}

impl SecondaryStructureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: SecondaryStructureMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymmetryConfig {
    /// Adds `UNITCELL` and `SUPERCELL` assemblies when the structure has a unit cell.
    pub build_unitcell: bool,
}

impl Default for SymmetryConfig {
    fn default() -> Self {
        Self {
            build_unitcell: true,
        }
    }
}

/// Top-level configuration consumed by [`process`](super::process).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessConfig {
    pub bonds: BondConfig,
    pub secondary_structure: SecondaryStructureConfig,
    pub symmetry: SymmetryConfig,
    /// Generates chain names when the input carries none.
    pub auto_chain_names: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            bonds: BondConfig::default(),
            secondary_structure: SecondaryStructureConfig::default(),
            symmetry: SymmetryConfig::default(),
            auto_chain_names: true,
        }
    }
}

impl ProcessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for syntax errors, unknown keys, values of the
    /// wrong type, and values outside their valid range.
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        let config: ProcessConfig =
            toml::from_str(source).map_err(|e| Error::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.bonds.validate()
    }

    pub fn bonds(mut self, bonds: BondConfig) -> Self {
        self.bonds = bonds;
        self
    }

    pub fn secondary_structure_mode(mut self, mode: SecondaryStructureMode) -> Self {
        self.secondary_structure.mode = mode;
        self
    }

    pub fn build_unitcell(mut self, value: bool) -> Self {
        self.symmetry.build_unitcell = value;
        self
    }

    pub fn auto_chain_names(mut self, value: bool) -> Self {
        self.auto_chain_names = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_toml_str_with_empty_input_returns_defaults() {
        let config = ProcessConfig::from_toml_str("").unwrap();
        assert_eq!(config, ProcessConfig::default());
        assert_eq!(config.bonds.max_residue_atoms, 500);
        assert_eq!(config.bonds.kdtree_threshold, 50);
        assert_eq!(config.secondary_structure.mode, SecondaryStructureMode::Auto);
        assert!(config.symmetry.build_unitcell);
    }

    #[test]
    fn from_toml_str_overrides_only_named_fields() {
        let config = ProcessConfig::from_toml_str(
            r#"
            auto_chain_names = false

            [bonds]
            ligand_radius = 3.5
            calculate_rung_bonds = false

            [secondary_structure]
            mode = "geometry"
            "#,
        )
        .unwrap();

        assert!(!config.auto_chain_names);
        assert_eq!(config.bonds.ligand_radius, 3.5);
        assert!(!config.bonds.calculate_rung_bonds);
        assert!(config.bonds.calculate_ligand_bonds);
        assert_eq!(
            config.secondary_structure.mode,
            SecondaryStructureMode::Geometry
        );
    }

    #[test]
    fn from_toml_str_rejects_unknown_keys() {
        let err = ProcessConfig::from_toml_str("[bonds]\nradius = 2.0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn from_toml_str_rejects_unknown_mode() {
        let err = ProcessConfig::from_toml_str("[secondary_structure]\nmode = \"dssp\"\n")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn from_toml_str_rejects_non_positive_ligand_radius() {
        let err = ProcessConfig::from_toml_str("[bonds]\nligand_radius = 0.0\n").unwrap_err();
        assert!(err.to_string().contains("ligand_radius"));
    }

    #[test]
    fn builder_setters_chain() {
        let config = ProcessConfig::new()
            .bonds(BondConfig::new().ligand_radius(3.0).use_existing_bonds(true))
            .secondary_structure_mode(SecondaryStructureMode::Off)
            .build_unitcell(false);

        assert_eq!(config.bonds.ligand_radius, 3.0);
        assert!(config.bonds.use_existing_bonds);
        assert_eq!(config.secondary_structure.mode, SecondaryStructureMode::Off);
        assert!(!config.symmetry.build_unitcell);
        assert!(config.validate().is_ok());
    }
}
