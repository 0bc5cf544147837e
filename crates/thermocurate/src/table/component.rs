//! Components of a measured system.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The role a component plays in the measured system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Solvent,
    Solute,
    Ligand,
    Receptor,
}

impl Role {
    /// The name used for this role in measurement files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Solvent => "Solvent",
            Role::Solute => "Solute",
            Role::Ligand => "Ligand",
            Role::Receptor => "Receptor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "solvent" => Ok(Role::Solvent),
            "solute" => Ok(Role::Solute),
            "ligand" => Ok(Role::Ligand),
            "receptor" => Ok(Role::Receptor),
            _ => Err(format!("Unknown component role: {}", s)),
        }
    }
}

/// A single chemical species within a measured substance.
///
/// Both amount fields are always present so that every row of a table shares
/// one shape; only one of them is meaningful for a given component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// SMILES representation of the species.
    pub smiles: String,
    /// Role of the species in the system.
    #[serde(default)]
    pub role: Role,
    /// Mole fraction of the species, in [0, 1].
    #[serde(default)]
    pub mole_fraction: f64,
    /// Exact number of molecules of the species.
    #[serde(default)]
    pub exact_amount: u32,
}

impl Component {
    /// Create a solvent component present as a mole fraction.
    pub fn new(smiles: impl Into<String>, mole_fraction: f64) -> Self {
        Self {
            smiles: smiles.into(),
            role: Role::Solvent,
            mole_fraction,
            exact_amount: 0,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the exact amount.
    pub fn with_exact_amount(mut self, exact_amount: u32) -> Self {
        self.exact_amount = exact_amount;
        self
    }
}
