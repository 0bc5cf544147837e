//! Order-independent substance identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The set of component SMILES making up a measured system, independent of
/// the amounts and of the order the components were recorded in.
///
/// The SMILES are stored sorted, so two substances compare equal whenever they
/// contain the same components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Substance(Vec<String>);

impl Substance {
    /// Create a substance from component SMILES in any order.
    pub fn new<I, S>(smiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut smiles: Vec<String> = smiles.into_iter().map(Into::into).collect();
        smiles.sort();
        Self(smiles)
    }

    /// The sorted component SMILES.
    pub fn smiles(&self) -> &[String] {
        &self.0
    }

    /// Number of components in the substance.
    pub fn n_components(&self) -> usize {
        self.0.len()
    }

    /// Whether one of the components has the given SMILES.
    pub fn contains(&self, smiles: &str) -> bool {
        self.0.iter().any(|s| s == smiles)
    }
}

impl From<Vec<String>> for Substance {
    fn from(smiles: Vec<String>) -> Self {
        Self::new(smiles)
    }
}

impl From<Substance> for Vec<String> {
    fn from(substance: Substance) -> Self {
        substance.0
    }
}

impl fmt::Display for Substance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substance_is_order_independent() {
        assert_eq!(Substance::new(["O", "CCO"]), Substance::new(["CCO", "O"]));
        assert_eq!(Substance::new(["O", "CCO"]).smiles(), &["CCO", "O"]);
    }

    #[test]
    fn test_substance_deserializes_unsorted() {
        let substance: Substance = serde_json::from_str(r#"["O", "CCO"]"#).unwrap();
        assert_eq!(substance, Substance::new(["CCO", "O"]));
        assert_eq!(substance.to_string(), "CCO + O");
    }
}
