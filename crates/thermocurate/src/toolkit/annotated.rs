//! A toolkit backed by precomputed molecule annotations.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::environment::{builtin_functional_groups, parse_checkmol_output};
use super::{
    EnvironmentClassifier, FunctionalGroups, MoleculeInspector, SubstructureMatch,
    SubstructureMatcher, ToolkitError,
};

/// Everything known about one molecule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoleculeAnnotation {
    /// Element symbols, hydrogens included.
    #[serde(default)]
    pub elements: BTreeSet<String>,

    /// Net formal charge.
    #[serde(default)]
    pub formal_charge: i32,

    /// Whether any stereochemistry is left undefined.
    #[serde(default)]
    pub undefined_stereochemistry: bool,

    /// Functional groups. `None` marks a molecule the classifier rejects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environments: Option<FunctionalGroups>,

    /// Raw `checkmol -p` output, used when `environments` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkmol: Option<String>,

    /// Pattern -> atom-index matches of that pattern.
    #[serde(default)]
    pub matches: BTreeMap<String, Vec<SubstructureMatch>>,
}

impl MoleculeAnnotation {
    /// Create an empty annotation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the elements.
    pub fn with_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements = elements.into_iter().map(Into::into).collect();
        self
    }

    /// Set the net formal charge.
    pub fn with_formal_charge(mut self, formal_charge: i32) -> Self {
        self.formal_charge = formal_charge;
        self
    }

    /// Mark the stereochemistry as undefined.
    pub fn with_undefined_stereochemistry(mut self) -> Self {
        self.undefined_stereochemistry = true;
        self
    }

    /// Set the functional groups.
    pub fn with_environments(mut self, environments: FunctionalGroups) -> Self {
        self.environments = Some(environments);
        self
    }

    /// Record a single match of a pattern.
    pub fn with_match(mut self, pattern: impl Into<String>, atoms: SubstructureMatch) -> Self {
        self.matches.entry(pattern.into()).or_default().push(atoms);
        self
    }
}

/// Implements every toolkit interface by looking molecules up in a table of
/// annotations keyed by SMILES.
///
/// Water and ammonia are classified without annotations. Any other molecule
/// the table does not know is unclassifiable, and inspecting it is an error.
#[derive(Debug, Clone, Default)]
pub struct AnnotatedToolkit {
    annotations: HashMap<String, MoleculeAnnotation>,
}

impl AnnotatedToolkit {
    /// Create a toolkit with no annotations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the annotation of a molecule.
    pub fn with_annotation(mut self, smiles: impl Into<String>, annotation: MoleculeAnnotation) -> Self {
        self.insert(smiles, annotation);
        self
    }

    /// Add or replace the annotation of a molecule.
    pub fn insert(&mut self, smiles: impl Into<String>, annotation: MoleculeAnnotation) {
        self.annotations.insert(smiles.into(), annotation);
    }

    /// Parse annotations from a JSON object of `smiles -> annotation`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let annotations: HashMap<String, MoleculeAnnotation> = serde_json::from_str(json)?;
        Ok(Self { annotations })
    }

    /// Load annotations from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ToolkitError> {
        let path = path.as_ref();
        let failed = |reason: String| ToolkitError::Annotations {
            path: path.to_path_buf(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
        let toolkit = Self::from_json(&contents).map_err(|e| failed(e.to_string()))?;

        debug!(path = %path.display(), molecules = toolkit.len(), "Loaded molecule annotations");
        Ok(toolkit)
    }

    /// The annotation of a molecule, if any.
    pub fn annotation(&self, smiles: &str) -> Option<&MoleculeAnnotation> {
        self.annotations.get(smiles)
    }

    /// Number of annotated molecules.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether no molecule is annotated.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    fn require(&self, smiles: &str) -> Result<&MoleculeAnnotation, ToolkitError> {
        self.annotations
            .get(smiles)
            .ok_or_else(|| ToolkitError::UnknownMolecule {
                smiles: smiles.to_string(),
            })
    }
}

impl EnvironmentClassifier for AnnotatedToolkit {
    fn functional_groups(&self, smiles: &str) -> Option<FunctionalGroups> {
        if let Some(groups) = builtin_functional_groups(smiles) {
            return Some(groups);
        }

        let annotation = self.annotations.get(smiles)?;

        if let Some(environments) = &annotation.environments {
            return Some(environments.clone());
        }

        let output = annotation.checkmol.as_deref()?;
        match parse_checkmol_output(output) {
            Ok(groups) => Some(groups),
            Err(e) => {
                debug!(smiles, error = %e, "Could not interpret checkmol output");
                None
            }
        }
    }
}

impl SubstructureMatcher for AnnotatedToolkit {
    fn find_matches(
        &self,
        smiles: &str,
        patterns: &[String],
    ) -> Result<BTreeSet<SubstructureMatch>, ToolkitError> {
        let annotation = self.require(smiles)?;

        Ok(patterns
            .iter()
            .filter_map(|pattern| annotation.matches.get(pattern))
            .flatten()
            .cloned()
            .collect())
    }
}

impl MoleculeInspector for AnnotatedToolkit {
    fn elements(&self, smiles: &str) -> Result<BTreeSet<String>, ToolkitError> {
        let annotation = self.require(smiles)?;

        if annotation.elements.is_empty() {
            return Err(ToolkitError::InvalidMolecule {
                smiles: smiles.to_string(),
                reason: "no elements annotated".to_string(),
            });
        }

        Ok(annotation.elements.clone())
    }

    fn has_undefined_stereochemistry(&self, smiles: &str) -> Result<bool, ToolkitError> {
        Ok(self.require(smiles)?.undefined_stereochemistry)
    }

    fn net_formal_charge(&self, smiles: &str) -> Result<i32, ToolkitError> {
        Ok(self.require(smiles)?.formal_charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::ChemicalEnvironment;

    const ANNOTATIONS: &str = r##"{
        "CCO": {
            "elements": ["C", "H", "O"],
            "environments": {"Alcohol": 1, "PrimaryAlcohol": 1},
            "matches": {"[#8]": [[2]]}
        },
        "CC=O": {
            "elements": ["C", "H", "O"],
            "checkmol": "#003:1:1,2\n#004:1:1,2\n"
        },
        "[Cl-]": {"elements": ["Cl"], "formal_charge": -1},
        "FC(Cl)Br": {"elements": ["Br", "C", "Cl", "F", "H"], "undefined_stereochemistry": true}
    }"##;

    #[test]
    fn test_from_json() {
        let toolkit = AnnotatedToolkit::from_json(ANNOTATIONS).unwrap();
        assert_eq!(toolkit.len(), 4);
        assert_eq!(
            toolkit.elements("CCO").unwrap(),
            BTreeSet::from(["C".to_string(), "H".to_string(), "O".to_string()])
        );
        assert_eq!(toolkit.net_formal_charge("[Cl-]").unwrap(), -1);
        assert!(toolkit.has_undefined_stereochemistry("FC(Cl)Br").unwrap());
        assert!(!toolkit.has_undefined_stereochemistry("CCO").unwrap());
    }

    #[test]
    fn test_functional_groups_sources() {
        let toolkit = AnnotatedToolkit::from_json(ANNOTATIONS).unwrap();

        let alcohol = toolkit.functional_groups("CCO").unwrap();
        assert!(alcohol.contains_key(&ChemicalEnvironment::Alcohol));

        let aldehyde = toolkit.functional_groups("CC=O").unwrap();
        assert!(aldehyde.contains_key(&ChemicalEnvironment::Aldehyde));
        assert!(aldehyde.contains_key(&ChemicalEnvironment::Carbonyl));

        assert!(toolkit.functional_groups("O").unwrap().contains_key(&ChemicalEnvironment::Aqueous));
        assert!(toolkit.functional_groups("c1ccccc1").is_none());
    }

    #[test]
    fn test_find_matches() {
        let toolkit = AnnotatedToolkit::from_json(ANNOTATIONS).unwrap();

        let oxygen = toolkit.find_matches("CCO", &["[#8]".to_string()]).unwrap();
        assert_eq!(oxygen.len(), 1);

        let nitrogen = toolkit.find_matches("CCO", &["[#7]".to_string()]).unwrap();
        assert!(nitrogen.is_empty());
    }

    #[test]
    fn test_unknown_molecule_is_an_error() {
        let toolkit = AnnotatedToolkit::new();
        assert!(matches!(
            toolkit.elements("CCO"),
            Err(ToolkitError::UnknownMolecule { .. })
        ));
        assert!(toolkit.find_matches("CCO", &[]).is_err());
    }

    #[test]
    fn test_builder() {
        let toolkit = AnnotatedToolkit::new().with_annotation(
            "CCO",
            MoleculeAnnotation::new()
                .with_elements(["C", "H", "O"])
                .with_match("[#6]", vec![0])
                .with_match("[#6]", vec![1]),
        );

        let carbons = toolkit.find_matches("CCO", &["[#6]".to_string()]).unwrap();
        assert_eq!(carbons.len(), 2);
    }
}
