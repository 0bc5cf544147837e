//! Interfaces to the cheminformatics toolchain.
//!
//! The curation stages never interpret SMILES themselves. Everything they need
//! to know about a molecule comes through these traits:
//!
//! - [`EnvironmentClassifier`] assigns functional-group environments
//! - [`SubstructureMatcher`] matches SMARTS / SMIRKS patterns
//! - [`MoleculeInspector`] reports elements, stereochemistry and formal charge
//!
//! [`AnnotatedToolkit`] implements all three from precomputed annotations.

mod annotated;
mod environment;

pub use annotated::{AnnotatedToolkit, MoleculeAnnotation};
pub use environment::{ChemicalEnvironment, FunctionalGroups, parse_checkmol_output};

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a cheminformatics toolkit.
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// The toolkit has no information about a molecule.
    #[error("No information is available for molecule '{smiles}'")]
    UnknownMolecule { smiles: String },

    /// The toolkit could not interpret a SMILES string.
    #[error("Unable to interpret molecule '{smiles}': {reason}")]
    InvalidMolecule { smiles: String, reason: String },

    /// A substructure pattern could not be used.
    #[error("Invalid substructure pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Output from an external classifier could not be understood.
    #[error("Malformed classifier output '{line}': {reason}")]
    MalformedOutput { line: String, reason: String },

    /// An annotation file could not be loaded.
    #[error("Failed to load annotations from '{path}': {reason}")]
    Annotations { path: PathBuf, reason: String },
}

/// One match of a pattern against a molecule: the indices of the matched atoms.
pub type SubstructureMatch = Vec<usize>;

/// Classifies molecules into chemical environments.
pub trait EnvironmentClassifier: Send + Sync {
    /// The functional groups present in a molecule, or `None` when the
    /// molecule could not be classified.
    fn functional_groups(&self, smiles: &str) -> Option<FunctionalGroups>;
}

/// Finds substructure pattern matches in molecules.
pub trait SubstructureMatcher: Send + Sync {
    /// All matches of any of `patterns` in the molecule. An empty set means no
    /// pattern matched.
    fn find_matches(
        &self,
        smiles: &str,
        patterns: &[String],
    ) -> Result<BTreeSet<SubstructureMatch>, ToolkitError>;
}

/// Reports basic properties of a molecule.
pub trait MoleculeInspector: Send + Sync {
    /// Symbols of the elements making up the molecule, hydrogens included.
    fn elements(&self, smiles: &str) -> Result<BTreeSet<String>, ToolkitError>;

    /// Whether the molecule has any stereocenter or stereobond left undefined.
    fn has_undefined_stereochemistry(&self, smiles: &str) -> Result<bool, ToolkitError>;

    /// Sum of the formal charges of the molecule's atoms.
    fn net_formal_charge(&self, smiles: &str) -> Result<i32, ToolkitError>;
}

/// A toolkit providing every capability the curation stages need.
pub trait Toolkit: EnvironmentClassifier + SubstructureMatcher + MoleculeInspector {}

impl<T> Toolkit for T where T: EnvironmentClassifier + SubstructureMatcher + MoleculeInspector {}
