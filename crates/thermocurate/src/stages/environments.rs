//! Filter on the chemical environments (functional groups) of each component.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::schema::{FilterByEnvironmentsSchema, StageKind, StageSchema};
use crate::table::{Measurement, MeasurementTable};
use crate::toolkit::{ChemicalEnvironment, EnvironmentClassifier, FunctionalGroups, Toolkit};

use super::{Stage, assignment::maximum_weight_assignment, filter_rows, schema_mismatch};

/// Whether a component's functional groups satisfy a list of target
/// environments.
///
/// With `strict`, every environment of the component must be a target;
/// otherwise one shared environment is enough.
fn satisfies(groups: &FunctionalGroups, targets: &[ChemicalEnvironment], strict: bool) -> bool {
    if strict {
        groups.keys().all(|e| targets.contains(e))
    } else {
        groups.keys().any(|e| targets.contains(e))
    }
}

/// Classify every component of a row, or `None` if any of them cannot be.
fn classify_components<C>(row: &Measurement, classifier: &C) -> Option<Vec<FunctionalGroups>>
where
    C: EnvironmentClassifier + ?Sized,
{
    row.component_smiles()
        .map(|smiles| {
            let groups = classifier.functional_groups(smiles);
            if groups.is_none() {
                info!(
                    smiles,
                    "Could not classify the functional groups of a component; rejecting the row."
                );
            }
            groups
        })
        .collect()
}

/// Whether the components can be paired one-to-one with the per-position
/// target lists so that every pair is satisfied.
fn has_perfect_assignment(
    components: &[FunctionalGroups],
    target_lists: &[Vec<ChemicalEnvironment>],
    strict: bool,
) -> bool {
    let weights: Vec<Vec<f64>> = components
        .iter()
        .map(|groups| {
            target_lists
                .iter()
                .map(|targets| if satisfies(groups, targets, strict) { 1.0 } else { 0.0 })
                .collect()
        })
        .collect();

    let pairs = maximum_weight_assignment(&weights);
    pairs.len() == components.len() && pairs.iter().all(|(i, j)| weights[*i][*j] > 0.0)
}

/// Keep rows whose components sit in the configured chemical environments.
///
/// In the unordered mode every component must satisfy the shared environment
/// list. In the per-position mode an `n`-component row must admit an
/// assignment of its components to the `n` target lists where every pair is
/// satisfied; rows with a component count absent from the map pass untouched.
/// A component the classifier cannot handle rejects its row.
pub fn filter_by_environments<C>(
    table: &MeasurementTable,
    schema: &FilterByEnvironmentsSchema,
    classifier: &C,
    n_processes: usize,
) -> Result<MeasurementTable>
where
    C: EnvironmentClassifier + ?Sized,
{
    let strict = schema.strictly_specified_environments;

    if let Some(per_component) = &schema.per_component_environments {
        return filter_rows(table, n_processes, |row| {
            let Some(target_lists) = per_component.get(&row.n_components()) else {
                return Ok(true);
            };
            let Some(components) = classify_components(row, classifier) else {
                return Ok(false);
            };
            Ok(has_perfect_assignment(&components, target_lists, strict))
        });
    }

    let targets = schema.environments.as_deref().unwrap_or_default();
    debug!(n_targets = targets.len(), strict, "Matching components against environments.");

    filter_rows(table, n_processes, |row| {
        let Some(components) = classify_components(row, classifier) else {
            return Ok(false);
        };
        Ok(components.iter().all(|groups| satisfies(groups, targets, strict)))
    })
}

/// The `FilterByEnvironments` stage.
pub struct EnvironmentsFilter {
    toolkit: Arc<dyn Toolkit>,
}

impl EnvironmentsFilter {
    pub fn new(toolkit: Arc<dyn Toolkit>) -> Self {
        Self { toolkit }
    }
}

impl Stage for EnvironmentsFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterByEnvironments
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterByEnvironments(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        filter_by_environments(table, schema, self.toolkit.as_ref(), n_processes)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::table::Component;
    use crate::toolkit::{AnnotatedToolkit, MoleculeAnnotation};

    use ChemicalEnvironment::{Aldehyde, Aqueous, Carbonyl, Ketone};

    const DIKETONE: &str = "CC(=O)CC=O";

    fn groups(environments: &[ChemicalEnvironment]) -> FunctionalGroups {
        environments.iter().map(|e| (*e, 1)).collect()
    }

    fn toolkit(diketone: &[ChemicalEnvironment]) -> AnnotatedToolkit {
        AnnotatedToolkit::new()
            .with_annotation(
                "C",
                MoleculeAnnotation::new().with_environments(groups(&[ChemicalEnvironment::Alkane])),
            )
            .with_annotation(
                DIKETONE,
                MoleculeAnnotation::new().with_environments(groups(diketone)),
            )
    }

    fn row(smiles: &[&str]) -> Measurement {
        let mole_fraction = 1.0 / smiles.len() as f64;
        smiles.iter().fold(
            Measurement::new(298.15, 101.325).with_value("Density", 1.0, None),
            |row, s| row.with_component(Component::new(*s, mole_fraction)),
        )
    }

    fn table() -> MeasurementTable {
        MeasurementTable::from_rows(
            [("Density", "g / ml")],
            vec![
                row(&["O"]),
                row(&["C"]),
                row(&["C", "O"]),
                row(&["O", DIKETONE]),
                row(&[DIKETONE, "O"]),
            ],
        )
        .unwrap()
    }

    fn per_component(
        entries: Vec<(usize, Vec<Vec<ChemicalEnvironment>>)>,
    ) -> BTreeMap<usize, Vec<Vec<ChemicalEnvironment>>> {
        entries.into_iter().collect()
    }

    #[test]
    fn test_unordered_environments() {
        let toolkit = toolkit(&[Aldehyde, Ketone, Carbonyl]);
        let table = table();

        let schema = FilterByEnvironmentsSchema::environments([Aqueous]);
        let aqueous = filter_by_environments(&table, &schema, &toolkit, 1).unwrap();
        assert_eq!(aqueous.len(), 1);

        let schema = FilterByEnvironmentsSchema::environments([Aqueous, Aldehyde]);
        let any = filter_by_environments(&table, &schema, &toolkit, 2).unwrap();
        assert_eq!(any.len(), 3);

        let strict = filter_by_environments(&table, &schema.strictly_specified(), &toolkit, 1).unwrap();
        assert_eq!(strict.len(), 1);
        assert_eq!(strict.rows()[0].components[0].smiles, "O");
    }

    #[test]
    fn test_per_component_environments() {
        let toolkit = toolkit(&[Aldehyde, Ketone, Carbonyl]);
        let table = table();

        let schema = FilterByEnvironmentsSchema::per_component(per_component(vec![
            (1, vec![vec![Aqueous]]),
            (2, vec![vec![Aqueous], vec![Aqueous]]),
        ]))
        .unwrap();
        assert_eq!(filter_by_environments(&table, &schema, &toolkit, 1).unwrap().len(), 1);

        let schema = FilterByEnvironmentsSchema::per_component(per_component(vec![(2, vec![vec![Aldehyde], vec![Aqueous]])])).unwrap();
        let any = filter_by_environments(&table, &schema, &toolkit, 1).unwrap();
        assert_eq!(any.len(), 4);

        let strict = filter_by_environments(&table, &schema.strictly_specified(), &toolkit, 1).unwrap();
        assert_eq!(strict.len(), 2);
        assert_eq!(strict.max_n_components(), 1);

        let schema = FilterByEnvironmentsSchema::per_component(per_component(vec![(
            2,
            vec![vec![Aldehyde, Ketone, Carbonyl], vec![Aqueous]],
        )]))
        .unwrap()
        .strictly_specified();
        assert_eq!(filter_by_environments(&table, &schema, &toolkit, 1).unwrap().len(), 4);
    }

    #[test]
    fn test_assignment_ignores_component_order() {
        // Classified as a plain aldehyde so the strict quantifier can hold.
        let toolkit = toolkit(&[Aldehyde]);
        let table = MeasurementTable::from_rows(
            [("Density", "g / ml")],
            vec![row(&[DIKETONE, "O"]), row(&["O", DIKETONE])],
        )
        .unwrap();

        let matched = FilterByEnvironmentsSchema::per_component(per_component(vec![(2, vec![vec![Aldehyde], vec![Aqueous]])]))
            .unwrap()
            .strictly_specified();
        assert_eq!(filter_by_environments(&table, &matched, &toolkit, 1).unwrap().len(), 2);

        let unmatched = FilterByEnvironmentsSchema::per_component(per_component(vec![(2, vec![vec![Aqueous], vec![Aqueous]])]))
            .unwrap()
            .strictly_specified();
        assert!(filter_by_environments(&table, &unmatched, &toolkit, 1).unwrap().is_empty());
    }

    #[test]
    fn test_unclassified_component_rejects_row() {
        let toolkit = toolkit(&[Aldehyde]);
        let table = MeasurementTable::from_rows(
            [("Density", "g / ml")],
            vec![row(&["O"]), row(&["O", "CCCCO"])],
        )
        .unwrap();

        let schema = FilterByEnvironmentsSchema::environments(ChemicalEnvironment::ALL.iter().copied());
        let filtered = filter_by_environments(&table, &schema, &toolkit, 1).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.rows()[0].n_components(), 1);
    }
}
