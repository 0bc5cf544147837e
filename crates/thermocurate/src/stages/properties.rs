//! Filter on the measured property types.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use crate::error::Result;
use crate::schema::{
    FilterByPropertyTypesSchema, FilterBySmilesSchema, FilterBySubstancesSchema, StageKind,
    StageSchema,
};
use crate::table::{MeasurementTable, Substance};

use super::identity::{filter_by_smiles, filter_by_substances};
use super::{Stage, schema_mismatch};

/// Keep the requested property columns and the rows measured for them.
///
/// Rows of a property type listed in `n_components` must have one of the
/// given component counts. In strict mode, only substances with data for
/// every requested property type (per component count) are kept. Property
/// columns left without any value are removed.
pub fn filter_by_property_types(
    table: &MeasurementTable,
    schema: &FilterByPropertyTypesSchema,
) -> MeasurementTable {
    let requested: HashSet<&str> = schema.property_types.iter().map(String::as_str).collect();

    let mut filtered = table
        .select_properties(&requested)
        .retain(|row| !row.values.is_empty());

    for (property_type, n_components) in &schema.n_components {
        if !filtered.has_property(property_type) {
            continue;
        }

        filtered = filtered.retain(|row| {
            !row.has_value(property_type) || n_components.contains(&row.n_components())
        });
    }

    if schema.strict {
        filtered = filter_by_coverage(&filtered, schema);
    }

    filtered.prune_empty_properties()
}

/// Property types each substance must be measured for, keyed by component
/// count.
fn required_property_types<'a>(
    table: &MeasurementTable,
    schema: &'a FilterByPropertyTypesSchema,
) -> BTreeMap<usize, Vec<&'a str>> {
    let mut required: BTreeMap<usize, Vec<&str>> = BTreeMap::new();

    if schema.n_components.is_empty() {
        if let Some((min, max)) = table.n_components_range() {
            for n_components in min..=max {
                required.insert(
                    n_components,
                    schema.property_types.iter().map(String::as_str).collect(),
                );
            }
        }
    } else {
        for (property_type, n_components) in &schema.n_components {
            for n in n_components {
                required.entry(*n).or_default().push(property_type.as_str());
            }
        }
    }

    required
}

fn filter_by_coverage(
    table: &MeasurementTable,
    schema: &FilterByPropertyTypesSchema,
) -> MeasurementTable {
    let required = required_property_types(table, schema);

    let mut substances_with_data: BTreeSet<Substance> = BTreeSet::new();
    let mut components_with_data: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();

    for (&n_components, property_types) in &required {
        let rows: Vec<_> = table
            .iter()
            .filter(|row| row.n_components() == n_components)
            .collect();

        if rows.is_empty() {
            continue;
        }

        let present = property_types
            .iter()
            .filter(|property_type| table.has_property(property_type))
            .count();

        if present != property_types.len() {
            debug!(
                n_components,
                "Not every required property type has a column; skipping."
            );
            continue;
        }

        let covered = property_types
            .iter()
            .map(|property_type| {
                rows.iter()
                    .filter(|row| row.has_value(property_type))
                    .map(|row| row.substance())
                    .collect::<BTreeSet<Substance>>()
            })
            .reduce(|covered, substances| &covered & &substances)
            .unwrap_or_default();

        components_with_data.insert(
            n_components,
            covered
                .iter()
                .flat_map(|substance| substance.smiles().iter().cloned())
                .collect(),
        );
        substances_with_data.extend(covered);
    }

    let mut filtered = table.clone();

    if !schema.n_components.is_empty() {
        // Only components measured for every restricted component count.
        let shared = components_with_data
            .into_values()
            .reduce(|shared, components| &shared & &components)
            .unwrap_or_default();

        filtered = filter_by_smiles(&filtered, &FilterBySmilesSchema::include(shared));
    }

    filter_by_substances(
        &filtered,
        &FilterBySubstancesSchema::include(substances_with_data),
    )
}

/// The `FilterByPropertyTypes` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyTypesFilter;

impl Stage for PropertyTypesFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterByPropertyTypes
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        _n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterByPropertyTypes(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        Ok(filter_by_property_types(table, schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Component, Measurement};

    fn row(smiles: &[&str], property_type: &str) -> Measurement {
        let mole_fraction = 1.0 / smiles.len() as f64;
        smiles.iter().fold(
            Measurement::new(298.15, 101.325).with_value(property_type, 1.0, Some(0.1)),
            |row, s| row.with_component(Component::new(*s, mole_fraction)),
        )
    }

    fn table(rows: Vec<Measurement>) -> MeasurementTable {
        MeasurementTable::from_rows(
            [
                ("Density", "g / ml"),
                ("EnthalpyOfMixing", "kJ / mol"),
                ("EnthalpyOfVaporization", "kJ / mol"),
            ],
            rows,
        )
        .unwrap()
    }

    fn schema(property_types: &[&str]) -> FilterByPropertyTypesSchema {
        FilterByPropertyTypesSchema::new(property_types.iter().copied()).unwrap()
    }

    #[test]
    fn test_unrequested_columns_and_rows_are_dropped() {
        let table = table(vec![
            row(&["O"], "Density"),
            row(&["O"], "EnthalpyOfVaporization"),
            row(&["CCO", "O"], "EnthalpyOfMixing"),
        ]);

        let filtered = filter_by_property_types(&table, &schema(&["Density", "EnthalpyOfMixing"]));

        assert_eq!(filtered.len(), 2);
        assert_eq!(
            filtered.property_types().collect::<Vec<_>>(),
            vec!["Density", "EnthalpyOfMixing"]
        );
    }

    #[test]
    fn test_empty_columns_are_pruned() {
        let table = table(vec![row(&["O"], "Density")]);
        let filtered = filter_by_property_types(&table, &schema(&["Density", "EnthalpyOfMixing"]));

        assert_eq!(filtered.len(), 1);
        assert!(!filtered.has_property("EnthalpyOfMixing"));
    }

    #[test]
    fn test_n_components_only_restricts_its_property_type() {
        let table = table(vec![
            row(&["O"], "Density"),
            row(&["CCO", "O"], "Density"),
            row(&["CCO", "O"], "EnthalpyOfMixing"),
        ]);

        let filtered = filter_by_property_types(
            &table,
            &schema(&["Density", "EnthalpyOfMixing"])
                .with_n_components("Density", [1])
                .unwrap(),
        );

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.count_property("Density"), 1);
        assert_eq!(filtered.count_property("EnthalpyOfMixing"), 1);
    }

    #[test]
    fn test_strict_requires_every_property_type() {
        let table = table(vec![
            row(&["A"], "Density"),
            row(&["B"], "Density"),
            row(&["A"], "EnthalpyOfMixing"),
        ]);

        let filtered = filter_by_property_types(
            &table,
            &schema(&["Density", "EnthalpyOfMixing"]).with_strict(true),
        );

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.substance() == Substance::new(["A"])));
    }

    #[test]
    fn test_strict_with_component_counts() {
        let table = table(vec![
            row(&["A"], "Density"),
            row(&["B"], "Density"),
            row(&["C"], "Density"),
            row(&["A", "B"], "EnthalpyOfMixing"),
            row(&["A", "D"], "EnthalpyOfMixing"),
        ]);

        let filtered = filter_by_property_types(
            &table,
            &schema(&["Density", "EnthalpyOfMixing"])
                .with_n_components("Density", [1])
                .unwrap()
                .with_n_components("EnthalpyOfMixing", [2])
                .unwrap()
                .with_strict(true),
        );

        // D has no pure data and C appears in no mixture.
        let substances: Vec<Substance> = filtered.substances().into_iter().collect();
        assert_eq!(
            substances,
            vec![
                Substance::new(["A"]),
                Substance::new(["B"]),
                Substance::new(["A", "B"]),
            ]
        );
    }

    #[test]
    fn test_strict_skips_counts_without_columns() {
        let table = MeasurementTable::from_rows(
            [("Density", "g / ml")],
            vec![row(&["A"], "Density"), row(&["B"], "Density")],
        )
        .unwrap();

        let filtered = filter_by_property_types(
            &table,
            &schema(&["Density", "EnthalpyOfMixing"]).with_strict(true),
        );

        assert!(filtered.is_empty());
    }
}
