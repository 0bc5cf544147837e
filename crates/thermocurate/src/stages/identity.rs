//! Filters on the identity of the measured components and substances.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Result;
use crate::schema::{
    FilterByNComponentsSchema, FilterBySmilesSchema, FilterBySmirksSchema,
    FilterBySubstancesSchema, StageKind, StageSchema,
};
use crate::table::{MeasurementTable, Substance};
use crate::toolkit::{SubstructureMatcher, Toolkit};

use super::{Stage, filter_rows, schema_mismatch};

/// Keep or drop rows by the SMILES of their components.
pub fn filter_by_smiles(table: &MeasurementTable, schema: &FilterBySmilesSchema) -> MeasurementTable {
    if let Some(excluded) = &schema.smiles_to_exclude {
        let excluded: HashSet<&str> = excluded.iter().map(String::as_str).collect();
        return table.retain(|row| !row.component_smiles().any(|s| excluded.contains(s)));
    }

    let included: HashSet<&str> = schema
        .smiles_to_include
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();

    if schema.allow_partial_inclusion {
        table.retain(|row| row.component_smiles().any(|s| included.contains(s)))
    } else {
        table.retain(|row| row.component_smiles().all(|s| included.contains(s)))
    }
}

/// Keep or drop rows by whether their components match substructure patterns.
pub fn filter_by_smirks<M>(
    table: &MeasurementTable,
    schema: &FilterBySmirksSchema,
    matcher: &M,
    n_processes: usize,
) -> Result<MeasurementTable>
where
    M: SubstructureMatcher + ?Sized,
{
    let (patterns, exclude) = match (&schema.smirks_to_include, &schema.smirks_to_exclude) {
        (_, Some(patterns)) => (patterns.as_slice(), true),
        (Some(patterns), None) => (patterns.as_slice(), false),
        (None, None) => (&[][..], false),
    };

    filter_rows(table, n_processes, |row| {
        let mut matched = Vec::with_capacity(row.n_components());
        for smiles in row.component_smiles() {
            matched.push(!matcher.find_matches(smiles, patterns)?.is_empty());
        }

        Ok(if exclude {
            !matched.iter().any(|m| *m)
        } else if schema.allow_partial_inclusion {
            matched.iter().any(|m| *m)
        } else {
            matched.iter().all(|m| *m)
        })
    })
}

/// Keep or drop rows by their whole substance, ignoring component order.
pub fn filter_by_substances(
    table: &MeasurementTable,
    schema: &FilterBySubstancesSchema,
) -> MeasurementTable {
    match (&schema.substances_to_include, &schema.substances_to_exclude) {
        (_, Some(excluded)) => {
            let excluded: HashSet<&Substance> = excluded.iter().collect();
            table.retain(|row| !excluded.contains(&row.substance()))
        }
        (Some(included), None) => {
            let included: HashSet<&Substance> = included.iter().collect();
            table.retain(|row| included.contains(&row.substance()))
        }
        (None, None) => table.clone(),
    }
}

/// Keep rows measured for one of the configured numbers of components.
pub fn filter_by_n_components(
    table: &MeasurementTable,
    schema: &FilterByNComponentsSchema,
) -> MeasurementTable {
    table.retain(|row| schema.n_components.contains(&row.n_components()))
}

/// The `FilterBySmiles` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmilesFilter;

impl Stage for SmilesFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterBySmiles
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        _n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterBySmiles(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        Ok(filter_by_smiles(table, schema))
    }
}

/// The `FilterBySmirks` stage.
pub struct SmirksFilter {
    toolkit: Arc<dyn Toolkit>,
}

impl SmirksFilter {
    pub fn new(toolkit: Arc<dyn Toolkit>) -> Self {
        Self { toolkit }
    }
}

impl Stage for SmirksFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterBySmirks
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterBySmirks(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        filter_by_smirks(table, schema, self.toolkit.as_ref(), n_processes)
    }
}

/// The `FilterBySubstances` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstancesFilter;

impl Stage for SubstancesFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterBySubstances
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        _n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterBySubstances(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        Ok(filter_by_substances(table, schema))
    }
}

/// The `FilterByNComponents` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NComponentsFilter;

impl Stage for NComponentsFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterByNComponents
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        _n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterByNComponents(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        Ok(filter_by_n_components(table, schema))
    }
}
