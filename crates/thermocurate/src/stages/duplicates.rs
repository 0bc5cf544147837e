//! Removal of repeated measurements of the same property at the same state.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::error::Result;
use crate::schema::{FilterDuplicatesSchema, StageKind, StageSchema};
use crate::table::{Measurement, MeasurementTable, Role};

use super::{Stage, schema_mismatch};

fn round(value: f64, precision: u32) -> i64 {
    (value * 10f64.powi(precision as i32)).round() as i64
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct ComponentKey<'a> {
    smiles: &'a str,
    role: Role,
    mole_fraction: i64,
    exact_amount: u32,
}

/// The rounded state a row was measured at. Components are sorted by SMILES,
/// so the key also fixes the number of components.
#[derive(Debug, PartialEq, Eq, Hash)]
struct StateKey<'a> {
    temperature: i64,
    pressure: i64,
    phase: &'a str,
    components: Vec<ComponentKey<'a>>,
}

impl<'a> StateKey<'a> {
    fn new(row: &'a Measurement, schema: &FilterDuplicatesSchema) -> Self {
        Self {
            temperature: round(row.temperature, schema.temperature_precision),
            pressure: round(row.pressure, schema.pressure_precision),
            phase: &row.phase,
            components: row
                .sorted_components()
                .into_iter()
                .map(|c| ComponentKey {
                    smiles: &c.smiles,
                    role: c.role,
                    mole_fraction: round(c.mole_fraction, schema.mole_fraction_precision),
                    exact_amount: c.exact_amount,
                })
                .collect(),
        }
    }
}

/// Whether `candidate` should replace `incumbent` as the kept duplicate.
fn is_better(candidate: Option<f64>, incumbent: Option<f64>) -> bool {
    match (candidate, incumbent) {
        (Some(candidate), Some(incumbent)) => candidate < incumbent,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// Keep one row per property type and rounded state.
///
/// Of a group of duplicates, the row with the lowest uncertainty is kept. A
/// row without an uncertainty loses to any row with one, and remaining ties
/// go to the row that comes first. Rows without any value are dropped, and
/// kept rows stay in table order.
pub fn filter_duplicates(
    table: &MeasurementTable,
    schema: &FilterDuplicatesSchema,
) -> MeasurementTable {
    let keys: Vec<StateKey> = table.iter().map(|row| StateKey::new(row, schema)).collect();
    let mut keep = vec![false; table.len()];

    for property_type in table.property_types() {
        let mut kept: HashMap<&StateKey, (usize, Option<f64>)> = HashMap::new();

        for (index, row) in table.iter().enumerate() {
            let Some(value) = row.value(property_type) else {
                continue;
            };

            match kept.entry(&keys[index]) {
                Entry::Vacant(entry) => {
                    entry.insert((index, value.uncertainty));
                }
                Entry::Occupied(mut entry) => {
                    if is_better(value.uncertainty, entry.get().1) {
                        entry.insert((index, value.uncertainty));
                    }
                }
            }
        }

        for (index, _) in kept.into_values() {
            keep[index] = true;
        }
    }

    let filtered = table.masked(&keep);
    debug!(
        removed = table.len() - filtered.len(),
        "Removed duplicate measurements."
    );
    filtered
}

/// The `FilterDuplicates` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicatesFilter;

impl Stage for DuplicatesFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterDuplicates
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        _n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterDuplicates(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        Ok(filter_duplicates(table, schema))
    }
}
