//! Selection of the data points closest to a set of target states.
//!
//! Rows of each substance are clustered around the target states of each
//! target group. Within a cluster, conditions are then picked greedily so that
//! as many of the group's property types as possible are measured at the same
//! condition, which lets one simulation estimate all of them. Every row at a
//! chosen condition is kept; repeated measurements are left to
//! `FilterDuplicates`.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::Result;
use crate::schema::{SelectDataPointsSchema, StageKind, StageSchema, State, TargetState};
use crate::table::{MeasurementTable, Substance};

use super::{Stage, schema_mismatch};

const TEMPERATURE_DECIMALS: i32 = 2;
const PRESSURE_DECIMALS: i32 = 1;
const MOLE_FRACTION_DECIMALS: i32 = 3;

fn scaled(value: f64, decimals: i32) -> i64 {
    (value * 10f64.powi(decimals)).round() as i64
}

fn unscaled(value: i64, decimals: i32) -> f64 {
    value as f64 / 10f64.powi(decimals)
}

/// A measured condition rounded so that repeated measurements collapse onto
/// one key. Ordered lexicographically by temperature, pressure and then mole
/// fractions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ConditionKey {
    temperature: i64,
    pressure: i64,
    mole_fractions: Vec<i64>,
}

impl ConditionKey {
    fn new(temperature: f64, pressure: f64, mole_fractions: &[f64]) -> Self {
        Self {
            temperature: scaled(temperature, TEMPERATURE_DECIMALS),
            pressure: scaled(pressure, PRESSURE_DECIMALS),
            mole_fractions: mole_fractions
                .iter()
                .map(|x| scaled(*x, MOLE_FRACTION_DECIMALS))
                .collect(),
        }
    }

    fn distance_squared(&self, state: &State) -> f64 {
        let mole_fractions: Vec<f64> = self
            .mole_fractions
            .iter()
            .map(|x| unscaled(*x, MOLE_FRACTION_DECIMALS))
            .collect();

        distance_squared(
            unscaled(self.temperature, TEMPERATURE_DECIMALS),
            unscaled(self.pressure, PRESSURE_DECIMALS),
            &mole_fractions,
            state,
        )
    }
}

/// Squared distance in state space. Pressures are scaled by 1/10 so that
/// 1 K weighs as much as 10 kPa.
fn distance_squared(temperature: f64, pressure: f64, mole_fractions: &[f64], state: &State) -> f64 {
    let mole_fraction_term: f64 = mole_fractions
        .iter()
        .zip(&state.mole_fractions)
        .map(|(x, target)| (x - target).powi(2))
        .sum();

    (temperature - state.temperature).powi(2)
        + (pressure / 10.0 - state.pressure / 10.0).powi(2)
        + mole_fraction_term
}

/// A row that can be selected for a target group.
#[derive(Debug)]
struct Candidate<'a> {
    index: usize,
    property_type: &'a str,
    key: ConditionKey,
}

fn nearest_state(key: &ConditionKey, states: &[State]) -> usize {
    let mut nearest = 0;
    let mut nearest_distance = f64::INFINITY;

    for (index, state) in states.iter().enumerate() {
        let distance = key.distance_squared(state);
        if distance < nearest_distance {
            nearest = index;
            nearest_distance = distance;
        }
    }

    nearest
}

/// Mark the rows of one substance selected for one target group.
fn select_for_target(
    table: &MeasurementTable,
    indices: &[usize],
    target: &TargetState,
    selected: &mut [bool],
) {
    let n_components = target.n_components();
    let property_types: Vec<&str> = target.property_type_names().collect();

    let mut clusters: Vec<Vec<Candidate>> = target.states.iter().map(|_| Vec::new()).collect();

    for &index in indices {
        let row = &table.rows()[index];
        if row.n_components() != n_components {
            continue;
        }
        let Some(&property_type) = property_types.iter().find(|t| row.has_value(t)) else {
            continue;
        };

        // Sorted SMILES order.
        let mole_fractions: Vec<f64> = row
            .sorted_components()
            .iter()
            .map(|c| c.mole_fraction)
            .collect();
        let key = ConditionKey::new(row.temperature, row.pressure, &mole_fractions);

        clusters[nearest_state(&key, &target.states)].push(Candidate {
            index,
            property_type,
            key,
        });
    }

    for (state, candidates) in target.states.iter().zip(&clusters) {
        let mut conditions: BTreeMap<&ConditionKey, Vec<&Candidate>> = BTreeMap::new();
        for candidate in candidates {
            conditions.entry(&candidate.key).or_default().push(candidate);
        }

        let mut open: Vec<&str> = property_types.clone();

        while !open.is_empty() && !conditions.is_empty() {
            let Some((key, score)) = best_condition(&conditions, &open, state) else {
                break;
            };
            if score == 0 {
                break;
            }

            let Some(rows) = conditions.remove(key) else {
                break;
            };

            for candidate in &rows {
                if open.contains(&candidate.property_type) {
                    selected[candidate.index] = true;
                }
            }
            open.retain(|property_type| !rows.iter().any(|c| c.property_type == *property_type));
        }
    }
}

/// The condition covering the most still-open property types, together with
/// that number. Ties go to the condition closest to the target state, then to
/// the lowest condition.
fn best_condition<'a>(
    conditions: &BTreeMap<&'a ConditionKey, Vec<&Candidate>>,
    open: &[&str],
    state: &State,
) -> Option<(&'a ConditionKey, usize)> {
    conditions
        .iter()
        .map(|(key, candidates)| {
            let score = open
                .iter()
                .filter(|t| candidates.iter().any(|c| c.property_type == **t))
                .count();
            (*key, score, key.distance_squared(state))
        })
        .min_by(|a, b| {
            b.1.cmp(&a.1)
                .then(a.2.total_cmp(&b.2))
                .then_with(|| a.0.cmp(b.0))
        })
        .map(|(key, score, _)| (key, score))
}

/// Select, per substance and target group, the rows measured closest to the
/// group's target states. Selected rows are returned unmodified and in table
/// order.
pub fn select_data_points(
    table: &MeasurementTable,
    schema: &SelectDataPointsSchema,
) -> MeasurementTable {
    let mut substances: IndexMap<Substance, Vec<usize>> = IndexMap::new();
    for (index, row) in table.iter().enumerate() {
        substances.entry(row.substance()).or_default().push(index);
    }

    let mut selected = vec![false; table.len()];

    for indices in substances.values() {
        for target in &schema.target_states {
            select_for_target(table, indices, target, &mut selected);
        }
    }

    debug!(
        n_substances = substances.len(),
        n_selected = selected.iter().filter(|s| **s).count(),
        "Selected data points."
    );

    table.masked(&selected)
}

/// The `SelectDataPoints` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataPointSelector;

impl Stage for DataPointSelector {
    fn kind(&self) -> StageKind {
        StageKind::SelectDataPoints
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        _n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::SelectDataPoints(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        Ok(select_data_points(table, schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Component, Measurement};

    fn row(smiles: &str, temperature: f64, property_type: &str, value: f64) -> Measurement {
        Measurement::new(temperature, 101.325)
            .with_component(Component::new(smiles, 1.0))
            .with_value(property_type, value, Some(0.1))
    }

    fn table(rows: Vec<Measurement>) -> MeasurementTable {
        MeasurementTable::from_rows(
            [
                ("Density", "g / ml"),
                ("EnthalpyOfVaporization", "kJ / mol"),
            ],
            rows,
        )
        .unwrap()
    }

    fn schema(temperatures: &[f64]) -> SelectDataPointsSchema {
        let states = temperatures
            .iter()
            .map(|t| State::new(*t, 101.325, [1.0]))
            .collect();
        let target = TargetState::new(
            [("Density", 1), ("EnthalpyOfVaporization", 1)],
            states,
        )
        .unwrap();
        SelectDataPointsSchema::new(vec![target]).unwrap()
    }

    #[test]
    fn test_condition_keys_round() {
        let a = ConditionKey::new(298.150004, 101.325, &[0.2501]);
        let b = ConditionKey::new(298.149996, 101.3, &[0.2499]);
        assert_eq!(a, b);
        assert!(
            ConditionKey::new(298.15, 101.3, &[0.5]) < ConditionKey::new(298.16, 90.0, &[0.1])
        );
    }

    #[test]
    fn test_conditions_covering_more_types_win() {
        // 299 K is closer but only has a density.
        let table = table(vec![
            row("C", 299.0, "Density", 1.0),
            row("C", 303.15, "Density", 1.0),
            row("C", 303.15, "EnthalpyOfVaporization", 1.0),
        ]);

        let selected = select_data_points(&table, &schema(&[300.0]));
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|r| r.temperature == 303.15));
    }

    #[test]
    fn test_remaining_types_are_filled_from_other_conditions() {
        let table = table(vec![
            row("C", 298.15, "Density", 1.0),
            row("C", 310.0, "EnthalpyOfVaporization", 1.0),
        ]);

        let selected = select_data_points(&table, &schema(&[300.0]));
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_every_row_at_chosen_condition_is_selected() {
        let table = table(vec![
            row("C", 298.15, "Density", 1.0),
            row("C", 298.15, "Density", 2.0),
            row("C", 298.15, "EnthalpyOfVaporization", 40.0),
            row("C", 298.15004, "Density", 3.0),
        ]);

        let selected = select_data_points(&table, &schema(&[298.15]));
        assert_eq!(selected.len(), 4);
    }

    #[test]
    fn test_covered_types_are_not_selected_again() {
        // Densities at 299 K are not needed once 298.15 K covers both types.
        let table = table(vec![
            row("C", 298.15, "Density", 1.0),
            row("C", 298.15, "EnthalpyOfVaporization", 40.0),
            row("C", 299.0, "Density", 2.0),
        ]);

        let selected = select_data_points(&table, &schema(&[298.15]));
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|r| r.temperature == 298.15));
    }

    #[test]
    fn test_substances_are_selected_independently() {
        let table = table(vec![
            row("C", 298.15, "Density", 1.0),
            row("CO", 298.15, "Density", 1.0),
            row("CCO", 298.15, "Density", 1.0).with_component(Component::new("O", 0.5)),
        ]);

        let selected = select_data_points(&table, &schema(&[298.15]));
        assert_eq!(selected.len(), 2);
        assert_eq!(selected.max_n_components(), 1);
    }
}
