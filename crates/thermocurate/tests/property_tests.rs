//! Property-based tests for curation stages.
//!
//! Stages are checked against invariants that must hold for any table:
//!
//! 1. **Subset**: filters only ever return rows of their input, in order
//! 2. **Idempotence**: applying a filter twice equals applying it once
//! 3. **Order independence**: substances compare equal however their
//!    components are listed
//!
//! ```bash
//! cargo test -p thermocurate --test property_tests
//! ```

use std::collections::HashMap;

use proptest::prelude::*;

use thermocurate::schema::{
    FilterByTemperatureSchema, FilterDuplicatesSchema, SelectDataPointsSchema, State, TargetState,
};
use thermocurate::stages::{filter_by_temperature, filter_duplicates, select_data_points};
use thermocurate::{Component, Measurement, MeasurementTable, Substance};

// =============================================================================
// Test Strategies
// =============================================================================

fn smiles() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["C", "CC", "CCO", "O", "CO", "c1ccccc1"]).prop_map(String::from)
}

fn measurement() -> impl Strategy<Value = Measurement> {
    (
        280.0f64..350.0,
        prop::sample::select(vec![101.325, 101.3, 200.0]),
        smiles(),
        0.5f64..2.0,
        prop::option::of(0.001f64..0.1),
    )
        .prop_map(|(temperature, pressure, smiles, value, uncertainty)| {
            Measurement::new((temperature * 10.0).round() / 10.0, pressure)
                .with_component(Component::new(smiles, 1.0))
                .with_value("Density", value, uncertainty)
        })
}

fn table() -> impl Strategy<Value = MeasurementTable> {
    prop::collection::vec(measurement(), 0..60).prop_map(|rows| {
        MeasurementTable::from_rows([("Density", "g / ml")], rows).expect("valid rows")
    })
}

fn is_ordered_subset(subset: &MeasurementTable, table: &MeasurementTable) -> bool {
    let mut rows = table.iter();
    subset.iter().all(|row| rows.any(|candidate| candidate == row))
}

// =============================================================================
// Filter Properties
// =============================================================================

proptest! {
    /// Temperature filtering is idempotent and returns an ordered subset.
    #[test]
    fn temperature_filter_is_idempotent(
        table in table(),
        minimum in 270.0f64..320.0,
        width in 1.0f64..50.0,
    ) {
        let schema = FilterByTemperatureSchema::new(Some(minimum), Some(minimum + width)).unwrap();

        let once = filter_by_temperature(&table, &schema);
        let twice = filter_by_temperature(&once, &schema);

        prop_assert_eq!(&once, &twice);
        prop_assert!(is_ordered_subset(&once, &table));
        prop_assert!(once.iter().all(|row| minimum < row.temperature && row.temperature < minimum + width));
    }

    /// Duplicate removal is idempotent and leaves one row per state.
    #[test]
    fn duplicate_filter_is_idempotent(table in table()) {
        let schema = FilterDuplicatesSchema::new();

        let once = filter_duplicates(&table, &schema);
        let twice = filter_duplicates(&once, &schema);

        prop_assert_eq!(&once, &twice);
        prop_assert!(is_ordered_subset(&once, &table));
        prop_assert_eq!(once.substances(), table.substances());
    }

    /// Selection keeps every substance, and all rows kept for a substance
    /// share one rounded condition.
    #[test]
    fn selection_keeps_one_condition_per_substance(table in table(), target in 280.0f64..350.0) {
        let target = TargetState::new(
            [("Density", 1)],
            vec![State::new(target, 101.325, [1.0])],
        ).unwrap();
        let schema = SelectDataPointsSchema::new(vec![target]).unwrap();

        let selected = select_data_points(&table, &schema);

        prop_assert!(is_ordered_subset(&selected, &table));
        prop_assert_eq!(selected.substances(), table.substances());

        let mut conditions: HashMap<Substance, (i64, i64)> = HashMap::new();
        for row in selected.iter() {
            let condition = (
                (row.temperature * 100.0).round() as i64,
                (row.pressure * 10.0).round() as i64,
            );
            let first = *conditions.entry(row.substance()).or_insert(condition);
            prop_assert_eq!(first, condition);
        }
    }
}

// =============================================================================
// Substance Properties
// =============================================================================

proptest! {
    /// Substances ignore the order components are listed in.
    #[test]
    fn substance_is_order_independent(mut components in prop::collection::vec(smiles(), 1..5)) {
        let forward = Substance::new(components.clone());
        components.reverse();
        let backward = Substance::new(components);

        prop_assert_eq!(&forward, &backward);
        prop_assert_eq!(forward.to_string(), backward.to_string());
    }
}
