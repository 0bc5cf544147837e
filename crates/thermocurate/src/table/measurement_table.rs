//! In-memory table of measurements.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};

use crate::error::{CurationError, Result};

use super::measurement::Measurement;
use super::substance::Substance;

/// A set of measurements together with the property columns they populate.
///
/// Each property type owns one column (and its uncertainty twin) with a fixed
/// unit. Stages never modify a table in place; they derive new tables from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementTable {
    /// Property type -> unit, in column order.
    properties: IndexMap<String, String>,
    rows: Vec<Measurement>,
}

impl MeasurementTable {
    /// Create an empty table with no property columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from property columns and rows.
    pub fn from_rows<I, P, U>(properties: I, rows: Vec<Measurement>) -> Result<Self>
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        let mut table = Self::new();
        for (property_type, unit) in properties {
            table.add_property(property_type, unit)?;
        }
        for row in rows {
            table.push(row)?;
        }
        Ok(table)
    }

    /// Register a property column.
    ///
    /// Registering the same property type twice is allowed only with the same unit.
    pub fn add_property(
        &mut self,
        property_type: impl Into<String>,
        unit: impl Into<String>,
    ) -> Result<()> {
        let property_type = property_type.into();
        let unit = unit.into();

        if property_type.is_empty() || property_type.contains(' ') {
            return Err(CurationError::Table(format!(
                "Invalid property type '{}'",
                property_type
            )));
        }

        match self.properties.get(&property_type) {
            Some(existing) if *existing != unit => Err(CurationError::Table(format!(
                "Property '{}' is already registered with unit '{}', not '{}'",
                property_type, existing, unit
            ))),
            Some(_) => Ok(()),
            None => {
                self.properties.insert(property_type, unit);
                Ok(())
            }
        }
    }

    /// Append a row, checking it only references registered property columns.
    pub fn push(&mut self, row: Measurement) -> Result<()> {
        if row.components.is_empty() {
            return Err(CurationError::Table(
                "A measurement must have at least one component".to_string(),
            ));
        }

        if let Some(unknown) = row
            .values
            .keys()
            .find(|property_type| !self.properties.contains_key(*property_type))
        {
            return Err(CurationError::Table(format!(
                "Measurement references unregistered property '{}'",
                unknown
            )));
        }

        self.rows.push(row);
        Ok(())
    }

    /// All rows in table order.
    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    /// Iterate over rows in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Measurement> {
        self.rows.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Property columns (property type -> unit) in column order.
    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// Property types in column order.
    pub fn property_types(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(|k| k.as_str())
    }

    /// Unit of a property column.
    pub fn unit(&self, property_type: &str) -> Option<&str> {
        self.properties.get(property_type).map(|u| u.as_str())
    }

    /// Whether a property column exists.
    pub fn has_property(&self, property_type: &str) -> bool {
        self.properties.contains_key(property_type)
    }

    /// Largest number of components of any row (0 for an empty table).
    pub fn max_n_components(&self) -> usize {
        self.rows.iter().map(|r| r.n_components()).max().unwrap_or(0)
    }

    /// Smallest and largest number of components of any row.
    pub fn n_components_range(&self) -> Option<(usize, usize)> {
        let min = self.rows.iter().map(|r| r.n_components()).min()?;
        Some((min, self.max_n_components()))
    }

    /// Distinct substances in order of first appearance.
    pub fn substances(&self) -> IndexSet<Substance> {
        self.rows.iter().map(|r| r.substance()).collect()
    }

    /// Number of rows with a value for the property type.
    pub fn count_property(&self, property_type: &str) -> usize {
        self.rows.iter().filter(|r| r.has_value(property_type)).count()
    }

    /// A table with the same columns holding the rows for which `keep` is true.
    pub fn retain(&self, mut keep: impl FnMut(&Measurement) -> bool) -> Self {
        let rows = self.rows.iter().filter(|r| keep(r)).cloned().collect();
        self.with_rows(rows)
    }

    /// A table with the same columns holding the rows whose mask entry is true.
    pub fn masked(&self, mask: &[bool]) -> Self {
        let rows = self
            .rows
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(row, _)| row.clone())
            .collect();
        self.with_rows(rows)
    }

    /// A table with the same columns and different rows.
    pub(crate) fn with_rows(&self, rows: Vec<Measurement>) -> Self {
        Self {
            properties: self.properties.clone(),
            rows,
        }
    }

    /// Replace every representation of a missing value with `None` / absence.
    pub fn normalize_missing(&self) -> Self {
        self.with_rows(self.rows.iter().map(|r| r.normalized()).collect())
    }

    /// Drop every property column not in `property_types`, along with the
    /// matching row values.
    pub fn select_properties(&self, property_types: &HashSet<&str>) -> Self {
        let properties = self
            .properties
            .iter()
            .filter(|(k, _)| property_types.contains(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row.values.retain(|k, _| property_types.contains(k.as_str()));
                row
            })
            .collect();

        Self { properties, rows }
    }

    /// Drop property columns which no row has a value for.
    pub fn prune_empty_properties(&self) -> Self {
        let properties = self
            .properties
            .iter()
            .filter(|(k, _)| self.rows.iter().any(|r| r.has_value(k)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            properties,
            rows: self.rows.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Component;

    fn density(smiles: &str, temperature: f64) -> Measurement {
        Measurement::new(temperature, 101.325)
            .with_component(Component::new(smiles, 1.0))
            .with_value("Density", 1.0, Some(0.1))
    }

    #[test]
    fn test_push_rejects_unregistered_property() {
        let mut table = MeasurementTable::new();
        assert!(table.push(density("C", 298.15)).is_err());

        table.add_property("Density", "g / ml").unwrap();
        assert!(table.push(density("C", 298.15)).is_ok());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_push_rejects_rows_without_components() {
        let mut table = MeasurementTable::new();
        table.add_property("Density", "g / ml").unwrap();

        let row = Measurement::new(298.15, 101.325).with_value("Density", 1.0, None);
        assert!(table.push(row).is_err());
    }

    #[test]
    fn test_conflicting_units_rejected() {
        let mut table = MeasurementTable::new();
        table.add_property("Density", "g / ml").unwrap();
        assert!(table.add_property("Density", "g / ml").is_ok());
        assert!(table.add_property("Density", "kg / m**3").is_err());
    }

    #[test]
    fn test_select_and_prune_properties() {
        let rows = vec![
            density("C", 298.15),
            Measurement::new(298.15, 101.325)
                .with_component(Component::new("C", 1.0))
                .with_value("EnthalpyOfVaporization", 8.0, None),
        ];
        let table = MeasurementTable::from_rows(
            [("Density", "g / ml"), ("EnthalpyOfVaporization", "kJ / mol"), ("DielectricConstant", "")],
            rows,
        )
        .unwrap();

        let selected = table.select_properties(&HashSet::from(["Density", "DielectricConstant"]));
        assert_eq!(selected.properties().len(), 2);
        assert!(selected.rows()[1].values.is_empty());

        let pruned = selected.prune_empty_properties();
        assert_eq!(pruned.property_types().collect::<Vec<_>>(), vec!["Density"]);
    }

    #[test]
    fn test_substances_in_first_seen_order() {
        let table = MeasurementTable::from_rows(
            [("Density", "g / ml")],
            vec![density("O", 298.15), density("C", 298.15), density("O", 300.0)],
        )
        .unwrap();

        let substances: Vec<_> = table.substances().into_iter().collect();
        assert_eq!(substances, vec![Substance::new(["O"]), Substance::new(["C"])]);
        assert_eq!(table.n_components_range(), Some((1, 1)));
    }
}
