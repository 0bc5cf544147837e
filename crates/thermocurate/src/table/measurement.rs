//! A single measured data point.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::component::Component;
use super::substance::Substance;

/// The measured value of one property type, in the unit of its table column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub value: f64,
    pub uncertainty: Option<f64>,
}

impl PropertyValue {
    /// Create a property value.
    pub fn new(value: f64, uncertainty: Option<f64>) -> Self {
        Self { value, uncertainty }
    }
}

/// One row of a measurement table.
///
/// Rows are sparse by property type: `values` normally holds a single entry,
/// keyed by the property type the row was measured for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Temperature (K).
    pub temperature: f64,
    /// Pressure (kPa).
    pub pressure: f64,
    /// Phase the property was measured in.
    pub phase: String,
    /// Components of the measured system, in recorded order.
    pub components: Vec<Component>,
    /// Measured values keyed by property type.
    pub values: IndexMap<String, PropertyValue>,
    /// DOI or other reference for the measurement.
    pub source: String,
}

impl Measurement {
    /// Create a liquid-phase measurement with no components or values yet.
    pub fn new(temperature: f64, pressure: f64) -> Self {
        Self {
            temperature,
            pressure,
            phase: "Liquid".to_string(),
            components: Vec::new(),
            values: IndexMap::new(),
            source: String::new(),
        }
    }

    /// Set the phase.
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = phase.into();
        self
    }

    /// Append a component.
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Set a measured value.
    pub fn with_value(
        mut self,
        property_type: impl Into<String>,
        value: f64,
        uncertainty: Option<f64>,
    ) -> Self {
        self.values
            .insert(property_type.into(), PropertyValue::new(value, uncertainty));
        self
    }

    /// Set the source reference.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Number of components in the measured system.
    pub fn n_components(&self) -> usize {
        self.components.len()
    }

    /// Component SMILES in recorded order.
    pub fn component_smiles(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.smiles.as_str())
    }

    /// Components sorted alphabetically by SMILES.
    pub fn sorted_components(&self) -> Vec<&Component> {
        let mut components: Vec<&Component> = self.components.iter().collect();
        components.sort_by(|a, b| a.smiles.cmp(&b.smiles));
        components
    }

    /// The substance this measurement was made for.
    pub fn substance(&self) -> Substance {
        Substance::new(self.component_smiles())
    }

    /// The value measured for a property type, if any.
    pub fn value(&self, property_type: &str) -> Option<&PropertyValue> {
        self.values.get(property_type)
    }

    /// Whether a value was measured for a property type.
    pub fn has_value(&self, property_type: &str) -> bool {
        self.values.contains_key(property_type)
    }

    /// Copy of this row with NaN standing in for missing values removed.
    pub(crate) fn normalized(&self) -> Self {
        let values = self
            .values
            .iter()
            .filter(|(_, v)| !v.value.is_nan())
            .map(|(k, v)| {
                let uncertainty = v.uncertainty.filter(|u| !u.is_nan());
                (k.clone(), PropertyValue::new(v.value, uncertainty))
            })
            .collect();

        Self {
            values,
            ..self.clone()
        }
    }
}
