//! Schema of the data point selection stage.

use serde::{Deserialize, Serialize};

use crate::error::{CurationError, Result};

use super::StageKind;

/// A state point data points should be selected around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Temperature (K).
    pub temperature: f64,
    /// Pressure (kPa).
    pub pressure: f64,
    /// Mole fraction of each component, in alphabetical SMILES order of the
    /// components.
    pub mole_fractions: Vec<f64>,
}

impl State {
    /// Create a state point.
    pub fn new(temperature: f64, pressure: f64, mole_fractions: impl Into<Vec<f64>>) -> Self {
        Self {
            temperature,
            pressure,
            mole_fractions: mole_fractions.into(),
        }
    }
}

/// A group of property types, all measured for the same number of
/// components, and the states to select them at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetState {
    /// `(property type, number of components)` pairs.
    pub property_types: Vec<(String, usize)>,
    /// Target states, in order.
    pub states: Vec<State>,
}

impl TargetState {
    /// Create a target group.
    pub fn new<S: Into<String>>(
        property_types: impl IntoIterator<Item = (S, usize)>,
        states: Vec<State>,
    ) -> Result<Self> {
        let target = Self {
            property_types: property_types
                .into_iter()
                .map(|(property_type, n)| (property_type.into(), n))
                .collect(),
            states,
        };
        target.validate()?;
        Ok(target)
    }

    /// The number of components shared by the group's property types.
    pub fn n_components(&self) -> usize {
        self.property_types.first().map(|(_, n)| *n).unwrap_or(0)
    }

    /// The group's property types, without their component counts.
    pub fn property_type_names(&self) -> impl Iterator<Item = &str> {
        self.property_types.iter().map(|(property_type, _)| property_type.as_str())
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| CurationError::invalid(StageKind::SelectDataPoints, reason);

        let n_components = self.n_components();

        if self.property_types.is_empty() {
            return Err(invalid("a target state needs at least one property type".into()));
        }
        if n_components == 0 {
            return Err(invalid("property types must have a positive number of components".into()));
        }
        if let Some((property_type, n)) = self.property_types.iter().find(|(_, n)| *n != n_components) {
            return Err(invalid(format!(
                "all property types of a target state must share one number of components, \
                 but '{}' has {} rather than {}",
                property_type, n, n_components
            )));
        }
        if self.states.is_empty() {
            return Err(invalid("a target state needs at least one state".into()));
        }

        for state in &self.states {
            if state.mole_fractions.len() != n_components {
                return Err(invalid(format!(
                    "states of {} component property types need {} mole fractions, got {}",
                    n_components,
                    n_components,
                    state.mole_fractions.len()
                )));
            }
        }

        Ok(())
    }
}

/// Configuration of `SelectDataPoints`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectDataPointsSchema {
    /// The groups to select data points for.
    pub target_states: Vec<TargetState>,
}

impl SelectDataPointsSchema {
    /// Create a schema from its target groups.
    pub fn new(target_states: Vec<TargetState>) -> Result<Self> {
        let schema = Self { target_states };
        schema.validate()?;
        Ok(schema)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.target_states.is_empty() {
            return Err(CurationError::invalid(
                StageKind::SelectDataPoints,
                "at least one target state must be given",
            ));
        }
        self.target_states.iter().try_for_each(TargetState::validate)
    }
}
