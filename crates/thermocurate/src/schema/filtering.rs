//! Schemas of the filter stages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CurationError, Result};
use crate::table::Substance;
use crate::toolkit::ChemicalEnvironment;

use super::{StageKind, exactly_one};

/// Largest rounding precision accepted by the duplicate filter.
const MAX_PRECISION: u32 = 12;

/// Configuration of `FilterDuplicates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDuplicatesSchema {
    /// Decimal places temperatures (K) are compared to.
    #[serde(default = "default_temperature_precision")]
    pub temperature_precision: u32,
    /// Decimal places pressures (kPa) are compared to.
    #[serde(default = "default_pressure_precision")]
    pub pressure_precision: u32,
    /// Decimal places mole fractions are compared to.
    #[serde(default = "default_mole_fraction_precision")]
    pub mole_fraction_precision: u32,
}

fn default_temperature_precision() -> u32 {
    2
}

fn default_pressure_precision() -> u32 {
    3
}

fn default_mole_fraction_precision() -> u32 {
    6
}

impl FilterDuplicatesSchema {
    /// Create a schema with the default precisions.
    pub fn new() -> Self {
        Self {
            temperature_precision: default_temperature_precision(),
            pressure_precision: default_pressure_precision(),
            mole_fraction_precision: default_mole_fraction_precision(),
        }
    }

    /// Create a schema with custom precisions.
    pub fn with_precisions(temperature: u32, pressure: u32, mole_fraction: u32) -> Result<Self> {
        let schema = Self {
            temperature_precision: temperature,
            pressure_precision: pressure,
            mole_fraction_precision: mole_fraction,
        };
        schema.validate()?;
        Ok(schema)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for (name, precision) in [
            ("temperature_precision", self.temperature_precision),
            ("pressure_precision", self.pressure_precision),
            ("mole_fraction_precision", self.mole_fraction_precision),
        ] {
            if precision > MAX_PRECISION {
                return Err(CurationError::invalid(
                    StageKind::FilterDuplicates,
                    format!("`{}` must be at most {}", name, MAX_PRECISION),
                ));
            }
        }
        Ok(())
    }
}

impl Default for FilterDuplicatesSchema {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_range(
    stage: StageKind,
    quantity: &str,
    minimum: Option<f64>,
    maximum: Option<f64>,
) -> Result<()> {
    for bound in [minimum, maximum].into_iter().flatten() {
        if bound <= 0.0 || !bound.is_finite() {
            return Err(CurationError::invalid(
                stage,
                format!("{} bounds must be positive, got {}", quantity, bound),
            ));
        }
    }

    if let (Some(minimum), Some(maximum)) = (minimum, maximum) {
        if minimum >= maximum {
            return Err(CurationError::invalid(
                stage,
                format!(
                    "the minimum {} ({}) must be less than the maximum ({})",
                    quantity, minimum, maximum
                ),
            ));
        }
    }

    Ok(())
}

/// Configuration of `FilterByTemperature`.
///
/// Rows are kept when their temperature lies strictly between the bounds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterByTemperatureSchema {
    /// Exclusive lower bound (K).
    #[serde(default)]
    pub minimum_temperature: Option<f64>,
    /// Exclusive upper bound (K).
    #[serde(default)]
    pub maximum_temperature: Option<f64>,
}

impl FilterByTemperatureSchema {
    /// Create a schema from optional bounds.
    pub fn new(minimum_temperature: Option<f64>, maximum_temperature: Option<f64>) -> Result<Self> {
        let schema = Self {
            minimum_temperature,
            maximum_temperature,
        };
        schema.validate()?;
        Ok(schema)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_range(
            StageKind::FilterByTemperature,
            "temperature",
            self.minimum_temperature,
            self.maximum_temperature,
        )
    }
}

/// Configuration of `FilterByPressure`.
///
/// Rows are kept when their pressure lies strictly between the bounds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterByPressureSchema {
    /// Exclusive lower bound (kPa).
    #[serde(default)]
    pub minimum_pressure: Option<f64>,
    /// Exclusive upper bound (kPa).
    #[serde(default)]
    pub maximum_pressure: Option<f64>,
}

impl FilterByPressureSchema {
    /// Create a schema from optional bounds.
    pub fn new(minimum_pressure: Option<f64>, maximum_pressure: Option<f64>) -> Result<Self> {
        let schema = Self {
            minimum_pressure,
            maximum_pressure,
        };
        schema.validate()?;
        Ok(schema)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        validate_range(
            StageKind::FilterByPressure,
            "pressure",
            self.minimum_pressure,
            self.maximum_pressure,
        )
    }
}

fn validate_non_empty_strings<'a>(
    stage: StageKind,
    field: &str,
    values: impl IntoIterator<Item = &'a String>,
) -> Result<()> {
    if values.into_iter().any(|v| v.trim().is_empty()) {
        return Err(CurationError::invalid(
            stage,
            format!("`{}` may not contain empty strings", field),
        ));
    }
    Ok(())
}

/// Configuration of `FilterByElements`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterByElementsSchema {
    /// The only elements the components may contain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_elements: Option<Vec<String>>,
    /// Elements none of the components may contain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden_elements: Option<Vec<String>>,
}

impl FilterByElementsSchema {
    /// Keep only systems made exclusively of the given elements.
    pub fn allowed<I, S>(elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = Self {
            allowed_elements: Some(elements.into_iter().map(Into::into).collect()),
            forbidden_elements: None,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Drop systems containing any of the given elements.
    pub fn forbidden<I, S>(elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = Self {
            allowed_elements: None,
            forbidden_elements: Some(elements.into_iter().map(Into::into).collect()),
        };
        schema.validate()?;
        Ok(schema)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let stage = StageKind::FilterByElements;
        exactly_one(
            stage,
            ("allowed_elements", &self.allowed_elements),
            ("forbidden_elements", &self.forbidden_elements),
        )?;

        let (field, elements) = match (&self.allowed_elements, &self.forbidden_elements) {
            (Some(elements), _) => ("allowed_elements", elements),
            (_, Some(elements)) => ("forbidden_elements", elements),
            (None, None) => return Ok(()),
        };
        validate_non_empty_strings(stage, field, elements)
    }
}

/// Configuration of `FilterByPropertyTypes`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterByPropertyTypesSchema {
    /// Property types to retain.
    pub property_types: Vec<String>,

    /// Per property type, the numbers of components it must have been
    /// measured for.
    #[serde(default)]
    pub n_components: BTreeMap<String, Vec<usize>>,

    /// Keep only substances with data for every requested property type.
    #[serde(default)]
    pub strict: bool,
}

impl FilterByPropertyTypesSchema {
    /// Retain the given property types.
    pub fn new<I, S>(property_types: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schema = Self {
            property_types: property_types.into_iter().map(Into::into).collect(),
            n_components: BTreeMap::new(),
            strict: false,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Require a property type to have been measured for one of the given
    /// numbers of components.
    pub fn with_n_components(
        mut self,
        property_type: impl Into<String>,
        n_components: impl IntoIterator<Item = usize>,
    ) -> Result<Self> {
        self.n_components
            .insert(property_type.into(), n_components.into_iter().collect());
        self.validate()?;
        Ok(self)
    }

    /// Enable or disable strict substance coverage.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let stage = StageKind::FilterByPropertyTypes;

        if self.property_types.is_empty() {
            return Err(CurationError::invalid(
                stage,
                "at least one property type must be given",
            ));
        }
        validate_non_empty_strings(stage, "property_types", &self.property_types)?;

        for (property_type, n_components) in &self.n_components {
            if !self.property_types.contains(property_type) {
                return Err(CurationError::invalid(
                    stage,
                    format!(
                        "`n_components` references '{}' which is not in `property_types`",
                        property_type
                    ),
                ));
            }
            if n_components.is_empty() || n_components.contains(&0) {
                return Err(CurationError::invalid(
                    stage,
                    format!(
                        "the component counts of '{}' must be a non-empty list of positive integers",
                        property_type
                    ),
                ));
            }
        }

        Ok(())
    }
}

/// Configuration of `FilterByStereochemistry`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterByStereochemistrySchema {}

impl FilterByStereochemistrySchema {
    pub fn new() -> Self {
        Self {}
    }

    pub(crate) fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Configuration of `FilterByCharged`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterByChargedSchema {}

impl FilterByChargedSchema {
    pub fn new() -> Self {
        Self {}
    }

    pub(crate) fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Configuration of `FilterByIonicLiquid`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterByIonicLiquidSchema {}

impl FilterByIonicLiquidSchema {
    pub fn new() -> Self {
        Self {}
    }

    pub(crate) fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Configuration of `FilterBySmiles`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterBySmilesSchema {
    /// Components which rows must be made of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smiles_to_include: Option<Vec<String>>,
    /// Components which rows may not contain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smiles_to_exclude: Option<Vec<String>>,
    /// With `smiles_to_include`, keep rows where at least one component
    /// (rather than every component) is included.
    #[serde(default)]
    pub allow_partial_inclusion: bool,
}

impl FilterBySmilesSchema {
    /// Keep rows whose components are all in `smiles`.
    pub fn include<I, S>(smiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            smiles_to_include: Some(smiles.into_iter().map(Into::into).collect()),
            smiles_to_exclude: None,
            allow_partial_inclusion: false,
        }
    }

    /// Drop rows containing any component in `smiles`.
    pub fn exclude<I, S>(smiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            smiles_to_include: None,
            smiles_to_exclude: Some(smiles.into_iter().map(Into::into).collect()),
            allow_partial_inclusion: false,
        }
    }

    /// Set whether a single included component is enough to keep a row.
    pub fn with_partial_inclusion(mut self, allow_partial_inclusion: bool) -> Self {
        self.allow_partial_inclusion = allow_partial_inclusion;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        exactly_one(
            StageKind::FilterBySmiles,
            ("smiles_to_include", &self.smiles_to_include),
            ("smiles_to_exclude", &self.smiles_to_exclude),
        )
    }
}

/// Configuration of `FilterBySmirks`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterBySmirksSchema {
    /// Patterns which components must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smirks_to_include: Option<Vec<String>>,
    /// Patterns which no component may match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smirks_to_exclude: Option<Vec<String>>,
    /// With `smirks_to_include`, keep rows where at least one component
    /// (rather than every component) matches.
    #[serde(default)]
    pub allow_partial_inclusion: bool,
}

impl FilterBySmirksSchema {
    /// Keep rows whose components all match one of `patterns`.
    pub fn include<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            smirks_to_include: Some(patterns.into_iter().map(Into::into).collect()),
            smirks_to_exclude: None,
            allow_partial_inclusion: false,
        }
    }

    /// Drop rows with any component matching one of `patterns`.
    pub fn exclude<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            smirks_to_include: None,
            smirks_to_exclude: Some(patterns.into_iter().map(Into::into).collect()),
            allow_partial_inclusion: false,
        }
    }

    /// Set whether a single matching component is enough to keep a row.
    pub fn with_partial_inclusion(mut self, allow_partial_inclusion: bool) -> Self {
        self.allow_partial_inclusion = allow_partial_inclusion;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        exactly_one(
            StageKind::FilterBySmirks,
            ("smirks_to_include", &self.smirks_to_include),
            ("smirks_to_exclude", &self.smirks_to_exclude),
        )
    }
}

/// Configuration of `FilterByNComponents`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterByNComponentsSchema {
    /// Numbers of components to retain.
    pub n_components: Vec<usize>,
}

impl FilterByNComponentsSchema {
    /// Keep rows measured for one of the given numbers of components.
    pub fn new(n_components: impl IntoIterator<Item = usize>) -> Result<Self> {
        let schema = Self {
            n_components: n_components.into_iter().collect(),
        };
        schema.validate()?;
        Ok(schema)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.n_components.is_empty() || self.n_components.contains(&0) {
            return Err(CurationError::invalid(
                StageKind::FilterByNComponents,
                "`n_components` must be a non-empty list of positive integers",
            ));
        }
        Ok(())
    }
}

/// Configuration of `FilterBySubstances`.
///
/// Substances are compared without regard to component order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterBySubstancesSchema {
    /// The only substances to retain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substances_to_include: Option<Vec<Substance>>,
    /// Substances to drop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substances_to_exclude: Option<Vec<Substance>>,
}

impl FilterBySubstancesSchema {
    /// Keep only rows measured for one of `substances`.
    pub fn include(substances: impl IntoIterator<Item = Substance>) -> Self {
        Self {
            substances_to_include: Some(substances.into_iter().collect()),
            substances_to_exclude: None,
        }
    }

    /// Drop rows measured for any of `substances`.
    pub fn exclude(substances: impl IntoIterator<Item = Substance>) -> Self {
        Self {
            substances_to_include: None,
            substances_to_exclude: Some(substances.into_iter().collect()),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        exactly_one(
            StageKind::FilterBySubstances,
            ("substances_to_include", &self.substances_to_include),
            ("substances_to_exclude", &self.substances_to_exclude),
        )
    }
}

/// Configuration of `FilterByEnvironments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterByEnvironmentsSchema {
    /// Per number of components, one list of environments per component
    /// position. Components may be matched to positions in any order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_component_environments: Option<BTreeMap<usize, Vec<Vec<ChemicalEnvironment>>>>,

    /// Environments every component is tested against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environments: Option<Vec<ChemicalEnvironment>>,

    /// A component matches when it has at least one listed environment.
    #[serde(default = "default_true")]
    pub at_least_one_environment: bool,

    /// A component matches when all of its environments are listed.
    #[serde(default)]
    pub strictly_specified_environments: bool,
}

fn default_true() -> bool {
    true
}

impl FilterByEnvironmentsSchema {
    /// Test every component against a single list of environments.
    pub fn environments(environments: impl IntoIterator<Item = ChemicalEnvironment>) -> Self {
        Self {
            per_component_environments: None,
            environments: Some(environments.into_iter().collect()),
            at_least_one_environment: true,
            strictly_specified_environments: false,
        }
    }

    /// Test components against position-specific environment lists.
    pub fn per_component(
        per_component_environments: BTreeMap<usize, Vec<Vec<ChemicalEnvironment>>>,
    ) -> Result<Self> {
        let schema = Self {
            per_component_environments: Some(per_component_environments),
            environments: None,
            at_least_one_environment: true,
            strictly_specified_environments: false,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Require components to contain only the listed environments.
    pub fn strictly_specified(mut self) -> Self {
        self.at_least_one_environment = false;
        self.strictly_specified_environments = true;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let stage = StageKind::FilterByEnvironments;

        exactly_one(
            stage,
            ("per_component_environments", &self.per_component_environments),
            ("environments", &self.environments),
        )?;

        if self.at_least_one_environment == self.strictly_specified_environments {
            return Err(CurationError::invalid(
                stage,
                "exactly one of `at_least_one_environment` or \
                 `strictly_specified_environments` must be true",
            ));
        }

        if let Some(per_component) = &self.per_component_environments {
            for (n_components, environments) in per_component {
                if *n_components == 0 || environments.len() != *n_components {
                    return Err(CurationError::invalid(
                        stage,
                        format!(
                            "{} component systems need {} environment lists, got {}",
                            n_components,
                            n_components,
                            environments.len()
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}
