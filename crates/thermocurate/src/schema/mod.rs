//! Stage configuration schemas.
//!
//! Every curation stage is configured by its own schema type. [`StageSchema`]
//! wraps them in a single enum which serializes with a `type` field naming
//! the stage, and which is validated whenever it is deserialized.
//!
//! Schema fields are public and may be edited after construction.
//! [`Workflow::new`](crate::Workflow::new) validates every schema again and
//! keeps its own copy, so a workflow never runs an invalid or later-edited
//! configuration.

mod filtering;
mod selection;
mod workflow;

pub use filtering::{
    FilterByChargedSchema, FilterByElementsSchema, FilterByEnvironmentsSchema,
    FilterByIonicLiquidSchema, FilterByNComponentsSchema, FilterByPressureSchema,
    FilterByPropertyTypesSchema, FilterBySmilesSchema, FilterBySmirksSchema,
    FilterByStereochemistrySchema, FilterBySubstancesSchema, FilterByTemperatureSchema,
    FilterDuplicatesSchema,
};
pub use selection::{SelectDataPointsSchema, State, TargetState};
pub use workflow::WorkflowSchema;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CurationError, Result};

/// Discriminator naming a curation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StageKind {
    FilterDuplicates,
    FilterByTemperature,
    FilterByPressure,
    FilterByElements,
    FilterByPropertyTypes,
    FilterByStereochemistry,
    FilterByCharged,
    FilterByIonicLiquid,
    FilterBySmiles,
    FilterBySmirks,
    FilterByNComponents,
    FilterBySubstances,
    FilterByEnvironments,
    SelectDataPoints,
}

impl StageKind {
    /// Every stage kind.
    pub const ALL: &'static [StageKind] = &[
        StageKind::FilterDuplicates,
        StageKind::FilterByTemperature,
        StageKind::FilterByPressure,
        StageKind::FilterByElements,
        StageKind::FilterByPropertyTypes,
        StageKind::FilterByStereochemistry,
        StageKind::FilterByCharged,
        StageKind::FilterByIonicLiquid,
        StageKind::FilterBySmiles,
        StageKind::FilterBySmirks,
        StageKind::FilterByNComponents,
        StageKind::FilterBySubstances,
        StageKind::FilterByEnvironments,
        StageKind::SelectDataPoints,
    ];

    /// The discriminator value used in serialized schemas.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::FilterDuplicates => "FilterDuplicates",
            StageKind::FilterByTemperature => "FilterByTemperature",
            StageKind::FilterByPressure => "FilterByPressure",
            StageKind::FilterByElements => "FilterByElements",
            StageKind::FilterByPropertyTypes => "FilterByPropertyTypes",
            StageKind::FilterByStereochemistry => "FilterByStereochemistry",
            StageKind::FilterByCharged => "FilterByCharged",
            StageKind::FilterByIonicLiquid => "FilterByIonicLiquid",
            StageKind::FilterBySmiles => "FilterBySmiles",
            StageKind::FilterBySmirks => "FilterBySmirks",
            StageKind::FilterByNComponents => "FilterByNComponents",
            StageKind::FilterBySubstances => "FilterBySubstances",
            StageKind::FilterByEnvironments => "FilterByEnvironments",
            StageKind::SelectDataPoints => "SelectDataPoints",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        StageKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown stage type: {}", s))
    }
}

macro_rules! stage_schemas {
    ($($kind:ident($schema:ty),)*) => {
        /// The configuration of one curation stage.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", try_from = "RawStageSchema")]
        pub enum StageSchema {
            $($kind($schema),)*
        }

        /// Unvalidated form of [`StageSchema`], used while deserializing.
        #[derive(Deserialize)]
        #[serde(tag = "type")]
        enum RawStageSchema {
            $($kind($schema),)*
        }

        impl StageSchema {
            /// The stage this schema configures.
            pub fn kind(&self) -> StageKind {
                match self {
                    $(StageSchema::$kind(_) => StageKind::$kind,)*
                }
            }

            /// Check the schema's constraints.
            pub fn validate(&self) -> Result<()> {
                match self {
                    $(StageSchema::$kind(schema) => schema.validate(),)*
                }
            }
        }

        impl TryFrom<RawStageSchema> for StageSchema {
            type Error = CurationError;

            fn try_from(raw: RawStageSchema) -> Result<Self> {
                let schema = match raw {
                    $(RawStageSchema::$kind(schema) => StageSchema::$kind(schema),)*
                };
                schema.validate()?;
                Ok(schema)
            }
        }

        $(
            impl From<$schema> for StageSchema {
                fn from(schema: $schema) -> Self {
                    StageSchema::$kind(schema)
                }
            }
        )*
    };
}

stage_schemas! {
    FilterDuplicates(FilterDuplicatesSchema),
    FilterByTemperature(FilterByTemperatureSchema),
    FilterByPressure(FilterByPressureSchema),
    FilterByElements(FilterByElementsSchema),
    FilterByPropertyTypes(FilterByPropertyTypesSchema),
    FilterByStereochemistry(FilterByStereochemistrySchema),
    FilterByCharged(FilterByChargedSchema),
    FilterByIonicLiquid(FilterByIonicLiquidSchema),
    FilterBySmiles(FilterBySmilesSchema),
    FilterBySmirks(FilterBySmirksSchema),
    FilterByNComponents(FilterByNComponentsSchema),
    FilterBySubstances(FilterBySubstancesSchema),
    FilterByEnvironments(FilterByEnvironmentsSchema),
    SelectDataPoints(SelectDataPointsSchema),
}

/// Fail unless exactly one of two mutually exclusive options is set.
pub(crate) fn exactly_one<A, B>(
    stage: StageKind,
    (a_name, a): (&str, &Option<A>),
    (b_name, b): (&str, &Option<B>),
) -> Result<()> {
    match (a, b) {
        (Some(_), Some(_)) => Err(CurationError::invalid(
            stage,
            format!("`{}` and `{}` are mutually exclusive", a_name, b_name),
        )),
        (None, None) => Err(CurationError::invalid(
            stage,
            format!("one of `{}` or `{}` must be set", a_name, b_name),
        )),
        _ => Ok(()),
    }
}
