//! Curation stages.
//!
//! A stage turns one [`MeasurementTable`] into another according to its
//! schema. Filter stages return a subset of the input rows, in their original
//! order; the selection stage picks representative rows per substance.

mod assignment;
mod chemistry;
mod duplicates;
mod environments;
mod identity;
mod properties;
mod range;
mod registry;
mod selection;

pub use assignment::maximum_weight_assignment;
pub use chemistry::{
    ChargedFilter, ElementsFilter, IonicLiquidFilter, StereochemistryFilter, filter_by_charged,
    filter_by_elements, filter_by_ionic_liquid, filter_by_stereochemistry,
};
pub use duplicates::{DuplicatesFilter, filter_duplicates};
pub use environments::{EnvironmentsFilter, filter_by_environments};
pub use identity::{
    NComponentsFilter, SmilesFilter, SmirksFilter, SubstancesFilter, filter_by_n_components,
    filter_by_smiles, filter_by_smirks, filter_by_substances,
};
pub use properties::{PropertyTypesFilter, filter_by_property_types};
pub use range::{PressureFilter, TemperatureFilter, filter_by_pressure, filter_by_temperature};
pub use registry::StageRegistry;
pub use selection::{DataPointSelector, select_data_points};

use rayon::prelude::*;

use crate::error::{CurationError, Result};
use crate::schema::{StageKind, StageSchema};
use crate::table::{Measurement, MeasurementTable};

/// A table-to-table transform configured by a [`StageSchema`].
pub trait Stage: Send + Sync {
    /// The kind of schema this stage is configured by.
    fn kind(&self) -> StageKind;

    /// Apply the stage, returning a new table.
    ///
    /// `n_processes` bounds the number of worker threads the stage may use.
    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        n_processes: usize,
    ) -> Result<MeasurementTable>;
}

pub(crate) fn schema_mismatch(expected: StageKind, schema: &StageSchema) -> CurationError {
    CurationError::SchemaMismatch {
        expected,
        found: schema.kind(),
    }
}

/// Keep the rows matching `predicate`, evaluating it on up to `n_processes`
/// threads. Rows keep their original order whatever order they finish in.
pub(crate) fn filter_rows<F>(
    table: &MeasurementTable,
    n_processes: usize,
    predicate: F,
) -> Result<MeasurementTable>
where
    F: Fn(&Measurement) -> Result<bool> + Sync,
{
    let mask: Vec<bool> = if n_processes <= 1 || table.len() < 2 {
        table.iter().map(&predicate).collect::<Result<_>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_processes)
            .thread_name(|i| format!("thermocurate-worker-{}", i))
            .build()?;

        pool.install(|| {
            table
                .rows()
                .par_iter()
                .map(&predicate)
                .collect::<Result<Vec<bool>>>()
        })?
    };

    Ok(table.masked(&mask))
}
