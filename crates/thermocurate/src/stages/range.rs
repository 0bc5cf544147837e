//! Temperature and pressure range filters.

use crate::error::Result;
use crate::schema::{FilterByPressureSchema, FilterByTemperatureSchema, StageKind, StageSchema};
use crate::table::MeasurementTable;

use super::{Stage, schema_mismatch};

fn within(value: f64, minimum: Option<f64>, maximum: Option<f64>) -> bool {
    minimum.is_none_or(|minimum| minimum < value) && maximum.is_none_or(|maximum| value < maximum)
}

/// Keep rows measured strictly inside a temperature range.
pub fn filter_by_temperature(
    table: &MeasurementTable,
    schema: &FilterByTemperatureSchema,
) -> MeasurementTable {
    table.retain(|row| {
        within(
            row.temperature,
            schema.minimum_temperature,
            schema.maximum_temperature,
        )
    })
}

/// Keep rows measured strictly inside a pressure range.
pub fn filter_by_pressure(
    table: &MeasurementTable,
    schema: &FilterByPressureSchema,
) -> MeasurementTable {
    table.retain(|row| within(row.pressure, schema.minimum_pressure, schema.maximum_pressure))
}

/// The `FilterByTemperature` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemperatureFilter;

impl Stage for TemperatureFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterByTemperature
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        _n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterByTemperature(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        Ok(filter_by_temperature(table, schema))
    }
}

/// The `FilterByPressure` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct PressureFilter;

impl Stage for PressureFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterByPressure
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        _n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterByPressure(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        Ok(filter_by_pressure(table, schema))
    }
}
