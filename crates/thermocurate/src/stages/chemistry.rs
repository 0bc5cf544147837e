//! Filters on the chemistry of each component: elements, stereochemistry,
//! charge and fragment count.

use std::sync::Arc;

use crate::error::Result;
use crate::schema::{
    FilterByChargedSchema, FilterByElementsSchema, FilterByIonicLiquidSchema,
    FilterByStereochemistrySchema, StageKind, StageSchema,
};
use crate::table::{Measurement, MeasurementTable};
use crate::toolkit::{MoleculeInspector, Toolkit};

use super::{Stage, filter_rows, schema_mismatch};

fn all_components<F>(row: &Measurement, mut keep: F) -> Result<bool>
where
    F: FnMut(&str) -> Result<bool>,
{
    for smiles in row.component_smiles() {
        if !keep(smiles)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Keep rows whose components are made only of allowed elements, or contain
/// no forbidden element.
pub fn filter_by_elements<I>(
    table: &MeasurementTable,
    schema: &FilterByElementsSchema,
    inspector: &I,
    n_processes: usize,
) -> Result<MeasurementTable>
where
    I: MoleculeInspector + ?Sized,
{
    filter_rows(table, n_processes, |row| {
        all_components(row, |smiles| {
            let elements = inspector.elements(smiles)?;

            if let Some(allowed) = &schema.allowed_elements {
                if !elements.iter().all(|e| allowed.contains(e)) {
                    return Ok(false);
                }
            }
            if let Some(forbidden) = &schema.forbidden_elements {
                if elements.iter().any(|e| forbidden.contains(e)) {
                    return Ok(false);
                }
            }
            Ok(true)
        })
    })
}

/// Drop rows with any component whose stereochemistry is undefined.
pub fn filter_by_stereochemistry<I>(
    table: &MeasurementTable,
    _schema: &FilterByStereochemistrySchema,
    inspector: &I,
    n_processes: usize,
) -> Result<MeasurementTable>
where
    I: MoleculeInspector + ?Sized,
{
    filter_rows(table, n_processes, |row| {
        all_components(row, |smiles| {
            Ok(!inspector.has_undefined_stereochemistry(smiles)?)
        })
    })
}

/// Drop rows with any component carrying a net formal charge.
pub fn filter_by_charged<I>(
    table: &MeasurementTable,
    _schema: &FilterByChargedSchema,
    inspector: &I,
    n_processes: usize,
) -> Result<MeasurementTable>
where
    I: MoleculeInspector + ?Sized,
{
    filter_rows(table, n_processes, |row| {
        all_components(row, |smiles| Ok(inspector.net_formal_charge(smiles)? == 0))
    })
}

/// Drop rows with any component made of several disconnected fragments,
/// such as the ions of a salt or ionic liquid.
pub fn filter_by_ionic_liquid(
    table: &MeasurementTable,
    _schema: &FilterByIonicLiquidSchema,
) -> MeasurementTable {
    table.retain(|row| row.component_smiles().all(|smiles| !smiles.contains('.')))
}

/// The `FilterByElements` stage.
pub struct ElementsFilter {
    toolkit: Arc<dyn Toolkit>,
}

impl ElementsFilter {
    pub fn new(toolkit: Arc<dyn Toolkit>) -> Self {
        Self { toolkit }
    }
}

impl Stage for ElementsFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterByElements
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterByElements(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        filter_by_elements(table, schema, self.toolkit.as_ref(), n_processes)
    }
}

/// The `FilterByStereochemistry` stage.
pub struct StereochemistryFilter {
    toolkit: Arc<dyn Toolkit>,
}

impl StereochemistryFilter {
    pub fn new(toolkit: Arc<dyn Toolkit>) -> Self {
        Self { toolkit }
    }
}

impl Stage for StereochemistryFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterByStereochemistry
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterByStereochemistry(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        filter_by_stereochemistry(table, schema, self.toolkit.as_ref(), n_processes)
    }
}

/// The `FilterByCharged` stage.
pub struct ChargedFilter {
    toolkit: Arc<dyn Toolkit>,
}

impl ChargedFilter {
    pub fn new(toolkit: Arc<dyn Toolkit>) -> Self {
        Self { toolkit }
    }
}

impl Stage for ChargedFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterByCharged
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterByCharged(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        filter_by_charged(table, schema, self.toolkit.as_ref(), n_processes)
    }
}

/// The `FilterByIonicLiquid` stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct IonicLiquidFilter;

impl Stage for IonicLiquidFilter {
    fn kind(&self) -> StageKind {
        StageKind::FilterByIonicLiquid
    }

    fn apply(
        &self,
        table: &MeasurementTable,
        schema: &StageSchema,
        _n_processes: usize,
    ) -> Result<MeasurementTable> {
        let StageSchema::FilterByIonicLiquid(schema) = schema else {
            return Err(schema_mismatch(self.kind(), schema));
        };
        Ok(filter_by_ionic_liquid(table, schema))
    }
}
