//! Writer for measurement tables in the wide delimited layout.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{CurationError, Result};
use crate::table::MeasurementTable;

use super::parser::{N_COMPONENTS, PHASE, PRESSURE, SOURCE, TEMPERATURE};

/// Writes measurement tables with one line per measurement.
///
/// Component columns are emitted up to the largest number of components in
/// the table, and property columns in table order. Missing cells are empty.
#[derive(Debug, Clone)]
pub struct TableWriter {
    delimiter: u8,
}

impl TableWriter {
    /// Create a comma-separated writer.
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Use a different delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write a table to a file, replacing it.
    pub fn write_file(&self, table: &MeasurementTable, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| CurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.write(table, file)
    }

    /// Write a table to any writer.
    pub fn write<W: Write>(&self, table: &MeasurementTable, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        let max_n_components = table.max_n_components();

        let mut headers: Vec<String> = [TEMPERATURE, PRESSURE, PHASE, N_COMPONENTS]
            .iter()
            .map(|h| h.to_string())
            .collect();
        for i in 1..=max_n_components {
            headers.push(format!("Component {}", i));
            headers.push(format!("Role {}", i));
            headers.push(format!("Mole Fraction {}", i));
            headers.push(format!("Exact Amount {}", i));
        }
        for (property_type, unit) in table.properties() {
            headers.push(format!("{} Value ({})", property_type, unit));
            headers.push(format!("{} Uncertainty ({})", property_type, unit));
        }
        headers.push(SOURCE.to_string());
        writer.write_record(&headers)?;

        for row in table.iter() {
            let mut record: Vec<String> = Vec::with_capacity(headers.len());
            record.push(row.temperature.to_string());
            record.push(row.pressure.to_string());
            record.push(row.phase.clone());
            record.push(row.n_components().to_string());

            for i in 0..max_n_components {
                match row.components.get(i) {
                    Some(component) => {
                        record.push(component.smiles.clone());
                        record.push(component.role.to_string());
                        record.push(component.mole_fraction.to_string());
                        record.push(component.exact_amount.to_string());
                    }
                    None => record.extend(std::iter::repeat_n(String::new(), 4)),
                }
            }

            for property_type in table.property_types() {
                match row.value(property_type) {
                    Some(value) => {
                        record.push(value.value.to_string());
                        record.push(value.uncertainty.map(|u| u.to_string()).unwrap_or_default());
                    }
                    None => record.extend(std::iter::repeat_n(String::new(), 2)),
                }
            }

            record.push(row.source.clone());
            writer.write_record(&record)?;
        }

        writer.flush().map_err(|e| CurationError::Csv(e.into()))?;
        Ok(())
    }

    /// Render a table as a string.
    pub fn to_csv_string(&self, table: &MeasurementTable) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(table, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| CurationError::Table(e.to_string()))
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new()
    }
}
