//! Reader for measurement tables stored as wide delimited text.
//!
//! Each line holds one measurement. Components are spread over numbered
//! column groups (`Component 1`, `Role 1`, `Mole Fraction 1`, ...), and every
//! property type owns a `<Type> Value (<unit>)` / `<Type> Uncertainty (<unit>)`
//! column pair.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use csv::StringRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{CurationError, Result};
use crate::table::{Component, Measurement, MeasurementTable, Role};

use super::source::SourceMetadata;

pub(crate) const TEMPERATURE: &str = "Temperature (K)";
pub(crate) const PRESSURE: &str = "Pressure (kPa)";
pub(crate) const PHASE: &str = "Phase";
pub(crate) const N_COMPONENTS: &str = "N Components";
pub(crate) const SOURCE: &str = "Source";

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b',', b'\t', b';'];

static COMPONENT_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Component|Role|Mole Fraction|Exact Amount) (\d+)$").expect("valid regex")
});

static PROPERTY_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+) (Value|Uncertainty) \((.*)\)$").expect("valid regex")
});

/// Whether a cell holds one of the usual spellings of a missing value.
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
}

/// Parser configuration.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
}

#[derive(Debug, Default)]
struct ComponentColumns {
    smiles: Option<usize>,
    role: Option<usize>,
    mole_fraction: Option<usize>,
    exact_amount: Option<usize>,
}

#[derive(Debug)]
struct PropertyColumns {
    property_type: String,
    value: Option<usize>,
    uncertainty: Option<usize>,
}

/// Where each field of a measurement lives in a record.
#[derive(Debug)]
struct Layout {
    headers: Vec<String>,
    temperature: usize,
    pressure: usize,
    n_components: usize,
    phase: Option<usize>,
    source: Option<usize>,
    components: BTreeMap<usize, ComponentColumns>,
    properties: Vec<PropertyColumns>,
}

impl Layout {
    /// Classify the headers, registering a table column per property type.
    fn new(headers: &StringRecord, table: &mut MeasurementTable) -> Result<Self> {
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let position = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| CurationError::Parse {
                row: 0,
                column: name.to_string(),
                message: "required column is missing".to_string(),
            })
        };

        let temperature = required(TEMPERATURE)?;
        let pressure = required(PRESSURE)?;
        let n_components = required(N_COMPONENTS)?;
        let phase = position(PHASE);
        let source = position(SOURCE);

        let mut components: BTreeMap<usize, ComponentColumns> = BTreeMap::new();
        let mut properties: Vec<PropertyColumns> = Vec::new();

        for (index, header) in headers.iter().enumerate() {
            if let Some(captures) = COMPONENT_HEADER.captures(header) {
                let number: usize = captures[2].parse().map_err(|_| CurationError::Parse {
                    row: 0,
                    column: header.clone(),
                    message: "component number is out of range".to_string(),
                })?;
                let columns = components.entry(number).or_default();

                match &captures[1] {
                    "Component" => columns.smiles = Some(index),
                    "Role" => columns.role = Some(index),
                    "Mole Fraction" => columns.mole_fraction = Some(index),
                    _ => columns.exact_amount = Some(index),
                }
            } else if let Some(captures) = PROPERTY_HEADER.captures(header) {
                let property_type = &captures[1];
                table.add_property(property_type, &captures[3])?;

                let slot = match properties.iter().position(|p| p.property_type == property_type) {
                    Some(slot) => slot,
                    None => {
                        properties.push(PropertyColumns {
                            property_type: property_type.to_string(),
                            value: None,
                            uncertainty: None,
                        });
                        properties.len() - 1
                    }
                };
                let columns = &mut properties[slot];

                if &captures[2] == "Value" {
                    columns.value = Some(index);
                } else {
                    columns.uncertainty = Some(index);
                }
            } else if ![TEMPERATURE, PRESSURE, N_COMPONENTS, PHASE, SOURCE].contains(&header.as_str()) {
                debug!(column = %header, "Ignoring unrecognised column.");
            }
        }

        for (number, columns) in &components {
            if columns.smiles.is_none() {
                return Err(CurationError::Parse {
                    row: 0,
                    column: format!("Component {}", number),
                    message: "amount columns were given without a component column".to_string(),
                });
            }
        }

        Ok(Self {
            headers,
            temperature,
            pressure,
            n_components,
            phase,
            source,
            components,
            properties,
        })
    }

    fn parse_error(&self, row: usize, column: usize, message: impl Into<String>) -> CurationError {
        CurationError::Parse {
            row,
            column: self.headers.get(column).cloned().unwrap_or_default(),
            message: message.into(),
        }
    }

    fn cell<'r>(record: &'r StringRecord, column: usize) -> Option<&'r str> {
        record.get(column).map(str::trim).filter(|v| !is_missing(v))
    }

    fn number(&self, record: &StringRecord, row: usize, column: usize) -> Result<Option<f64>> {
        Self::cell(record, column)
            .map(|text| {
                text.parse::<f64>()
                    .map_err(|_| self.parse_error(row, column, format!("'{}' is not a number", text)))
            })
            .transpose()
    }

    fn required_number(&self, record: &StringRecord, row: usize, column: usize) -> Result<f64> {
        self.number(record, row, column)?
            .ok_or_else(|| self.parse_error(row, column, "value is missing"))
    }

    /// Build the measurement held by one record. `row` is 1-based.
    fn measurement(&self, record: &StringRecord, row: usize) -> Result<Measurement> {
        let temperature = self.required_number(record, row, self.temperature)?;
        let pressure = self.required_number(record, row, self.pressure)?;

        let n_components = self.required_number(record, row, self.n_components)?;
        if n_components < 1.0 || n_components.fract() != 0.0 {
            return Err(self.parse_error(
                row,
                self.n_components,
                "must be a positive whole number",
            ));
        }
        let n_components = n_components as usize;

        let mut measurement = Measurement::new(temperature, pressure);
        if let Some(phase) = self.phase.and_then(|column| Self::cell(record, column)) {
            measurement = measurement.with_phase(phase);
        }
        if let Some(source) = self.source.and_then(|column| Self::cell(record, column)) {
            measurement = measurement.with_source(source);
        }

        for (&number, columns) in &self.components {
            let smiles = columns.smiles.and_then(|column| Self::cell(record, column));

            let Some(smiles) = smiles else {
                if number <= n_components {
                    return Err(self.parse_error(
                        row,
                        self.n_components,
                        format!("expected {} components but component {} is empty", n_components, number),
                    ));
                }
                continue;
            };
            if number > n_components {
                return Err(self.parse_error(
                    row,
                    self.n_components,
                    format!("expected {} components but component {} is set", n_components, number),
                ));
            }

            let role = match columns.role.and_then(|column| Self::cell(record, column)) {
                Some(text) => text.parse::<Role>().map_err(|message| {
                    self.parse_error(row, columns.role.unwrap_or_default(), message)
                })?,
                None => Role::Solvent,
            };

            let mole_fraction = match columns.mole_fraction {
                Some(column) => self.number(record, row, column)?.unwrap_or(0.0),
                None => 0.0,
            };

            let exact_amount = match columns.exact_amount {
                Some(column) => {
                    let amount = self.number(record, row, column)?.unwrap_or(0.0);
                    if amount < 0.0 || amount.fract() != 0.0 || amount > u32::MAX as f64 {
                        return Err(self.parse_error(row, column, "must be a non-negative whole number"));
                    }
                    amount as u32
                }
                None => 0,
            };

            measurement = measurement.with_component(
                Component::new(smiles, mole_fraction)
                    .with_role(role)
                    .with_exact_amount(exact_amount),
            );
        }

        if measurement.n_components() != n_components {
            return Err(self.parse_error(
                row,
                self.n_components,
                format!(
                    "expected {} components but the file has columns for {}",
                    n_components,
                    measurement.n_components()
                ),
            ));
        }

        for columns in &self.properties {
            let Some(value) = columns
                .value
                .map(|column| self.number(record, row, column))
                .transpose()?
                .flatten()
            else {
                continue;
            };
            let uncertainty = columns
                .uncertainty
                .map(|column| self.number(record, row, column))
                .transpose()?
                .flatten();

            measurement = measurement.with_value(&columns.property_type, value, uncertainty);
        }

        if measurement.values.is_empty() {
            return Err(CurationError::Parse {
                row,
                column: "Value".to_string(),
                message: "no property value is set".to_string(),
            });
        }

        Ok(measurement)
    }
}

/// Reads measurement tables from delimited text files.
pub struct TableParser {
    config: ParserConfig,
}

impl TableParser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the table and metadata about its source.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(MeasurementTable, SourceMetadata)> {
        let path = path.as_ref();
        let io_error = |source| CurationError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(io_error)?;
        let size_bytes = file.metadata().map_err(io_error)?.len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(io_error)?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let table = self.parse_bytes(&contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            _ => "delimited",
        }
        .to_string();

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            table.len(),
            table.properties().len(),
        );

        debug!(
            file = %metadata.file,
            rows = metadata.row_count,
            properties = metadata.property_count,
            "Loaded measurement table."
        );

        Ok((table, metadata))
    }

    /// Parse text, detecting its delimiter.
    pub fn parse_str(&self, text: &str) -> Result<MeasurementTable> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(text.as_bytes())?,
        };
        self.parse_bytes(text.as_bytes(), delimiter)
    }

    /// Parse bytes with a known delimiter.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<MeasurementTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let mut table = MeasurementTable::new();
        let layout = Layout::new(reader.headers()?, &mut table)?;

        for (index, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if index >= max {
                    break;
                }
            }

            let record = result?;
            table.push(layout.measurement(&record, index + 1)?)?;
        }

        if table.is_empty() {
            return Err(CurationError::EmptyData("No measurements found".to_string()));
        }

        Ok(table)
    }
}

impl Default for TableParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(CurationError::EmptyData("No lines to analyze".to_string()));
    }

    // Prefer delimiters found the same number of times on every line.
    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delimiter in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delimiter))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let score = if counts.iter().all(|&c| c == first_count) {
            first_count * 1000
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delimiter;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delimiter = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
