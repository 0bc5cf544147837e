//! Measurement table data model.

mod component;
mod measurement;
mod measurement_table;
mod substance;

pub use component::{Component, Role};
pub use measurement::{Measurement, PropertyValue};
pub use measurement_table::MeasurementTable;
pub use substance::Substance;
