//! Reading and writing measurement tables.

mod parser;
mod source;
mod writer;

pub use parser::{ParserConfig, TableParser, is_missing};
pub use source::SourceMetadata;
pub use writer::TableWriter;
