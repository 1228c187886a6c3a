pub mod csv_source;
pub mod source;

pub use csv_source::CsvDirectorySource;
pub use source::{DataSource, MemorySource};
