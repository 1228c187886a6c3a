pub mod catalog_resolver;
pub mod monitor;
pub mod report_assembler;
pub mod rule_engine;
pub mod rules;

pub use catalog_resolver::CatalogResolver;
pub use monitor::{RunSummary, StationMonitor};
pub use report_assembler::assemble;
pub use rule_engine::RuleEngine;
