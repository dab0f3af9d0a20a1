// logsift - core/mod.rs
//
// Core business logic layer: record model, predicates, filters, the line
// parser, record sets, discovery, and result export.

pub mod discovery;
pub mod export;
pub mod filter;
pub mod model;
pub mod parser;
pub mod predicate;
pub mod record_set;

pub use filter::{Criteria, Filter};
pub use model::{Groups, LogRecord, PropName, PropValue, RecordProps};
pub use parser::LoadSummary;
pub use predicate::{Predicate, PropPredicate, RegexPredicate, TimeRangePredicate};
pub use record_set::RecordSet;
