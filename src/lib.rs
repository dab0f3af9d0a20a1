// logsift - lib.rs
//
// Library entry point. The `logsift` binary in `main.rs` is a thin CLI over
// these modules; everything it does is reachable programmatically.

pub mod core;
pub mod platform;
pub mod util;

pub use crate::core::{Criteria, LogRecord, RecordSet};
pub use crate::util::error::{LogSiftError, Result};
