//! Command implementations.
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod collect;
pub mod report;
pub mod routes;

pub use collect::execute as collect_execute;
pub use report::execute as report_execute;
pub use routes::execute as routes_execute;
