//! Staff directory and payroll processing

mod processor;

pub use processor::{PayrollError, PayrollService};
