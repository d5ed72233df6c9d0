//! Use cases and business workflows.

pub mod context;
pub mod use_cases;
