pub mod result_log;

pub use result_log::ResultLogger;
