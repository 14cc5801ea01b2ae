//! CLI input/output helpers.

pub mod exit_code;

pub use exit_code::ExitCode;
