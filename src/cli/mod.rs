//! Command line interface module
//!
//! Argument parsing and validation, and the runner that drives one cleanup run.

pub mod args;
pub mod runner;

pub use args::Args;
pub use runner::Runner;
