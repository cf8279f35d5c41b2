//! Common module - shared traits and utilities

pub mod traits;
pub mod utils;

pub use traits::*;
pub use utils::*;
