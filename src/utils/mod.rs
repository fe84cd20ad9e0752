//! contains utils used in loading records and parameters

pub mod files;
pub mod parameters;

pub use files::*;
pub use parameters::*;
