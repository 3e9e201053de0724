mod definitions;
pub use definitions::*;

pub mod formatters;
pub mod loggers;
