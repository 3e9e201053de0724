pub use crate::command::*;
pub use crate::error::*;
