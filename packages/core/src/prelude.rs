pub use crate::definitions::*;
pub use crate::security::*;
pub use crate::values::*;
