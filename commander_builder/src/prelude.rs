//! Traits which, typically, may be imported without concern: `use commander::prelude::*`.

pub use crate::api::Commander;
pub use crate::parser::Template;
