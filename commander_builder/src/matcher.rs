mod core;
mod words;

pub(crate) use self::core::*;
pub(crate) use words::*;
