//! Builder module for `commander`.
//! See [documentation root](https://docs.rs/commander/latest/commander/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod matcher;
mod model;
mod parser;
pub mod prelude;

pub use api::*;
pub use model::*;
pub use parser::{BoxError, Context, Error, ErrorKind, Printer, Signal, Template, Usage, UsageRow};
#[cfg(unix)]
pub use parser::{SIGINT, SIGTERM};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
