mod base;
mod context;
mod interface;
mod middleware;
mod printer;

pub use base::{BoxError, Error, ErrorKind};
pub use context::{Context, Signal};
#[cfg(unix)]
pub use context::{SIGINT, SIGTERM};
pub use printer::{Printer, Template, Usage, UsageRow};

pub(crate) use base::Config;
pub(crate) use context::Trap;

#[cfg(test)]
pub(crate) use interface::util;
