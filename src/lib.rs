//! `commander` is a typed, tree-structured command line parser.
//!
//! A program is described as a tree of commands.
//! Every command declares its own flags, positional args, an optional collector for the remaining positionals, and an action.
//! Parsing walks the tree with the tokens of the command line, and runs the action of the command it lands on.
//!
//! `commander` focuses on the following concerns:
//! * *Typed destinations*:
//! Each parameter writes into a [`Target`] of the type it was declared with (text, integers, booleans, enumerations, lists, maps, or a custom callback).
//! The program never converts `&str` itself.
//! * *Layered values*:
//! A value given on the command line wins over its environment variable, which wins over its default.
//! Parameters without any of these are reported as missing, unless they were declared optional.
//! * *Sub-command trees*:
//! Sub-commands inherit the flags declared on their parent (up to the point of their creation), and flags may appear anywhere on the line.
//! * *Usage out of the box*:
//! `-h`/`--help`, or a command without an action, prints a usage page rendered by a replaceable [`Template`].
//!
//! # Usage
//! A minimal program, with a single sub-command:
//! ```no_run
#![doc = include_str!("../demos/app.rs")]
//! ```
//!
//! A larger tree, with environment fallbacks, nested sub-commands and an advanced command:
//! ```no_run
#![doc = include_str!("../demos/heroku.rs")]
//! ```
//!
//! Which generates the following usage page:
//! ```console
//! $ heroku -h
//!
//!   Usage:
//!     $ heroku [flags] [command]
//!
//!   Description:
//!     CLI to interact with Heroku
//!
//!   Version:
//!     8.1.9
//!
//!   Flags:
//!     -a, --app     app to run command against (env: HEROKU_APP)
//!     -r, --remote  git remote of app to use (optional)
//!
//!   Commands:
//!     ps  list dynos for an app
//!
//!   Advanced Commands:
//!     login  login with your Heroku credentials
//!
//! ```
//!
//! # Flags and positionals
//! * Flags are written `--name value`, `--name=value`, or with their short alias `-n value`.
//! A single dash works for long names too (`-name`).
//! * Boolean flags may be given bare (`--json` means `true`), or inline (`--json=false`).
//! * Flags and positionals interleave freely: `heroku ps scale web=1 -a foo` and `heroku -a foo ps scale web=1` are equivalent.
//! * `--` ends flag parsing; everything after it is positional, even when it looks like a flag or names a sub-command.
//!
//! # Errors
//! [`Cli::parse`] returns an [`Error`], which the program typically prints before exiting.
//! Branch on [`Error::kind`] rather than the message.
//! An action may return [`Error::Usage`] to print its command's usage instead.
//!
//! # Cancellation
//! Actions receive a [`Context`].
//! By default, `SIGINT` cancels it for the duration of the parse (see [`Cli::trap`]), in which case `parse` returns [`Error::Cancelled`].
//!
//! # Testing
//! With the `unit_test` feature, [`Command::test_dummy`] and [`Command::test_parse`] allow exercising the setup of a single command in isolation.
//!
//! # Logging
//! With the `tracing_debug` feature, `commander` emits `tracing` debug events describing how each token was matched and where every value came from.
//! No subscriber is installed.
pub use commander_builder::*;
