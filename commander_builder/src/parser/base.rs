use std::io::Write;
use thiserror::Error;

use crate::parser::context::{default_signals, Signal};
use crate::parser::printer::{Printer, Template, Usage};

/// Boxed error produced by user code (custom value callbacks and actions).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The errors produced while parsing and running a command line.
///
/// Use [`Error::kind`] (or the `is_*` predicates) to branch on the category of failure rather than matching messages.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A positional token was given to a command that declares no positional parameters.
    #[error("commander: invalid input with unexpected arg {0:?}")]
    UnexpectedArg(String),

    /// A positional token was left over after every positional parameter was filled.
    #[error("commander: invalid input: {0}")]
    ExtraArg(String),

    /// A flag that the command does not define.
    #[error("commander: invalid input: unknown flag {0:?}")]
    UnknownFlag(String),

    /// A value taking flag was the final token.
    #[error("commander: invalid input: flag needs an argument: {0}")]
    MissingFlagValue(String),

    /// A flag shaped token that cannot name a flag (ex: `---x` or `-=x`).
    #[error("commander: invalid input: bad flag syntax {0:?}")]
    BadFlagSyntax(String),

    /// Two flags of the same command share a name or short alias.
    #[error("commander: invalid input {command:?} command contains a duplicate flag {flag:?}")]
    DuplicateFlag {
        /// The full path of the command.
        command: String,
        /// The colliding flag, as `--name` or `-s`.
        flag: String,
    },

    /// A string map value without a `:` separator.
    #[error("{key}: invalid key:value pair for {raw:?}")]
    MalformedPair {
        /// The parameter key.
        key: String,
        /// The offending value.
        raw: String,
    },

    /// A command path lookup that does not exist in the tree.
    #[error("commander: unable to find command {0:?}")]
    CommandNotFound(String),

    /// A required parameter was not given explicitly, by environment, or by default.
    #[error("missing {key}{}", environment_hint(.env))]
    MissingInput {
        /// The parameter key.
        key: String,
        /// The environment variable consulted, if any.
        env: Option<String>,
    },

    /// A value that does not convert into the parameter's type.
    #[error("{key}: expected {expected} but got {raw:?}")]
    TypeMismatch {
        /// The parameter key.
        key: String,
        /// The offending value.
        raw: String,
        /// The expected type, with its article (ex: `an integer`).
        expected: &'static str,
    },

    /// A value outside of an enumeration's possibilities.
    #[error("{key} {raw:?} must be {}", either(.allowed))]
    EnumMismatch {
        /// The parameter key.
        key: String,
        /// The offending value.
        raw: String,
        /// The possibilities of the enumeration.
        allowed: Vec<String>,
    },

    /// A custom value callback rejected its input.
    #[error("{key}: invalid value {raw:?}: {source}")]
    Custom {
        /// The parameter key.
        key: String,
        /// The offending value.
        raw: String,
        /// The callback's error.
        source: BoxError,
    },

    /// Returned by an action to request the command's usage instead of an error.
    #[error("commander: usage requested")]
    Usage,

    /// The context was cancelled while the action ran.
    #[error("commander: context cancelled")]
    Cancelled,

    /// An error raised by an action.
    #[error("{0}")]
    Action(BoxError),

    /// The configured writer failed.
    #[error("commander: unable to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unrecognized, extra or malformed input (including duplicate flag definitions).
    InvalidInput,
    /// A command path that does not exist.
    NotFound,
    /// A required value that was not provided.
    MissingInput,
    /// A value that does not convert into its parameter's type.
    TypeMismatch,
    /// A value outside of an enumeration's possibilities.
    EnumMismatch,
    /// The usage sentinel.
    Usage,
    /// The context was cancelled.
    Cancelled,
    /// An action failed.
    Action,
    /// Output could not be written.
    Io,
}

impl Error {
    /// Wrap an arbitrary error raised by an action.
    ///
    /// ### Example
    /// ```
    /// # use commander_builder as commander;
    /// use commander::{Error, ErrorKind};
    ///
    /// let error = Error::action("disk full");
    /// assert_eq!(error.kind(), ErrorKind::Action);
    /// assert_eq!(error.to_string(), "disk full");
    /// ```
    pub fn action(error: impl Into<BoxError>) -> Self {
        Error::Action(error.into())
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnexpectedArg(_)
            | Error::ExtraArg(_)
            | Error::UnknownFlag(_)
            | Error::MissingFlagValue(_)
            | Error::BadFlagSyntax(_)
            | Error::DuplicateFlag { .. }
            | Error::MalformedPair { .. }
            | Error::Custom { .. } => ErrorKind::InvalidInput,
            Error::CommandNotFound(_) => ErrorKind::NotFound,
            Error::MissingInput { .. } => ErrorKind::MissingInput,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::EnumMismatch { .. } => ErrorKind::EnumMismatch,
            Error::Usage => ErrorKind::Usage,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Action(_) => ErrorKind::Action,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether this error stems from unrecognized, extra or malformed input.
    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }

    /// Whether this error is a failed command path lookup.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Whether this error is a required value that was not provided.
    pub fn is_missing_input(&self) -> bool {
        self.kind() == ErrorKind::MissingInput
    }

    /// Whether this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}

fn environment_hint(env: &Option<String>) -> String {
    match env {
        Some(name) => format!(" or ${name} environment variable"),
        None => String::default(),
    }
}

fn either(allowed: &[String]) -> String {
    match allowed.split_last() {
        None => "one of an empty set".to_string(),
        Some((last, [])) => format!("{last:?}"),
        Some((last, rest)) => format!(
            "either {} or {last:?}",
            rest.iter()
                .map(|possibility| format!("{possibility:?}"))
                .collect::<Vec<String>>()
                .join(", ")
        ),
    }
}

/// Process wide settings, threaded through the parse of every command.
pub(crate) struct Config {
    pub(crate) writer: Box<dyn Write>,
    pub(crate) version: Option<String>,
    pub(crate) template: Box<dyn Template>,
    pub(crate) signals: Vec<Signal>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            writer: Box::new(std::io::stdout()),
            version: None,
            template: Box::new(Printer::terminal()),
            signals: default_signals(),
        }
    }
}

impl Config {
    pub(crate) fn print(&mut self, message: &str) -> Result<(), Error> {
        self.writer.write_all(message.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    pub(crate) fn print_usage(&mut self, usage: Usage) -> Result<(), Error> {
        let message = self.template.render(&usage);
        self.print(&message)
    }
}
