use std::env;
use std::rc::Rc;

use crate::api::{Cli, Command, Commander, Middleware, Next};
use crate::matcher::{is_flag, scan, FlagTable, Scan};
use crate::parser::{Config, Context, Error, Trap, Usage};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

const COMPLETION_VARIABLE: &str = "COMP_LINE";

impl Command {
    /// Clear the per-parse state of every binding in this sub-tree.
    pub(crate) fn reset(&self) {
        for flag in &self.flags {
            flag.reset();
        }

        for parameter in self.args.iter().chain(self.rest.iter()) {
            parameter.reset();
        }

        for command in self.commands.values() {
            command.reset();
        }
    }

    /// Parse `tokens` against this command, dispatching to a sub-command when the first positional names one.
    ///
    /// Middlewares of every command along the way are accumulated in `chain`, root first.
    pub(crate) fn parse(
        &mut self,
        config: &mut Config,
        context: &Context,
        chain: &mut Vec<Middleware>,
        tokens: Vec<String>,
    ) -> Result<(), Error> {
        let table = match &self.table {
            Some(table) => table.clone(),
            None => {
                let table = Rc::new(FlagTable::assemble(&self.full, &self.flags)?);
                self.table.replace(table.clone());
                table
            }
        };

        let (remaining, literal) = match scan(&table, &self.flags, &tokens)? {
            Scan::Help => return self.print_usage(config),
            Scan::Stopped { remaining, literal } => (remaining, literal),
        };
        chain.extend(self.middlewares.iter().cloned());

        if !literal {
            if let Some(child) = remaining
                .first()
                .and_then(|name| self.commands.get_mut(name))
            {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Dispatching '{}' to '{}'.", self.full, child.full);
                }

                return child.parse(config, context, chain, remaining[1..].to_vec());
            }
        }

        if let Some(first) = remaining.first() {
            if self.args.is_empty() && self.rest.is_none() {
                return Err(Error::UnexpectedArg(first.clone()));
            }
        }

        let positionals = match self.interleaved(&table, remaining, literal)? {
            Some(positionals) => positionals,
            None => return self.print_usage(config),
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Positionals for '{}': {positionals:?}.", self.full);
        }

        for (index, token) in positionals.iter().enumerate() {
            match (self.args.get(index), &self.rest) {
                (Some(arg), _) => arg.set(token)?,
                (None, Some(rest)) => {
                    for token in &positionals[index..] {
                        rest.set(token)?;
                    }

                    break;
                }
                (None, None) => return Err(Error::ExtraArg(token.clone())),
            }
        }

        for parameter in self.args.iter().chain(self.rest.iter()) {
            parameter.resolve()?;
        }

        let action = match self.action.as_mut() {
            Some(action) => action,
            None => match positionals.first() {
                None => return self.print_usage(config),
                Some(first) => return Err(Error::ExtraArg(first.clone())),
            },
        };

        for flag in &self.flags {
            flag.resolve()?;
        }

        match run_chain(chain, context, &mut **action) {
            Err(Error::Usage) => self.print_usage(config),
            result => result,
        }
    }

    /// Separate the positional tokens from flags given in between them.
    /// Returns `None` when usage is requested along the way.
    fn interleaved(
        &self,
        table: &FlagTable,
        mut tokens: Vec<String>,
        mut literal: bool,
    ) -> Result<Option<Vec<String>>, Error> {
        let mut positionals = Vec::default();

        while !literal {
            let Some(index) = tokens.iter().position(|token| is_flag(token)) else {
                break;
            };
            positionals.extend(tokens.drain(..index));

            match scan(table, &self.flags, &tokens)? {
                Scan::Help => return Ok(None),
                Scan::Stopped {
                    remaining,
                    literal: stopped,
                } => {
                    tokens = remaining;
                    literal = stopped;
                }
            }
        }

        positionals.extend(tokens);
        Ok(Some(positionals))
    }

    fn print_usage(&self, config: &mut Config) -> Result<(), Error> {
        let version = if self.name == self.full {
            config.version.clone()
        } else {
            None
        };

        config.print_usage(Usage::describe(self, version))
    }
}

fn run_chain(chain: &[Middleware], context: &Context, action: Next<'_>) -> Result<(), Error> {
    match chain.split_first() {
        Some((middleware, rest)) => middleware(context, &mut |context: &Context| {
            run_chain(rest, context, &mut *action)
        }),
        None => action(context),
    }
}

impl Cli {
    /// Run the command line against `tokens` (which exclude the program name).
    ///
    /// Parsing happens in two phases:
    /// 1. Token matching walks the command tree, setting each flag and positional as it is encountered.
    /// 2. Resolution fills every binding that was not given on the command line, from its environment variable or its default.
    ///
    /// The selected command's action then runs, wrapped by the middlewares along its path.
    /// A command without an action prints its usage instead, as does `-h`/`--help` or an action returning [`Error::Usage`].
    ///
    /// When the `COMP_LINE` environment variable is set, the sub-command names for that line are printed instead.
    ///
    /// ### Example
    /// ```
    /// # use commander_builder as commander;
    /// use commander::{prelude::*, Cli, Context, Target};
    ///
    /// let verbose = Target::default();
    /// let mut cli = Cli::new("cli", "").trap(&[]);
    /// cli.flag("verbose", "print more").short('v').bool(&verbose);
    /// cli.run(|_| Ok(()));
    ///
    /// cli.parse(&Context::background(), &["-v"]).unwrap();
    /// assert!(verbose.get());
    /// ```
    pub fn parse<S: AsRef<str>>(&mut self, context: &Context, tokens: &[S]) -> Result<(), Error> {
        if let Ok(line) = env::var(COMPLETION_VARIABLE) {
            if !line.is_empty() {
                return self.complete(&line);
            }
        }

        self.root.reset();
        let trap = Trap::install(context, &self.config.signals);
        let result = self.root.parse(
            &mut self.config,
            trap.context(),
            &mut Vec::default(),
            tokens
                .iter()
                .map(|token| token.as_ref().to_string())
                .collect(),
        );
        let cancelled = trap.context().is_cancelled();
        drop(trap);
        result?;

        if cancelled {
            return Err(Error::Cancelled);
        }

        Ok(())
    }

    /// Run the command line against the process arguments ([`env::args`]).
    pub fn parse_args(&mut self, context: &Context) -> Result<(), Error> {
        let tokens: Vec<String> = env::args().skip(1).collect();
        self.parse(context, &tokens)
    }

    pub(crate) fn complete(&mut self, line: &str) -> Result<(), Error> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let path = fields.get(1..).unwrap_or_default();

        let command = match self.root.find(path) {
            Ok(command) => command,
            Err(_error) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("No completions: {_error}.");
                }

                return Ok(());
            }
        };

        let names: String = command
            .commands
            .values()
            .filter(|command| !command.hidden)
            .map(|command| format!("{}\n", command.name))
            .collect();
        self.config.print(&names)
    }
}
