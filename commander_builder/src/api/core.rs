use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;

use crate::api::{ArgBuilder, FlagBuilder, Parameter, ParameterClass, RestBuilder};
use crate::matcher::FlagTable;
use crate::parser::{Config, Context, Error, Signal, Template};

pub(crate) type Action = Box<dyn FnMut(&Context) -> Result<(), Error>>;

/// The next step of a middleware chain: either the following middleware, or the command's action.
pub type Next<'a> = &'a mut dyn FnMut(&Context) -> Result<(), Error>;

pub(crate) type Middleware = Rc<dyn Fn(&Context, Next<'_>) -> Result<(), Error>>;

/// One level of the command tree.
///
/// A command owns its flags (including a snapshot of its parent's), its positional args, an optional rest collector, its sub-commands and its action.
/// Configure it through the [`Commander`] methods.
pub struct Command {
    pub(crate) name: String,
    pub(crate) full: String,
    pub(crate) help: String,
    pub(crate) hidden: bool,
    pub(crate) advanced: bool,
    pub(crate) flags: Vec<Rc<Parameter>>,
    pub(crate) args: Vec<Parameter>,
    pub(crate) rest: Option<Parameter>,
    rest_declared: bool,
    pub(crate) commands: BTreeMap<String, Command>,
    pub(crate) action: Option<Action>,
    pub(crate) middlewares: Vec<Middleware>,
    pub(crate) table: Option<Rc<FlagTable>>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("full", &self.full)
            .field("flags", &self.flags)
            .field("args", &self.args)
            .field("rest", &self.rest)
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Command {
    pub(crate) fn new(
        name: impl Into<String>,
        full: impl Into<String>,
        help: impl Into<String>,
        flags: Vec<Rc<Parameter>>,
    ) -> Self {
        Self {
            name: name.into(),
            full: full.into(),
            help: help.into(),
            hidden: false,
            advanced: false,
            flags,
            args: Vec::default(),
            rest: None,
            rest_declared: false,
            commands: BTreeMap::default(),
            action: None,
            middlewares: Vec::default(),
            table: None,
        }
    }

    pub(crate) fn attach(&mut self, parameter: Parameter) {
        match parameter.class {
            ParameterClass::Flag => {
                self.flags.push(Rc::new(parameter));
                self.table = None;
            }
            ParameterClass::Arg => self.args.push(parameter),
            ParameterClass::Rest => self.rest = Some(parameter),
        }
    }

    /// *Available using 'unit_test' crate feature only.*</br></br>
    /// Build a detached [`Command`] for use in testing.
    ///
    /// ### Example
    /// ```
    /// # use commander_builder as commander;
    /// use commander::{prelude::*, Command, Target};
    ///
    /// // Function under test.
    /// // We want to make sure the setup_fn is wired up correctly.
    /// fn setup_fn(command: &mut Command, value: &Target<i64>) {
    ///     command.arg("value", "the value").int(value);
    /// }
    ///
    /// # #[cfg(feature = "unit_test")]
    /// # {
    /// let x = Target::new(1);
    /// let mut command = Command::test_dummy();
    /// setup_fn(&mut command, &x);
    /// command.test_parse(&["2"]).unwrap();
    /// assert_eq!(x.get(), 2);
    /// # }
    /// ```
    #[cfg(any(test, feature = "unit_test"))]
    pub fn test_dummy() -> Self {
        Command::new("test-dummy", "test-dummy", "", Vec::default())
    }

    /// *Available using 'unit_test' crate feature only.*</br></br>
    /// Parse `tokens` against this command, discarding any usage output.
    /// A command without an action is given one that does nothing, so its bindings are always resolved.
    /// See [`Command::test_dummy`] for an example.
    #[cfg(any(test, feature = "unit_test"))]
    pub fn test_parse(&mut self, tokens: &[&str]) -> Result<(), Error> {
        if self.action.is_none() {
            self.action = Some(Box::new(|_| Ok(())));
        }

        let mut config = Config {
            writer: Box::new(std::io::sink()),
            signals: Vec::default(),
            ..Config::default()
        };
        self.reset();
        self.parse(
            &mut config,
            &Context::background(),
            &mut Vec::default(),
            tokens.iter().map(|token| token.to_string()).collect(),
        )
    }
}

/// The configuration surface shared by the root of the tree ([`Cli`]) and every [`Command`].
///
/// ### Example
/// ```
/// # use commander_builder as commander;
/// use commander::{prelude::*, Cli, Context, Target};
///
/// let app = Target::default();
/// let scale = Target::default();
/// let mut cli = Cli::new("heroku", "heroku cli").writer(std::io::sink()).trap(&[]);
/// let ps = cli.command("ps", "manage processes");
/// let command = ps.command("scale", "scale dynos");
/// command.flag("app", "app name").short('a').string(&app);
/// command.args("scale", "scale dynos").strings(&scale);
/// command.run(|_| Ok(()));
///
/// cli.parse(&Context::background(), &["ps", "scale", "web=1", "--app=foo"]).unwrap();
/// assert_eq!(app.get(), "foo");
/// assert_eq!(scale.get(), vec!["web=1"]);
/// ```
pub trait Commander {
    /// The command configured by this value.
    fn node(&mut self) -> &mut Command;

    /// Declare a flag.
    /// The declaration is only attached once its destination is bound (ex: [`FlagBuilder::string`]).
    fn flag(&mut self, name: impl Into<String>, help: impl Into<String>) -> FlagBuilder<'_> {
        FlagBuilder::new(self.node(), name, help)
    }

    /// Declare a positional argument.
    /// Args are filled in declaration order.
    fn arg(&mut self, name: impl Into<String>, help: impl Into<String>) -> ArgBuilder<'_> {
        ArgBuilder::new(self.node(), name, help)
    }

    /// Declare the rest collector, which takes every positional token beyond the declared args.
    ///
    /// # Panics
    /// When called a second time for the same command.
    fn args(&mut self, name: impl Into<String>, help: impl Into<String>) -> RestBuilder<'_> {
        let node = self.node();

        if node.rest_declared {
            panic!("commander: you can only use args(name, help) once per command");
        }

        node.rest_declared = true;
        RestBuilder::new(node, name, help)
    }

    /// Find or create the sub-command `name`.
    ///
    /// A new sub-command starts with a copy of this command's flags, as declared at this point.
    /// An existing sub-command is returned unchanged.
    fn command(&mut self, name: impl Into<String>, help: impl Into<String>) -> &mut Command {
        let node = self.node();

        match node.commands.entry(name.into()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let full = format!("{} {}", node.full, entry.key());
                let child = Command::new(entry.key().clone(), full, help, node.flags.clone());
                entry.insert(child)
            }
        }
    }

    /// Omit this command from usage listings and completion.
    /// It remains invokable by name.
    fn hidden(&mut self) -> &mut Self {
        self.node().hidden = true;
        self
    }

    /// List this command in the usage's advanced section.
    fn advanced(&mut self) -> &mut Self {
        self.node().advanced = true;
        self
    }

    /// Set the action, replacing any previous one.
    fn run(&mut self, action: impl FnMut(&Context) -> Result<(), Error> + 'static) -> &mut Self {
        self.node().action = Some(Box::new(action));
        self
    }

    /// Look up a sub-command by its path of names.
    /// An empty path finds this command.
    fn find(&mut self, path: &[&str]) -> Result<&mut Command, Error> {
        let mut node = self.node();

        for (index, name) in path.iter().enumerate() {
            node = node
                .commands
                .get_mut(*name)
                .ok_or_else(|| Error::CommandNotFound(path[..=index].join(" ")))?;
        }

        Ok(node)
    }

    /// Wrap the action of this command, and of every command beneath it, with `middleware`.
    ///
    /// A middleware may act before or after calling `next`, or skip it altogether.
    /// Middlewares run root first, in registration order within a command.
    ///
    /// ### Example
    /// ```
    /// # use commander_builder as commander;
    /// use commander::{prelude::*, Cli, Context};
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    ///
    /// let calls = Rc::new(RefCell::new(Vec::default()));
    /// let mut cli = Cli::new("cli", "").trap(&[]);
    /// let inner = calls.clone();
    /// cli.middleware(move |context, next| {
    ///     inner.borrow_mut().push("before");
    ///     next(context)
    /// });
    /// let inner = calls.clone();
    /// cli.run(move |_| {
    ///     inner.borrow_mut().push("action");
    ///     Ok(())
    /// });
    ///
    /// cli.parse(&Context::background(), &[] as &[&str]).unwrap();
    /// assert_eq!(*calls.borrow(), vec!["before", "action"]);
    /// ```
    fn middleware(
        &mut self,
        middleware: impl Fn(&Context, Next<'_>) -> Result<(), Error> + 'static,
    ) -> &mut Self {
        self.node().middlewares.push(Rc::new(middleware));
        self
    }
}

impl Commander for Command {
    fn node(&mut self) -> &mut Command {
        self
    }
}

/// The root of a command tree, along with its process wide configuration.
///
/// ### Example
/// ```
/// # use commander_builder as commander;
/// use commander::{prelude::*, Cli, Context, Target};
///
/// let src = Target::default();
/// let dst = Target::default();
/// let mut cli = Cli::new("cp", "copy files").trap(&[]);
/// cli.arg("src", "source").string(&src);
/// cli.arg("dst", "destination").string(&dst).default(".");
/// cli.run(|_| Ok(()));
///
/// cli.parse(&Context::background(), &["a.txt"]).unwrap();
/// assert_eq!(src.get(), "a.txt");
/// assert_eq!(dst.get(), ".");
/// ```
pub struct Cli {
    pub(crate) root: Command,
    pub(crate) config: Config,
}

impl Cli {
    /// Create a command tree rooted at `name`.
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        let name = name.into();

        Self {
            root: Command::new(name.clone(), name, help, Vec::default()),
            config: Config::default(),
        }
    }

    /// Write usage and completions to `writer` (default: stdout).
    pub fn writer(mut self, writer: impl Write + 'static) -> Self {
        self.config.writer = Box::new(writer);
        self
    }

    /// Show `version` in the root command's usage.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version.replace(version.into());
        self
    }

    /// Render usage with `template` (default: [`Printer::terminal`](crate::Printer::terminal)).
    pub fn template(mut self, template: impl Template + 'static) -> Self {
        self.config.template = Box::new(template);
        self
    }

    /// Trap `signals` for the duration of each parse, cancelling the action's context on delivery.
    ///
    /// Defaults to `SIGINT`, except under cargo where nothing is trapped.
    /// Pass an empty slice to disable trapping.
    pub fn trap(mut self, signals: &[Signal]) -> Self {
        self.config.signals = signals.to_vec();
        self
    }
}

impl Commander for Cli {
    fn node(&mut self) -> &mut Command {
        &mut self.root
    }
}
