use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::api::capture::*;
use crate::api::field::*;
use crate::api::Command;
use crate::model::Target;
use crate::parser::{BoxError, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParameterClass {
    Flag,
    Arg,
    Rest,
}

/// A flag, arg or rest collector attached to a command, with its bound value.
pub(crate) struct Parameter {
    pub(crate) class: ParameterClass,
    pub(crate) name: String,
    pub(crate) short: Option<char>,
    pub(crate) help: String,
    pub(crate) env: Option<String>,
    value: Rc<RefCell<dyn Value>>,
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let short = match &self.short {
            Some(s) => format!(" -{s},"),
            None => "".to_string(),
        };

        write!(f, "{:?}[{}{short} {}]", self.class, self.key(), self.help)
    }
}

impl Parameter {
    pub(crate) fn key(&self) -> String {
        self.value.borrow().key().to_string()
    }

    pub(crate) fn set(&self, raw: &str) -> Result<(), Error> {
        self.value.borrow_mut().set(raw)
    }

    pub(crate) fn resolve(&self) -> Result<(), Error> {
        self.value.borrow_mut().resolve(self.env.as_deref())
    }

    pub(crate) fn reset(&self) {
        self.value.borrow_mut().reset();
    }

    pub(crate) fn is_switch(&self) -> bool {
        self.value.borrow().is_switch()
    }

    pub(crate) fn is_optional(&self) -> bool {
        self.value.borrow().is_optional()
    }

    pub(crate) fn render(&self) -> String {
        self.value.borrow().render()
    }

    pub(crate) fn default_string(&self) -> Option<String> {
        self.value.borrow().default_string()
    }
}

/// A handle to a freshly bound value, used to register its default.
///
/// Dropping the handle is fine; the command keeps the binding alive.
pub struct Binding<V>(Rc<RefCell<V>>);

impl<K: Kind> Binding<Scalar<K>> {
    /// Register the value assigned when neither the command line nor the environment provide one.
    ///
    /// ### Example
    /// ```
    /// # use commander_builder as commander;
    /// use commander::{prelude::*, Cli, Context, Target};
    ///
    /// let dir = Target::default();
    /// let mut cli = Cli::new("bud", "bud cli").trap(&[]);
    /// cli.flag("chdir", "change the working directory").short('C').string(&dir).default(".");
    ///
    /// cli.parse(&Context::background(), &[] as &[&str]).unwrap();
    /// assert_eq!(dir.get(), ".");
    /// ```
    pub fn default(self, value: impl Into<K::Output>) -> Self {
        self.0.borrow_mut().default = Some(value.into());
        self
    }
}

impl<K: Kind> Binding<Optional<K>> {
    /// Register the value assigned when neither the command line nor the environment provide one.
    pub fn default(self, value: impl Into<K::Output>) -> Self {
        self.0.borrow_mut().default = Some(value.into());
        self
    }
}

impl Binding<Collection> {
    /// Register the list assigned when neither the command line nor the environment provide one.
    pub fn default(self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.0.borrow_mut().default = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

impl Binding<Mapping> {
    /// Register the map assigned when neither the command line nor the environment provide one.
    pub fn default<K: Into<String>, V: Into<String>>(
        self,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.0.borrow_mut().default = Some(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }
}

impl Binding<Callback> {
    /// Register the raw value handed to the callback when neither the command line nor the environment provide one.
    pub fn default(self, raw: impl Into<String>) -> Self {
        self.0.borrow_mut().default = Some(raw.into());
        self
    }

    /// Allow the value to be absent, in which case the callback is never called.
    pub fn optional(self) -> Self {
        self.0.borrow_mut().optional = true;
        self
    }
}

struct Declaration {
    class: ParameterClass,
    name: String,
    help: String,
    short: Option<char>,
    env: Option<String>,
}

impl Declaration {
    fn new(class: ParameterClass, name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            class,
            name: name.into(),
            help: help.into(),
            short: None,
            env: None,
        }
    }

    fn key(&self) -> String {
        match self.class {
            ParameterClass::Flag => format!("--{}", self.name),
            ParameterClass::Arg => format!("<{}>", self.name),
            ParameterClass::Rest => format!("<{}...>", self.name),
        }
    }

    fn bind<V: Value + 'static>(self, command: &mut Command, value: V) -> Binding<V> {
        let value = Rc::new(RefCell::new(value));
        let Declaration {
            class,
            name,
            help,
            short,
            env,
        } = self;
        command.attach(Parameter {
            class,
            name,
            short,
            help,
            env,
            value: value.clone(),
        });
        Binding(value)
    }
}

fn environment_name(name: impl Into<String>) -> String {
    let name = name.into();

    match name.strip_prefix('$') {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

fn choice(possibilities: impl IntoIterator<Item = impl Into<String>>) -> Choice {
    Choice::new(possibilities.into_iter().map(Into::into).collect())
}

/// Declares a flag (`--name`), finished by choosing the type of its destination.
pub struct FlagBuilder<'a> {
    command: &'a mut Command,
    declaration: Declaration,
}

impl<'a> FlagBuilder<'a> {
    pub(crate) fn new(command: &'a mut Command, name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            command,
            declaration: Declaration::new(ParameterClass::Flag, name, help),
        }
    }

    /// Alias the flag with a single character (`-c`).
    pub fn short(mut self, short: char) -> Self {
        self.declaration.short = Some(short);
        self
    }

    /// Fall back to the environment variable `name` when the flag is not given.
    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.declaration.env = Some(environment_name(name));
        self
    }

    /// Make the flag optional, binding it to an [`Option`] destination.
    pub fn optional(self) -> OptionalFlagBuilder<'a> {
        OptionalFlagBuilder(self)
    }

    /// Bind the flag to text.
    pub fn string(self, target: &Target<String>) -> Binding<Scalar<Text>> {
        let value = Scalar::new(self.declaration.key(), Text, target);
        self.declaration.bind(self.command, value)
    }

    /// Bind the flag to an integer.
    pub fn int(self, target: &Target<i64>) -> Binding<Scalar<Integer>> {
        let value = Scalar::new(self.declaration.key(), Integer, target);
        self.declaration.bind(self.command, value)
    }

    /// Bind the flag to a boolean.
    /// The flag may be given bare (`--flag`), meaning `true`.
    pub fn bool(self, target: &Target<bool>) -> Binding<Scalar<Boolean>> {
        let value = Scalar::new(self.declaration.key(), Boolean, target);
        self.declaration.bind(self.command, value)
    }

    /// Bind the flag to text which must be one of `possibilities`.
    ///
    /// ### Example
    /// ```
    /// # use commander_builder as commander;
    /// use commander::{prelude::*, Cli, Context, Target};
    ///
    /// let format = Target::default();
    /// let mut cli = Cli::new("cli", "").trap(&[]);
    /// cli.flag("format", "output format").enumeration(&format, ["json", "text"]);
    ///
    /// let error = cli.parse(&Context::background(), &["--format=yaml"]).unwrap_err();
    /// assert_eq!(error.to_string(), "--format \"yaml\" must be either \"json\" or \"text\"");
    /// ```
    pub fn enumeration(
        self,
        target: &Target<String>,
        possibilities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Binding<Scalar<Choice>> {
        let value = Scalar::new(self.declaration.key(), choice(possibilities), target);
        self.declaration.bind(self.command, value)
    }

    /// Bind the flag to a list, which collects every occurrence of the flag.
    pub fn strings(self, target: &Target<Vec<String>>) -> Binding<Collection> {
        let value = Collection::new(self.declaration.key(), target, false);
        self.declaration.bind(self.command, value)
    }

    /// Bind the flag to a map, which collects every `key:value` occurrence of the flag.
    pub fn string_map(self, target: &Target<BTreeMap<String, String>>) -> Binding<Mapping> {
        let value = Mapping::new(self.declaration.key(), target, false);
        self.declaration.bind(self.command, value)
    }

    /// Hand the flag's values to `callback`.
    pub fn custom(
        self,
        callback: impl FnMut(&str) -> Result<(), BoxError> + 'static,
    ) -> Binding<Callback> {
        let value = Callback::new(self.declaration.key(), Box::new(callback));
        self.declaration.bind(self.command, value)
    }
}

/// Declares an optional flag, which leaves its destination untouched when absent.
pub struct OptionalFlagBuilder<'a>(FlagBuilder<'a>);

impl<'a> OptionalFlagBuilder<'a> {
    /// Bind the flag to optional text.
    pub fn string(self, target: &Target<Option<String>>) -> Binding<Optional<Text>> {
        let declaration = self.0.declaration;
        let value = Optional::new(declaration.key(), Text, target);
        declaration.bind(self.0.command, value)
    }

    /// Bind the flag to an optional integer.
    pub fn int(self, target: &Target<Option<i64>>) -> Binding<Optional<Integer>> {
        let declaration = self.0.declaration;
        let value = Optional::new(declaration.key(), Integer, target);
        declaration.bind(self.0.command, value)
    }

    /// Bind the flag to an optional boolean.
    pub fn bool(self, target: &Target<Option<bool>>) -> Binding<Optional<Boolean>> {
        let declaration = self.0.declaration;
        let value = Optional::new(declaration.key(), Boolean, target);
        declaration.bind(self.0.command, value)
    }

    /// Bind the flag to optional text which must be one of `possibilities`.
    pub fn enumeration(
        self,
        target: &Target<Option<String>>,
        possibilities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Binding<Optional<Choice>> {
        let declaration = self.0.declaration;
        let value = Optional::new(declaration.key(), choice(possibilities), target);
        declaration.bind(self.0.command, value)
    }

    /// Bind the flag to a list, left empty when the flag is absent.
    pub fn strings(self, target: &Target<Vec<String>>) -> Binding<Collection> {
        let declaration = self.0.declaration;
        let value = Collection::new(declaration.key(), target, true);
        declaration.bind(self.0.command, value)
    }

    /// Bind the flag to a map, left empty when the flag is absent.
    pub fn string_map(self, target: &Target<BTreeMap<String, String>>) -> Binding<Mapping> {
        let declaration = self.0.declaration;
        let value = Mapping::new(declaration.key(), target, true);
        declaration.bind(self.0.command, value)
    }
}

/// Declares a positional argument (`<name>`), finished by choosing the type of its destination.
pub struct ArgBuilder<'a> {
    command: &'a mut Command,
    declaration: Declaration,
}

impl<'a> ArgBuilder<'a> {
    pub(crate) fn new(command: &'a mut Command, name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            command,
            declaration: Declaration::new(ParameterClass::Arg, name, help),
        }
    }

    /// Fall back to the environment variable `name` when the arg is not given.
    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.declaration.env = Some(environment_name(name));
        self
    }

    /// Make the arg optional, binding it to an [`Option`] destination.
    pub fn optional(self) -> OptionalArgBuilder<'a> {
        OptionalArgBuilder(self)
    }

    /// Bind the arg to text.
    pub fn string(self, target: &Target<String>) -> Binding<Scalar<Text>> {
        let value = Scalar::new(self.declaration.key(), Text, target);
        self.declaration.bind(self.command, value)
    }

    /// Bind the arg to an integer.
    pub fn int(self, target: &Target<i64>) -> Binding<Scalar<Integer>> {
        let value = Scalar::new(self.declaration.key(), Integer, target);
        self.declaration.bind(self.command, value)
    }

    /// Bind the arg to a boolean.
    pub fn bool(self, target: &Target<bool>) -> Binding<Scalar<Boolean>> {
        let value = Scalar::new(self.declaration.key(), Boolean, target);
        self.declaration.bind(self.command, value)
    }

    /// Bind the arg to text which must be one of `possibilities`.
    pub fn enumeration(
        self,
        target: &Target<String>,
        possibilities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Binding<Scalar<Choice>> {
        let value = Scalar::new(self.declaration.key(), choice(possibilities), target);
        self.declaration.bind(self.command, value)
    }

    /// Bind the arg to a single `key:value` pair.
    pub fn string_map(self, target: &Target<BTreeMap<String, String>>) -> Binding<Mapping> {
        let value = Mapping::new("<key:value>".to_string(), target, false);
        self.declaration.bind(self.command, value)
    }

    /// Hand the arg's value to `callback`.
    pub fn custom(
        self,
        callback: impl FnMut(&str) -> Result<(), BoxError> + 'static,
    ) -> Binding<Callback> {
        let value = Callback::new(self.declaration.key(), Box::new(callback));
        self.declaration.bind(self.command, value)
    }
}

/// Declares an optional positional argument, which leaves its destination untouched when absent.
pub struct OptionalArgBuilder<'a>(ArgBuilder<'a>);

impl<'a> OptionalArgBuilder<'a> {
    /// Bind the arg to optional text.
    pub fn string(self, target: &Target<Option<String>>) -> Binding<Optional<Text>> {
        let declaration = self.0.declaration;
        let value = Optional::new(declaration.key(), Text, target);
        declaration.bind(self.0.command, value)
    }

    /// Bind the arg to an optional integer.
    pub fn int(self, target: &Target<Option<i64>>) -> Binding<Optional<Integer>> {
        let declaration = self.0.declaration;
        let value = Optional::new(declaration.key(), Integer, target);
        declaration.bind(self.0.command, value)
    }

    /// Bind the arg to an optional boolean.
    pub fn bool(self, target: &Target<Option<bool>>) -> Binding<Optional<Boolean>> {
        let declaration = self.0.declaration;
        let value = Optional::new(declaration.key(), Boolean, target);
        declaration.bind(self.0.command, value)
    }

    /// Bind the arg to optional text which must be one of `possibilities`.
    pub fn enumeration(
        self,
        target: &Target<Option<String>>,
        possibilities: impl IntoIterator<Item = impl Into<String>>,
    ) -> Binding<Optional<Choice>> {
        let declaration = self.0.declaration;
        let value = Optional::new(declaration.key(), choice(possibilities), target);
        declaration.bind(self.0.command, value)
    }

    /// Bind the arg to a single `key:value` pair, left empty when the arg is absent.
    pub fn string_map(self, target: &Target<BTreeMap<String, String>>) -> Binding<Mapping> {
        let value = Mapping::new("<key:value>".to_string(), target, true);
        self.0.declaration.bind(self.0.command, value)
    }
}

/// Declares the rest collector (`<name...>`), which takes every positional token beyond the declared args.
pub struct RestBuilder<'a> {
    command: &'a mut Command,
    declaration: Declaration,
}

impl<'a> RestBuilder<'a> {
    pub(crate) fn new(command: &'a mut Command, name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            command,
            declaration: Declaration::new(ParameterClass::Rest, name, help),
        }
    }

    /// Fall back to the environment variable `name` when no tokens remain.
    /// The variable's value is split into words with shell quoting rules.
    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.declaration.env = Some(environment_name(name));
        self
    }

    /// Allow the collector to receive nothing.
    pub fn optional(self) -> OptionalRestBuilder<'a> {
        OptionalRestBuilder(self)
    }

    /// Collect the remaining tokens into a list.
    pub fn strings(self, target: &Target<Vec<String>>) -> Binding<Collection> {
        let value = Collection::new(self.declaration.key(), target, false);
        self.declaration.bind(self.command, value)
    }

    /// Collect the remaining tokens as `key:value` pairs.
    pub fn string_map(self, target: &Target<BTreeMap<String, String>>) -> Binding<Mapping> {
        let value = Mapping::new("<key:value...>".to_string(), target, false);
        self.declaration.bind(self.command, value)
    }
}

/// Declares an optional rest collector (`[<name>...]`).
pub struct OptionalRestBuilder<'a>(RestBuilder<'a>);

impl<'a> OptionalRestBuilder<'a> {
    fn key(&self) -> String {
        format!("[<{}>...]", self.0.declaration.name)
    }

    /// Collect the remaining tokens into a list, left empty when there are none.
    pub fn strings(self, target: &Target<Vec<String>>) -> Binding<Collection> {
        let value = Collection::new(self.key(), target, true);
        self.0.declaration.bind(self.0.command, value)
    }

    /// Collect the remaining tokens as `key:value` pairs, left empty when there are none.
    pub fn string_map(self, target: &Target<BTreeMap<String, String>>) -> Binding<Mapping> {
        let value = Mapping::new(self.key(), target, true);
        self.0.declaration.bind(self.0.command, value)
    }
}
