use std::rc::Rc;

use terminal_size::{terminal_size, Width};

use crate::api::{Command, Parameter};
use crate::parser::interface::{ColumnRenderer, LeftWidth, MiddleWidth, PaddingWidth, TotalWidth};

/// A row of a usage section: the label column and its help text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRow {
    /// The flag (ex: `-a, --app`), arg (ex: `<src>`) or command name.
    pub label: String,
    /// The help text, or empty.
    pub help: String,
    /// Parenthesized attributes (ex: ` (default: ., env: DIR)`), or empty.
    /// Only present when `help` is.
    pub suffix: String,
    /// The parameter's value as it would be written on the command line, or empty for commands.
    /// This is the default until a parse sets it.
    pub value: String,
}

/// Everything a [`Template`] needs to describe one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    /// The command's name.
    pub name: String,
    /// The command's full path, starting from the program name (ex: `heroku ps scale`).
    pub full: String,
    /// The command's help text.
    pub description: String,
    /// The program version, given only for the root command.
    pub version: Option<String>,
    /// What follows the full path in the usage line (ex: ` [flags] [command]`).
    pub synopsis: String,
    /// The command's flags, with short aliases first.
    pub flags: Vec<UsageRow>,
    /// The command's positional args, followed by its rest collector.
    pub args: Vec<UsageRow>,
    /// The visible sub-commands, by name.
    pub commands: Vec<UsageRow>,
    /// The visible advanced sub-commands, by name.
    pub advanced: Vec<UsageRow>,
}

impl Usage {
    pub(crate) fn describe(command: &Command, version: Option<String>) -> Self {
        let mut flags: Vec<&Rc<Parameter>> = command.flags.iter().collect();
        flags.sort_by(|a, b| {
            b.short
                .is_some()
                .cmp(&a.short.is_some())
                .then_with(|| a.name.cmp(&b.name))
        });

        Self {
            name: command.name.clone(),
            full: command.full.clone(),
            description: command.help.clone(),
            version,
            synopsis: synopsis(command),
            flags: flags
                .into_iter()
                .map(|flag| {
                    let label = match flag.short {
                        Some(short) => format!("-{short}, --{}", flag.name),
                        None => format!("--{}", flag.name),
                    };
                    row(label, flag)
                })
                .collect(),
            args: command
                .args
                .iter()
                .map(|arg| row(format!("<{}>", arg.name), arg))
                .chain(command.rest.iter().map(|rest| row(rest.key(), rest)))
                .collect(),
            commands: command
                .commands
                .values()
                .filter(|sub| !sub.hidden && !sub.advanced)
                .map(command_row)
                .collect(),
            advanced: command
                .commands
                .values()
                .filter(|sub| !sub.hidden && sub.advanced)
                .map(command_row)
                .collect(),
        }
    }
}

fn synopsis(command: &Command) -> String {
    let mut out = String::default();

    if !command.flags.is_empty() {
        out.push_str(" [flags]");
    }

    if command.action.is_some() && !(command.args.is_empty() && command.rest.is_none()) {
        for arg in &command.args {
            if arg.is_optional() || arg.default_string().is_some() {
                out.push_str(&format!(" [<{}>]", arg.name));
            } else {
                out.push_str(&format!(" <{}>", arg.name));
            }
        }

        if let Some(rest) = &command.rest {
            out.push(' ');
            out.push_str(&rest.key());
        }
    } else if !command.commands.is_empty() {
        out.push_str(" [command]");
    }

    out
}

fn row(label: String, parameter: &Parameter) -> UsageRow {
    let mut attributes = Vec::default();

    match parameter.default_string() {
        Some(default) if default.is_empty() => attributes.push("default: \"\"".to_string()),
        Some(default) => attributes.push(format!("default: {default}")),
        None if parameter.is_optional() => attributes.push("optional".to_string()),
        None => {}
    }

    if let Some(env) = &parameter.env {
        attributes.push(format!("env: {env}"));
    }

    let suffix = if parameter.help.is_empty() || attributes.is_empty() {
        String::default()
    } else {
        format!(" ({})", attributes.join(", "))
    };

    UsageRow {
        label,
        help: parameter.help.clone(),
        suffix,
        value: parameter.render(),
    }
}

fn command_row(command: &Command) -> UsageRow {
    UsageRow {
        label: command.name.clone(),
        help: command.help.clone(),
        suffix: String::default(),
        value: String::default(),
    }
}

/// Renders a [`Usage`] into the text printed for `-h`/`--help`.
///
/// Any `Fn(&Usage) -> String` is a template.
///
/// ### Example
/// ```
/// # use commander_builder as commander;
/// use commander::{Cli, Usage};
///
/// let cli = Cli::new("cli", "my program")
///     .template(|usage: &Usage| format!("{}: {}\n", usage.full, usage.description));
/// ```
pub trait Template {
    /// Produce the complete usage text.
    fn render(&self, usage: &Usage) -> String;
}

impl<F: Fn(&Usage) -> String> Template for F {
    fn render(&self, usage: &Usage) -> String {
        self(usage)
    }
}

/// The default [`Template`]: plain text sections, with help text wrapped to fit the terminal.
#[derive(Debug, Clone, Default)]
pub struct Printer {
    terminal_width: Option<usize>,
}

const PADDING_WIDTH: usize = 2;
const TITLE_INDENT: usize = 2;
const MAIN_INDENT: usize = 4;

impl Printer {
    /// A printer that wraps to the width of the attached terminal, if there is one.
    pub fn terminal() -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self { terminal_width }
    }

    /// A printer that wraps to `terminal_width` columns.
    pub fn width(terminal_width: usize) -> Self {
        Self {
            terminal_width: Some(terminal_width),
        }
    }

    fn section(&self, out: &mut String, title: &str, rows: &[UsageRow]) {
        if rows.is_empty() {
            return;
        }

        let left_column_width = rows
            .iter()
            .map(|row| row.label.chars().count())
            .max()
            .unwrap_or_default();
        let middle_column_width = rows
            .iter()
            .map(|row| row.help.chars().count() + row.suffix.chars().count())
            .max()
            .unwrap_or_default();
        let column_renderer = match self.terminal_width {
            Some(total_width) => ColumnRenderer::guided(
                MAIN_INDENT,
                PaddingWidth::new(PADDING_WIDTH),
                LeftWidth::new(left_column_width),
                MiddleWidth::new(middle_column_width),
                TotalWidth(total_width),
            ),
            None => ColumnRenderer::new(
                MAIN_INDENT,
                PaddingWidth::new(PADDING_WIDTH),
                LeftWidth::new(left_column_width),
                MiddleWidth::new(middle_column_width),
            ),
        };

        title_line(out, title);

        for row in rows {
            let text = format!("{}{}", row.help, row.suffix);

            for line in column_renderer.render(&row.label, &text) {
                out.push_str(&line);
                out.push('\n');
            }
        }

        out.push('\n');
    }
}

fn title_line(out: &mut String, title: &str) {
    out.push_str(&format!("{:TITLE_INDENT$}{title}:\n", ""));
}

impl Template for Printer {
    fn render(&self, usage: &Usage) -> String {
        let mut out = String::from("\n");
        title_line(&mut out, "Usage");
        out.push_str(&format!(
            "{:MAIN_INDENT$}$ {}{}\n\n",
            "", usage.full, usage.synopsis
        ));

        if !usage.description.is_empty() {
            title_line(&mut out, "Description");
            out.push_str(&format!("{:MAIN_INDENT$}{}\n\n", "", usage.description));
        }

        if let Some(version) = &usage.version {
            title_line(&mut out, "Version");
            out.push_str(&format!("{:MAIN_INDENT$}{version}\n\n", ""));
        }

        self.section(&mut out, "Args", &usage.args);
        self.section(&mut out, "Flags", &usage.flags);
        self.section(&mut out, "Commands", &usage.commands);
        self.section(&mut out, "Advanced Commands", &usage.advanced);
        out
    }
}
