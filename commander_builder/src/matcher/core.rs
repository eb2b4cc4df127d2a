use std::collections::HashMap;
use std::rc::Rc;

use crate::api::Parameter;
use crate::parser::Error;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

const HELP_NAME: &str = "help";
const HELP_SHORT: &str = "h";
const END_OF_FLAGS: &str = "--";

/// Lookup from every long name and short alias of a command's flags to the flag's position.
#[derive(Debug, Default)]
pub(crate) struct FlagTable {
    lookup: HashMap<String, usize>,
}

impl FlagTable {
    /// Names and short aliases share one namespace.
    pub(crate) fn assemble(command: &str, flags: &[Rc<Parameter>]) -> Result<Self, Error> {
        let mut lookup = HashMap::default();

        for (index, flag) in flags.iter().enumerate() {
            if lookup.insert(flag.name.clone(), index).is_some() {
                return Err(Error::DuplicateFlag {
                    command: command.to_string(),
                    flag: format!("--{}", flag.name),
                });
            }

            if let Some(short) = flag.short {
                if lookup.insert(short.to_string(), index).is_some() {
                    return Err(Error::DuplicateFlag {
                        command: command.to_string(),
                        flag: format!("-{short}"),
                    });
                }
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Assembled {} flags for '{command}'.", flags.len());
        }

        Ok(Self { lookup })
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }
}

/// The outcome of one flag pass.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Scan {
    /// Flags were consumed up to the first positional token; `remaining` starts there.
    /// `literal` is set when the pass stopped at (and consumed) the end of flags marker.
    Stopped { remaining: Vec<String>, literal: bool },
    /// An undefined `-h`/`--help` was encountered.
    Help,
}

/// Set flags from the front of `tokens`, stopping at the first token which is not a flag.
pub(crate) fn scan(
    table: &FlagTable,
    flags: &[Rc<Parameter>],
    tokens: &[String],
) -> Result<Scan, Error> {
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];

        if !is_flag(token) {
            break;
        }

        index += 1;

        if token == END_OF_FLAGS {
            return Ok(Scan::Stopped {
                remaining: tokens[index..].to_vec(),
                literal: true,
            });
        }

        let dashes = if token.starts_with(END_OF_FLAGS) { 2 } else { 1 };
        let body = &token[dashes..];

        if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
            return Err(Error::BadFlagSyntax(token.clone()));
        }

        let (name, inline) = split_equals_delimiter(body);
        let flag = match table.get(name) {
            Some(position) => &flags[position],
            None if name == HELP_NAME || name == HELP_SHORT => return Ok(Scan::Help),
            None => {
                return Err(Error::UnknownFlag(format!(
                    "{}{name}",
                    &token[..dashes]
                )))
            }
        };

        let value = match inline {
            Some(value) => value.to_string(),
            None if flag.is_switch() => "true".to_string(),
            None => match tokens.get(index) {
                Some(value) => {
                    index += 1;
                    value.clone()
                }
                None => return Err(Error::MissingFlagValue(flag.key())),
            },
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Matched flag '{}' with '{value}'.", flag.key());
        }

        flag.set(&value)?;
    }

    Ok(Scan::Stopped {
        remaining: tokens[index..].to_vec(),
        literal: false,
    })
}

/// Whether `token` is shaped like a flag (a lone `-` is positional).
pub(crate) fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

fn split_equals_delimiter(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test::{bool_flag, string_flag, strings_flag};
    use crate::Target;
    use rstest::rstest;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn assemble_empty() {
        // Execute
        let table = FlagTable::assemble("program", &[]).unwrap();

        // Verify
        assert!(table.lookup.is_empty());
    }

    #[test]
    fn assemble() {
        // Setup
        let flags = vec![
            string_flag("chdir", Some('C'), &Target::default()),
            bool_flag("json", None, &Target::default()),
        ];

        // Execute
        let table = FlagTable::assemble("program", &flags).unwrap();

        // Verify
        assert_eq!(table.get("chdir"), Some(0));
        assert_eq!(table.get("C"), Some(0));
        assert_eq!(table.get("json"), Some(1));
        assert_eq!(table.get("j"), None);
    }

    #[rstest]
    #[case(("chdir", Some('C')), ("copy", Some('C')), "-C")]
    #[case(("chdir", Some('C')), ("chdir", None), "--chdir")]
    #[case(("C", None), ("copy", Some('C')), "-C")]
    fn assemble_duplicate(
        #[case] first: (&str, Option<char>),
        #[case] second: (&str, Option<char>),
        #[case] expected: &str,
    ) {
        // Setup
        let flags = vec![
            string_flag(first.0, first.1, &Target::default()),
            string_flag(second.0, second.1, &Target::default()),
        ];

        // Execute
        let error = FlagTable::assemble("bud sub", &flags).unwrap_err();

        // Verify
        assert_matches!(error, Error::DuplicateFlag { command, flag } => {
            assert_eq!(command, "bud sub");
            assert_eq!(flag, expected);
        });
    }

    #[rstest]
    #[case(vec![], vec![], "")]
    #[case(vec!["a"], vec!["a"], "")]
    #[case(vec!["--app", "foo"], vec![], "foo")]
    #[case(vec!["--app=foo"], vec![], "foo")]
    #[case(vec!["-app", "foo"], vec![], "foo")]
    #[case(vec!["-a", "foo", "b"], vec!["b"], "foo")]
    #[case(vec!["-a=foo", "b", "--app", "c"], vec!["b", "--app", "c"], "foo")]
    #[case(vec!["--app", "--other"], vec![], "--other")]
    #[case(vec!["--app=a=b"], vec![], "a=b")]
    #[case(vec!["--app="], vec![], "")]
    #[case(vec!["-", "--app", "foo"], vec!["-", "--app", "foo"], "")]
    fn scan_string(
        #[case] input: Vec<&str>,
        #[case] expected_remaining: Vec<&str>,
        #[case] expected: &str,
    ) {
        // Setup
        let target = Target::new(String::default());
        let flags = vec![string_flag("app", Some('a'), &target)];
        let table = FlagTable::assemble("program", &flags).unwrap();

        // Execute
        let result = scan(&table, &flags, &tokens(&input)).unwrap();

        // Verify
        assert_eq!(
            result,
            Scan::Stopped {
                remaining: tokens(&expected_remaining),
                literal: false,
            }
        );
        assert_eq!(target.get(), expected);
    }

    #[rstest]
    #[case(vec!["--json"], vec![], true)]
    #[case(vec!["--json", "false"], vec!["false"], true)]
    #[case(vec!["--json=false"], vec![], false)]
    #[case(vec!["--json=0"], vec![], false)]
    #[case(vec!["-j=T"], vec![], true)]
    fn scan_switch(
        #[case] input: Vec<&str>,
        #[case] expected_remaining: Vec<&str>,
        #[case] expected: bool,
    ) {
        // Setup
        let target = Target::new(false);
        let flags = vec![bool_flag("json", Some('j'), &target)];
        let table = FlagTable::assemble("program", &flags).unwrap();

        // Execute
        let result = scan(&table, &flags, &tokens(&input)).unwrap();

        // Verify
        assert_eq!(
            result,
            Scan::Stopped {
                remaining: tokens(&expected_remaining),
                literal: false,
            }
        );
        assert_eq!(target.get(), expected);
    }

    #[test]
    fn scan_repeated() {
        // Setup
        let target = Target::default();
        let flags = vec![strings_flag("f", None, &target)];
        let table = FlagTable::assemble("program", &flags).unwrap();

        // Execute
        scan(&table, &flags, &tokens(&["-f", "c", "-f", "d"])).unwrap();

        // Verify
        assert_eq!(target.get(), vec!["c", "d"]);
    }

    #[rstest]
    #[case(vec!["--"], vec![])]
    #[case(vec!["--", "--app", "foo"], vec!["--app", "foo"])]
    #[case(vec!["--app", "foo", "--", "-a"], vec!["-a"])]
    fn scan_literal(#[case] input: Vec<&str>, #[case] expected_remaining: Vec<&str>) {
        // Setup
        let flags = vec![string_flag("app", Some('a'), &Target::default())];
        let table = FlagTable::assemble("program", &flags).unwrap();

        // Execute
        let result = scan(&table, &flags, &tokens(&input)).unwrap();

        // Verify
        assert_eq!(
            result,
            Scan::Stopped {
                remaining: tokens(&expected_remaining),
                literal: true,
            }
        );
    }

    #[rstest]
    #[case(vec!["-h"])]
    #[case(vec!["--help"])]
    #[case(vec!["-help"])]
    #[case(vec!["--app", "foo", "-h", "--unknown"])]
    fn scan_help(#[case] input: Vec<&str>) {
        // Setup
        let flags = vec![string_flag("app", Some('a'), &Target::default())];
        let table = FlagTable::assemble("program", &flags).unwrap();

        // Execute
        let result = scan(&table, &flags, &tokens(&input)).unwrap();

        // Verify
        assert_eq!(result, Scan::Help);
    }

    #[test]
    fn scan_help_defined() {
        // Setup
        let target = Target::new(false);
        let flags = vec![bool_flag("help", Some('h'), &target)];
        let table = FlagTable::assemble("program", &flags).unwrap();

        // Execute
        let result = scan(&table, &flags, &tokens(&["-h"])).unwrap();

        // Verify
        assert_matches!(result, Scan::Stopped { .. });
        assert!(target.get());
    }

    #[rstest]
    #[case(vec!["--unknown"], "commander: invalid input: unknown flag \"--unknown\"")]
    #[case(vec!["-u=1"], "commander: invalid input: unknown flag \"-u\"")]
    #[case(vec!["--app"], "commander: invalid input: flag needs an argument: --app")]
    #[case(vec!["---app"], "commander: invalid input: bad flag syntax \"---app\"")]
    #[case(vec!["-=app"], "commander: invalid input: bad flag syntax \"-=app\"")]
    #[case(vec!["--json=x"], "--json: expected a boolean but got \"x\"")]
    fn scan_invalid(#[case] input: Vec<&str>, #[case] expected: &str) {
        // Setup
        let flags = vec![
            string_flag("app", Some('a'), &Target::default()),
            bool_flag("json", None, &Target::default()),
        ];
        let table = FlagTable::assemble("program", &flags).unwrap();

        // Execute
        let error = scan(&table, &flags, &tokens(&input)).unwrap_err();

        // Verify
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case("-a", true)]
    #[case("--a", true)]
    #[case("--", true)]
    #[case("-", false)]
    #[case("a", false)]
    #[case("", false)]
    fn flag_shape(#[case] token: &str, #[case] expected: bool) {
        assert_eq!(is_flag(token), expected);
    }
}
