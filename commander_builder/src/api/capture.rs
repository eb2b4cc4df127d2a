use std::env;

use crate::parser::Error;

/// Conversion between command line text and a typed value.
///
/// We use this at the bottom of the command tree object graph so the compiler can maintain each binding's type.
#[doc(hidden)]
pub trait Kind: 'static {
    /// The converted type.
    type Output: Clone + 'static;

    /// Convert `raw` into the output type, attributing any failure to `key`.
    fn convert(&self, key: &str, raw: &str) -> Result<Self::Output, Error>;

    /// Render a value the way it would be written on the command line.
    fn render(&self, value: &Self::Output) -> String;

    /// Check a registered default before it is assigned.
    fn admit(&self, _key: &str, _value: &Self::Output) -> Result<(), Error> {
        Ok(())
    }

    /// Whether a bare flag of this kind means `true`.
    fn is_switch(&self) -> bool {
        false
    }
}

/// Text, taken verbatim.
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct Text;

impl Kind for Text {
    type Output = String;

    fn convert(&self, _key: &str, raw: &str) -> Result<String, Error> {
        Ok(raw.to_string())
    }

    fn render(&self, value: &String) -> String {
        value.clone()
    }
}

/// A base 10 integer.
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct Integer;

impl Kind for Integer {
    type Output = i64;

    fn convert(&self, key: &str, raw: &str) -> Result<i64, Error> {
        raw.parse::<i64>().map_err(|_| Error::TypeMismatch {
            key: key.to_string(),
            raw: raw.to_string(),
            expected: "an integer",
        })
    }

    fn render(&self, value: &i64) -> String {
        value.to_string()
    }
}

/// A boolean, usable as a bare switch.
#[doc(hidden)]
#[derive(Debug, Default)]
pub struct Boolean;

impl Kind for Boolean {
    type Output = bool;

    fn convert(&self, key: &str, raw: &str) -> Result<bool, Error> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(Error::TypeMismatch {
                key: key.to_string(),
                raw: raw.to_string(),
                expected: "a boolean",
            }),
        }
    }

    fn render(&self, value: &bool) -> String {
        value.to_string()
    }

    fn is_switch(&self) -> bool {
        true
    }
}

/// Text restricted to a closed set of possibilities.
#[doc(hidden)]
#[derive(Debug)]
pub struct Choice {
    possibilities: Vec<String>,
}

impl Choice {
    pub(crate) fn new(possibilities: Vec<String>) -> Self {
        Self { possibilities }
    }

    fn verify(&self, key: &str, raw: &str) -> Result<(), Error> {
        if self.possibilities.iter().any(|possibility| possibility == raw) {
            Ok(())
        } else {
            Err(Error::EnumMismatch {
                key: key.to_string(),
                raw: raw.to_string(),
                allowed: self.possibilities.clone(),
            })
        }
    }
}

impl Kind for Choice {
    type Output = String;

    fn convert(&self, key: &str, raw: &str) -> Result<String, Error> {
        self.verify(key, raw)?;
        Ok(raw.to_string())
    }

    fn render(&self, value: &String) -> String {
        value.clone()
    }

    // Unlike the other kinds, enumeration defaults are held to the possibilities.
    fn admit(&self, key: &str, value: &String) -> Result<(), Error> {
        self.verify(key, value)
    }
}

/// Behaviour to set and resolve a value without knowledge of its type.
///
/// We use this at the middle/top of the command tree object graph so that bindings of different types may all live in one command.
pub(crate) trait Value {
    /// The key naming this value in messages (ex: `--flag` or `<arg>`).
    fn key(&self) -> &str;

    /// Set the value from an explicit token.
    fn set(&mut self, raw: &str) -> Result<(), Error>;

    /// Fill the value from the environment or default when it was not set explicitly.
    fn resolve(&mut self, env: Option<&str>) -> Result<(), Error>;

    /// The value as displayed in help text, falling back to the default until a value is set.
    fn render(&self) -> String;

    fn is_optional(&self) -> bool;

    fn is_switch(&self) -> bool {
        false
    }

    /// The registered default, as displayed in help text.
    fn default_string(&self) -> Option<String>;

    /// Forget the previous parse, so that defaults and environment apply again.
    fn reset(&mut self);
}

/// Look up an environment variable; presence (even if empty) counts.
pub(crate) fn lookup_env(name: Option<&str>) -> Option<String> {
    let name = name?;
    env::var_os(name).map(|value| value.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};
    use rstest::rstest;

    #[test]
    fn integer_render_convert() {
        for _ in 0..100 {
            let value: i64 = thread_rng().gen();
            let raw = Integer.render(&value);
            assert_eq!(Integer.convert("--n", &raw).unwrap(), value);
        }
    }

    #[rstest]
    #[case("0", 0)]
    #[case("5", 5)]
    #[case("-5", -5)]
    #[case("+5", 5)]
    #[case("007", 7)]
    fn integer_convert(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(Integer.convert("--n", raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("x")]
    #[case("1.5")]
    #[case("0x10")]
    #[case("99999999999999999999")]
    fn integer_convert_invalid(#[case] raw: &str) {
        // Execute
        let error = Integer.convert("--n", raw).unwrap_err();

        // Verify
        assert_matches!(error, Error::TypeMismatch { expected: "an integer", .. });
    }

    #[rstest]
    #[case("1", true)]
    #[case("t", true)]
    #[case("T", true)]
    #[case("TRUE", true)]
    #[case("true", true)]
    #[case("True", true)]
    #[case("0", false)]
    #[case("f", false)]
    #[case("F", false)]
    #[case("FALSE", false)]
    #[case("false", false)]
    #[case("False", false)]
    fn boolean_convert(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(Boolean.convert("--b", raw).unwrap(), expected);
    }

    #[rstest]
    #[case("tRUE")]
    #[case("yes")]
    #[case("")]
    fn boolean_convert_invalid(#[case] raw: &str) {
        // Execute
        let error = Boolean.convert("--b", raw).unwrap_err();

        // Verify
        assert_eq!(
            error.to_string(),
            format!("--b: expected a boolean but got {raw:?}")
        );
    }

    #[test]
    fn choice() {
        // Setup
        let choice = Choice::new(vec!["a".to_string(), "b".to_string(), "c".to_string()]);

        // Execute & Verify
        assert_eq!(choice.convert("--flag", "b").unwrap(), "b");
        assert_matches!(choice.admit("--flag", &"c".to_string()), Ok(()));
        assert_eq!(
            choice.convert("--flag", "d").unwrap_err().to_string(),
            "--flag \"d\" must be either \"a\", \"b\" or \"c\""
        );
        assert_matches!(
            choice.admit("--flag", &"d".to_string()),
            Err(Error::EnumMismatch { .. })
        );
    }

    #[test]
    fn admit_unchecked() {
        assert_matches!(Text.admit("--s", &"anything".to_string()), Ok(()));
        assert_matches!(Integer.admit("--n", &-1), Ok(()));
    }

    #[test]
    fn lookup_env_absent() {
        assert_eq!(lookup_env(None), None);
        assert_eq!(lookup_env(Some("COMMANDER_CAPTURE_ABSENT_VARIABLE")), None);
    }

    #[test]
    fn lookup_env_present() {
        // Setup
        env::set_var("COMMANDER_CAPTURE_EMPTY_VARIABLE", "");

        // Execute
        let result = lookup_env(Some("COMMANDER_CAPTURE_EMPTY_VARIABLE"));

        // Verify
        assert_eq!(result, Some("".to_string()));
    }
}
