use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum WordsError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),
    #[error("unterminated escape")]
    UnterminatedEscape,
}

/// Split `line` into words the way a POSIX shell would, without any expansion.
///
/// Single quotes preserve everything literally.
/// Double quotes preserve everything except a backslash before `$`, `` ` ``, `"`, `\` or a newline.
/// Outside of quotes a backslash escapes any character, and an escaped newline is removed.
pub(crate) fn split_words(line: &str) -> Result<Vec<String>, WordsError> {
    let mut words = Vec::default();
    let mut current = String::default();
    // Distinguishes an empty quoted word ('') from no word at all.
    let mut started = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                started = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(quoted) => current.push(quoted),
                        None => return Err(WordsError::UnterminatedQuote('\'')),
                    }
                }
            }
            '"' => {
                started = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped @ ('$' | '`' | '"' | '\\')) => current.push(escaped),
                            Some('\n') => {}
                            Some(other) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => return Err(WordsError::UnterminatedQuote('"')),
                        },
                        Some(quoted) => current.push(quoted),
                        None => return Err(WordsError::UnterminatedQuote('"')),
                    }
                }
            }
            '\\' => match chars.next() {
                Some('\n') => {}
                Some(escaped) => {
                    started = true;
                    current.push(escaped);
                }
                None => return Err(WordsError::UnterminatedEscape),
            },
            c if c.is_whitespace() => {
                if started {
                    words.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            _ => {
                started = true;
                current.push(c);
            }
        }
    }

    if started {
        words.push(current);
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", vec![])]
    #[case("   ", vec![])]
    #[case("a", vec!["a"])]
    #[case("a b  c", vec!["a", "b", "c"])]
    #[case(" a\tb\nc ", vec!["a", "b", "c"])]
    #[case("a:b c:'d e'", vec!["a:b", "c:d e"])]
    #[case("a:b c:\"d e\"", vec!["a:b", "c:d e"])]
    #[case("'a b'c", vec!["a bc"])]
    #[case("''", vec![""])]
    #[case("a '' b", vec!["a", "", "b"])]
    #[case("'a\\b'", vec!["a\\b"])]
    #[case("\"a\\\"b\"", vec!["a\"b"])]
    #[case("\"a\\b\"", vec!["a\\b"])]
    #[case("a\\ b", vec!["a b"])]
    #[case("a\\\nb", vec!["ab"])]
    #[case("\"it's\"", vec!["it's"])]
    fn split(#[case] line: &str, #[case] expected: Vec<&str>) {
        // Execute
        let result = split_words(line).unwrap();

        // Verify
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case("'a", WordsError::UnterminatedQuote('\''))]
    #[case("a \"b", WordsError::UnterminatedQuote('"'))]
    #[case("\"a\\", WordsError::UnterminatedQuote('"'))]
    #[case("a\\", WordsError::UnterminatedEscape)]
    fn split_invalid(#[case] line: &str, #[case] expected: WordsError) {
        // Execute
        let result = split_words(line);

        // Verify
        assert_eq!(result, Err(expected));
    }
}
