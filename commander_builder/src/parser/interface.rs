#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug)]
pub(crate) struct PaddingWidth(usize);

impl PaddingWidth {
    pub(crate) fn new(width: usize) -> Self {
        // padding must be at least 1
        PaddingWidth(std::cmp::max(width, 1))
    }
}

#[derive(Debug)]
pub(crate) struct LeftWidth(usize);

impl LeftWidth {
    pub(crate) fn new(width: usize) -> Self {
        LeftWidth(width)
    }
}

#[derive(Debug)]
pub(crate) struct MiddleWidth(usize);

impl MiddleWidth {
    pub(crate) fn new(width: usize) -> Self {
        // middle must be at least 2 (so we can hyphenate)
        MiddleWidth(std::cmp::max(width, 2))
    }
}

#[derive(Debug)]
pub(crate) struct TotalWidth(pub usize);

/// Lays out a label column and a wrapped text column, separated by padding.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    indent: usize,
    padding: PaddingWidth,
    left: LeftWidth,
    middle: MiddleWidth,
}

// We'll target 95% of the total width, to ensure the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

impl ColumnRenderer {
    /// Produce a renderer based off the provided widths.
    /// This renderer will use a heuristic to chose the middle width.
    pub(crate) fn guided(
        indent: usize,
        padding: PaddingWidth,
        left: LeftWidth,
        middle: MiddleWidth,
        total_width: TotalWidth,
    ) -> Self {
        let non_middle: usize = indent + left.0 + padding.0;
        let target_total_width = (total_width.0 as f64 * TARGET_TOTAL_FACTOR) as usize;
        let guided_middle = std::cmp::max(middle.0, MINIMUM_MIDDLE_WIDTH);

        if guided_middle + non_middle <= target_total_width {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} and middle fit within the target total {target_total_width}.  Selecting middle: {guided_middle}.");
            }

            Self::new(indent, padding, left, MiddleWidth(guided_middle))
        } else if non_middle < total_width.0 {
            let calculated_middle =
                std::cmp::max(total_width.0 - non_middle, MINIMUM_MIDDLE_WIDTH);
            #[cfg(feature = "tracing_debug")]
            {
                debug!(
                    "Columns {non_middle} fits within the total {}.  Selecting middle: {calculated_middle}.",
                    total_width.0
                );
            }

            Self::new(indent, padding, left, MiddleWidth(calculated_middle))
        } else {
            #[cfg(feature = "tracing_debug")]
            {
                debug!(
                    "Columns {non_middle} do not fit within the total {}.  Selecting middle: {MINIMUM_MIDDLE_WIDTH}.",
                    total_width.0
                );
            }

            Self::new(indent, padding, left, MiddleWidth(MINIMUM_MIDDLE_WIDTH))
        }
    }

    /// Produce a renderer based off the provided widths.
    pub(crate) fn new(
        indent: usize,
        padding: PaddingWidth,
        left: LeftWidth,
        middle: MiddleWidth,
    ) -> Self {
        Self {
            indent,
            padding,
            left,
            middle,
        }
    }

    pub(crate) fn render(&self, left: &str, middle: &str) -> Vec<String> {
        let indent = self.indent;
        let padding = format!("{:width$}", "", width = self.padding.0);
        let left_column_width = self.left.0;
        let middle_parts = chunk(middle, self.middle.0);
        let mut out = Vec::default();

        for (i, part) in middle_parts.iter().enumerate() {
            let label = if i == 0 { left } else { "" };
            out.push(
                format!("{:indent$}{label:left_column_width$}{padding}{part}", "")
                    .trim_end()
                    .to_string(),
            );
        }

        if out.is_empty() {
            out.push(format!("{:indent$}{left}", ""));
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if current.chars().count() + word.chars().count() < width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let increment = width - 1;
    let mut left = 0;

    while characters.len() - left > width {
        let piece: String = characters[left..left + increment].iter().collect();
        lines.push(format!("{piece}-"));
        left += increment;
    }

    current.extend(&characters[left..]);
}

#[cfg(test)]
pub(crate) mod util {
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    /// A writer whose output remains readable after being handed to a `Cli`.
    #[derive(Clone, Default)]
    pub(crate) struct InMemoryWriter {
        buffer: Rc<RefCell<Vec<u8>>>,
    }

    impl Write for InMemoryWriter {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.buffer.borrow_mut().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl InMemoryWriter {
        pub(crate) fn consume_message(&self) -> String {
            let bytes = std::mem::take(&mut *self.buffer.borrow_mut());
            String::from_utf8(bytes).unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn column_renderer_simple() {
        let cr = ColumnRenderer::new(
            0,
            PaddingWidth::new(4),
            LeftWidth::new(5),
            MiddleWidth::new(23),
        );

        assert_eq!(cr.render("abc", "something"), vec!["abc      something"]);
        assert_eq!(cr.render("abc", "  something  "), vec!["abc      something"]);
        assert_eq!(
            cr.render("abc12", "something pieces full"),
            vec!["abc12    something pieces full"]
        );
        assert_eq!(
            cr.render("abc", "something pieces full more stuff"),
            vec!["abc      something pieces full", "         more stuff"]
        );
        assert_eq!(
            cr.render("abc", "something pieces fullest more stuff extra     "),
            vec![
                "abc      something pieces",
                "         fullest more stuff",
                "         extra",
            ]
        );
    }

    #[test]
    fn column_renderer_indent() {
        let cr = ColumnRenderer::new(
            4,
            PaddingWidth::new(2),
            LeftWidth::new(12),
            MiddleWidth::new(40),
        );

        assert_eq!(
            cr.render("-a, --app", "app to run command against"),
            vec!["    -a, --app     app to run command against"]
        );
        assert_eq!(cr.render("--json", ""), vec!["    --json"]);
    }

    #[test]
    fn column_renderer_hyphenate() {
        let cr = ColumnRenderer::new(0, PaddingWidth::new(1), LeftWidth::new(1), MiddleWidth::new(5));

        assert_eq!(
            cr.render("a", "abcdefghij k"),
            vec!["a abcd-", "  efgh-", "  ij k"]
        );
        assert_eq!(cr.render("a", "ééééééé"), vec!["a éééé-", "  ééé"]);
    }

    #[rstest]
    #[case(2, 20, 100, 20)]
    #[case(2, 5, 100, MINIMUM_MIDDLE_WIDTH)]
    #[case(20, 80, 100, 76)]
    #[case(20, 80, 30, MINIMUM_MIDDLE_WIDTH)]
    fn guided(
        #[case] left: usize,
        #[case] middle: usize,
        #[case] total: usize,
        #[case] expected: usize,
    ) {
        // Execute
        let cr = ColumnRenderer::guided(
            2,
            PaddingWidth::new(2),
            LeftWidth::new(left),
            MiddleWidth::new(middle),
            TotalWidth(total),
        );

        // Verify
        assert_eq!(cr.middle.0, expected);
    }

    #[rstest]
    #[case(0, 1)]
    #[case(3, 3)]
    fn padding_width(#[case] width: usize, #[case] expected: usize) {
        assert_eq!(PaddingWidth::new(width).0, expected);
    }
}
