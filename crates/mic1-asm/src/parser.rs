//! Assembly source line parser.
//!
//! A line is `[label:]... [mnemonic [operand]] [# comment]`. Mnemonic and
//! operand are kept as text here; the symbol table and encoder give them
//! meaning.

use crate::errors::AssembleError;

/// Character that starts a comment running to end of line.
pub const COMMENT_CHAR: char = '#';

/// One mnemonic with its optional operand text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Mnemonic as written.
    pub mnemonic: String,
    /// First operand token, if any.
    pub operand: Option<String>,
}

/// A non-blank source line after comment stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// 1-based source line number.
    pub line: usize,
    /// Labels defined on this line, in order.
    pub labels: Vec<String>,
    /// Statement following the labels, if any.
    pub statement: Option<Statement>,
}

/// Returns the part of `raw` before any comment.
#[must_use]
pub fn strip_comment(raw: &str) -> &str {
    raw.split_once(COMMENT_CHAR).map_or(raw, |(code, _)| code)
}

fn check_label(name: &str, line: usize) -> Result<String, AssembleError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(AssembleError::InvalidLabel {
            line,
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Parses one source line.
///
/// Returns `Ok(None)` for blank and comment-only lines.
///
/// # Errors
///
/// Returns [`AssembleError::InvalidLabel`] for an empty label or one that
/// contains whitespace.
pub fn parse_line(raw: &str, line: usize) -> Result<Option<ParsedLine>, AssembleError> {
    let mut code = strip_comment(raw).trim();
    if code.is_empty() {
        return Ok(None);
    }

    let mut labels = Vec::new();
    while let Some((label, rest)) = code.split_once(':') {
        labels.push(check_label(label.trim(), line)?);
        code = rest.trim();
    }

    let mut tokens = code.split_whitespace();
    let statement = tokens.next().map(|mnemonic| {
        let operand = tokens.next().map(str::to_string);
        if let Some(extra) = tokens.next() {
            tracing::warn!(line, extra, "ignoring trailing tokens");
        }
        Statement {
            mnemonic: mnemonic.to_string(),
            operand,
        }
    });

    Ok(Some(ParsedLine {
        line,
        labels,
        statement,
    }))
}

/// Parses every line of `source`, dropping blank lines.
///
/// # Errors
///
/// Returns the first error from [`parse_line`].
pub fn parse_source(source: &str) -> Result<Vec<ParsedLine>, AssembleError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| parse_line(raw, index + 1).transpose())
        .collect()
}

/// Parses a decimal (optionally negative) or `0x` hexadecimal literal.
///
/// Values must fit in a 16-bit word either as unsigned (`0..=65535`) or as
/// two's complement (`-32768..=-1`); the result is the word's bit pattern.
#[must_use]
pub fn parse_literal(text: &str) -> Option<u16> {
    let (negative, digits) = text
        .strip_prefix('-')
        .map_or((false, text), |rest| (true, rest));
    let magnitude = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        i64::from_str_radix(hex, 16).ok()?
    } else if digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse::<i64>().ok()?
    } else {
        return None;
    };

    if negative {
        i16::try_from(-magnitude)
            .ok()
            .map(|value| u16::from_ne_bytes(value.to_ne_bytes()))
    } else {
        u16::try_from(magnitude).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_line, parse_literal, parse_source, strip_comment, Statement};
    use crate::errors::AssembleError;

    fn statement(mnemonic: &str, operand: Option<&str>) -> Option<Statement> {
        Some(Statement {
            mnemonic: mnemonic.to_string(),
            operand: operand.map(str::to_string),
        })
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(strip_comment("LODD 5 # load"), "LODD 5 ");
        assert_eq!(strip_comment("# only a comment"), "");
        assert_eq!(strip_comment("PUSH"), "PUSH");
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_line("", 1).expect("parses"), None);
        assert_eq!(parse_line("   \t ", 2).expect("parses"), None);
        assert_eq!(parse_line("  # note", 3).expect("parses"), None);
    }

    #[test]
    fn instruction_with_operand() {
        let parsed = parse_line("  lodd  0x10  ", 4).expect("parses").expect("non-blank");
        assert_eq!(parsed.line, 4);
        assert!(parsed.labels.is_empty());
        assert_eq!(parsed.statement, statement("lodd", Some("0x10")));
    }

    #[test]
    fn label_alone_and_as_prefix() {
        let alone = parse_line("loop:", 1).expect("parses").expect("non-blank");
        assert_eq!(alone.labels, ["loop"]);
        assert_eq!(alone.statement, None);

        let prefixed = parse_line("end: JUMP end # spin", 2)
            .expect("parses")
            .expect("non-blank");
        assert_eq!(prefixed.labels, ["end"]);
        assert_eq!(prefixed.statement, statement("JUMP", Some("end")));
    }

    #[test]
    fn several_labels_on_one_line() {
        let parsed = parse_line("a: b : PUSH", 1).expect("parses").expect("non-blank");
        assert_eq!(parsed.labels, ["a", "b"]);
        assert_eq!(parsed.statement, statement("PUSH", None));
    }

    #[test]
    fn empty_label_is_rejected() {
        let err = parse_line(": LODD 1", 7).expect_err("empty label");
        assert!(matches!(err, AssembleError::InvalidLabel { line: 7, .. }));

        let err = parse_line("two words: PUSH", 8).expect_err("label with space");
        assert!(matches!(err, AssembleError::InvalidLabel { line: 8, .. }));
    }

    #[test]
    fn source_keeps_original_line_numbers() {
        let lines = parse_source("# header\n\nLOCO 1\n\nx: .DATA 5\n").expect("parses");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, 3);
        assert_eq!(lines[1].line, 5);
    }

    #[test]
    fn literals_accept_decimal_hex_and_negative() {
        assert_eq!(parse_literal("0"), Some(0));
        assert_eq!(parse_literal("4095"), Some(4095));
        assert_eq!(parse_literal("0x1F"), Some(0x1F));
        assert_eq!(parse_literal("0XFFFF"), Some(0xFFFF));
        assert_eq!(parse_literal("-10"), Some(0xFFF6));
        assert_eq!(parse_literal("-32768"), Some(0x8000));
        assert_eq!(parse_literal("65535"), Some(0xFFFF));
    }

    #[test]
    fn literals_reject_garbage_and_out_of_range() {
        assert_eq!(parse_literal(""), None);
        assert_eq!(parse_literal("-"), None);
        assert_eq!(parse_literal("0x"), None);
        assert_eq!(parse_literal("0x-5"), None);
        assert_eq!(parse_literal("12ab"), None);
        assert_eq!(parse_literal("+5"), None);
        assert_eq!(parse_literal("65536"), None);
        assert_eq!(parse_literal("-32769"), None);
        assert_eq!(parse_literal("loop"), None);
    }
}
