//! Line-level patterns shared by the detector and the table parser.
//!
//! The header and list patterns are plain regular expressions. Callout markers
//! and user-replaceable values are scanned by hand because both must reject a
//! match preceded by `<`, which the `regex` crate cannot express.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static SOURCE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[source(?:,\s*(\w+))?(?:[,\s]+[^\]]+)?\]").expect("valid source header pattern")
});

#[allow(clippy::expect_used)]
static LIST_EXPLANATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<(\d+)>\s+(.+)$").expect("valid list explanation pattern"));

#[allow(clippy::expect_used)]
static MARKER_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<(\d+)>$").expect("valid marker cell pattern"));

#[allow(clippy::expect_used)]
static COLS_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"cols\s*=\s*(?:"([^"]*)"|'([^']*)'|([^,\]]*))"#).expect("valid cols pattern")
});

pub(crate) const TABLE_DELIMITER: &str = "|===";

/// A `<N>` token inside a code line. `start..end` covers the brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MarkerToken<'a> {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) digits: &'a str,
}

/// Outcome of matching a `[source...]` header line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SourceHeader {
    pub(crate) language: Option<String>,
}

pub(crate) fn source_header(line: &str) -> Option<SourceHeader> {
    SOURCE_HEADER.captures(line).map(|captures| SourceHeader {
        language: captures.get(1).map(|m| m.as_str().to_string()),
    })
}

/// Split a `<N> text` explanation line into its digits and text.
pub(crate) fn list_explanation(line: &str) -> Option<(&str, &str)> {
    let captures = LIST_EXPLANATION.captures(line)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

/// Digits of a table cell holding nothing but a `<N>` marker.
pub(crate) fn marker_cell(text: &str) -> Option<&str> {
    MARKER_CELL
        .captures(text.trim())
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

pub(crate) fn is_table_delimiter(line: &str) -> bool {
    line.trim_end() == TABLE_DELIMITER
}

/// Column count declared by a block attribute line such as `[cols="1,3"]`.
///
/// Each comma or semicolon separated spec counts once, unless it carries a
/// `N*` multiplier.
pub(crate) fn declared_columns(line: &str) -> Option<usize> {
    let trimmed = line.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return None;
    }
    let captures = COLS_ATTRIBUTE.captures(trimmed)?;
    let value = captures
        .get(1)
        .or_else(|| captures.get(2))
        .or_else(|| captures.get(3))?
        .as_str()
        .trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(count) = value.parse::<usize>() {
        return (count > 0).then_some(count);
    }
    let count = value
        .split([',', ';'])
        .map(|spec| {
            spec.split_once('*')
                .and_then(|(multiplier, _)| multiplier.trim().parse::<usize>().ok())
                .unwrap_or(1)
        })
        .sum();
    (count > 0).then_some(count)
}

fn preceded_by_angle(bytes: &[u8], index: usize) -> bool {
    index
        .checked_sub(1)
        .and_then(|previous| bytes.get(previous))
        .is_some_and(|byte| *byte == b'<')
}

/// Every `<digits>` token in `line` that is not preceded by another `<`.
pub(crate) fn marker_tokens(line: &str) -> Vec<MarkerToken<'_>> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut index = 0;
    while index < bytes.len() {
        if bytes.get(index) == Some(&b'<') && !preceded_by_angle(bytes, index) {
            let digits_start = index + 1;
            let mut cursor = digits_start;
            while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
                cursor += 1;
            }
            if cursor > digits_start
                && bytes.get(cursor) == Some(&b'>')
                && let Some(digits) = line.get(digits_start..cursor)
            {
                tokens.push(MarkerToken {
                    start: index,
                    end: cursor + 1,
                    digits,
                });
                index = cursor + 1;
                continue;
            }
        }
        index += 1;
    }
    tokens
}

/// Every `<value>` placeholder in `line` whose first character is a letter
/// and which is not preceded by another `<`.
pub(crate) fn user_values(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut values = Vec::new();
    let mut index = 0;
    while index < bytes.len() {
        if bytes.get(index) == Some(&b'<')
            && !preceded_by_angle(bytes, index)
            && bytes.get(index + 1).is_some_and(u8::is_ascii_alphabetic)
            && let Some(close) = line
                .get(index + 1..)
                .and_then(|rest| rest.find('>'))
                .map(|offset| index + 1 + offset)
            && let Some(value) = line.get(index..=close)
        {
            values.push(value);
            index = close + 1;
            continue;
        }
        index += 1;
    }
    values
}
