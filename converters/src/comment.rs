//! Callouts as inline comments on the annotated code lines.

use callout_parser::{CalloutGroup, CalloutMap, remove_callouts_from_code};
use unicode_width::UnicodeWidthStr;

use crate::code::{CommentSyntax, comment_syntax, drop_optional_terminator, strip_comment_guard};

/// Joins the explanations of a line carrying several markers.
pub const DEFAULT_SEPARATOR: &str = "; ";

/// Rewrite code lines with their explanations as trailing comments, using the
/// comment delimiters of `language` and [`DEFAULT_SEPARATOR`].
///
/// See [`convert_with_separator`].
#[must_use]
pub fn convert<S: AsRef<str>>(
    code_content: &[S],
    groups: &[CalloutGroup],
    explanations: &CalloutMap,
    language: Option<&str>,
) -> Vec<String> {
    convert_with_separator(code_content, groups, explanations, language, DEFAULT_SEPARATOR)
}

/// Rewrite code lines with their explanations as trailing comments.
///
/// Annotated lines lose their markers (and a comment left empty by that) and
/// get `  <open> <explanation>` appended. Several numbers on one line are
/// joined with `separator` in marker order. Single-token styles only carry the
/// first line of each explanation; paired styles such as `<!-- -->` fall back
/// to a block comment when an explanation spans several lines. Lines without
/// markers pass through unchanged.
#[must_use]
#[tracing::instrument(level = "trace", skip(code_content, groups, explanations))]
pub fn convert_with_separator<S: AsRef<str>>(
    code_content: &[S],
    groups: &[CalloutGroup],
    explanations: &CalloutMap,
    language: Option<&str>,
    separator: &str,
) -> Vec<String> {
    let syntax = comment_syntax(language);
    let mut lines = Vec::with_capacity(code_content.len());
    for (index, line) in code_content.iter().enumerate() {
        let line = line.as_ref();
        let Some(group) = groups.iter().find(|group| group.line == index) else {
            lines.push(line.to_string());
            continue;
        };

        let texts: Vec<Vec<String>> = group
            .numbers
            .iter()
            .filter_map(|number| {
                let callout = explanations.get(number);
                if callout.is_none() {
                    tracing::warn!(number, "no explanation for callout, leaving it out");
                }
                callout
            })
            .map(|callout| {
                callout
                    .lines
                    .iter()
                    .map(|line| line.trim())
                    .filter(|line| !line.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .collect();

        let code = drop_optional_terminator(
            &strip_comment_guard(&remove_callouts_from_code(line), language),
            language,
        );
        let lead = if code.trim().is_empty() {
            line.chars()
                .take_while(|ch| ch.is_whitespace())
                .collect::<String>()
        } else {
            format!("{code}  ")
        };
        if texts.iter().all(Vec::is_empty) {
            lines.push(code);
            continue;
        }
        lines.extend(commented(&lead, &texts, syntax, separator));
    }
    lines
}

fn commented(
    lead: &str,
    texts: &[Vec<String>],
    syntax: CommentSyntax,
    separator: &str,
) -> Vec<String> {
    let open = syntax.open;
    let close = syntax
        .close
        .map(|close| format!(" {close}"))
        .unwrap_or_default();
    let multi_line = texts.iter().any(|text| text.len() > 1);
    if !(syntax.is_paired() && multi_line) {
        return vec![format!("{lead}{open} {}{close}", first_lines(texts, separator))];
    }

    let indent = " ".repeat(UnicodeWidthStr::width(lead) + open.len() + 1);
    let mut block: Vec<String> = texts
        .iter()
        .flatten()
        .enumerate()
        .map(|(position, text)| {
            if position == 0 {
                format!("{lead}{open} {text}")
            } else {
                format!("{indent}{text}")
            }
        })
        .collect();
    if let Some(last) = block.last_mut() {
        last.push_str(&close);
    }
    block
}

fn first_lines(texts: &[Vec<String>], separator: &str) -> String {
    texts
        .iter()
        .filter_map(|text| text.first())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}
