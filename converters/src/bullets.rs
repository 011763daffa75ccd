//! Callouts as a bulleted list.
//!
//! ```text
//! * `name: demo`: The name of the application.
//!                 Continuation lines line up with the text.
//! ```

use callout_parser::{Callout, CalloutGroup, CalloutMap};
use unicode_width::UnicodeWidthStr;

use crate::markup::{description_lines, inline_literal};

/// One bullet. Continuation lines are indented to the display width of the
/// bullet prefix.
pub(crate) fn entry(term: &str, callout: &Callout) -> Vec<String> {
    let prefix = format!("* {}: ", inline_literal(term));
    let mut description = description_lines(&callout.lines).into_iter();
    let Some(first) = description.next() else {
        return vec![prefix.trim_end().to_string()];
    };
    let indent = " ".repeat(UnicodeWidthStr::width(prefix.as_str()));
    let mut lines = vec![format!("{prefix}{first}")];
    lines.extend(description.map(|line| format!("{indent}{line}")));
    lines
}

/// Render one bullet per callout number, groups in document order.
///
/// Numbers without an explanation are skipped; validate first to rule that
/// out.
#[must_use]
#[tracing::instrument(level = "trace", skip_all, fields(groups = groups.len()))]
pub fn convert(groups: &[CalloutGroup], explanations: &CalloutMap) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        for number in &group.numbers {
            let Some(callout) = explanations.get(number) else {
                tracing::warn!(number, "no explanation for callout, leaving it out");
                continue;
            };
            lines.extend(entry(group.term(), callout));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bullets_with_aligned_continuation() {
        let groups = vec![
            CalloutGroup::new(0, "name: demo".to_string(), vec![1]),
            CalloutGroup::new(1, "port: 80".to_string(), vec![2]),
        ];
        let explanations: CalloutMap = [
            (1, Callout::new(1, vec!["The name.".to_string()])),
            (
                2,
                Callout::new(2, vec!["The port.".to_string(), "Defaults to 80.".to_string()]),
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            convert(&groups, &explanations),
            vec![
                "* `name: demo`: The name.",
                "* `port: 80`: The port.",
                "              Defaults to 80.",
            ]
        );
    }

    #[test]
    fn test_wide_characters_are_measured_by_width() {
        let callout = Callout::new(1, vec!["名前".to_string(), "続き".to_string()]);
        assert_eq!(
            entry("名前: x", &callout),
            vec!["* `名前: x`: 名前", "             続き"]
        );
    }
}
