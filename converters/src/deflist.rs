//! Callouts as an `AsciiDoc` definition list.
//!
//! ```text
//! `name: demo`::
//! The name of the application.
//! +
//! Must be unique per namespace.
//! ```
//!
//! Description lines start at column zero. `AsciiDoc` attaches the lines
//! directly below a term to it whatever their indentation, but an indented
//! paragraph after a `+` continuation turns into a literal block, so the
//! description is never indented.

use callout_parser::{Callout, CalloutGroup, CalloutMap};

use crate::markup::{description_lines, inline_literal};

/// One term and its description.
pub(crate) fn entry(term: &str, callout: &Callout) -> Vec<String> {
    let mut lines = vec![format!("{}::", inline_literal(term))];
    lines.extend(description_lines(&callout.lines));
    lines
}

/// Render one definition list entry per callout number.
///
/// Groups are visited in document order and each number of a group gets its
/// own entry against the same code line. Numbers without an explanation are
/// skipped; validate first to rule that out.
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

    fn explanations(entries: &[(u32, &[&str])]) -> CalloutMap {
        entries
            .iter()
            .map(|(number, lines)| {
                (
                    *number,
                    Callout::new(*number, lines.iter().map(ToString::to_string).collect()),
                )
            })
            .collect()
    }

    #[test]
    fn test_one_entry_per_number_in_code_order() {
        let groups = vec![
            CalloutGroup::new(0, "port: 80".to_string(), vec![2]),
            CalloutGroup::new(1, "  name: demo".to_string(), vec![1]),
        ];
        let explanations = explanations(&[(1, &["The name."]), (2, &["The port.", "Defaults to 80."])]);
        assert_eq!(
            convert(&groups, &explanations),
            vec![
                "`port: 80`::",
                "The port.",
                "Defaults to 80.",
                "`name: demo`::",
                "The name.",
            ]
        );
    }

    #[test]
    fn test_description_is_flush_left() {
        let groups = vec![CalloutGroup::new(0, "name: demo".to_string(), vec![1])];
        let explanations = explanations(&[(
            1,
            &["  The name.", "", "    Must be unique per namespace."],
        )]);
        assert_eq!(
            convert(&groups, &explanations),
            vec![
                "`name: demo`::",
                "The name.",
                "+",
                "Must be unique per namespace.",
            ]
        );
    }

    #[test]
    fn test_multi_number_group_is_not_merged() {
        let groups = vec![CalloutGroup::new(0, "foo();".to_string(), vec![1, 2])];
        let explanations = explanations(&[(1, &["First."]), (2, &["Second."])]);
        assert_eq!(
            convert(&groups, &explanations),
            vec!["`foo();`::", "First.", "`foo();`::", "Second."]
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_missing_explanation_is_skipped() {
        let groups = vec![CalloutGroup::new(0, "foo();".to_string(), vec![1, 2])];
        let explanations = explanations(&[(1, &["First."])]);
        assert_eq!(convert(&groups, &explanations), vec!["`foo();`::", "First."]);
        assert!(logs_contain("no explanation for callout"));
    }
}
