//! Callout tables rendered as definition or bulleted lists.
//!
//! With conditionals kept, every row becomes an entry and the `ifdef::` /
//! `ifndef::` guards around it are written back as directive lines, so each
//! variant still only shows up in the build it was written for. Otherwise
//! only the preferred explanation per number survives.

use callout_parser::{
    AsciiDocTable, Callout, CalloutGroup, Guard, callout_rows,
    extract_callout_explanations_from_table,
};

use crate::{bullets, deflist};

type Entry = fn(&str, &Callout) -> Vec<String>;

fn term_for(groups: &[CalloutGroup], number: u32) -> String {
    groups
        .iter()
        .find(|group| group.numbers.contains(&number))
        .map_or_else(|| format!("<{number}>"), |group| group.term().to_string())
}

fn with_conditionals(table: &AsciiDocTable, groups: &[CalloutGroup], entry: Entry) -> Vec<String> {
    let mut lines = Vec::new();
    let mut open: Vec<Guard> = Vec::new();
    for variant in callout_rows(table) {
        let shared = open
            .iter()
            .zip(&variant.guards)
            .take_while(|(active, wanted)| active == wanted)
            .count();
        while open.len() > shared {
            if let Some(guard) = open.pop() {
                lines.push(guard.closing_directive());
            }
        }
        for guard in variant.guards.iter().skip(shared) {
            lines.push(guard.opening_directive());
            open.push(guard.clone());
        }
        let number = variant.callout.number;
        lines.extend(entry(&term_for(groups, number), &variant.callout));
    }
    while let Some(guard) = open.pop() {
        lines.push(guard.closing_directive());
    }
    lines
}

fn preferred_only(
    table: &AsciiDocTable,
    groups: &[CalloutGroup],
    entry: Entry,
    convert: fn(&[CalloutGroup], &callout_parser::CalloutMap) -> Vec<String>,
) -> Vec<String> {
    let explanations = extract_callout_explanations_from_table(table);
    if groups.is_empty() {
        return explanations
            .values()
            .flat_map(|callout| entry(&term_for(groups, callout.number), callout))
            .collect();
    }
    convert(groups, &explanations)
}

/// Render a callout table as a definition list.
///
/// Terms come from the code lines in `groups`; a number no group references
/// is shown as its `<N>` marker. With `keep_conditionals` every row is kept
/// in table order inside its directives, otherwise one entry per group
/// number is written the way [`deflist::convert`] does.
#[must_use]
#[tracing::instrument(level = "trace", skip(table, groups))]
pub fn convert_table_to_deflist(
    table: &AsciiDocTable,
    groups: &[CalloutGroup],
    keep_conditionals: bool,
) -> Vec<String> {
    if keep_conditionals {
        with_conditionals(table, groups, deflist::entry)
    } else {
        preferred_only(table, groups, deflist::entry, deflist::convert)
    }
}

/// Render a callout table as a bulleted list. Same rules as
/// [`convert_table_to_deflist`].
#[must_use]
#[tracing::instrument(level = "trace", skip(table, groups))]
pub fn convert_table_to_bullets(
    table: &AsciiDocTable,
    groups: &[CalloutGroup],
    keep_conditionals: bool,
) -> Vec<String> {
    if keep_conditionals {
        with_conditionals(table, groups, bullets::entry)
    } else {
        preferred_only(table, groups, bullets::entry, bullets::convert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callout_parser::find_tables;
    use pretty_assertions::assert_eq;

    const CONDITIONAL_TABLE: [&str; 9] = [
        "|===",
        "ifdef::product[]",
        "|<1> |Product text",
        "endif::product[]",
        "ifndef::product[]",
        "|<1> |Community text",
        "endif::product[]",
        "|<2> |Shared",
        "|===",
    ];

    fn table(lines: &[&str]) -> AsciiDocTable {
        find_tables(lines).into_iter().next().unwrap_or_else(|| AsciiDocTable::new(vec![], 0, 0))
    }

    fn groups() -> Vec<CalloutGroup> {
        vec![
            CalloutGroup::new(0, "edition: x".to_string(), vec![1]),
            CalloutGroup::new(1, "mode: y".to_string(), vec![2]),
        ]
    }

    #[test]
    fn test_deflist_keeps_rows_and_conditionals() {
        let table = table(&CONDITIONAL_TABLE);
        let output = convert_table_to_deflist(&table, &groups(), true);
        assert_eq!(
            output,
            vec![
                "ifdef::product[]",
                "`edition: x`::",
                "Product text",
                "endif::product[]",
                "ifndef::product[]",
                "`edition: x`::",
                "Community text",
                "endif::product[]",
                "`mode: y`::",
                "Shared",
            ]
        );
        let entries = output.iter().filter(|line| line.ends_with("::")).count();
        assert_eq!(entries, table.rows.len());
    }

    #[test]
    fn test_deflist_without_conditionals_picks_one_variant() {
        let table = table(&CONDITIONAL_TABLE);
        assert_eq!(
            convert_table_to_deflist(&table, &groups(), false),
            vec!["`edition: x`::", "Product text", "`mode: y`::", "Shared"]
        );
    }

    #[test]
    fn test_bullets_nested_conditionals() {
        let table = table(&[
            "|===",
            "ifdef::cloud[]",
            "|<1> |Cloud",
            "ifdef::gpu[]",
            "|<2> |Cloud with GPU",
            "endif::gpu[]",
            "endif::cloud[]",
            "|===",
        ]);
        assert_eq!(
            convert_table_to_bullets(&table, &groups(), true),
            vec![
                "ifdef::cloud[]",
                "* `edition: x`: Cloud",
                "ifdef::gpu[]",
                "* `mode: y`: Cloud with GPU",
                "endif::gpu[]",
                "endif::cloud[]",
            ]
        );
    }

    #[test]
    fn test_marker_terms_without_groups() {
        let table = table(&["|===", "|<1> |One", "|<2> |Two", "|==="]);
        assert_eq!(
            convert_table_to_bullets(&table, &[], false),
            vec!["* `<1>`: One", "* `<2>`: Two"]
        );
    }
}
