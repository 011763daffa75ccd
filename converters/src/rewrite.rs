//! Whole-document conversion.
//!
//! Each annotated block that validates is turned into a set of splices over
//! the source lines. The splices never overlap and are applied from the bottom
//! of the document up, so the indices of the ones still pending stay valid.

use std::ops::Range;

use callout_parser::{
    AnnotatedBlock, CalloutGroup, ExplanationSource, remove_callouts_from_code, scan_document,
};

use crate::{
    Error, Format, Options, bullets,
    code::strip_comment_guard,
    comment, deflist,
    table::{convert_table_to_bullets, convert_table_to_deflist},
};

/// Introduces the converted list below a code block.
const LIST_INTRODUCTION: &str = "where:";

/// The outcome of [`rewrite_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Rewrite {
    /// The rewritten document.
    pub lines: Vec<String>,
    /// How many code blocks were converted.
    pub converted: usize,
    /// Why each block left untouched was skipped: an unreadable callout
    /// number, or markers and explanations that disagree.
    pub skipped: Vec<callout_parser::Error>,
}

impl Rewrite {
    /// Whether nothing had to be skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug)]
struct Splice {
    range: Range<usize>,
    replacement: Vec<String>,
}

fn line_at<S: AsRef<str>>(lines: &[S], index: usize) -> &str {
    lines.get(index).map_or("", AsRef::as_ref)
}

fn is_blank<S: AsRef<str>>(lines: &[S], index: usize) -> bool {
    lines
        .get(index)
        .is_some_and(|line| line.as_ref().trim().is_empty())
}

/// Markers removed from every annotated code line, explanations replaced with
/// a list.
fn list_splices<S: AsRef<str>>(
    lines: &[S],
    annotated: &AnnotatedBlock,
    options: &Options,
) -> Vec<Splice> {
    let language = annotated.block.language.as_deref();
    let mut splices: Vec<Splice> = annotated
        .groups
        .iter()
        .map(|group| {
            let index = annotated.line_of(group);
            let code =
                strip_comment_guard(&remove_callouts_from_code(line_at(lines, index)), language);
            Splice {
                range: index..index + 1,
                replacement: vec![code],
            }
        })
        .collect();

    let Some(span) = annotated.explanations.span() else {
        return splices;
    };
    // Terms must not carry the comment that only held the markers.
    let groups: Vec<CalloutGroup> = annotated
        .groups
        .iter()
        .cloned()
        .map(|mut group| {
            group.code = strip_comment_guard(&group.code, language);
            group
        })
        .collect();
    let as_bullets = options.format() == Format::Bullets;
    let converted = if let ExplanationSource::Table { table, .. } = &annotated.explanations.source
    {
        if as_bullets {
            convert_table_to_bullets(table, &groups, options.keep_conditionals())
        } else {
            convert_table_to_deflist(table, &groups, options.keep_conditionals())
        }
    } else if as_bullets {
        bullets::convert(&groups, &annotated.explanations.callouts)
    } else {
        deflist::convert(&groups, &annotated.explanations.callouts)
    };

    let mut replacement = vec![LIST_INTRODUCTION.to_string(), String::new()];
    replacement.extend(converted);
    splices.push(Splice {
        range: span,
        replacement,
    });
    splices
}

/// Code content replaced with commented lines, explanations removed.
fn comment_splices<S: AsRef<str>>(
    lines: &[S],
    annotated: &AnnotatedBlock,
    options: &Options,
) -> Vec<Splice> {
    let block = &annotated.block;
    let mut splices = vec![Splice {
        range: block.content_start()..block.end,
        replacement: comment::convert_with_separator(
            &block.content,
            &annotated.groups,
            &annotated.explanations.callouts,
            block.language.as_deref(),
            options.comment_separator(),
        ),
    }];

    if let Some(mut span) = annotated.explanations.span() {
        // Removing the span must not leave two blank lines in a row.
        let blank_before = span.start == 0 || is_blank(lines, span.start - 1);
        if blank_before && is_blank(lines, span.end) {
            span.end += 1;
        }
        splices.push(Splice {
            range: span,
            replacement: Vec::new(),
        });
    }
    splices
}

/// Convert the callouts of every valid annotated block in a document.
///
/// Blocks with an invalid callout number, and blocks whose markers and
/// explanations disagree, are left as they are and reported in
/// [`Rewrite::skipped`], unless [`Options::strict`] is set.
///
/// # Errors
///
/// In strict mode, returns [`Error::Parser`] for the first block with an
/// invalid callout number, or else [`Error::Validation`] for the first block
/// that does not validate.
#[tracing::instrument(level = "debug", skip(lines), fields(lines = lines.len()))]
pub fn rewrite_document<S: AsRef<str>>(lines: &[S], options: &Options) -> Result<Rewrite, Error> {
    let scan = scan_document(lines);
    if options.strict()
        && let Some(rejected) = scan.rejected.first()
    {
        return Err(Error::Parser(rejected.clone()));
    }

    let mut splices = Vec::new();
    let mut skipped = scan.rejected;
    let mut converted = 0;
    for annotated in &scan.blocks {
        if let Err(mismatch) = annotated.check() {
            if options.strict() {
                return Err(Error::Validation(mismatch));
            }
            tracing::warn!(
                line = annotated.block.start + 1,
                %mismatch,
                "leaving code block unconverted"
            );
            skipped.push(mismatch);
            continue;
        }
        match options.format() {
            Format::Deflist | Format::Bullets => {
                splices.extend(list_splices(lines, annotated, options));
            }
            Format::Comments => splices.extend(comment_splices(lines, annotated, options)),
        }
        converted += 1;
    }

    let mut output: Vec<String> = lines.iter().map(|line| line.as_ref().to_string()).collect();
    splices.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    let mut floor = output.len();
    for splice in splices {
        if splice.range.end > floor || splice.range.end > output.len() {
            tracing::warn!(?splice.range, "overlapping rewrite, skipping it");
            continue;
        }
        floor = splice.range.start;
        output.splice(splice.range, splice.replacement);
    }

    tracing::debug!(converted, skipped = skipped.len(), "document rewritten");
    Ok(Rewrite {
        lines: output,
        converted,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = "\
[source,yaml]
----
name: demo # <1>
port: 80 <2>
----

<1> The name.
<2> The port.

Closing text.";

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_deflist_rewrite() -> Result<(), Error> {
        let rewrite = rewrite_document(&lines(DOCUMENT), &Options::default())?;
        assert_eq!(rewrite.converted, 1);
        assert!(rewrite.is_clean());
        assert_eq!(
            rewrite.lines,
            vec![
                "[source,yaml]",
                "----",
                "name: demo",
                "port: 80",
                "----",
                "",
                "where:",
                "",
                "`name: demo`::",
                "The name.",
                "`port: 80`::",
                "The port.",
                "",
                "Closing text.",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_comment_rewrite() -> Result<(), Error> {
        let options = Options::builder().format(Format::Comments).build();
        let rewrite = rewrite_document(&lines(DOCUMENT), &options)?;
        assert_eq!(
            rewrite.lines,
            vec![
                "[source,yaml]",
                "----",
                "name: demo  # The name.",
                "port: 80  # The port.",
                "----",
                "",
                "Closing text.",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_mismatch_is_skipped_or_fatal() -> Result<(), Error> {
        let document = "[source,js]\n----\nfoo(); <1> <2>\n----\n<1> Calls foo.";
        let rewrite = rewrite_document(&lines(document), &Options::default())?;
        assert_eq!(rewrite.converted, 0);
        assert_eq!(rewrite.lines, lines(document));
        assert_eq!(
            rewrite.skipped,
            vec![callout_parser::Error::StructuralMismatch {
                line: 0,
                missing: vec![2],
                unreferenced: vec![],
            }]
        );

        let strict = Options::builder().strict(true).build();
        assert!(matches!(
            rewrite_document(&lines(document), &strict),
            Err(Error::Validation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_number_leaves_other_blocks_convertible() -> Result<(), Error> {
        let document = [
            "[source,cpp]",
            "----",
            "auto x = std::get<0>(t);",
            "----",
            "",
            "[source,yaml]",
            "----",
            "name: demo <1>",
            "----",
            "<1> The name.",
        ];
        let rewrite = rewrite_document(&document, &Options::default())?;
        assert_eq!(rewrite.converted, 1);
        assert_eq!(
            rewrite.skipped,
            vec![callout_parser::Error::InvalidCalloutNumber {
                line: 2,
                token: "<0>".to_string(),
            }]
        );
        assert_eq!(
            rewrite.lines,
            vec![
                "[source,cpp]",
                "----",
                "auto x = std::get<0>(t);",
                "----",
                "",
                "[source,yaml]",
                "----",
                "name: demo",
                "----",
                "where:",
                "",
                "`name: demo`::",
                "The name.",
            ]
        );

        let strict = Options::builder().strict(true).build();
        assert!(matches!(
            rewrite_document(&document, &strict),
            Err(Error::Parser(callout_parser::Error::InvalidCalloutNumber { line: 2, .. }))
        ));
        Ok(())
    }

    #[test]
    fn test_table_rewrite_keeps_conditionals() -> Result<(), Error> {
        let document = "\
[source,yaml]
----
edition: x <1>
----

|===
ifdef::product[]
|<1> |Product edition.
endif::product[]
ifndef::product[]
|<1> |Community edition.
endif::product[]
|===";
        let options = Options::builder()
            .format(Format::Bullets)
            .keep_conditionals(true)
            .build();
        let rewrite = rewrite_document(&lines(document), &options)?;
        assert_eq!(
            rewrite.lines,
            vec![
                "[source,yaml]",
                "----",
                "edition: x",
                "----",
                "",
                "where:",
                "",
                "ifdef::product[]",
                "* `edition: x`: Product edition.",
                "endif::product[]",
                "ifndef::product[]",
                "* `edition: x`: Community edition.",
                "endif::product[]",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_rewrite_is_stable() -> Result<(), Error> {
        let first = rewrite_document(&lines(DOCUMENT), &Options::default())?;
        let second = rewrite_document(&first.lines, &Options::default())?;
        assert_eq!(second.converted, 0);
        assert_eq!(second.lines, first.lines);
        Ok(())
    }
}
