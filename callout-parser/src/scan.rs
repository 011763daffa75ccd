use serde::Serialize;

use crate::{
    detector::{
        CalloutValidation, extract_callouts_from_code, find_code_blocks, validate_callouts,
    },
    error::Error,
    explanations::{Explanations, extract_callout_explanations},
    model::{CalloutGroup, CodeBlock},
};

/// A code block carrying callouts, together with everything a converter needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[non_exhaustive]
pub struct AnnotatedBlock {
    pub block: CodeBlock,
    pub groups: Vec<CalloutGroup>,
    pub explanations: Explanations,
    pub validation: CalloutValidation,
}

impl AnnotatedBlock {
    /// The block's validation as an error pointing at its header line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StructuralMismatch`] when markers and explanations
    /// disagree.
    pub fn check(&self) -> Result<(), Error> {
        self.validation.check(self.block.start)
    }

    /// Absolute index of a group's code line.
    #[must_use]
    pub fn line_of(&self, group: &CalloutGroup) -> usize {
        self.block.content_start() + group.line
    }
}

/// Everything [`scan_document`] found in a document.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct Scan {
    /// Code blocks carrying callouts, in document order.
    pub blocks: Vec<AnnotatedBlock>,
    /// One error per code block that could not be read, in document order.
    /// Those blocks are not part of [`Scan::blocks`].
    pub rejected: Vec<Error>,
}

fn relocate(error: Error, offset: usize) -> Error {
    if let Error::InvalidCalloutNumber { line, token } = error {
        Error::InvalidCalloutNumber {
            line: offset + line,
            token,
        }
    } else {
        error
    }
}

fn annotate<S: AsRef<str>>(lines: &[S], block: CodeBlock) -> Result<Option<AnnotatedBlock>, Error> {
    let groups = extract_callouts_from_code(&block.content)
        .map_err(|error| relocate(error, block.content_start()))?;
    if groups.is_empty() {
        return Ok(None);
    }
    let explanations = extract_callout_explanations(lines, block.end)?;
    let validation = validate_callouts(&groups, &explanations.callouts);
    tracing::trace!(
        start = block.start,
        groups = groups.len(),
        valid = validation.is_valid(),
        "annotated code block"
    );
    Ok(Some(AnnotatedBlock {
        block,
        groups,
        explanations,
        validation,
    }))
}

/// Scan a whole document: every code block carrying at least one callout, with
/// its groups, explanations and validation, in document order.
///
/// A block with an invalid callout number (`<0>`, or one overflowing `u32`) in
/// its code or its explanation list is left out of [`Scan::blocks`] and its
/// error, pointing at the absolute line in `lines`, goes to
/// [`Scan::rejected`]. The other blocks are unaffected.
#[must_use]
#[tracing::instrument(level = "trace", skip(lines), fields(lines = lines.len()))]
pub fn scan_document<S: AsRef<str>>(lines: &[S]) -> Scan {
    let mut scan = Scan::default();
    for block in find_code_blocks(lines) {
        let start = block.start;
        match annotate(lines, block) {
            Ok(Some(annotated)) => scan.blocks.push(annotated),
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(line = start + 1, %error, "skipping unreadable code block");
                scan.rejected.push(error);
            }
        }
    }
    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = "\
= Title

[source,yaml]
----
name: demo <1>
port: 80 <2>
----
<1> The name.
<2> The port.

[source,yaml]
----
plain: true
----

[source,java]
----
foo(); <1> <2>
----
<1> Calls foo.
";

    #[test]
    fn test_scan_document() {
        let lines: Vec<&str> = DOCUMENT.lines().collect();
        let Scan { blocks, rejected } = scan_document(&lines);
        assert!(rejected.is_empty());
        assert_eq!(blocks.len(), 2);

        let Some(first) = blocks.first() else {
            panic!("no blocks");
        };
        assert_eq!(first.block.language.as_deref(), Some("yaml"));
        assert!(first.validation.is_valid());
        assert!(first.check().is_ok());
        assert_eq!(
            first.groups.iter().map(|g| first.line_of(g)).collect::<Vec<_>>(),
            vec![4, 5]
        );

        let Some(second) = blocks.get(1) else {
            panic!("second block missing");
        };
        assert_eq!(second.groups.len(), 1);
        assert_eq!(
            second.check(),
            Err(Error::StructuralMismatch {
                line: 15,
                missing: vec![2],
                unreferenced: vec![],
            })
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_invalid_number_only_rejects_its_block() {
        let lines = [
            "text",
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
        let scan = scan_document(&lines);
        assert_eq!(
            scan.rejected,
            vec![Error::InvalidCalloutNumber {
                line: 3,
                token: "<0>".to_string()
            }]
        );
        assert_eq!(scan.blocks.len(), 1);
        assert!(scan.blocks.iter().all(|annotated| annotated.check().is_ok()));
        assert!(logs_contain("skipping unreadable code block"));
    }

    #[test]
    fn test_invalid_explanation_number_rejects_its_block() {
        let lines = ["[source,sh]", "----", "run <1>", "----", "<0> Runs."];
        let scan = scan_document(&lines);
        assert!(scan.blocks.is_empty());
        assert_eq!(
            scan.rejected,
            vec![Error::InvalidCalloutNumber {
                line: 4,
                token: "<0>".to_string()
            }]
        );
    }
}
