//! Code block discovery and callout marker handling.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    error::Error,
    model::{CalloutGroup, CalloutMap, CodeBlock, Fence},
    patterns,
};

/// Find every `[source]` block whose header is immediately followed by a
/// `----` or `....` fence and which is closed by the same fence.
///
/// Blocks that never close are skipped and scanning resumes on the line after
/// their header.
#[tracing::instrument(level = "trace", skip(lines), fields(lines = lines.len()))]
pub fn find_code_blocks<S: AsRef<str>>(lines: &[S]) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut index = 0;
    while let Some(line) = lines.get(index) {
        let Some(header) = patterns::source_header(line.as_ref()) else {
            index += 1;
            continue;
        };
        let Some(fence) = lines
            .get(index + 1)
            .and_then(|next| Fence::from_line(next.as_ref()))
        else {
            index += 1;
            continue;
        };

        let content_start = index + 2;
        let closing = lines
            .iter()
            .enumerate()
            .skip(content_start)
            .find(|(_, candidate)| Fence::from_line(candidate.as_ref()) == Some(fence))
            .map(|(position, _)| position);

        let Some(end) = closing else {
            tracing::warn!(
                line = index + 1,
                %fence,
                "code block is never closed, skipping it"
            );
            index += 1;
            continue;
        };

        let content = lines
            .get(content_start..end)
            .unwrap_or_default()
            .iter()
            .map(|line| line.as_ref().to_string())
            .collect();
        blocks.push(CodeBlock::new(index, end, fence, content, header.language));
        index = end + 1;
    }
    blocks
}

pub(crate) fn parse_number(digits: &str, line: usize) -> Result<u32, Error> {
    match digits.parse::<u32>() {
        Ok(number) if number > 0 => Ok(number),
        Ok(_) | Err(_) => Err(Error::InvalidCalloutNumber {
            line,
            token: format!("<{digits}>"),
        }),
    }
}

/// Collect one [`CalloutGroup`] per code line carrying `<N>` markers.
///
/// Numbers keep their left-to-right order; a number repeated on the same line
/// is only recorded once. Each line is recorded with its markers removed and
/// its indentation kept. A `<value>` placeholder is not a marker, so a line
/// holding nothing but one survives verbatim.
///
/// # Errors
///
/// Returns [`Error::InvalidCalloutNumber`] for a marker whose number is zero
/// or overflows a `u32`. The reported line is the index into `content`.
#[tracing::instrument(level = "trace", skip(content))]
pub fn extract_callouts_from_code<S: AsRef<str>>(content: &[S]) -> Result<Vec<CalloutGroup>, Error> {
    let mut groups = Vec::new();
    for (index, line) in content.iter().enumerate() {
        let line = line.as_ref();
        let tokens = patterns::marker_tokens(line);
        if tokens.is_empty() {
            continue;
        }
        let mut numbers: Vec<u32> = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let number = parse_number(token.digits, index)?;
            if !numbers.contains(&number) {
                numbers.push(number);
            }
        }
        groups.push(CalloutGroup::new(
            index,
            remove_callouts_from_code(line),
            numbers,
        ));
    }
    Ok(groups)
}

fn remove_markers_once(line: &str) -> String {
    let tokens = patterns::marker_tokens(line);
    if tokens.is_empty() {
        return line.to_string();
    }

    let indent_len = line.len() - line.trim_start().len();
    let mut out = String::with_capacity(line.len());
    let mut cursor = 0;
    for token in &tokens {
        out.push_str(line.get(cursor..token.start).unwrap_or_default());
        // Whitespace in front of a marker belongs to the marker.
        let kept = out.trim_end().len().max(indent_len.min(out.len()));
        let spaced_before = kept < out.len();
        out.truncate(kept);
        cursor = token.end;
        let rest = line.get(cursor..).unwrap_or_default();
        let rest_trimmed = rest.trim_start();
        let spaced_after = rest_trimmed.len() < rest.len();
        if !rest_trimmed.is_empty()
            && out.len() > indent_len
            && (spaced_before || spaced_after)
            && patterns::marker_tokens(rest_trimmed)
                .first()
                .is_none_or(|next| next.start != 0)
        {
            out.push(' ');
        }
        cursor += rest.len() - rest_trimmed.len();
    }
    out.push_str(line.get(cursor..).unwrap_or_default());

    if out.trim().is_empty() {
        String::new()
    } else {
        out
    }
}

/// Delete every `<N>` marker from a code line.
///
/// Whitespace around a removed marker collapses to a single space between the
/// surrounding text (none at line end); leading indentation is kept. Applying
/// it twice gives the same result as applying it once.
#[must_use]
pub fn remove_callouts_from_code(line: &str) -> String {
    let mut current = remove_markers_once(line);
    loop {
        let next = remove_markers_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Result of comparing code markers with explanations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct CalloutValidation {
    pub code_numbers: BTreeSet<u32>,
    pub explanation_numbers: BTreeSet<u32>,
}

impl CalloutValidation {
    /// Whether both sides reference exactly the same numbers.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.code_numbers == self.explanation_numbers
    }

    /// Numbers used in code but never explained.
    #[must_use]
    pub fn missing_explanations(&self) -> Vec<u32> {
        self.code_numbers
            .difference(&self.explanation_numbers)
            .copied()
            .collect()
    }

    /// Numbers explained but never used in code.
    #[must_use]
    pub fn unreferenced_explanations(&self) -> Vec<u32> {
        self.explanation_numbers
            .difference(&self.code_numbers)
            .copied()
            .collect()
    }

    /// Turn a failed validation into [`Error::StructuralMismatch`] for the
    /// block whose header is on zero-based line `line`.
    ///
    /// # Errors
    ///
    /// Returns the mismatch when the two number sets differ.
    pub fn check(&self, line: usize) -> Result<(), Error> {
        if self.is_valid() {
            return Ok(());
        }
        Err(Error::StructuralMismatch {
            line,
            missing: self.missing_explanations(),
            unreferenced: self.unreferenced_explanations(),
        })
    }
}

/// Compare the numbers referenced by `groups` with the explained numbers.
/// Nothing is repaired; the caller decides what a mismatch means.
#[must_use]
pub fn validate_callouts(groups: &[CalloutGroup], explanations: &CalloutMap) -> CalloutValidation {
    let validation = CalloutValidation {
        code_numbers: groups
            .iter()
            .flat_map(|group| group.numbers.iter().copied())
            .collect(),
        explanation_numbers: explanations.keys().copied().collect(),
    };
    if !validation.is_valid() {
        tracing::debug!(
            missing = ?validation.missing_explanations(),
            unreferenced = ?validation.unreferenced_explanations(),
            "callout numbers do not match"
        );
    }
    validation
}
