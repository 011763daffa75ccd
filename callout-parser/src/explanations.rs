//! Locating the explanations that belong to a code block.
//!
//! A callout table directly after the block wins over list-format lines. When
//! neither is present the block simply has no explanations, which
//! [`crate::validate_callouts`] later reports as a mismatch.

use std::ops::Range;

use serde::Serialize;

use crate::{
    conditional,
    detector::parse_number,
    error::Error,
    model::{AsciiDocTable, Callout, CalloutMap, CalloutVariants, Fence, select_preferred},
    patterns,
    table::{extract_callout_variants_from_table, is_callout_table, table_at},
};

/// Where the explanations of a block came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
#[non_exhaustive]
pub enum ExplanationSource {
    /// A callout table. `start` is the first line of the table region, which
    /// includes any attribute or title lines directly above `|===`.
    Table {
        start: usize,
        table: AsciiDocTable,
        variants: CalloutVariants,
    },
    /// `<N> text` lines starting at `start`.
    List { start: usize },
    /// Nothing explains the block.
    None,
}

/// The explanations found after a code block.
///
/// `end` follows the lookup contract: the closing delimiter line for a table,
/// the line after the last consumed line for a list, and the line after the
/// block when nothing was found.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Explanations {
    pub source: ExplanationSource,
    pub callouts: CalloutMap,
    pub end: usize,
}

impl Explanations {
    /// The source lines the explanations occupy, as a half-open range.
    #[must_use]
    pub fn span(&self) -> Option<Range<usize>> {
        match &self.source {
            ExplanationSource::Table { start, .. } => Some(*start..self.end + 1),
            ExplanationSource::List { start } => Some(*start..self.end),
            ExplanationSource::None => None,
        }
    }

    #[must_use]
    pub fn is_table(&self) -> bool {
        matches!(self.source, ExplanationSource::Table { .. })
    }
}

#[derive(Debug)]
enum Lookup {
    NotStarted,
    TryTable,
    TryList,
    Done(Explanations),
}

fn first_non_blank<S: AsRef<str>>(lines: &[S], from: usize) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| !line.as_ref().trim().is_empty())
        .map(|(index, _)| index)
}

fn is_block_attribute(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('[') && line.ends_with(']') && patterns::source_header(line).is_none()
}

fn is_block_title(line: &str) -> bool {
    line.starts_with('.') && !line.starts_with("..") && line.len() > 1
}

fn table_lookup<S: AsRef<str>>(lines: &[S], after_line: usize) -> Option<Explanations> {
    let start = first_non_blank(lines, after_line + 1)?;
    let mut index = start;
    while lines
        .get(index)
        .is_some_and(|line| is_block_attribute(line.as_ref()) || is_block_title(line.as_ref()))
    {
        index += 1;
    }
    let table = table_at(lines, index)?;
    if !is_callout_table(&table) {
        tracing::trace!(line = index + 1, "table after code block is not a callout table");
        return None;
    }
    let variants = extract_callout_variants_from_table(&table);
    let callouts = select_preferred(&variants);
    let end = table.end;
    Some(Explanations {
        source: ExplanationSource::Table {
            start,
            table,
            variants,
        },
        callouts,
        end,
    })
}

/// Lines that can never continue a list explanation.
fn ends_list(line: &str) -> bool {
    Fence::from_line(line).is_some()
        || patterns::source_header(line).is_some()
        || patterns::is_table_delimiter(line)
        || conditional::looks_like_directive(line)
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

fn record(callouts: &mut CalloutMap, entry: Option<(u32, Vec<String>)>) {
    let Some((number, text)) = entry else {
        return;
    };
    if callouts.contains_key(&number) {
        tracing::warn!(number, "callout explained twice, keeping the first explanation");
    } else {
        callouts.insert(number, Callout::new(number, text));
    }
}

fn list_lookup<S: AsRef<str>>(lines: &[S], after_line: usize) -> Result<Explanations, Error> {
    let missing = || Explanations {
        source: ExplanationSource::None,
        callouts: CalloutMap::new(),
        end: after_line + 1,
    };
    let Some(start) = first_non_blank(lines, after_line + 1) else {
        return Ok(missing());
    };
    if !lines
        .get(start)
        .is_some_and(|line| patterns::list_explanation(line.as_ref()).is_some())
    {
        return Ok(missing());
    }

    let mut callouts = CalloutMap::new();
    let mut current: Option<(u32, Vec<String>)> = None;
    let mut last_consumed = start;
    let mut index = start;

    while let Some(line) = lines.get(index) {
        let line = line.as_ref();
        if let Some((digits, text)) = patterns::list_explanation(line) {
            record(&mut callouts, current.take());
            let number = parse_number(digits, index)?;
            current = Some((number, vec![text.trim_end().to_string()]));
            last_consumed = index;
            index += 1;
            continue;
        }
        if ends_list(line) {
            break;
        }
        if line.trim().is_empty() {
            let resumes = first_non_blank(lines, index).filter(|next| {
                lines.get(*next).is_some_and(|candidate| {
                    let candidate = candidate.as_ref();
                    patterns::list_explanation(candidate).is_some()
                        || (is_indented(candidate) && !ends_list(candidate.trim()))
                })
            });
            match resumes {
                Some(next) => {
                    index = next;
                    continue;
                }
                None => break,
            }
        }
        if is_indented(line) || last_consumed + 1 == index {
            if let Some((_, text)) = current.as_mut() {
                text.push(line.trim().to_string());
            }
            last_consumed = index;
            index += 1;
            continue;
        }
        break;
    }
    record(&mut callouts, current.take());

    Ok(Explanations {
        source: ExplanationSource::List { start },
        callouts,
        end: last_consumed + 1,
    })
}

/// Find the explanations for the code block whose closing fence is on line
/// `after_line`.
///
/// A callout table (optionally preceded by block attributes or a title) is
/// tried first. Failing that, `<N> text` lines are collected: a line directly
/// below an entry, or an indented line after blank lines, continues it. The
/// first explanation for a number wins.
///
/// # Errors
///
/// Returns [`Error::InvalidCalloutNumber`] for a list entry numbered `<0>` or
/// beyond `u32`.
#[tracing::instrument(level = "trace", skip(lines))]
pub fn extract_callout_explanations<S: AsRef<str>>(
    lines: &[S],
    after_line: usize,
) -> Result<Explanations, Error> {
    let mut state = Lookup::NotStarted;
    loop {
        state = match state {
            Lookup::NotStarted => Lookup::TryTable,
            Lookup::TryTable => match table_lookup(lines, after_line) {
                Some(found) => Lookup::Done(found),
                None => Lookup::TryList,
            },
            Lookup::TryList => Lookup::Done(list_lookup(lines, after_line)?),
            Lookup::Done(explanations) => return Ok(explanations),
        };
    }
}
