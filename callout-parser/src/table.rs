//! Pipe tables (`|===` ... `|===`) and the callout explanations they can hold.
//!
//! A cell starts at a line beginning with `|` and runs until the next cell, a
//! conditional directive, or the closing delimiter, so a cell may span several
//! lines. Rows are sized by the `cols` attribute on the line above the table,
//! or by the number of cells on its first cell line, or failing both by its
//! first blank-line separated group of cells. Directive lines never become
//! content: they annotate the rows and cells that follow with guards.

use crate::{
    conditional::{self, Directive},
    model::{
        AsciiDocTable, Callout, CalloutMap, CalloutVariant, CalloutVariants, Guard, TableCell,
        TableRow, select_preferred,
    },
    patterns,
};

/// Why a table region was left out of the results.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Malformed {
    Directive(String),
    UnmatchedEndif(Option<String>),
    UnclosedConditional(String),
}

impl std::fmt::Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directive(line) => write!(f, "unparseable directive `{line}`"),
            Self::UnmatchedEndif(Some(expression)) => {
                write!(f, "`endif::{expression}[]` closes nothing")
            }
            Self::UnmatchedEndif(None) => write!(f, "`endif::[]` closes nothing"),
            Self::UnclosedConditional(directive) => write!(f, "`{directive}` is never closed"),
        }
    }
}

/// Split a cell line into the text of each cell. An escaped `\|` stays in the
/// text as a literal pipe.
fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current: Option<String> = None;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                chars.next();
                current.get_or_insert_with(String::new).push('|');
            }
            '|' => {
                if let Some(text) = current.take() {
                    cells.push(text.trim().to_string());
                }
                current = Some(String::new());
            }
            other => current.get_or_insert_with(String::new).push(other),
        }
    }
    if let Some(text) = current {
        cells.push(text.trim().to_string());
    }
    cells
}

#[derive(Debug, Default)]
struct TableBuilder {
    columns: Option<usize>,
    rows: Vec<TableRow>,
    row: Option<TableRow>,
    cell: Option<TableCell>,
    guards: Vec<Guard>,
    blank_since_cell: bool,
    seen_cell_line: bool,
}

impl TableBuilder {
    fn new(columns: Option<usize>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    fn row_len(&self) -> usize {
        self.row.as_ref().map_or(0, |row| row.cells.len()) + usize::from(self.cell.is_some())
    }

    fn row_is_full(&self) -> bool {
        self.columns.is_some_and(|columns| self.row_len() >= columns)
    }

    fn finish_cell(&mut self) {
        let Some(mut cell) = self.cell.take() else {
            return;
        };
        while cell.content.last().is_some_and(|line| line.trim().is_empty()) {
            cell.content.pop();
        }
        let leading = cell
            .content
            .iter()
            .take_while(|line| line.trim().is_empty())
            .count();
        cell.content.drain(..leading);
        self.row
            .get_or_insert_with(|| TableRow::new(Vec::new(), self.guards.clone()))
            .cells
            .push(cell);
    }

    fn finish_row(&mut self) {
        self.finish_cell();
        if let Some(row) = self.row.take()
            && !row.cells.is_empty()
        {
            if self.columns.is_none() {
                self.columns = Some(row.cells.len());
            }
            self.rows.push(row);
        }
    }

    fn start_cell(&mut self, text: String) {
        self.finish_cell();
        if self.row.is_none() {
            self.row = Some(TableRow::new(Vec::new(), self.guards.clone()));
        }
        let content = if text.is_empty() { Vec::new() } else { vec![text] };
        self.cell = Some(TableCell::new(content, self.guards.clone()));
    }

    fn cell_line(&mut self, line: &str) {
        let cells = split_cells(line);
        if !self.seen_cell_line {
            self.seen_cell_line = true;
            if self.columns.is_none() && cells.len() > 1 {
                self.columns = Some(cells.len());
            }
        }
        if self.row_len() > 0 && (self.blank_since_cell || self.row_is_full()) {
            self.finish_row();
        }
        for (position, text) in cells.into_iter().enumerate() {
            if position > 0 && self.row_is_full() {
                // Overflowing cells on the same source line fold into the last cell.
                if let Some(cell) = self.cell.as_mut()
                    && !text.is_empty()
                {
                    cell.content.push(text);
                }
                continue;
            }
            self.start_cell(text);
        }
        self.blank_since_cell = false;
    }

    fn text_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            if let Some(cell) = self.cell.as_mut() {
                cell.content.push(String::new());
                self.blank_since_cell = true;
            }
            return;
        }
        match self.cell.as_mut() {
            Some(cell) => {
                cell.content.push(line.to_string());
                self.blank_since_cell = false;
            }
            None => tracing::trace!(line, "text before the first cell ignored"),
        }
    }

    fn directive(&mut self, directive: Directive) -> Result<(), Malformed> {
        self.finish_cell();
        if self.columns.is_none() || self.row_is_full() {
            self.finish_row();
        }
        match directive {
            Directive::Open(guard) => self.guards.push(guard),
            Directive::Close(expression) => match self.guards.last() {
                Some(guard) if Directive::closes(expression.as_deref(), guard) => {
                    self.guards.pop();
                }
                Some(_) | None => return Err(Malformed::UnmatchedEndif(expression)),
            },
        }
        Ok(())
    }

    fn build(mut self, start: usize, end: usize) -> Result<AsciiDocTable, Malformed> {
        self.finish_row();
        if let Some(guard) = self.guards.last() {
            return Err(Malformed::UnclosedConditional(guard.opening_directive()));
        }
        Ok(AsciiDocTable::new(self.rows, start, end))
    }
}

fn parse_table<S: AsRef<str>>(
    lines: &[S],
    start: usize,
    end: usize,
) -> Result<AsciiDocTable, Malformed> {
    let columns = start
        .checked_sub(1)
        .and_then(|above| lines.get(above))
        .and_then(|line| patterns::declared_columns(line.as_ref()));
    let mut builder = TableBuilder::new(columns);
    for line in lines.get(start + 1..end).unwrap_or_default() {
        let line = line.as_ref().trim_end();
        match conditional::parse_directive(line) {
            Ok(Some(directive)) => builder.directive(directive)?,
            Ok(None) if line.starts_with('|') => builder.cell_line(line),
            Ok(None) => builder.text_line(line),
            Err(_) => return Err(Malformed::Directive(line.to_string())),
        }
    }
    builder.build(start, end)
}

fn tables_from<S: AsRef<str>>(lines: &[S], from: usize, limit: Option<usize>) -> Vec<AsciiDocTable> {
    let mut tables = Vec::new();
    let mut index = from;
    while let Some(line) = lines.get(index) {
        if limit.is_some_and(|limit| tables.len() >= limit) {
            break;
        }
        if !patterns::is_table_delimiter(line.as_ref()) {
            index += 1;
            continue;
        }
        let closing = lines
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, candidate)| patterns::is_table_delimiter(candidate.as_ref()))
            .map(|(position, _)| position);
        let Some(end) = closing else {
            tracing::warn!(line = index + 1, "table is never closed, skipping it");
            break;
        };
        match parse_table(lines, index, end) {
            Ok(table) => tables.push(table),
            Err(reason) => {
                tracing::warn!(line = index + 1, %reason, "malformed table, skipping it");
            }
        }
        index = end + 1;
    }
    tables
}

/// Find every terminated `|===` table in document order.
///
/// Unterminated and malformed tables (unparseable or unbalanced conditional
/// directives) are logged and left out.
#[tracing::instrument(level = "trace", skip(lines), fields(lines = lines.len()))]
pub fn find_tables<S: AsRef<str>>(lines: &[S]) -> Vec<AsciiDocTable> {
    tables_from(lines, 0, None)
}

/// Parse the table whose opening delimiter sits on line `start`, if it is
/// terminated and well formed.
pub fn table_at<S: AsRef<str>>(lines: &[S], start: usize) -> Option<AsciiDocTable> {
    if !lines
        .get(start)
        .is_some_and(|line| patterns::is_table_delimiter(line.as_ref()))
    {
        return None;
    }
    tables_from(lines, start, Some(1))
        .into_iter()
        .next()
        .filter(|table| table.start == start)
}

fn marker_number(row: &TableRow) -> Option<u32> {
    let first = row.cells.first()?;
    patterns::marker_cell(&first.text())?
        .parse::<u32>()
        .ok()
        .filter(|number| *number > 0)
}

/// Whether every non-empty first-column cell is a bare `<N>` marker.
///
/// The same number may appear more than once only when each occurrence sits
/// under different conditionals. A table without any marker row is not a
/// callout table.
#[must_use]
pub fn is_callout_table(table: &AsciiDocTable) -> bool {
    let mut seen: Vec<(u32, &[Guard])> = Vec::new();
    for row in &table.rows {
        let Some(first) = row.cells.first() else {
            continue;
        };
        if first.is_empty() {
            continue;
        }
        let Some(number) = marker_number(row) else {
            return false;
        };
        if seen
            .iter()
            .any(|(other, guards)| *other == number && *guards == row.guards.as_slice())
        {
            tracing::debug!(number, "callout repeated under the same conditionals");
            return false;
        }
        seen.push((number, row.guards.as_slice()));
    }
    !seen.is_empty()
}

fn variant_guards(row: &TableRow) -> Vec<Guard> {
    let mut guards = row.guards.clone();
    for cell in row.cells.iter().skip(1) {
        for guard in &cell.guards {
            if !guards.contains(guard) {
                guards.push(guard.clone());
            }
        }
    }
    guards
}

/// One variant per marker row, in table order.
///
/// Column one holds the marker; all further columns form the explanation.
/// Rows without a marker are ignored.
#[must_use]
pub fn callout_rows(table: &AsciiDocTable) -> Vec<CalloutVariant> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let number = marker_number(row)?;
            let lines: Vec<String> = row
                .cells
                .iter()
                .skip(1)
                .flat_map(|cell| cell.content.iter().cloned())
                .collect();
            Some(CalloutVariant::new(
                variant_guards(row),
                Callout::new(number, lines),
            ))
        })
        .collect()
}

/// Every explanation variant per callout number, in row order.
#[must_use]
pub fn extract_callout_variants_from_table(table: &AsciiDocTable) -> CalloutVariants {
    let mut variants = CalloutVariants::new();
    for variant in callout_rows(table) {
        variants
            .entry(variant.callout.number)
            .or_default()
            .push(variant);
    }
    variants
}

/// One explanation per callout number: the first unconditioned variant, else
/// the first one found. Use [`extract_callout_variants_from_table`] to see
/// every variant.
#[must_use]
pub fn extract_callout_explanations_from_table(table: &AsciiDocTable) -> CalloutMap {
    select_preferred(&extract_callout_variants_from_table(table))
}
