//! Read-only views over one pass of a document: code blocks, callouts, and the
//! pipe tables that may carry their explanations.

use std::{collections::BTreeMap, fmt};

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::patterns;

/// Callout number to explanation, ordered by number.
pub type CalloutMap = BTreeMap<u32, Callout>;

/// Callout number to every explanation variant found for it, in source order.
pub type CalloutVariants = BTreeMap<u32, Vec<CalloutVariant>>;

/// The two fenced block styles a callout-carrying block may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fence {
    /// `----`
    Listing,
    /// `....`
    Literal,
}

impl Fence {
    /// Recognize a fence line. The whole line (minus trailing whitespace) must
    /// be the delimiter.
    #[must_use]
    pub fn from_line(line: &str) -> Option<Self> {
        match line.trim_end() {
            "----" => Some(Self::Listing),
            "...." => Some(Self::Literal),
            _ => None,
        }
    }

    #[must_use]
    pub fn delimiter(self) -> &'static str {
        match self {
            Self::Listing => "----",
            Self::Literal => "....",
        }
    }
}

impl fmt::Display for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.delimiter())
    }
}

/// A `[source]` block found in the document.
///
/// `start` is the index of the `[source...]` header line and `end` the index of
/// the closing fence, both zero-based into the scanned lines.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[non_exhaustive]
pub struct CodeBlock {
    pub start: usize,
    pub end: usize,
    pub fence: Fence,
    pub content: Vec<String>,
    pub language: Option<String>,
}

impl CodeBlock {
    #[must_use]
    pub fn new(
        start: usize,
        end: usize,
        fence: Fence,
        content: Vec<String>,
        language: Option<String>,
    ) -> Self {
        Self {
            start,
            end,
            fence,
            content,
            language,
        }
    }

    /// Index of the first content line (header, then opening fence).
    #[must_use]
    pub fn content_start(&self) -> usize {
        self.start + 2
    }
}

/// The explanation attached to one callout number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Callout {
    pub number: u32,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl Callout {
    /// Build a callout, flagging it optional when the text ends with
    /// `(optional)` in any letter case.
    #[must_use]
    pub fn new(number: u32, lines: Vec<String>) -> Self {
        let optional = lines
            .last()
            .is_some_and(|line| line.trim_end().to_lowercase().ends_with("(optional)"));
        Self {
            number,
            lines,
            optional,
        }
    }

    /// First explanation line, or the empty string.
    #[must_use]
    pub fn first_line(&self) -> &str {
        self.lines.first().map_or("", String::as_str)
    }
}

/// One annotated code line and the callout numbers attached to it, in the
/// order they appear left to right.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct CalloutGroup {
    /// Index of the line within the code block content.
    pub line: usize,
    /// The line with its markers removed.
    pub code: String,
    pub numbers: Vec<u32>,
}

impl CalloutGroup {
    #[must_use]
    pub fn new(line: usize, code: String, numbers: Vec<u32>) -> Self {
        Self {
            line,
            code,
            numbers,
        }
    }

    /// User-replaceable values (`<my_value>`) appearing on the code line.
    #[must_use]
    pub fn user_values(&self) -> Vec<&str> {
        patterns::user_values(&self.code)
    }

    /// Whether the code line is nothing but a single user-replaceable value.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        let term = self.term();
        matches!(self.user_values().as_slice(), [value] if *value == term)
    }

    /// The text a list converter shows for this group.
    #[must_use]
    pub fn term(&self) -> &str {
        self.code.trim()
    }
}

impl Serialize for CalloutGroup {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_map(None)?;
        state.serialize_entry("line", &self.line)?;
        state.serialize_entry("code", &self.code)?;
        state.serialize_entry("numbers", &self.numbers)?;
        let user_values = self.user_values();
        if !user_values.is_empty() {
            state.serialize_entry("user_values", &user_values)?;
        }
        if self.is_placeholder() {
            state.serialize_entry("placeholder", &true)?;
        }
        state.end()
    }
}

/// Whether a conditional includes its content when the attribute is set or
/// when it is unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// `ifdef::NAME[]`
    IfDef,
    /// `ifndef::NAME[]`
    IfNDef,
}

/// How several attribute names in one directive combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `a,b`: any of them
    Or,
    /// `a+b`: all of them
    And,
}

/// A conditional directive enclosing some table content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Guard {
    pub attributes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    pub polarity: Polarity,
}

impl Guard {
    #[must_use]
    pub fn new(attributes: Vec<String>, operation: Option<Operation>, polarity: Polarity) -> Self {
        Self {
            attributes,
            operation,
            polarity,
        }
    }

    /// Shorthand for a single-attribute `ifdef`.
    #[must_use]
    pub fn ifdef(name: &str) -> Self {
        Self::new(vec![name.to_string()], None, Polarity::IfDef)
    }

    /// Shorthand for a single-attribute `ifndef`.
    #[must_use]
    pub fn ifndef(name: &str) -> Self {
        Self::new(vec![name.to_string()], None, Polarity::IfNDef)
    }

    /// The attribute expression as written between `::` and `[]`.
    #[must_use]
    pub fn expression(&self) -> String {
        let separator = match self.operation {
            Some(Operation::And) => "+",
            Some(Operation::Or) | None => ",",
        };
        self.attributes.join(separator)
    }

    #[must_use]
    pub fn opening_directive(&self) -> String {
        let keyword = match self.polarity {
            Polarity::IfDef => "ifdef",
            Polarity::IfNDef => "ifndef",
        };
        format!("{keyword}::{}[]", self.expression())
    }

    #[must_use]
    pub fn closing_directive(&self) -> String {
        format!("endif::{}[]", self.expression())
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.opening_directive())
    }
}

/// One pipe-table cell. `guards` are the conditionals active where the cell
/// starts, outermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct TableCell {
    pub content: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<Guard>,
}

impl TableCell {
    #[must_use]
    pub fn new(content: Vec<String>, guards: Vec<Guard>) -> Self {
        Self { content, guards }
    }

    /// Cell content joined with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.content.join("\n")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.iter().all(|line| line.trim().is_empty())
    }
}

/// A row of cells and the conditionals active where the row starts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<Guard>,
}

impl TableRow {
    #[must_use]
    pub fn new(cells: Vec<TableCell>, guards: Vec<Guard>) -> Self {
        Self { cells, guards }
    }
}

/// A `|===` table. `start` and `end` index the opening and closing delimiter
/// lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct AsciiDocTable {
    pub rows: Vec<TableRow>,
    pub start: usize,
    pub end: usize,
}

impl AsciiDocTable {
    #[must_use]
    pub fn new(rows: Vec<TableRow>, start: usize, end: usize) -> Self {
        Self { rows, start, end }
    }
}

/// One candidate explanation for a callout number, with the conditionals it
/// sits under. An empty `guards` means the variant is unconditioned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct CalloutVariant {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<Guard>,
    pub callout: Callout,
}

impl CalloutVariant {
    #[must_use]
    pub fn new(guards: Vec<Guard>, callout: Callout) -> Self {
        Self { guards, callout }
    }

    #[must_use]
    pub fn is_unconditioned(&self) -> bool {
        self.guards.is_empty()
    }
}

/// Pick one explanation per number: the first unconditioned variant, else the
/// first variant encountered.
#[must_use]
pub fn select_preferred(variants: &CalloutVariants) -> CalloutMap {
    variants
        .iter()
        .filter_map(|(number, candidates)| {
            candidates
                .iter()
                .find(|variant| variant.is_unconditioned())
                .or_else(|| candidates.first())
                .map(|variant| (*number, variant.callout.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fence_from_line() {
        assert_eq!(Fence::from_line("----"), Some(Fence::Listing));
        assert_eq!(Fence::from_line("....  "), Some(Fence::Literal));
        assert_eq!(Fence::from_line("-----"), None);
        assert_eq!(Fence::from_line(" ----"), None);
    }

    #[test]
    fn test_callout_optional_flag() {
        let callout = Callout::new(1, vec!["Sets the port (Optional)".to_string()]);
        assert!(callout.optional);
        let callout = Callout::new(2, vec!["(optional) is not trailing here".to_string()]);
        assert!(!callout.optional);
    }

    #[test]
    fn test_group_user_values() {
        let group = CalloutGroup::new(0, "oc get <pod_name> -n <namespace>".to_string(), vec![1]);
        assert_eq!(group.user_values(), vec!["<pod_name>", "<namespace>"]);
        assert!(!group.is_placeholder());
    }

    #[rstest::rstest]
    #[case("<cluster_name>", true)]
    #[case("    <cluster_name>", true)]
    #[case("name: <cluster_name>", false)]
    #[case("<a> <b>", false)]
    #[case("List<<T>>", false)]
    fn test_group_is_placeholder(#[case] code: &str, #[case] expected: bool) {
        let group = CalloutGroup::new(0, code.to_string(), vec![1]);
        assert_eq!(group.is_placeholder(), expected, "code: {code}");
    }

    #[test]
    fn test_group_serialization() -> Result<(), serde_json::Error> {
        let plain = CalloutGroup::new(2, "port: 80".to_string(), vec![1, 2]);
        assert_eq!(
            serde_json::to_value(&plain)?,
            serde_json::json!({ "line": 2, "code": "port: 80", "numbers": [1, 2] })
        );

        let placeholder = CalloutGroup::new(0, "  <cluster_name>".to_string(), vec![3]);
        assert_eq!(
            serde_json::to_value(&placeholder)?,
            serde_json::json!({
                "line": 0,
                "code": "  <cluster_name>",
                "numbers": [3],
                "user_values": ["<cluster_name>"],
                "placeholder": true,
            })
        );
        Ok(())
    }

    #[test]
    fn test_guard_directives() {
        let guard = Guard::new(
            vec!["a".to_string(), "b".to_string()],
            Some(Operation::And),
            Polarity::IfNDef,
        );
        assert_eq!(guard.opening_directive(), "ifndef::a+b[]");
        assert_eq!(guard.closing_directive(), "endif::a+b[]");
        assert_eq!(Guard::ifdef("product").to_string(), "ifdef::product[]");
    }

    #[test]
    fn test_select_preferred_unconditioned_first() {
        let mut variants = CalloutVariants::new();
        variants.insert(
            1,
            vec![
                CalloutVariant::new(
                    vec![Guard::ifdef("product")],
                    Callout::new(1, vec!["Product".to_string()]),
                ),
                CalloutVariant::new(vec![], Callout::new(1, vec!["Plain".to_string()])),
            ],
        );
        variants.insert(
            2,
            vec![
                CalloutVariant::new(
                    vec![Guard::ifndef("product")],
                    Callout::new(2, vec!["Community".to_string()]),
                ),
                CalloutVariant::new(
                    vec![Guard::ifdef("product")],
                    Callout::new(2, vec!["Product".to_string()]),
                ),
            ],
        );
        let selected = select_preferred(&variants);
        assert_eq!(selected.get(&1).map(Callout::first_line), Some("Plain"));
        assert_eq!(selected.get(&2).map(Callout::first_line), Some("Community"));
    }
}
