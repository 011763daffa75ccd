use std::fmt::Write as _;

#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A `<N>` marker whose number is zero or does not fit in a `u32`.
    /// `line` is a zero-based index into the lines that were scanned.
    #[error("invalid callout number `{token}` on line {}", .line + 1)]
    InvalidCalloutNumber { line: usize, token: String },

    #[error("invalid conditional directive: {0}")]
    InvalidConditionalDirective(String),

    /// Code markers and explanations disagree for the code block whose header
    /// sits on zero-based line `line`.
    #[error(
        "callout mismatch in code block at line {}: {}",
        .line + 1,
        describe_mismatch(.missing, .unreferenced)
    )]
    StructuralMismatch {
        line: usize,
        missing: Vec<u32>,
        unreferenced: Vec<u32>,
    },
}

impl Error {
    /// Zero-based line the error points at.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidCalloutNumber { line, .. } | Self::StructuralMismatch { line, .. } => {
                Some(*line)
            }
            Self::InvalidConditionalDirective(_) => None,
        }
    }

    /// Get advice for this error if available.
    /// Returns helpful information for resolving the error.
    #[must_use]
    pub fn advice(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCalloutNumber { .. } => {
                Some("Callout numbers are positive integers, e.g. <1>, <2>, <3>")
            }
            Self::InvalidConditionalDirective(_) => Some(
                "Conditional directives look like ifdef::name[], ifndef::name[] and endif::name[] (or endif::[])",
            ),
            Self::StructuralMismatch { .. } => Some(
                "Every <N> marker in a code block needs a matching <N> explanation after the block, and every explanation needs a marker",
            ),
        }
    }
}

fn format_numbers(numbers: &[u32]) -> String {
    let mut out = String::new();
    for (index, number) in numbers.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "<{number}>");
    }
    out
}

fn describe_mismatch(missing: &[u32], unreferenced: &[u32]) -> String {
    match (missing.is_empty(), unreferenced.is_empty()) {
        (false, false) => format!(
            "no explanation for {}; no marker for {}",
            format_numbers(missing),
            format_numbers(unreferenced)
        ),
        (false, true) => format!("no explanation for {}", format_numbers(missing)),
        (true, false) => format!("no marker for {}", format_numbers(unreferenced)),
        (true, true) => "no callouts to compare".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_callout_number_display() {
        let error = Error::InvalidCalloutNumber {
            line: 4,
            token: "<99999999999>".to_string(),
        };
        assert_eq!(
            format!("{error}"),
            "invalid callout number `<99999999999>` on line 5"
        );
    }

    #[test]
    fn test_structural_mismatch_display() {
        let error = Error::StructuralMismatch {
            line: 9,
            missing: vec![2, 3],
            unreferenced: vec![],
        };
        assert_eq!(
            format!("{error}"),
            "callout mismatch in code block at line 10: no explanation for <2>, <3>"
        );

        let error = Error::StructuralMismatch {
            line: 0,
            missing: vec![2],
            unreferenced: vec![4],
        };
        assert_eq!(
            format!("{error}"),
            "callout mismatch in code block at line 1: no explanation for <2>; no marker for <4>"
        );
    }

    #[test]
    fn test_advice_and_line() {
        let error = Error::InvalidConditionalDirective("ifdef::[]".to_string());
        assert!(error.advice().is_some());
        assert_eq!(error.line(), None);
    }
}
