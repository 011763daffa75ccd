use std::{io, path::PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};

#[derive(Debug, Diagnostic, thiserror::Error)]
pub(crate) enum Error {
    #[error("failed to read {}", path.display())]
    #[diagnostic(help("check that the file exists and is readable"))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Rich error wrapper for miette display with the offending source line
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic()]
pub(crate) struct RichError {
    message: String,

    #[help]
    advice: Option<String>,

    #[source_code]
    src: NamedSource<String>,

    #[label("{label}")]
    span: Option<SourceSpan>,
    label: String,
}

/// Byte span of zero-based line `line`, without its line terminator.
fn line_span(source: &str, line: usize) -> Option<SourceSpan> {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index == line {
            let length = text.trim_end_matches(['\r', '\n']).len();
            return Some(SourceSpan::new(offset.into(), length));
        }
        offset += text.len();
    }
    None
}

impl RichError {
    pub(crate) fn parser(path: &std::path::Path, source: &str, error: &callout_parser::Error) -> Self {
        let label = if matches!(error, callout_parser::Error::StructuralMismatch { .. }) {
            "this code block"
        } else {
            "here"
        };
        Self::new(
            path,
            source,
            error.to_string(),
            error.line(),
            error.advice(),
            label,
        )
    }

    pub(crate) fn converter(
        path: &std::path::Path,
        source: &str,
        error: &callout_converters::Error,
    ) -> Self {
        Self::new(
            path,
            source,
            error.to_string(),
            error.line(),
            error.advice(),
            "here",
        )
    }

    fn new(
        path: &std::path::Path,
        source: &str,
        message: String,
        line: Option<usize>,
        advice: Option<&str>,
        label: &str,
    ) -> Self {
        let span = line.and_then(|line| line_span(source, line));
        let label = match line {
            Some(line) => format!("{label} (line {})", line + 1),
            None => label.to_string(),
        };
        Self {
            message,
            advice: advice.map(ToString::to_string),
            src: NamedSource::new(path.display().to_string(), source.to_string()),
            span,
            label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_span() {
        let source = "first\r\nsecond\nthird";
        assert_eq!(line_span(source, 0), Some(SourceSpan::new(0.into(), 5)));
        assert_eq!(line_span(source, 1), Some(SourceSpan::new(7.into(), 6)));
        assert_eq!(line_span(source, 2), Some(SourceSpan::new(14.into(), 5)));
        assert_eq!(line_span(source, 3), None);
    }
}
