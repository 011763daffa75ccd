/// Errors raised while converting a document.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A block holds a callout number that cannot be read, reported while
    /// rewriting in strict mode.
    #[error(transparent)]
    Parser(#[from] callout_parser::Error),

    /// A block failed validation while rewriting in strict mode.
    #[error("refusing to rewrite the document: {0}")]
    Validation(callout_parser::Error),
}

impl Error {
    /// Zero-based line the error points at, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Parser(error) | Self::Validation(error) => error.line(),
        }
    }

    /// Get advice for this error if available.
    #[must_use]
    pub fn advice(&self) -> Option<&'static str> {
        match self {
            Self::Parser(error) => error.advice(),
            Self::Validation(_) => Some(
                "Fix the callout numbers of the reported block, or run without strict mode to skip it",
            ),
        }
    }
}
