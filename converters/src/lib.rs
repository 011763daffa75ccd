//! Converters that rewrite `AsciiDoc` callouts.
//!
//! Callout explanations found by [`callout_parser`] can be turned into:
//!
//! - [`deflist`] - a definition list keyed by the annotated code line
//! - [`bullets`] - a bulleted list of `code: explanation` items
//! - [`comment`] - inline comments appended to the code lines themselves
//!
//! Callout tables keep their `ifdef::`/`ifndef::` variants when converted with
//! [`convert_table_to_deflist`] or [`convert_table_to_bullets`], and
//! [`rewrite_document`] applies a conversion to a whole document.
//!
//! # Example
//!
//! ```
//! use callout_converters::{Format, Options, rewrite_document};
//!
//! let document = ["[source,python]", "----", "x = 1; <1>", "----", "<1> Sets x"];
//! let options = Options::builder().format(Format::Comments).build();
//! let rewrite = rewrite_document(&document, &options)?;
//! assert_eq!(rewrite.lines, vec!["[source,python]", "----", "x = 1  # Sets x", "----"]);
//! # Ok::<(), callout_converters::Error>(())
//! ```

pub mod bullets;
/// Comment delimiters per language.
pub mod code;
pub mod comment;
pub mod deflist;
mod error;
mod format;
mod markup;
mod rewrite;
mod table;

pub use error::Error;
pub use format::Format;
pub use rewrite::{Rewrite, rewrite_document};
pub use table::{convert_table_to_bullets, convert_table_to_deflist};

/// Conversion options.
///
/// Use [`Options::builder()`] to construct an instance. This struct is marked
/// `#[non_exhaustive]` to allow adding new fields in future minor versions.
///
/// # Example
///
/// ```
/// use callout_converters::{Format, Options};
///
/// let options = Options::builder()
///     .format(Format::Bullets)
///     .keep_conditionals(true)
///     .build();
/// assert_eq!(options.comment_separator(), "; ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Options {
    format: Format,
    keep_conditionals: bool,
    strict: bool,
    comment_separator: String,
}

impl Default for Options {
    fn default() -> Self {
        OptionsBuilder::default().build()
    }
}

impl Options {
    /// Create a new builder with default values.
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Get the target format.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Get whether conditional table variants are written back with their
    /// directives.
    #[must_use]
    pub fn keep_conditionals(&self) -> bool {
        self.keep_conditionals
    }

    /// Get whether a block failing validation aborts the rewrite.
    #[must_use]
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Get the separator between explanations sharing one comment.
    #[must_use]
    pub fn comment_separator(&self) -> &str {
        &self.comment_separator
    }
}

/// Builder for [`Options`].
///
/// Use [`Options::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    format: Format,
    keep_conditionals: bool,
    strict: bool,
    comment_separator: String,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self {
            format: Format::default(),
            keep_conditionals: false,
            strict: false,
            comment_separator: comment::DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl OptionsBuilder {
    /// Set the target format.
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Keep every conditional variant of a callout table, wrapped in its
    /// `ifdef::`/`ifndef::` directives.
    #[must_use]
    pub fn keep_conditionals(mut self, keep_conditionals: bool) -> Self {
        self.keep_conditionals = keep_conditionals;
        self
    }

    /// Fail on the first block whose markers and explanations disagree instead
    /// of skipping it.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the separator joining several explanations in one comment.
    #[must_use]
    pub fn comment_separator(mut self, separator: impl Into<String>) -> Self {
        self.comment_separator = separator.into();
        self
    }

    /// Build the [`Options`] instance.
    #[must_use]
    pub fn build(self) -> Options {
        Options {
            format: self.format,
            keep_conditionals: self.keep_conditionals,
            strict: self.strict,
            comment_separator: self.comment_separator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.format(), Format::Deflist);
        assert!(!options.keep_conditionals());
        assert!(!options.strict());
        assert_eq!(options.comment_separator(), "; ");
    }

    #[test]
    fn test_builder() {
        let options = Options::builder()
            .format(Format::Comments)
            .strict(true)
            .comment_separator(" | ")
            .build();
        assert_eq!(options.format(), Format::Comments);
        assert!(options.strict());
        assert_eq!(options.comment_separator(), " | ");
    }
}
