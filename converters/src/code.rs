//! Comment delimiters per source language.

/// The delimiters an inline comment is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct CommentSyntax {
    /// Token that opens the comment.
    pub open: &'static str,
    /// Token that closes the comment, for block-only styles such as `<!-- -->`.
    pub close: Option<&'static str>,
}

impl CommentSyntax {
    const fn line(open: &'static str) -> Self {
        Self { open, close: None }
    }

    const fn paired(open: &'static str, close: &'static str) -> Self {
        Self {
            open,
            close: Some(close),
        }
    }

    /// Whether the comment needs a distinct closing token.
    #[must_use]
    pub fn is_paired(&self) -> bool {
        self.close.is_some()
    }
}

/// Used when the language is unknown or missing.
pub const DEFAULT_COMMENT: CommentSyntax = CommentSyntax::line("//");

/// Look up the comment delimiters for a source language.
///
/// The lookup is case-insensitive. Unknown or absent languages fall back to
/// [`DEFAULT_COMMENT`].
#[must_use]
pub fn comment_syntax(language: Option<&str>) -> CommentSyntax {
    let Some(language) = language else {
        return DEFAULT_COMMENT;
    };
    match language.to_ascii_lowercase().as_str() {
        // C family and friends
        "c" | "cpp" | "c++" | "h" | "hpp" | "java" | "js" | "javascript" | "jsx" | "ts"
        | "typescript" | "tsx" | "csharp" | "cs" | "go" | "golang" | "rust" | "rs" | "kotlin"
        | "kt" | "swift" | "scala" | "groovy" | "dart" | "php" | "json5" | "jsonc" | "proto"
        | "protobuf" => CommentSyntax::line("//"),
        // Hash comments
        "python" | "py" | "ruby" | "rb" | "perl" | "pl" | "bash" | "shell" | "sh" | "zsh"
        | "fish" | "yaml" | "yml" | "toml" | "dockerfile" | "containerfile" | "makefile"
        | "make" | "cmake" | "terminal" | "console" | "powershell" | "ps1" | "r" | "properties"
        | "conf" | "nginx" | "hcl" | "terraform" | "tf" => CommentSyntax::line("#"),
        // Double-dash comments
        "sql" | "plsql" | "psql" | "mysql" | "lua" | "haskell" | "hs" => CommentSyntax::line("--"),
        // Markup
        "html" | "xml" | "xhtml" | "svg" | "markdown" | "md" => {
            CommentSyntax::paired("<!--", "-->")
        }
        "css" | "scss" | "less" => CommentSyntax::paired("/*", "*/"),
        // Single-character prefixes
        "clojure" | "clj" | "lisp" | "scheme" | "elisp" | "ini" | "asm" | "nasm" => {
            CommentSyntax::line(";")
        }
        "latex" | "tex" | "erlang" | "erl" | "matlab" | "prolog" => CommentSyntax::line("%"),
        other => {
            tracing::debug!(language = other, "unknown language, using `//` comments");
            DEFAULT_COMMENT
        }
    }
}

/// Drop a `;` statement terminator in languages that do not need one, so an
/// appended comment does not follow a stray semicolon.
pub(crate) fn drop_optional_terminator(line: &str, language: Option<&str>) -> String {
    let optional = language.is_some_and(|language| {
        matches!(
            language.to_ascii_lowercase().as_str(),
            "python" | "py" | "ruby" | "rb"
        )
    });
    let line = line.trim_end();
    if optional {
        line.strip_suffix(';').unwrap_or(line).trim_end().to_string()
    } else {
        line.to_string()
    }
}

/// Strip a comment that was only there to hold callout markers.
///
/// Once `x = 1; // <1>` loses its marker the line ends in an empty `//`. That
/// delimiter (and for paired styles the closing token) is removed together
/// with trailing whitespace. Indentation is left alone.
#[must_use]
pub fn strip_comment_guard(line: &str, language: Option<&str>) -> String {
    let syntax = comment_syntax(language);
    let mut stripped = line.trim_end();

    if let Some(close) = syntax.close
        && let Some(rest) = stripped.strip_suffix(close)
        && let Some(inner) = rest.trim_end().strip_suffix(syntax.open)
    {
        stripped = inner.trim_end();
    } else if let Some(rest) = stripped.strip_suffix(syntax.open)
        && (rest.is_empty() || rest.ends_with(char::is_whitespace))
    {
        stripped = rest.trim_end();
    }
    stripped.to_string()
}
