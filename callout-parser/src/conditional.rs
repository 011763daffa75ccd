//! `ifdef::`, `ifndef::` and `endif::` lines.
//!
//! Only the block forms (empty brackets) are directives here. The single-line
//! form `ifdef::name[content]` is ordinary text to the table parser.

use crate::{
    error::Error,
    model::{Guard, Operation, Polarity},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive {
    Open(Guard),
    Close(Option<String>),
}

impl Directive {
    /// Whether an `endif` carrying `expression` closes `guard`. A bare
    /// `endif::[]` closes whatever is innermost.
    pub(crate) fn closes(expression: Option<&str>, guard: &Guard) -> bool {
        expression.is_none_or(|expression| {
            expression == guard.expression()
                || guard.attributes.iter().any(|attribute| attribute == expression)
        })
    }
}

peg::parser! {
    grammar directive_parser() for str {
        pub(crate) rule directive() -> Directive
            = ifdef() / ifndef() / endif()

        rule ifdef() -> Directive
            = "ifdef::" a:attributes() "[]" {
                Directive::Open(Guard::new(a.0, a.1, Polarity::IfDef))
            }

        rule ifndef() -> Directive
            = "ifndef::" a:attributes() "[]" {
                Directive::Open(Guard::new(a.0, a.1, Polarity::IfNDef))
            }

        rule endif() -> Directive
            = "endif::" e:expression()? "[]" {
                Directive::Close(e)
            }

        rule attributes() -> (Vec<String>, Option<Operation>)
            = n1:name() op:operation() rest:(name() ++ operation()) {
                let mut names = vec![n1];
                names.extend(rest);
                (names, Some(op))
            }
        / n1:name() { (vec![n1], None) }

        rule operation() -> Operation
            = "+" { Operation::And }
        / "," { Operation::Or }

        rule name_match() = (!['[' | ']' | ',' | '+'] [_])+

        rule name() -> String
            = n:$(name_match()) {
                n.to_string()
            }

        rule expression() -> String
            = e:$((!['['] [_])+) {
                e.to_string()
            }
    }
}

/// Whether a line is shaped like a block conditional directive.
pub(crate) fn looks_like_directive(line: &str) -> bool {
    let line = line.trim_end();
    (line.starts_with("ifdef::") || line.starts_with("ifndef::") || line.starts_with("endif::"))
        && line.ends_with("[]")
}

/// Parse a directive line. Returns `Ok(None)` for lines that are not block
/// directives at all.
///
/// # Errors
///
/// Returns [`Error::InvalidConditionalDirective`] when the line has the shape
/// of a directive but its attribute list does not parse.
#[tracing::instrument(level = "trace")]
pub(crate) fn parse_directive(line: &str) -> Result<Option<Directive>, Error> {
    if !looks_like_directive(line) {
        return Ok(None);
    }
    directive_parser::directive(line.trim_end())
        .map(Some)
        .map_err(|error| {
            tracing::warn!(?error, line, "failed to parse conditional directive");
            Error::InvalidConditionalDirective(line.trim_end().to_string())
        })
}
