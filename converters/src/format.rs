//! Target formats for callout explanations.

use std::str::FromStr;

/// What the callouts of a code block are converted to.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Format {
    /// A definition list below the block: `` `code`:: `` followed by the
    /// explanation.
    #[default]
    Deflist,

    /// A bulleted list below the block: ``* `code`: explanation``.
    Bullets,

    /// Inline comments at the end of each annotated code line. The
    /// explanations below the block are removed.
    Comments,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deflist" | "definition-list" => Ok(Self::Deflist),
            "bullets" | "bullet" => Ok(Self::Bullets),
            "comments" | "comment" => Ok(Self::Comments),
            _ => Err(format!(
                "invalid format: '{s}', expected: deflist, bullets, comments"
            )),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deflist => write!(f, "deflist"),
            Self::Bullets => write!(f, "bullets"),
            Self::Comments => write!(f, "comments"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Format::from_str("deflist").unwrap(), Format::Deflist);
        assert_eq!(Format::from_str("DEFLIST").unwrap(), Format::Deflist);
        assert_eq!(Format::from_str("bullet").unwrap(), Format::Bullets);
        assert_eq!(Format::from_str("comments").unwrap(), Format::Comments);
        assert!(Format::from_str("table").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Format::Deflist.to_string(), "deflist");
        assert_eq!(Format::Bullets.to_string(), "bullets");
        assert_eq!(Format::Comments.to_string(), "comments");
    }

    #[test]
    fn test_default() {
        assert_eq!(Format::default(), Format::Deflist);
    }
}
