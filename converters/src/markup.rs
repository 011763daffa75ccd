/// Render code as an inline literal. Code containing a backtick is wrapped in
/// the passthrough form so the backtick survives.
pub(crate) fn inline_literal(code: &str) -> String {
    if code.contains('`') {
        format!("`+{code}+`")
    } else {
        format!("`{code}`")
    }
}

/// Explanation lines with surrounding blank lines dropped. Blank lines inside
/// become `+` continuations so the text stays in one list item.
pub(crate) fn description_lines(lines: &[String]) -> Vec<String> {
    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return Vec::new();
    };
    lines
        .get(first..=last)
        .unwrap_or_default()
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                "+".to_string()
            } else {
                line.trim().to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inline_literal() {
        assert_eq!(inline_literal("name: demo"), "`name: demo`");
        assert_eq!(inline_literal("echo `date`"), "`+echo `date`+`");
    }

    #[test]
    fn test_description_lines() {
        let lines = vec![
            String::new(),
            "First".to_string(),
            "  indented".to_string(),
            String::new(),
            "After a gap".to_string(),
            String::new(),
        ];
        assert_eq!(
            description_lines(&lines),
            vec!["First", "indented", "+", "After a gap"]
        );
        assert!(description_lines(&[String::new()]).is_empty());
    }
}
