use std::path::{Path, PathBuf};

use callout_converters::{Format, Options, rewrite_document};

type Error = Box<dyn std::error::Error>;

fn remove_lines_trailing_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrites every source fixture in every format, with conditional table
/// variants kept, and compares with `expected/<name>.<format>.adoc`.
#[rstest::rstest]
#[tracing_test::traced_test]
fn test_fixtures(
    #[files("tests/fixtures/source/*.adoc")] path: PathBuf,
    #[values(Format::Deflist, Format::Bullets, Format::Comments)] format: Format,
) -> Result<(), Error> {
    let file_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or("Invalid fixture file name")?;
    let expected_path = Path::new("tests")
        .join("fixtures")
        .join("expected")
        .join(format!("{file_name}.{format}.adoc"));

    let source = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = source.lines().collect();
    let options = Options::builder()
        .format(format)
        .keep_conditionals(true)
        .build();
    let rewrite = rewrite_document(&lines, &options)?;

    let expected = std::fs::read_to_string(&expected_path)?;
    pretty_assertions::assert_eq!(
        remove_lines_trailing_whitespace(&expected),
        remove_lines_trailing_whitespace(&rewrite.lines.join("\n")),
        "{format} output mismatch for fixture: {file_name}",
    );
    Ok(())
}

#[test]
fn test_mismatched_block_is_reported() -> Result<(), Error> {
    let source = std::fs::read_to_string("tests/fixtures/source/mismatch.adoc")?;
    let lines: Vec<&str> = source.lines().collect();
    let rewrite = rewrite_document(&lines, &Options::default())?;
    assert_eq!(rewrite.converted, 1);
    assert_eq!(rewrite.skipped.len(), 1);
    assert_eq!(rewrite.skipped.first().and_then(callout_parser::Error::line), Some(6));
    Ok(())
}

#[rstest::rstest]
fn test_rewriting_twice_changes_nothing(
    #[files("tests/fixtures/source/*.adoc")] path: PathBuf,
) -> Result<(), Error> {
    let source = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = source.lines().collect();
    let options = Options::default();
    let first = rewrite_document(&lines, &options)?;
    let second = rewrite_document(&first.lines, &options)?;
    pretty_assertions::assert_eq!(first.lines, second.lines);
    Ok(())
}
