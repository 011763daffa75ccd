use std::path::{Path, PathBuf};

use callout_converters::{Format, Options, Rewrite, rewrite_document};
use clap::Args as ClapArgs;
use rayon::prelude::*;

use crate::{
    error::{Error, RichError},
    subcommands::read_document,
};

/// Convert callouts to another presentation
#[derive(ClapArgs, Debug)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally booleans
pub struct Args {
    /// List of files to convert
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// What the callouts are turned into
    #[arg(long, value_parser = clap::value_parser!(Format), default_value = "deflist")]
    pub format: Format,

    /// Keep every `ifdef::`/`ifndef::` variant of a callout table
    #[arg(long)]
    pub keep_conditionals: bool,

    /// Fail on a code block whose markers and explanations disagree instead of
    /// leaving it untouched
    #[arg(long)]
    pub strict: bool,

    /// Overwrite the files instead of printing the result
    #[arg(short = 'i', long)]
    pub in_place: bool,

    /// Separator between explanations sharing one inline comment
    #[arg(long, default_value = "; ")]
    pub separator: String,
}

#[derive(Debug)]
enum Failure {
    Io(Error),
    Conversion(Box<RichError>),
}

impl Failure {
    fn report(self) -> miette::Report {
        match self {
            Self::Io(error) => miette::Report::new(error),
            Self::Conversion(error) => miette::Report::new(*error),
        }
    }
}

fn join_lines(lines: &[String], trailing_newline: bool) -> String {
    let mut output = lines.join("\n");
    if trailing_newline {
        output.push('\n');
    }
    output
}

#[tracing::instrument(skip(options))]
fn convert_file(path: &Path, options: &Options) -> Result<(String, Rewrite), Failure> {
    let source = read_document(path).map_err(Failure::Io)?;
    let lines: Vec<&str> = source.lines().collect();
    let rewrite = rewrite_document(&lines, options).map_err(|error| {
        Failure::Conversion(Box::new(RichError::converter(path, &source, &error)))
    })?;
    for mismatch in &rewrite.skipped {
        let report = miette::Report::new(RichError::parser(path, &source, mismatch));
        eprintln!("{report:?}");
    }
    tracing::info!(
        path = %path.display(),
        converted = rewrite.converted,
        skipped = rewrite.skipped.len(),
        "converted document"
    );
    Ok((join_lines(&rewrite.lines, source.ends_with('\n')), rewrite))
}

fn write_back(path: &Path, options: &Options) -> Result<(), Failure> {
    let (output, rewrite) = convert_file(path, options)?;
    if rewrite.converted == 0 {
        return Ok(());
    }
    std::fs::write(path, output).map_err(|source| {
        Failure::Io(Error::Write {
            path: path.to_path_buf(),
            source,
        })
    })
}

pub fn run(args: &Args) -> miette::Result<()> {
    let options = Options::builder()
        .format(args.format)
        .keep_conditionals(args.keep_conditionals)
        .strict(args.strict)
        .comment_separator(args.separator.as_str())
        .build();

    let failures: Vec<(PathBuf, Failure)> = if args.in_place {
        // Every file is written back on its own, so they can be converted in parallel.
        args.files
            .par_iter()
            .filter_map(|file| {
                write_back(file, &options)
                    .err()
                    .map(|failure| (file.clone(), failure))
            })
            .collect()
    } else {
        // Output goes to stdout, so keep the documents in order.
        let mut failures = Vec::new();
        for file in &args.files {
            match convert_file(file, &options) {
                Ok((output, _)) => print!("{output}"),
                Err(failure) => failures.push((file.clone(), failure)),
            }
        }
        failures
    };

    if failures.is_empty() {
        return Ok(());
    }
    let count = failures.len();
    for (file, failure) in failures {
        tracing::debug!(path = %file.display(), "conversion failed");
        eprintln!("{:?}", failure.report());
    }
    Err(miette::miette!("failed to convert {count} file(s)"))
}
