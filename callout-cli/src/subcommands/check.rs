use std::path::PathBuf;

use callout_parser::scan_document;
use clap::Args as ClapArgs;
use crossterm::style::Stylize;

use crate::{error::RichError, subcommands::read_document};

/// Validate callouts without changing anything
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// List of files to check
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: &Args) -> miette::Result<()> {
    let mut problems = 0;
    for file in &args.files {
        let source = read_document(file)?;
        let lines: Vec<&str> = source.lines().collect();
        let scan = scan_document(&lines);

        let mismatched: Vec<_> = scan
            .blocks
            .iter()
            .filter_map(|block| block.check().err())
            .collect();
        for error in scan.rejected.iter().chain(&mismatched) {
            let report = miette::Report::new(RichError::parser(file, &source, error));
            eprintln!("{report:?}");
        }

        let summary = format!(
            "{}: {} annotated block(s), {} mismatched, {} unreadable",
            file.display(),
            scan.blocks.len(),
            mismatched.len(),
            scan.rejected.len()
        );
        let found = mismatched.len() + scan.rejected.len();
        if found == 0 {
            eprintln!("{} {summary}", "ok".green().bold());
        } else {
            eprintln!("{} {summary}", "error".red().bold());
        }
        problems += found;
    }

    if problems == 0 {
        Ok(())
    } else {
        Err(miette::miette!("found {problems} callout problem(s)"))
    }
}
