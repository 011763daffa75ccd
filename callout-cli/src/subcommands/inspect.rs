use std::{
    io::{self, Write},
    path::PathBuf,
};

use callout_parser::scan_document;
use clap::Args as ClapArgs;

use crate::{
    error::{Error, RichError},
    subcommands::read_document,
};

/// Print what was detected in a document
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// Input `AsciiDoc` file
    pub file: PathBuf,
}

pub fn run(args: &Args) -> miette::Result<()> {
    let source = read_document(&args.file)?;
    let lines: Vec<&str> = source.lines().collect();
    let scan = scan_document(&lines);
    for error in &scan.rejected {
        let report = miette::Report::new(RichError::parser(&args.file, &source, error));
        eprintln!("{report:?}");
    }

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &scan.blocks).map_err(Error::from)?;
    writeln!(stdout).map_err(Error::from)?;
    Ok(())
}
