use std::io;

use clap::{Parser, Subcommand};

mod error;
mod subcommands;

/// Converts `AsciiDoc` callouts into definition lists, bulleted lists or
/// inline code comments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert the callouts of one or more documents
    Convert(subcommands::convert::Args),

    /// Check that every code marker has an explanation and vice versa
    Check(subcommands::check::Args),

    /// Dump the annotated code blocks of a document as JSON
    Inspect(subcommands::inspect::Args),
}

fn setup_logging() {
    use tracing_subscriber::{EnvFilter, prelude::*};

    let filter = EnvFilter::try_from_env("CALLOUTS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::IsTerminal::is_terminal(&io::stderr()))
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry().with(layer).init();
}

fn main() -> miette::Result<()> {
    setup_logging();

    let args = Args::parse();
    match args.command {
        Commands::Convert(args) => subcommands::convert::run(&args),
        Commands::Check(args) => subcommands::check::run(&args),
        Commands::Inspect(args) => subcommands::inspect::run(&args),
    }
}
