//! reproducible - build byte-for-byte reproducible tar and zip archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use clap::Parser;
use console::Term;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(Term::stderr().is_term())
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    let (operation, result) = match &cli.command {
        cli::Commands::Pack(args) => (
            "pack",
            commands::pack::execute(args, &*formatter, !cli.quiet && !cli.json),
        ),
        cli::Commands::List(args) => ("list", commands::list::execute(args, &*formatter)),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            ("completion", Ok(()))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(operation, &err);
            ExitCode::FAILURE
        }
    }
}
