mod cli;
mod commands;
mod config;
mod progress;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Command::Apply(args) => commands::apply::apply(&ctx, &cli.connection, args),
        Command::Diff(args) => commands::apply::diff(&ctx, &cli.connection, args),
        Command::Ensure(args) => commands::ensure::run(&ctx, &cli.connection, args),
        Command::Fact(args) => commands::fact::run(&ctx, &cli.connection, args),
        Command::Completions { shell } => {
            generate(shell, &mut Cli::command(), "jiraform", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(err) = &result {
        ui::error(&format!("{err:#}"));
        std::process::exit(1);
    }
    result
}
