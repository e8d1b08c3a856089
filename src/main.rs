//! `dotlink` command-line entry point: parses arguments and dispatches subcommands.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod apply;
mod check;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod logging;
mod plan;
mod platform;

fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();
    logging::init_subscriber(args.global.verbose);
    let log = logging::Logger::new(args.global.verbose);

    match args.command {
        cli::Command::Plan(opts) => commands::plan::run(&args.global, &opts, &log)?,
        cli::Command::Apply(opts) => commands::apply::run(&args.global, &opts, &log)?,
        cli::Command::Deploy(opts) => commands::deploy::run(&args.global, &opts, &log)?,
        cli::Command::Check(opts) => {
            if !commands::check::run(&args.global, &opts, &log)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        cli::Command::Version => {
            let version = option_env!("DOTLINK_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("dotlink {version}");
        }
    }

    Ok(ExitCode::SUCCESS)
}
