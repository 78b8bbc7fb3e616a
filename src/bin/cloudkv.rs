use clap::Parser;
use cloudkv::{Cli, KvsError};
use colored::Colorize;
use log::LevelFilter;
use std::{env, process};

/// Status clap exits with on bad usage.
const USAGE: i32 = 2;

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // help and version go to stdout and are not failures
            if e.use_stderr() {
                if let Err(gate) = Cli::check_backend(env::args_os()) {
                    exit_with(gate);
                }
            }
            e.exit()
        }
    };

    if let Err(e) = cli.run() {
        exit_with(e);
    }
}

fn exit_with(e: anyhow::Error) -> ! {
    eprintln!("{}: {:#}", "error".red().bold(), e);
    let usage = e
        .downcast_ref::<KvsError>()
        .map_or(false, KvsError::is_usage);
    process::exit(if usage { USAGE } else { 1 });
}
