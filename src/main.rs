use std::process::ExitCode;

use clap::Parser;
use granary::cli::{self, parsers::Cli};

fn main() -> ExitCode {
    cli::run(Cli::parse())
}
