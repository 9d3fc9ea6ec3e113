//! The command-line front end: thin glue that parses arguments, opens
//! the database registry at the configured directory and hands the
//! command to the [`Executor`].

use std::env;
use std::process::ExitCode;

use crate::persistence::Database;

mod colors;
mod commands;
mod messages;
pub mod parsers;

pub use commands::Executor;

use crate::cli::messages::{highlight_argument, system_message};

pub const STORAGE_DIR_ENV: &str = "GRANARY_DATA_DIR";
pub const DEFAULT_STORAGE_DIR: &str = "./.granary_files";

pub fn storage_dir() -> String {
    //! Resolve the data directory: `.env` is honored, then the
    //! environment, then the default next to the working directory.

    dotenvy::dotenv().ok();
    env::var(STORAGE_DIR_ENV).unwrap_or_else(|_| DEFAULT_STORAGE_DIR.to_string())
}

pub fn run(cli: parsers::Cli) -> ExitCode {
    //! Open the registry, execute the parsed command and print the
    //! outcome. Every failure becomes a single formatted message and a
    //! nonzero exit.

    let dir = storage_dir();

    let mut database = match Database::open(&dir) {
        Ok(database) => database,
        Err(error) => {
            eprintln!(
                "{}",
                system_message(
                    "error",
                    format!(
                        "could not open data directory '{}': {}",
                        highlight_argument(&dir),
                        error
                    ),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    match Executor::new(&mut database).execute(cli.command) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", system_message("error", error.to_string()));
            ExitCode::FAILURE
        }
    }
}
