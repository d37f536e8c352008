//! NapCat installer entry point
//!
//! Parses the command line, runs one install/update, and maps the result to
//! the process exit code. Errors raised before the pipeline starts (bad
//! configuration, unknown directories) are printed here; pipeline failures
//! have already been shown by the error dialog.

use anyhow::Result;
use clap::Parser;
use napcat_installer::cli;
use napcat_installer::core::user_friendly_error;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(code) => Ok(code),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
