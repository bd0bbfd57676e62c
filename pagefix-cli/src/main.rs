use clap::Parser;
use pagefix_core::{awaiting_answer, PagefixError};
use std::io::{self, IsTerminal};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod cli;
mod fix;
mod logging;

use cli::Cli;

fn main() {
    let interrupted = Arc::new(AtomicBool::new(false));

    let interrupted_clone = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || {
        // Nothing has been renamed while we wait for an answer
        if awaiting_answer() {
            eprintln!();
            process::exit(130);
        }
        eprintln!("\nReceived SIGINT. Stopping after the current rename...");
        interrupted_clone.store(true, Ordering::SeqCst);
    }) {
        eprintln!("Warning: could not install Ctrl-C handler: {e}");
    }

    let cli = Cli::parse();
    let use_color = !cli.no_color && io::stderr().is_terminal();

    if let Some(ref dir) = cli.directory {
        if let Err(e) = std::env::set_current_dir(dir) {
            eprintln!("Error: Failed to change to directory {}: {e}", dir.display());
            process::exit(2);
        }
    }

    logging::init_logging(cli.verbose, use_color);

    let result = fix::handle_fix(&cli, use_color, Arc::clone(&interrupted));

    if interrupted.load(Ordering::SeqCst) {
        eprintln!("Operation interrupted");
        process::exit(130);
    }

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(exit_code(&e));
    }
}

/// 1 when some renames failed, 2 for bad usage or paths, 3 for anything else.
fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<PagefixError>() {
        Some(PagefixError::RenamesFailed(..)) => 1,
        Some(PagefixError::Interrupted) => 130,
        Some(err) if err.is_usage() => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        let failed = anyhow::Error::from(PagefixError::RenamesFailed(1, 3));
        assert_eq!(exit_code(&failed), 1);

        let missing = anyhow::Error::from(PagefixError::PathNotFound(PathBuf::from("nope")));
        assert_eq!(exit_code(&missing), 2);

        let conflicting = anyhow::Error::from(PagefixError::ConflictingModes);
        assert_eq!(exit_code(&conflicting), 2);

        assert_eq!(exit_code(&anyhow::anyhow!("disk on fire")), 3);
    }

    #[test]
    fn test_usage_errors_survive_context() {
        let err = anyhow::Error::from(PagefixError::PathNotFound(PathBuf::from("nope")))
            .context("while scanning");
        assert_eq!(exit_code(&err), 2);
    }
}
