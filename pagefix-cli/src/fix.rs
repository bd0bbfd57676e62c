use anyhow::Result;
use pagefix_core::{
    fix_operation, render_summary_line, Config, Confirm, FixOptions, LinePrompt, Mode,
    PagefixError, ScanOptions,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::cli::Cli;

pub fn handle_fix(cli: &Cli, use_color: bool, interrupted: Arc<AtomicBool>) -> Result<()> {
    let mode = Mode::from_flags(cli.auto, cli.dry_run)?;
    let config = Config::load(global_config_path().as_deref())?;
    let options = fix_options(cli, &config, mode, interrupted);

    let stdin = io::stdin();
    let mut prompt = LinePrompt::new(stdin.lock(), io::stderr(), use_color);
    let confirm: Option<&mut dyn Confirm> = if mode == Mode::Interactive {
        Some(&mut prompt)
    } else {
        None
    };

    let (result, rendered) = fix_operation(&cli.paths, &options, confirm)?;

    if !cli.quiet {
        print!("{rendered}");
    }
    eprintln!("{}", render_summary_line(&result, use_color));

    let summary = result.summary();
    if summary.failed > 0 {
        let attempted = summary.failed + summary.renamed;
        return Err(PagefixError::RenamesFailed(summary.failed, attempted).into());
    }

    Ok(())
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pagefix").join("config.toml"))
}

/// Command-line flags win over the config file.
fn fix_options(cli: &Cli, config: &Config, mode: Mode, interrupted: Arc<AtomicBool>) -> FixOptions {
    let defaults = &config.defaults;
    let extensions = if cli.extensions.is_empty() {
        defaults.extensions.clone()
    } else {
        cli.extensions.clone()
    };

    FixOptions {
        scan: ScanOptions {
            recursive: cli.recursive || defaults.recursive,
            archives: defaults.archives && !cli.no_archives,
            extensions,
        },
        mode,
        output_file: cli.output.clone(),
        format: cli.format.map_or(defaults.format, Into::into),
        interrupted: Some(interrupted),
    }
}
