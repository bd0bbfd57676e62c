use clap::Parser;
use std::path::PathBuf;

use super::types::FormatArg;

/// Rename double-page comic scans to a dash-separated page range
///
/// Without -a or -d every rename is confirmed interactively.
#[derive(Parser, Debug)]
#[command(name = "pagefix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files, directories or .cbz/.zip archives. Defaults to the current directory
    pub paths: Vec<PathBuf>,

    /// Rename everything without asking
    #[arg(short = 'a', long = "auto", conflicts_with = "dry_run")]
    pub auto: bool,

    /// Show what would be renamed without changing anything
    #[arg(short = 'd', long = "dry-run")]
    pub dry_run: bool,

    /// Also write the list of changes to FILE
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Leave .cbz/.zip archives alone
    #[arg(long)]
    pub no_archives: bool,

    /// Image extensions to consider (comma separated)
    #[arg(long = "ext", value_delimiter = ',', value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Don't print the change list to stdout
    #[arg(short, long)]
    pub quiet: bool,

    /// Log more detail to stderr. Repeat for more.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(
        long,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Run as if started in <path> instead of the current working directory
    #[arg(short = 'C', value_name = "PATH")]
    pub directory: Option<PathBuf>,
}
