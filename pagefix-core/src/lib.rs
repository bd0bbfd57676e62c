#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod apply;
pub mod archive;
pub mod config;
pub mod error;
pub mod interrupt;
pub mod mode;
pub mod operations;
pub mod pattern;
pub mod prompt;
pub mod report;
pub mod scanner;

pub use apply::{apply_changes, ApplyOptions, Change, Status};
pub use config::Config;
pub use error::PagefixError;
pub use interrupt::awaiting_answer;
pub use mode::Mode;
pub use operations::{fix_operation, FixOptions};
pub use pattern::{Convention, DoublePage, DoublePageMatcher, DEFAULT_EXTENSIONS};
pub use prompt::{Answer, Confirm, LinePrompt};
pub use report::{render_summary_line, OutputFormatter, ReportFormat, RunResult, Summary};
pub use scanner::{scan_paths, Conflict, Location, Plan, Proposal, ScanOptions, Stats};
