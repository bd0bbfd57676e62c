use crate::apply::{apply_changes, ApplyOptions, Change, Status};
use crate::mode::Mode;
use crate::prompt::{Answer, Confirm};
use crate::report::{OutputFormatter, ReportFormat, RunResult};
use crate::scanner::{scan_paths, Plan, ScanOptions};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

/// Everything that controls one run
#[derive(Debug, Clone, Default)]
pub struct FixOptions {
    pub scan: ScanOptions,
    pub mode: Mode,
    /// Also write the rendered change list here
    pub output_file: Option<PathBuf>,
    pub format: ReportFormat,
    pub interrupted: Option<Arc<AtomicBool>>,
}

/// High-level operation - equivalent to running `pagefix` on the command line.
///
/// Returns the result and the rendered change list. The same text is written
/// to `output_file` when one is set, so the file always matches what the
/// caller prints.
pub fn fix_operation(
    roots: &[PathBuf],
    options: &FixOptions,
    confirm: Option<&mut dyn Confirm>,
) -> Result<(RunResult, String)> {
    let mode = options.mode;
    if mode == Mode::Interactive && confirm.is_none() {
        return Err(anyhow!("interactive mode needs a prompt"));
    }

    let roots = if roots.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        roots.to_vec()
    };

    let plan = scan_paths(&roots, &options.scan)?;
    info!(
        "found {} double-page names in {} files",
        plan.len(),
        plan.stats.files_scanned
    );

    let stats = plan.stats.clone();
    let mut changes = decide(plan, mode, confirm)?;

    if mode.changes_files() {
        let apply_options = ApplyOptions {
            interrupted: options.interrupted.clone(),
        };
        apply_changes(&mut changes, &apply_options);
    }

    let result = RunResult {
        mode,
        changes,
        stats,
    };
    let rendered = result.format(options.format);

    if let Some(path) = &options.output_file {
        write_output(path, &rendered)?;
        info!("changes written to {}", path.display());
    }

    Ok((result, rendered))
}

/// Turn every proposal into a change with its initial status.
fn decide(plan: Plan, mode: Mode, mut confirm: Option<&mut dyn Confirm>) -> Result<Vec<Change>> {
    let mut changes = Vec::with_capacity(plan.len());
    let mut accept_rest = false;
    let mut decline_rest = false;

    for proposal in plan.proposals {
        let status = if let Some(conflict) = proposal.conflict {
            Status::Skipped(conflict.to_string())
        } else {
            match mode {
                Mode::DryRun => Status::WouldRename,
                Mode::Apply => Status::Pending,
                Mode::Interactive if accept_rest => Status::Pending,
                Mode::Interactive if decline_rest => Status::Declined,
                Mode::Interactive => {
                    let prompt = confirm
                        .as_deref_mut()
                        .ok_or_else(|| anyhow!("interactive mode needs a prompt"))?;
                    match prompt.confirm(&proposal)? {
                        Answer::Yes => Status::Pending,
                        Answer::No => Status::Declined,
                        Answer::All => {
                            accept_rest = true;
                            Status::Pending
                        },
                        Answer::Quit => {
                            decline_rest = true;
                            Status::Declined
                        },
                    }
                },
            }
        };
        changes.push(Change::new(proposal, status));
    }

    Ok(changes)
}

fn write_output(path: &Path, rendered: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, rendered)
        .with_context(|| format!("Failed to write changes to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Proposal;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    struct Scripted(VecDeque<Answer>);

    impl Confirm for Scripted {
        fn confirm(&mut self, _proposal: &Proposal) -> Result<Answer> {
            Ok(self.0.pop_front().unwrap_or(Answer::Quit))
        }
    }

    fn setup() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a001_002.jpg", "b003+004.jpg", "c005&006.jpg", "cover.jpg"] {
            fs::write(temp_dir.path().join(name), name).unwrap();
        }
        temp_dir
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn options(mode: Mode) -> FixOptions {
        FixOptions {
            mode,
            ..FixOptions::default()
        }
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let temp_dir = setup();
        let before = listing(temp_dir.path());

        let (result, rendered) =
            fix_operation(&[temp_dir.path().to_path_buf()], &options(Mode::DryRun), None).unwrap();

        assert_eq!(listing(temp_dir.path()), before);
        assert_eq!(result.summary().would_rename, 3);
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.lines().all(|l| l.starts_with("Would rename: ")));
    }

    #[test]
    fn test_apply_renames_everything() {
        let temp_dir = setup();

        let (result, _) =
            fix_operation(&[temp_dir.path().to_path_buf()], &options(Mode::Apply), None).unwrap();

        assert_eq!(result.summary().renamed, 3);
        assert_eq!(
            listing(temp_dir.path()),
            vec!["a001-002.jpg", "b003-004.jpg", "c005-006.jpg", "cover.jpg"]
        );
    }

    #[test]
    fn test_interactive_answers() {
        let temp_dir = setup();
        let mut prompt = Scripted(VecDeque::from([Answer::No, Answer::Yes, Answer::Quit]));

        let (result, rendered) = fix_operation(
            &[temp_dir.path().to_path_buf()],
            &options(Mode::Interactive),
            Some(&mut prompt),
        )
        .unwrap();

        assert_eq!(
            listing(temp_dir.path()),
            vec!["a001_002.jpg", "b003-004.jpg", "c005&006.jpg", "cover.jpg"]
        );
        let summary = result.summary();
        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.declined, 2);
        assert!(rendered.contains("Declined: "));
    }

    #[test]
    fn test_interactive_accept_all() {
        let temp_dir = setup();
        let mut prompt = Scripted(VecDeque::from([Answer::All]));

        let (result, _) = fix_operation(
            &[temp_dir.path().to_path_buf()],
            &options(Mode::Interactive),
            Some(&mut prompt),
        )
        .unwrap();

        assert_eq!(result.summary().renamed, 3);
        assert!(prompt.0.is_empty());
    }

    #[test]
    fn test_interactive_without_prompt_is_an_error() {
        let temp_dir = setup();
        let err = fix_operation(&[temp_dir.path().to_path_buf()], &options(Mode::Interactive), None)
            .unwrap_err();
        assert!(err.to_string().contains("needs a prompt"));
    }

    #[test]
    fn test_output_file_matches_rendered_text() {
        let temp_dir = setup();
        let out_dir = TempDir::new().unwrap();
        let output_file = out_dir.path().join("logs").join("changes.txt");

        let mut opts = options(Mode::DryRun);
        opts.output_file = Some(output_file.clone());
        let (_, rendered) = fix_operation(&[temp_dir.path().to_path_buf()], &opts, None).unwrap();

        let (_, without_file) =
            fix_operation(&[temp_dir.path().to_path_buf()], &options(Mode::DryRun), None).unwrap();

        assert_eq!(fs::read_to_string(&output_file).unwrap(), rendered);
        assert_eq!(rendered, without_file);
    }

    #[test]
    fn test_conflicts_are_skipped_not_applied() {
        let temp_dir = setup();
        fs::write(temp_dir.path().join("a001-002.jpg"), "already here").unwrap();

        let (result, rendered) =
            fix_operation(&[temp_dir.path().to_path_buf()], &options(Mode::Apply), None).unwrap();

        assert_eq!(result.summary().skipped, 1);
        assert!(rendered.contains("(target exists)"));
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("a001-002.jpg")).unwrap(),
            "already here"
        );
        assert!(temp_dir.path().join("a001_002.jpg").exists());
    }
}
