use crate::archive;
use crate::scanner::{Location, Proposal};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// What happened (or would happen) to one proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum Status {
    /// Accepted, waiting for [`apply_changes`]
    Pending,
    WouldRename,
    Renamed,
    Declined,
    Skipped(String),
    Failed(String),
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::WouldRename => "Would rename",
            Self::Renamed => "Renamed",
            Self::Declined => "Declined",
            Self::Skipped(_) => "Skipped",
            Self::Failed(_) => "Failed",
        }
    }

    /// Machine-readable name, as used in JSON output.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::WouldRename => "would-rename",
            Self::Renamed => "renamed",
            Self::Declined => "declined",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Skipped(reason) | Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub proposal: Proposal,
    pub status: Status,
}

impl Change {
    pub fn new(proposal: Proposal, status: Status) -> Self {
        Self { proposal, status }
    }
}

/// Options for applying accepted changes
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Set from a signal handler; checked before every rename
    pub interrupted: Option<Arc<AtomicBool>>,
}

impl ApplyOptions {
    fn is_interrupted(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Carry out every [`Status::Pending`] change, in order.
///
/// Best-effort: a failed rename is recorded on its change and the run moves
/// on. Entries of one archive are renamed together in a single rewrite.
pub fn apply_changes(changes: &mut [Change], options: &ApplyOptions) {
    let mut archives: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();
    for (idx, change) in changes.iter().enumerate() {
        if let (Status::Pending, Location::ArchiveEntry { archive, .. }) =
            (&change.status, &change.proposal.location)
        {
            archives.entry(archive.clone()).or_default().push(idx);
        }
    }

    for idx in 0..changes.len() {
        if changes[idx].status != Status::Pending {
            continue;
        }
        if options.is_interrupted() {
            changes[idx].status = Status::Skipped("interrupted".to_string());
            continue;
        }

        match changes[idx].proposal.location.clone() {
            Location::File { path } => {
                let to = path.with_file_name(&changes[idx].proposal.to);
                changes[idx].status = match rename_file(&path, &to) {
                    Ok(()) => {
                        info!("renamed {} -> {}", path.display(), to.display());
                        Status::Renamed
                    },
                    Err(e) => {
                        warn!("failed to rename {}: {e:#}", path.display());
                        Status::Failed(format!("{e:#}"))
                    },
                };
            },
            Location::ArchiveEntry { archive, .. } => {
                let indices = archives.remove(&archive).unwrap_or_default();
                apply_archive(&archive, &indices, changes);
            },
        }
    }
}

fn rename_file(from: &Path, to: &Path) -> Result<()> {
    // fs::rename would silently replace an existing target on Unix
    if to.symlink_metadata().is_ok() {
        return Err(anyhow!("{} already exists", to.display()));
    }
    fs::rename(from, to)
        .with_context(|| format!("Failed to rename {} to {}", from.display(), to.display()))
}

fn apply_archive(archive: &Path, indices: &[usize], changes: &mut [Change]) {
    let mut renames = BTreeMap::new();
    for &idx in indices {
        if let Location::ArchiveEntry { entry, .. } = &changes[idx].proposal.location {
            renames.insert(
                entry.clone(),
                archive::with_file_name(entry, &changes[idx].proposal.to),
            );
        }
    }

    let status = match archive::rename_entries(archive, &renames) {
        Ok(count) => {
            info!("renamed {count} entries in {}", archive.display());
            Status::Renamed
        },
        Err(e) => {
            warn!("failed to rewrite {}: {e:#}", archive.display());
            Status::Failed(format!("{e:#}"))
        },
    };
    for &idx in indices {
        changes[idx].status = status.clone();
    }
}
