use crate::archive::{self, entry_file_name, with_file_name};
use crate::error::PagefixError;
use crate::pattern::{Convention, DoublePageMatcher, DEFAULT_EXTENSIONS};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    pub recursive: bool,
    pub archives: bool,
    pub extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            archives: true,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }
}

/// Where a file lives: on disk, or inside a ZIP-based archive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    File { path: PathBuf },
    ArchiveEntry { archive: PathBuf, entry: String },
}

impl Location {
    /// The same location with its last component replaced.
    pub fn with_file_name(&self, file_name: &str) -> Self {
        match self {
            Self::File { path } => Self::File {
                path: path.with_file_name(file_name),
            },
            Self::ArchiveEntry { archive, entry } => Self::ArchiveEntry {
                archive: archive.clone(),
                entry: with_file_name(entry, file_name),
            },
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path } => write!(f, "{}", path.display()),
            Self::ArchiveEntry { archive, entry } => write!(f, "{}:{}", archive.display(), entry),
        }
    }
}

/// Why a proposal cannot be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Conflict {
    /// Something already has the proposed name
    TargetExists,
    /// An earlier proposal in the same place claimed the name
    DuplicateTarget,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetExists => write!(f, "target exists"),
            Self::DuplicateTarget => write!(f, "duplicate target"),
        }
    }
}

/// A single proposed rename. `from` and `to` are bare file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub location: Location,
    pub from: String,
    pub to: String,
    pub convention: Convention,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<Conflict>,
}

impl Proposal {
    pub fn target(&self) -> Location {
        self.location.with_file_name(&self.to)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub files_scanned: usize,
    pub archives_scanned: usize,
    pub unsupported_archives: usize,
}

/// Everything one scan pass found, in scan order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub proposals: Vec<Proposal>,
    pub stats: Stats,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    /// Proposals that can be carried out.
    pub fn actionable(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter().filter(|p| p.conflict.is_none())
    }
}

/// Scan files, directories and archives for double-page names.
///
/// Every root is checked before anything is scanned, so a bad path fails
/// the whole call.
pub fn scan_paths(roots: &[PathBuf], options: &ScanOptions) -> Result<Plan> {
    let matcher = DoublePageMatcher::new(&options.extensions);

    for root in roots {
        validate_root(root, &matcher)?;
    }

    let mut scanner = Scanner {
        matcher,
        options,
        plan: Plan::default(),
        seen: HashSet::new(),
        claimed: HashSet::new(),
    };

    for root in roots {
        if root.is_dir() {
            scanner.scan_dir(root);
        } else if archive::is_archive(root) {
            if options.archives {
                scanner.scan_archive(root)?;
            } else {
                warn!("skipping {}: archive scanning is disabled", root.display());
            }
        } else {
            scanner.scan_file(root);
        }
    }

    debug!(
        files = scanner.plan.stats.files_scanned,
        archives = scanner.plan.stats.archives_scanned,
        proposals = scanner.plan.len(),
        "scan finished"
    );

    Ok(scanner.plan)
}

fn validate_root(root: &Path, matcher: &DoublePageMatcher) -> Result<(), PagefixError> {
    if !root.exists() {
        return Err(PagefixError::PathNotFound(root.to_path_buf()));
    }
    if root.is_dir() || archive::is_archive(root) {
        return Ok(());
    }
    let is_image = root
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| matcher.is_image(n));
    if root.is_file() && is_image {
        Ok(())
    } else {
        Err(PagefixError::UnsupportedPath(root.to_path_buf()))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// A path with its directory resolved, so `./a.jpg` and `a.jpg` compare equal.
/// The file name itself is kept so symlinks are renamed, not their targets.
fn identity(path: &Path) -> PathBuf {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let parent = fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());
    match path.file_name() {
        Some(name) => parent.join(name),
        None => path.to_path_buf(),
    }
}

struct Scanner<'a> {
    matcher: DoublePageMatcher,
    options: &'a ScanOptions,
    plan: Plan,
    /// Files and archives already looked at, across all roots
    seen: HashSet<PathBuf>,
    /// Targets of earlier file proposals, across all roots
    claimed: HashSet<PathBuf>,
}

impl Scanner<'_> {
    fn scan_dir(&mut self, root: &Path) {
        let max_depth = if self.options.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("skipping unreadable entry: {e}");
                    continue;
                },
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if archive::is_archive(path) {
                if self.options.archives {
                    if let Err(e) = self.scan_archive(path) {
                        warn!("skipping archive {}: {e:#}", path.display());
                    }
                }
            } else if archive::is_unsupported_archive(path) {
                if self.options.archives {
                    warn!("skipping {}: RAR archives are not supported", path.display());
                    self.plan.stats.unsupported_archives += 1;
                }
            } else {
                self.scan_file(path);
            }
        }
    }

    fn scan_file(&mut self, path: &Path) {
        let key = identity(path);
        if !self.seen.insert(key.clone()) {
            trace!("already scanned {}", path.display());
            return;
        }
        self.plan.stats.files_scanned += 1;

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!("skipping non UTF-8 name {}", path.display());
            return;
        };
        let Some((to, convention)) = self.matcher.propose(name) else {
            trace!("no double page in {}", path.display());
            return;
        };

        let conflict = if path.with_file_name(&to).symlink_metadata().is_ok() {
            Some(Conflict::TargetExists)
        } else if !self.claimed.insert(key.with_file_name(&to)) {
            Some(Conflict::DuplicateTarget)
        } else {
            None
        };

        self.push(Proposal {
            location: Location::File {
                path: path.to_path_buf(),
            },
            from: name.to_string(),
            to,
            convention,
            conflict,
        });
    }

    fn scan_archive(&mut self, path: &Path) -> Result<()> {
        if !self.seen.insert(identity(path)) {
            trace!("already scanned {}", path.display());
            return Ok(());
        }
        let entries = archive::list_entries(path)?;
        self.plan.stats.archives_scanned += 1;
        debug!("scanning {} entries in {}", entries.len(), path.display());

        let existing: HashSet<&str> = entries.iter().map(String::as_str).collect();
        let mut claimed = HashSet::new();

        for entry in &entries {
            self.plan.stats.files_scanned += 1;

            let name = entry_file_name(entry);
            let Some((to, convention)) = self.matcher.propose(name) else {
                trace!("no double page in {}:{}", path.display(), entry);
                continue;
            };

            let target = with_file_name(entry, &to);
            let conflict = if existing.contains(target.as_str()) {
                Some(Conflict::TargetExists)
            } else if !claimed.insert(target) {
                Some(Conflict::DuplicateTarget)
            } else {
                None
            };

            self.push(Proposal {
                location: Location::ArchiveEntry {
                    archive: path.to_path_buf(),
                    entry: entry.clone(),
                },
                from: name.to_string(),
                to,
                convention,
                conflict,
            });
        }
        Ok(())
    }

    fn push(&mut self, proposal: Proposal) {
        match proposal.conflict {
            Some(conflict) => warn!(
                "not renaming {} to {}: {conflict}",
                proposal.location, proposal.to
            ),
            None => debug!("proposing {} -> {}", proposal.location, proposal.to),
        }
        self.plan.proposals.push(proposal);
    }
}
