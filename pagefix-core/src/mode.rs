use crate::error::PagefixError;
use serde::{Deserialize, Serialize};

/// What happens to each rename proposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Rename everything without asking (`-a`)
    Apply,
    /// Report only, never touch the filesystem (`-d`)
    #[default]
    DryRun,
    /// Ask before each rename (no flag)
    Interactive,
}

impl Mode {
    /// Resolve the mode from the `-a` and `-d` flags. Both at once is a usage error.
    pub fn from_flags(auto: bool, dry_run: bool) -> Result<Self, PagefixError> {
        match (auto, dry_run) {
            (true, true) => Err(PagefixError::ConflictingModes),
            (true, false) => Ok(Self::Apply),
            (false, true) => Ok(Self::DryRun),
            (false, false) => Ok(Self::Interactive),
        }
    }

    pub fn changes_files(self) -> bool {
        !matches!(self, Self::DryRun)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apply => write!(f, "apply"),
            Self::DryRun => write!(f, "dry-run"),
            Self::Interactive => write!(f, "interactive"),
        }
    }
}
