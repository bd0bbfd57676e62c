use std::path::PathBuf;
use thiserror::Error;

/// Failures the CLI needs to tell apart when choosing an exit code.
///
/// Everything else travels as a plain `anyhow::Error` with context.
#[derive(Debug, Error)]
pub enum PagefixError {
    #[error("invalid usage: automatic mode (-a) and dry run (-d) cannot be combined")]
    ConflictingModes,

    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("unsupported path: {} (expected a directory, an image or a .cbz/.zip archive)", .0.display())]
    UnsupportedPath(PathBuf),

    #[error("archive error in {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{0} of {1} renames failed")]
    RenamesFailed(usize, usize),

    #[error("interrupted")]
    Interrupted,
}

impl PagefixError {
    /// True for errors caused by how the tool was invoked rather than by the filesystem.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::ConflictingModes | Self::PathNotFound(_) | Self::UnsupportedPath(_)
        )
    }
}
