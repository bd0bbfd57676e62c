//! Reading and rewriting entry names inside ZIP-based comic archives.
//!
//! Entries are copied raw (no recompression) into a temporary file next to
//! the archive, which then replaces the original in a single rename.

use crate::error::PagefixError;
use anyhow::{anyhow, Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;
use zip::{ZipArchive, ZipWriter};

/// Archive extensions whose entries can be renamed.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["cbz", "zip"];

/// Archive extensions that are recognized but cannot be rewritten.
pub const UNSUPPORTED_ARCHIVE_EXTENSIONS: &[&str] = &["cbr", "rar"];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

pub fn is_archive(path: &Path) -> bool {
    has_extension(path, ARCHIVE_EXTENSIONS)
}

pub fn is_unsupported_archive(path: &Path) -> bool {
    has_extension(path, UNSUPPORTED_ARCHIVE_EXTENSIONS)
}

fn archive_error(path: &Path) -> impl FnOnce(zip::result::ZipError) -> PagefixError + '_ {
    move |source| PagefixError::Archive {
        path: path.to_path_buf(),
        source,
    }
}

/// The last component of an entry name (`ch1/p001.jpg` -> `p001.jpg`).
pub fn entry_file_name(entry: &str) -> &str {
    entry.rsplit_once('/').map_or(entry, |(_, name)| name)
}

/// Replace the last component of an entry name, keeping its directory.
pub fn with_file_name(entry: &str, file_name: &str) -> String {
    match entry.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{file_name}"),
        None => file_name.to_string(),
    }
}

/// List the file entries of an archive, sorted by name. Directories are skipped.
///
/// Only the central directory is read; entry data is not touched until the
/// archive is rewritten.
pub fn list_entries(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let archive = ZipArchive::new(file).map_err(archive_error(path))?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .map(str::to_string)
        .collect();
    names.sort();
    Ok(names)
}

/// Rewrite `path` with the entries in `renames` (old name -> new name) renamed.
///
/// Fails without touching the archive when a source entry is missing or a
/// target name is already taken.
pub fn rename_entries(path: &Path, renames: &BTreeMap<String, String>) -> Result<usize> {
    if renames.is_empty() {
        return Ok(0);
    }

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = ZipArchive::new(file).map_err(archive_error(path))?;

    let existing: HashSet<String> = archive.file_names().map(str::to_string).collect();
    for (from, to) in renames {
        if !existing.contains(from) {
            return Err(anyhow!("entry {from} not found in {}", path.display()));
        }
        if existing.contains(to) && !renames.contains_key(to) {
            return Err(anyhow!("entry {to} already exists in {}", path.display()));
        }
    }

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;

    let mut renamed = 0;
    {
        let mut writer = ZipWriter::new(temp.as_file_mut());
        for i in 0..archive.len() {
            let entry = archive.by_index(i).map_err(archive_error(path))?;
            let name = entry.name().to_string();
            match renames.get(&name) {
                Some(new_name) => {
                    debug!(archive = %path.display(), from = %name, to = %new_name, "renaming entry");
                    writer
                        .raw_copy_file_rename(entry, new_name.as_str())
                        .map_err(archive_error(path))?;
                    renamed += 1;
                },
                None => {
                    writer.raw_copy_file(entry).map_err(archive_error(path))?;
                },
            }
        }
        writer.finish().map_err(archive_error(path))?;
    }

    let permissions = fs::metadata(path)?.permissions();
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(renamed)
}
