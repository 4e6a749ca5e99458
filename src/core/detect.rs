//! Classify a path as a native save directory or a single-file archive.

use anyhow::{Context, Result};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

/// Index file of a native save directory
pub const INDEX_FILE: &str = "global.rpgsave";

/// Extension tried for bare archive names
pub const ARCHIVE_EXT: &str = "rpgarch";

/// Per-slot body file inside a native save directory
pub fn body_file_name(id: usize) -> String {
    format!("file{id}.rpgsave")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// Directory with `global.rpgsave` and `file<ID>.rpgsave`
    Native,
    /// One JSON file holding every slot
    Archive,
}

/// Resolved on-disk location of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Directory for native, file for archive
    pub path: PathBuf,
    pub format: SaveFormat,
}

impl Location {
    fn native(path: &Path) -> Self {
        Self { path: clean_dir(path), format: SaveFormat::Native }
    }

    fn archive(path: PathBuf) -> Self {
        Self { path, format: SaveFormat::Archive }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            SaveFormat::Native => write!(f, "{}{}", self.path.display(), MAIN_SEPARATOR),
            SaveFormat::Archive => write!(f, "{}", self.path.display()),
        }
    }
}

/// Work out which store backs `input`.
///
/// Rules, first match wins: trailing separator means a directory; a missing
/// bare name gets `.rpgarch` appended when `default_ext` is on; nothing on
/// disk means a new archive; an existing directory or a path naming
/// `global.rpgsave` means native; anything else is an archive.
pub fn detect(input: &str, default_ext: bool) -> Result<Location> {
    let input = if input.is_empty() { "." } else { input };
    let mut path = PathBuf::from(input);

    if input.ends_with('/') || input.ends_with(MAIN_SEPARATOR) || path.file_name().is_none() {
        return Ok(Location::native(&path));
    }

    let mut meta = stat(&path)?;
    if meta.is_none() && default_ext && path.extension().is_none() {
        let mut extended = path.clone().into_os_string();
        extended.push(".");
        extended.push(ARCHIVE_EXT);
        path = PathBuf::from(extended);
        meta = stat(&path)?;
    }

    let Some(meta) = meta else {
        return Ok(Location::archive(path));
    };

    if meta.is_dir() {
        return Ok(Location::native(&path));
    }

    if path.file_name().is_some_and(|n| n == INDEX_FILE) {
        let dir = path.parent().unwrap_or(Path::new("."));
        return Ok(Location::native(dir));
    }

    Ok(Location::archive(path))
}

fn stat(path: &Path) -> Result<Option<std::fs::Metadata>> {
    match std::fs::metadata(path) {
        Ok(m) => Ok(Some(m)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to stat {}", path.display())),
    }
}

/// Drop `.` components and trailing separators; empty becomes "."
fn clean_dir(path: &Path) -> PathBuf {
    let out: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if out.as_os_str().is_empty() { PathBuf::from(".") } else { out }
}
