use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::core::error::BodyWrite;

/// Write `bytes` to `path` through a temp file in the same directory,
/// then rename into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("Failed to write temp file for {}", path.display()))?;
    tmp.as_file().sync_all().ok();
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Write `content` unless the file already holds exactly these bytes.
pub fn write_if_changed(path: &Path, content: &str) -> Result<BodyWrite> {
    if content.is_empty() {
        return Ok(BodyWrite::NoData);
    }

    // Unreadable or missing files are simply rewritten
    if let Ok(existing) = std::fs::read(path) {
        if existing == content.as_bytes() {
            return Ok(BodyWrite::NotChanged);
        }
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(BodyWrite::Written)
}
