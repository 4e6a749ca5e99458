//! RPG Maker MV save directory: `global.rpgsave` plus `file<ID>.rpgsave`.
//!
//! The index is LZ-string compressed JSON: an array where position = slot id
//! and unused positions are `null`. Entries are kept as raw JSON text and
//! written back verbatim.

use anyhow::{Context, Result};
use serde_json::value::RawValue;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, trace};

use crate::core::detect::{INDEX_FILE, body_file_name};
use crate::core::error::{BodyWrite, SaveError};
use crate::core::record::SaveRecord;
use crate::core::selector::{IdFilter, Verdict};
use crate::infra::{io, lzstring};

/// Read index entries accepted by `filter`, and their bodies unless `index_only`.
pub fn read(dir: &Path, filter: &mut IdFilter, index_only: bool) -> Result<Vec<SaveRecord>> {
    let index_path = dir.join(INDEX_FILE);
    if !index_path.is_file() {
        return Err(SaveError::NotFound(index_path).into());
    }

    let text = lzstring::read_lzstring_file(&index_path)?;
    let slots: Vec<Box<RawValue>> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", index_path.display()))?;

    let mut out = Vec::new();
    for (id, raw) in slots.iter().enumerate() {
        if raw.get() == "null" {
            continue;
        }
        match filter.check(id) {
            Verdict::Take => {}
            Verdict::Skip => continue,
            Verdict::Done => break,
        }
        // Only objects are slots; anything else is junk left by the game
        if serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw.get()).is_err() {
            debug!(id, "skipping unparseable index entry");
            continue;
        }
        out.push(SaveRecord {
            id,
            index: Some(raw.get().to_string()),
            ..Default::default()
        });
    }

    if !index_only {
        for rec in &mut out {
            let path = dir.join(body_file_name(rec.id));
            match fs::read_to_string(&path) {
                Ok(body) if !body.is_empty() => rec.body = Some(body),
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(id = rec.id, "no body file");
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to read {}", path.display()));
                }
            }
        }
    }

    Ok(out)
}

/// Serialize the positional index for `records`; nulls pad the gaps.
pub fn build_index(records: &[SaveRecord]) -> String {
    let mut sorted: Vec<&SaveRecord> = records.iter().filter(|r| r.index.is_some()).collect();
    sorted.sort_by_key(|r| r.id);

    let mut out = String::from("[");
    let mut next = 0usize;
    for rec in sorted {
        // Duplicate ids would shift every later slot; first one wins
        if rec.id < next {
            continue;
        }
        while next < rec.id {
            if next > 0 {
                out.push(',');
            }
            out.push_str("null");
            next += 1;
        }
        if next > 0 {
            out.push(',');
        }
        out.push_str(rec.index.as_deref().unwrap_or("null"));
        next += 1;
    }
    out.push(']');
    out
}

/// Rewrite the index, then each body file whose content changed.
pub fn write(dir: &Path, records: &[SaveRecord]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let index = lzstring::compress(&build_index(records));
    io::write_atomic(&dir.join(INDEX_FILE), index.as_bytes())?;

    for rec in records {
        let path = dir.join(body_file_name(rec.id));
        match io::write_if_changed(&path, rec.body.as_deref().unwrap_or(""))? {
            BodyWrite::Written => trace!(id = rec.id, "body written"),
            BodyWrite::NotChanged => debug!(id = rec.id, "not changed"),
            BodyWrite::NoData => debug!(id = rec.id, "no body to write"),
        }
    }

    Ok(())
}
