//! Single-file JSON archive: an array of `ArchiveEntry` in ascending id order.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;

use crate::core::codec::{ArchiveEntry, decode_entry, encode_entry};
use crate::core::error::SaveError;
use crate::core::record::SaveRecord;
use crate::core::selector::{IdFilter, Verdict};
use crate::infra::io;

/// Read the entries accepted by `filter`; the file is assumed id-sorted.
pub fn read(path: &Path, filter: &mut IdFilter) -> Result<Vec<SaveRecord>> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SaveError::NotFound(path.to_path_buf()).into());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let entries: Vec<ArchiveEntry> = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse archive {}", path.display()))?;

    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        match filter.check(entry.id) {
            Verdict::Take => out.push(decode_entry(entry)),
            Verdict::Skip => continue,
            Verdict::Done => break,
        }
    }
    Ok(out)
}

/// Options for archive output
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Embed metadata and body as JSON instead of LZ-string text
    pub raw_json: bool,
    /// Tab-indented output
    pub pretty: bool,
}

/// Write `records` in the given order; callers sort first.
pub fn write(path: &Path, records: &[SaveRecord], opts: WriteOptions) -> Result<()> {
    let entries: Vec<ArchiveEntry> =
        records.iter().map(|r| encode_entry(r, opts.raw_json)).collect();

    let data = if opts.pretty {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        entries.serialize(&mut ser).context("Failed to serialize archive")?;
        buf
    } else {
        serde_json::to_vec(&entries).context("Failed to serialize archive")?
    };

    io::write_atomic(path, &data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selector::{IdGenerator, Selector};
    use crate::infra::lzstring;
    use tempfile::TempDir;

    fn rec(id: usize) -> SaveRecord {
        SaveRecord {
            id,
            index: Some(format!(r#"{{"title":"slot {id}","x":[{id}]}}"#)),
            body: Some(lzstring::compress(&format!(r#"{{"n":{id}}}"#))),
            comment: if id == 2 { "keep me".into() } else { String::new() },
        }
    }

    #[test]
    fn test_round_trip_all_modes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.rpgarch");
        let records: Vec<_> = [0, 2, 5].into_iter().map(rec).collect();

        for (raw_json, pretty) in [(false, false), (true, false), (true, true)] {
            write(&path, &records, WriteOptions { raw_json, pretty }).unwrap();
            let back = read(&path, &mut IdFilter::new(IdGenerator::all())).unwrap();
            assert_eq!(back, records, "raw={raw_json} pretty={pretty}");
        }
    }

    #[test]
    fn test_pretty_uses_tabs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("p.rpgarch");
        write(&path, &[rec(1)], WriteOptions { raw_json: false, pretty: true }).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n\t{"));
    }

    #[test]
    fn test_filter_skips_without_consuming() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f.rpgarch");
        let records: Vec<_> = [1, 3, 4, 8].into_iter().map(rec).collect();
        write(&path, &records, WriteOptions::default()).unwrap();

        let mut f = IdFilter::new(Selector::parse("#2-4,8").unwrap().generator());
        let ids: Vec<_> = read(&path, &mut f).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 4, 8]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = read(&tmp.path().join("none.rpgarch"), &mut IdFilter::new(IdGenerator::all()))
            .unwrap_err();
        assert!(crate::core::error::is_not_found(&err));
    }
}
