//! Shared test utilities for integration tests
//!
//! Builds native save directories and archives on disk and reads
//! them back through the library so assertions stay format-agnostic.

#![allow(dead_code)]

use std::path::Path;

use rpgarch::core::archive::{self, WriteOptions};
use rpgarch::core::prompt::OverwritePrompt;
use rpgarch::core::{Collection, Payload, SaveRecord, Scope};
use rpgarch::infra::lzstring;
use rpgarch::Settings;

/// Index entry JSON for slot `id`; spacing is deliberately irregular so
/// byte-exact preservation is observable
pub fn index_json(id: usize) -> String
{
    format!(
        r#"{{"globalId":"RPGMV","title":"Quest","characters":[[],[]],"faces":[],"playtime":"01:02:03","timestamp":1600000000000,"mapname":"Town {id}", "gold" : {g}}}"#,
        g = id * 100
    )
}

/// Plain body JSON for slot `id`
pub fn body_json(id: usize) -> String
{
    format!(r#"{{"slot":{id},"party":["hero"]}}"#)
}

/// Record as it would be read from a native directory
pub fn record(id: usize) -> SaveRecord
{
    SaveRecord {
        id,
        index: Some(index_json(id)),
        body: Some(lzstring::compress(&body_json(id))),
        comment: String::new(),
    }
}

/// Write `global.rpgsave` and one body file per id into `dir`
pub fn make_native(
    dir: &Path,
    ids: &[usize],
)
{
    std::fs::create_dir_all(dir).expect("create save dir");

    // Positional array; unused slots are null
    let max = ids.iter().copied().max().unwrap_or(0);
    let slots: Vec<String> = (0..=max)
        .map(|i| if ids.contains(&i) { index_json(i) } else { "null".to_string() })
        .collect();
    let index = if ids.is_empty() { "[]".to_string() } else { format!("[{}]", slots.join(",")) };

    std::fs::write(dir.join("global.rpgsave"), lzstring::compress(&index)).expect("write index");

    for &id in ids
    {
        std::fs::write(
            dir.join(format!("file{id}.rpgsave")),
            lzstring::compress(&body_json(id)),
        )
        .expect("write body");
    }
}

/// Write an archive holding `ids` in compressed form
pub fn make_archive(
    path: &Path,
    ids: &[usize],
)
{
    let records: Vec<SaveRecord> = ids.iter().map(|&id| record(id)).collect();
    archive::write(path, &records, WriteOptions::default()).expect("write archive");
}

/// Every record stored at `path`
pub fn read_all(path: &Path) -> Vec<SaveRecord>
{
    let mut coll = Collection::parse(&path.to_string_lossy()).expect("parse path");
    coll.read(Scope::All, Payload::Full, &quiet())
        .expect("read collection")
}

/// Ids stored at `path`, ascending
pub fn ids_at(path: &Path) -> Vec<usize>
{
    read_all(path)
        .iter()
        .map(|r| r.id)
        .collect()
}

/// Decompressed body of slot `id` at `path`
pub fn body_at(
    path: &Path,
    id: usize,
) -> Option<String>
{
    read_all(path)
        .into_iter()
        .find(|r| r.id == id)
        .and_then(|r| r.body)
        .map(|b| lzstring::decompress(&b).expect("decompress body"))
}

/// Settings with reporting off
pub fn quiet() -> Settings
{
    Settings { verbose: false, ..Settings::default() }
}

/// Scripted overwrite answers; counts how often it was asked
#[derive(Debug, Default)]
pub struct Answer
{
    pub yes: bool,
    pub asked: usize,
}

impl OverwritePrompt for Answer
{
    fn confirm(
        &mut self,
        _question: &str,
        _default: bool,
    ) -> bool
    {
        self.asked += 1;
        self.yes
    }
}
