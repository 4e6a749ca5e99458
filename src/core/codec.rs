//! JSON shape of one archive slot and conversion to/from `SaveRecord`.
//!
//! Metadata and body each appear in one of two forms: LZ-string text
//! (`index`, `saveData`) or embedded JSON (`indexJson`, `saveJson`).
//! Embedded JSON is kept as `RawValue` so unknown fields survive untouched.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::warn;

use crate::core::record::SaveRecord;
use crate::infra::lzstring;

/// One element of the archive's top-level array
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    pub id: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_json: Option<Box<RawValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_json: Option<Box<RawValue>>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// Build the archive form of a record; `raw_json` embeds decoded JSON.
pub fn encode_entry(rec: &SaveRecord, raw_json: bool) -> ArchiveEntry {
    let mut entry = ArchiveEntry {
        id: rec.id,
        index: None,
        index_json: None,
        save_data: None,
        save_json: None,
        comment: rec.comment.clone(),
    };

    if raw_json {
        entry.index_json = rec.index.as_deref().and_then(|s| embed(rec.id, "index", s));
        entry.save_json = rec.body.as_deref().and_then(|b| {
            lzstring::decompress(b)
                .ok()
                .and_then(|text| embed(rec.id, "save", &text))
        });
        // Payloads that are not JSON stay compressed
        if entry.index_json.is_none() {
            entry.index = rec.index.as_deref().map(lzstring::compress);
        }
        if entry.save_json.is_none() {
            entry.save_data = rec.body.clone();
        }
    } else {
        entry.index = rec.index.as_deref().map(lzstring::compress);
        entry.save_data = rec.body.clone();
    }

    entry
}

fn embed(id: usize, what: &str, text: &str) -> Option<Box<RawValue>> {
    match RawValue::from_string(text.to_string()) {
        Ok(raw) => Some(raw),
        Err(e) => {
            warn!(id, what, error = %e, "payload is not JSON; keeping compressed form");
            None
        }
    }
}

/// Turn an archive slot back into a record; embedded JSON wins over text.
pub fn decode_entry(entry: ArchiveEntry) -> SaveRecord {
    let index = match (entry.index_json, entry.index) {
        (Some(raw), _) => Some(raw.get().to_string()),
        (None, Some(enc)) if !enc.is_empty() => lzstring::decompress(&enc)
            .ok()
            .filter(|s| !s.is_empty()),
        _ => None,
    };

    let body = match (entry.save_json, entry.save_data) {
        (Some(raw), _) => Some(lzstring::compress(raw.get())),
        (None, Some(data)) if !data.is_empty() => Some(data),
        _ => None,
    };

    SaveRecord { id: entry.id, index, body, comment: entry.comment }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"{"title":"Quest","unknown":{"keep":[1,2,3]},"gold":7}"#;
    const BODY_JSON: &str = r#"{"party":{"_actors":[1,2]},"map":{"_mapId":3}}"#;

    fn record() -> SaveRecord {
        SaveRecord {
            id: 4,
            index: Some(INDEX.to_string()),
            body: Some(lzstring::compress(BODY_JSON)),
            comment: "before boss".to_string(),
        }
    }

    #[test]
    fn test_compressed_form_round_trips() {
        let entry = encode_entry(&record(), false);
        assert!(entry.index_json.is_none());
        assert!(entry.save_json.is_none());
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""saveData""#));

        let back = decode_entry(serde_json::from_str(&json).unwrap());
        assert_eq!(back, record());
    }

    #[test]
    fn test_raw_form_embeds_exact_metadata() {
        let entry = encode_entry(&record(), true);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(INDEX));
        assert!(json.contains(BODY_JSON));
        assert!(!json.contains(r#""index":"#));

        let back = decode_entry(serde_json::from_str(&json).unwrap());
        assert_eq!(back.index.as_deref(), Some(INDEX));
        assert_eq!(lzstring::decompress(back.body.as_deref().unwrap()).unwrap(), BODY_JSON);
    }

    #[test]
    fn test_raw_form_preferred_on_read() {
        let json = format!(
            r#"{{"id":1,"index":"{}","indexJson":{}}}"#,
            lzstring::compress(r#"{"title":"stale"}"#),
            r#"{"title":"fresh"}"#
        );
        let rec = decode_entry(serde_json::from_str(&json).unwrap());
        assert_eq!(rec.index.as_deref(), Some(r#"{"title":"fresh"}"#));
    }

    #[test]
    fn test_metadata_only_entry() {
        let rec = SaveRecord { id: 2, index: Some("{}".into()), ..Default::default() };
        let json = serde_json::to_string(&encode_entry(&rec, false)).unwrap();
        assert!(!json.contains("saveData"));
        assert!(!json.contains("comment"));
        assert_eq!(decode_entry(serde_json::from_str(&json).unwrap()), rec);
    }
}
