//! Save records and the display-only view of their metadata.

use chrono::{DateTime, Local, TimeZone};
use serde::Deserialize;

/// One save slot.
///
/// `index` is the slot's entry from `global.rpgsave` as raw JSON text and
/// `body` is the LZ-string text of `file<ID>.rpgsave`. Both are carried
/// verbatim; only `id` and `comment` ever change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveRecord {
    pub id: usize,
    pub index: Option<String>,
    pub body: Option<String>,
    pub comment: String,
}

impl SaveRecord {
    /// Lossy decode of the metadata for listings
    pub fn summary(&self) -> Option<IndexSummary> {
        let raw = self.index.as_deref()?;
        serde_json::from_str(raw).ok()
    }
}

/// Fields of a `global.rpgsave` entry that listings show.
///
/// Never serialized back; unknown fields are dropped here on purpose.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndexSummary {
    pub title: String,
    pub characters: Vec<serde_json::Value>,
    pub playtime: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    #[serde(rename = "mapname")]
    pub map_name: String,
    pub gold: i64,
}

impl IndexSummary {
    pub fn saved_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.timestamp).single()
    }

    /// "HH:MM:SS" becomes "HH:MM"; anything else passes through
    pub fn playtime_minutes(&self) -> &str {
        match self.playtime.len() {
            8 => self.playtime.get(..5).unwrap_or(&self.playtime),
            _ => &self.playtime,
        }
    }
}
