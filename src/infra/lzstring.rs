//! Boundary to the LZ-string codec used by RPG Maker MV save files.
//!
//! Save files hold base64 LZ-string text. Everything here is UTF-16 under
//! the hood; callers only ever see `String`.

use anyhow::{Context, Result, anyhow};
use std::path::Path;

/// Compress text to LZ-string base64
pub fn compress(text: &str) -> String {
    lz_str::compress_to_base64(text)
}

/// Decompress LZ-string base64 back to text
pub fn decompress(encoded: &str) -> Result<String> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(String::new());
    }
    let wide = lz_str::decompress_from_base64(encoded)
        .ok_or_else(|| anyhow!("malformed lz-string data"))?;
    String::from_utf16(&wide).context("decompressed data is not valid UTF-16")
}

/// Read a whole file and decompress it
pub fn read_lzstring_file(path: &Path) -> Result<String> {
    let encoded = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    decompress(&encoded).with_context(|| format!("Failed to decode {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_decompress_json() {
        let text = r#"{"title":"Hero's Quest","gold":1200,"mapname":"Town"}"#;
        let enc = compress(text);
        assert_ne!(enc, text);
        assert_eq!(decompress(&enc).unwrap(), text);
    }

    #[test]
    fn test_empty_input_is_empty_text() {
        assert_eq!(decompress("").unwrap(), "");
        assert_eq!(decompress("  \n").unwrap(), "");
    }

    #[test]
    fn test_read_file_reports_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("nope.rpgsave");
        let err = read_lzstring_file(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("nope.rpgsave"));
    }
}
