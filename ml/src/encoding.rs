//! Byte-to-text decoding for exports and logs
//!
//! Mapping and repository exports usually declare `encoding="Windows-1252"`
//! and session logs are written in the server's code page, so input bytes are
//! not assumed to be UTF-8.

use std::path::Path;
use std::sync::LazyLock;

use encoding_rs::{Encoding, WINDOWS_1252};
use log::{debug, warn};
use regex::bytes::Regex;

static XML_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?-u:\xEF\xBB\xBF)?\s*<\?xml[^>]*?\sencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).unwrap()
});

/// Label from the `encoding=` pseudo-attribute of an XML declaration
pub fn declared_encoding(bytes: &[u8]) -> Option<&str> {
    XML_ENCODING
        .captures(bytes)
        .and_then(|caps| caps.get(1))
        .and_then(|m| std::str::from_utf8(m.as_bytes()).ok())
}

/// Decode an XML document by its declared encoding.
///
/// Without a declaration, or with a label no encoding matches, the bytes are
/// read as UTF-8 and invalid sequences are replaced.
pub fn decode_xml(path: &Path, bytes: &[u8]) -> String {
    let label = declared_encoding(bytes);
    match label.and_then(|l| Encoding::for_label(l.as_bytes())) {
        Some(encoding) => {
            let (text, used, had_errors) = encoding.decode(bytes);
            if had_errors {
                warn!("{}: invalid {} sequences replaced", path.display(), used.name());
            }
            debug!("{}: decoded as {}", path.display(), used.name());
            text.into_owned()
        }
        None => {
            if let Some(label) = label {
                warn!("{}: unknown encoding '{}', reading as UTF-8", path.display(), label);
            }
            lossy_utf8(path, bytes)
        }
    }
}

/// Decode plain text: UTF-8 when valid, otherwise Windows-1252
pub fn decode_text(path: &Path, bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warn!("{} is not valid UTF-8, reading as windows-1252", path.display());
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

fn lossy_utf8(path: &Path, bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warn!("{} is not valid UTF-8, replacing invalid bytes", path.display());
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
