//! Legacy Anchor IDL format detection (pre-0.30)
//!
//! Legacy documents describe accounts with `isMut`/`isSigner` and older
//! envelopes open with a `version` key. Both are rejected before structural
//! parsing so the user gets a conversion hint instead of a shape error.

use crate::error::IdlCodecError;

/// Keys only the legacy instruction account shape carries
const LEGACY_ACCOUNT_KEYS: [&str; 2] = ["\"isMut\"", "\"isSigner\""];

/// Opening of a legacy envelope, whitespace removed
const LEGACY_ENVELOPE_PREFIX: &str = "{\"version\":";

/// Return the marker that identifies `json` as a legacy IDL, if any
pub fn legacy_marker(json: &str) -> Option<&'static str> {
    if let Some(key) = LEGACY_ACCOUNT_KEYS.iter().find(|key| json.contains(**key)) {
        return Some(if key.contains("isMut") {
            "isMut"
        } else {
            "isSigner"
        });
    }

    let head: String = json
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(LEGACY_ENVELOPE_PREFIX.len())
        .collect();

    if head == LEGACY_ENVELOPE_PREFIX {
        return Some("version envelope");
    }

    None
}

/// Fail with `LegacyFormat` when `json` is a legacy IDL
pub fn reject_legacy(json: &str) -> Result<(), IdlCodecError> {
    match legacy_marker(json) {
        Some(marker) => Err(IdlCodecError::LegacyFormat { marker }),
        None => Ok(()),
    }
}
