//! IDL documents from text, local files, or raw IDL account data

use std::io::Read;
use std::path::Path;

use flate2::read::{DeflateDecoder, ZlibDecoder};
use log::debug;
use serde_json::Value;
use solana_sdk::pubkey::Pubkey;

use super::legacy::reject_legacy;
use super::trial::payload;
use super::types::Idl;
use crate::error::{IdlCodecError, IdlCodecResult, ParseError};

pub const IDL_SEED: &str = "anchor:idl";

const DISCRIMINATOR_SIZE: usize = 8;
const AUTHORITY_SIZE: usize = 32;
const DATA_LEN_SIZE: usize = 4;
const DATA_LEN_OFFSET: usize = DISCRIMINATOR_SIZE + AUTHORITY_SIZE;
const HEADER_SIZE: usize = DATA_LEN_OFFSET + DATA_LEN_SIZE;

/// Parse an IDL JSON document.
///
/// Legacy documents are rejected before any structural parsing. A document
/// that is not a JSON object fails with `UnknownShape`.
pub fn parse_idl(json: &str) -> IdlCodecResult<Idl> {
    reject_legacy(json)?;

    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(ParseError::UnknownShape {
            payload: payload(&value),
        }
        .into());
    }

    let idl: Idl = serde_json::from_value(value)?;
    debug!(
        "Parsed IDL `{}`: {} instructions, {} accounts, {} events, {} types",
        idl.metadata.name,
        idl.instructions.len(),
        idl.accounts.len(),
        idl.events.len(),
        idl.types.len()
    );
    Ok(idl)
}

/// Load IDL from a local JSON file.
pub fn load_idl_from_file(path: impl AsRef<Path>) -> IdlCodecResult<Idl> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(IdlCodecError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    parse_idl(&contents)
}

/// Parse IDL from the raw data of an on-chain IDL account.
///
/// Layout: 8-byte discriminator, 32-byte authority, u32 LE payload length,
/// then zlib (or raw deflate) compressed JSON.
pub fn idl_from_account_data(data: &[u8]) -> IdlCodecResult<Idl> {
    if data.len() < HEADER_SIZE {
        return Err(IdlCodecError::Decompression(
            "Account data too small for IDL header".to_string(),
        ));
    }

    let data_len_bytes: [u8; 4] = data[DATA_LEN_OFFSET..HEADER_SIZE]
        .try_into()
        .map_err(|_| IdlCodecError::Decompression("Failed to read data_len".to_string()))?;
    let data_len = u32::from_le_bytes(data_len_bytes) as usize;

    if data_len == 0 {
        return Err(IdlCodecError::Decompression(
            "IDL compressed data is empty".to_string(),
        ));
    }

    if data.len() < HEADER_SIZE + data_len {
        return Err(IdlCodecError::Decompression(format!(
            "Compressed data truncated: expected {} bytes, got {}",
            data_len,
            data.len() - HEADER_SIZE
        )));
    }

    let compressed = &data[HEADER_SIZE..HEADER_SIZE + data_len];
    let json_bytes = decompress_idl_data(compressed)?;

    let json_str = std::str::from_utf8(&json_bytes)
        .map_err(|_| IdlCodecError::Decompression("Invalid UTF-8".to_string()))?;

    parse_idl(json_str)
}

/// Derive the IDL account address for a program.
pub fn idl_address(program_id: &Pubkey) -> IdlCodecResult<Pubkey> {
    let (program_signer, _bump) = Pubkey::find_program_address(&[], program_id);

    Pubkey::create_with_seed(&program_signer, IDL_SEED, program_id)
        .map_err(|e| IdlCodecError::InvalidProgramId(e.to_string()))
}

fn decompress_idl_data(compressed: &[u8]) -> IdlCodecResult<Vec<u8>> {
    if let Ok(bytes) = decompress_zlib(compressed) {
        return Ok(bytes);
    }

    if let Ok(bytes) = decompress_deflate(compressed) {
        return Ok(bytes);
    }

    Err(IdlCodecError::Decompression(
        "Failed to decompress IDL data".to_string(),
    ))
}

fn decompress_zlib(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn decompress_deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    const MINIMAL: &str = r#"{
        "address": "11111111111111111111111111111111",
        "metadata": {"name": "minimal", "version": "0.1.0", "spec": "0.1.0"},
        "instructions": []
    }"#;

    #[test]
    fn test_parse_minimal() {
        let idl = parse_idl(MINIMAL).unwrap();
        assert_eq!(idl.metadata.name, "minimal");
        assert!(idl.types.is_empty());
    }

    #[test]
    fn test_non_object_is_unknown_shape() {
        let err = parse_idl("[1, 2, 3]").unwrap_err();
        assert!(matches!(
            err,
            IdlCodecError::Parse(ParseError::UnknownShape { ref payload }) if payload == "[1,2,3]"
        ));
    }

    #[test]
    fn test_legacy_rejected_before_parsing() {
        let err = parse_idl(r#"{"version": "0.1.0", "name": "old", "instructions": []}"#)
            .unwrap_err();
        assert!(matches!(err, IdlCodecError::LegacyFormat { .. }));
    }

    #[test]
    fn test_idl_from_account_data() {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(MINIMAL.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut data = vec![0u8; HEADER_SIZE];
        data[DATA_LEN_OFFSET..HEADER_SIZE]
            .copy_from_slice(&(compressed.len() as u32).to_le_bytes());
        data.extend_from_slice(&compressed);
        data.extend_from_slice(&[0u8; 16]);

        let idl = idl_from_account_data(&data).unwrap();
        assert_eq!(idl.metadata.name, "minimal");
    }

    #[test]
    fn test_idl_from_account_data_truncated() {
        let mut data = vec![0u8; HEADER_SIZE];
        data[DATA_LEN_OFFSET..HEADER_SIZE].copy_from_slice(&100u32.to_le_bytes());
        assert!(matches!(
            idl_from_account_data(&data),
            Err(IdlCodecError::Decompression(_))
        ));
    }

    #[test]
    fn test_idl_address_deterministic() {
        let program_id: Pubkey = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4"
            .parse()
            .unwrap();

        let addr1 = idl_address(&program_id).unwrap();
        let addr2 = idl_address(&program_id).unwrap();

        assert_eq!(addr1, addr2);
        assert_ne!(addr1, program_id);
    }

    #[test]
    fn test_header_constants() {
        assert_eq!(DATA_LEN_OFFSET, 40);
        assert_eq!(HEADER_SIZE, 44);
    }
}
