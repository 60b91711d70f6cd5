//! Parse `.idx` / `.idx.gz` files into a sequence of [`IdxEntry`] records (spec §4.C, §6.2).

use std::fs;
use std::io::Read;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use flate2::read::GzDecoder;

use crate::error::StarDictError;
use crate::model::{IdxEntry, OffsetBits};

/// A historically shipped dictionary ("mueller") carries a four-byte prologue before its first
/// record. It is skipped, and only checked, at position zero.
const MUELLER_PROLOGUE: [u8; 4] = [0x00, 0x00, 0xB4, 0x97];

/// Reads an `.idx` or `.idx.gz` file (distinguished by its `.gz` suffix) and parses its records.
pub fn read_indexes(path: impl AsRef<Path>, offset_bits: OffsetBits) -> Result<Vec<IdxEntry>, StarDictError> {
    let path = path.as_ref();
    let raw = fs::read(path)?;
    let bytes = if path.to_string_lossy().ends_with(".gz") {
        let mut decoder = GzDecoder::new(raw.as_slice());
        let mut out = Vec::new();
        decoder.read_to_end(&mut out)?;
        out
    } else {
        raw
    };
    Ok(parse_index(&bytes, offset_bits))
}

/// Parses an in-memory, already-decompressed `.idx` byte sequence.
///
/// Stops cleanly (no error) as soon as fewer than one full record remains, per spec §8's boundary
/// behavior for truncated tails.
pub fn parse_index(bytes: &[u8], offset_bits: OffsetBits) -> Vec<IdxEntry> {
    let suffix_len = offset_bits.bytes() + 4;
    let mut cursor = 0usize;
    if bytes.len() >= 4 && bytes[0..4] == MUELLER_PROLOGUE {
        cursor = 4;
    }

    let mut out = Vec::new();
    loop {
        let Some(nul_rel) = bytes[cursor..].iter().position(|&b| b == 0) else {
            break;
        };
        let word_end = cursor + nul_rel;
        let suffix_start = word_end + 1;
        let suffix_end = suffix_start + suffix_len;
        if suffix_end > bytes.len() {
            break;
        }
        let Ok(word) = std::str::from_utf8(&bytes[cursor..word_end]) else {
            break;
        };
        let (offset, size) = if offset_bits.bytes() == 8 {
            let offset = BigEndian::read_u64(&bytes[suffix_start..suffix_start + 8]);
            let size = BigEndian::read_u32(&bytes[suffix_start + 8..suffix_end]);
            (offset, size)
        } else {
            let offset = BigEndian::read_u32(&bytes[suffix_start..suffix_start + 4]) as u64;
            let size = BigEndian::read_u32(&bytes[suffix_start + 4..suffix_end]);
            (offset, size)
        };
        out.push(IdxEntry { word: word.to_string(), offset, size });
        cursor = suffix_end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record32(word: &str, offset: u32, size: u32) -> Vec<u8> {
        let mut out = word.as_bytes().to_vec();
        out.push(0);
        out.extend_from_slice(&offset.to_be_bytes());
        out.extend_from_slice(&size.to_be_bytes());
        out
    }

    #[test]
    fn single_record_32bit() {
        let bytes = record32("cat", 0, 5);
        let entries = parse_index(&bytes, OffsetBits::Bits32);
        assert_eq!(entries, vec![IdxEntry { word: "cat".into(), offset: 0, size: 5 }]);
    }

    #[test]
    fn mueller_prologue_is_skipped_only_at_position_zero() {
        let mut bytes = MUELLER_PROLOGUE.to_vec();
        bytes.extend(record32("dog", 0, 7));
        let entries = parse_index(&bytes, OffsetBits::Bits32);
        assert_eq!(entries, vec![IdxEntry { word: "dog".into(), offset: 0, size: 7 }]);
    }

    #[test]
    fn two_records_parsed_in_order() {
        let mut bytes = record32("ant", 0, 3);
        bytes.extend(record32("bee", 3, 4));
        let entries = parse_index(&bytes, OffsetBits::Bits32);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].word, "ant");
        assert_eq!(entries[1].word, "bee");
    }

    #[test]
    fn truncated_tail_terminates_cleanly() {
        let mut bytes = record32("ant", 0, 3);
        bytes.extend_from_slice(b"bee\0\x00\x00"); // short of offset+size bytes
        let entries = parse_index(&bytes, OffsetBits::Bits32);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "ant");
    }

    #[test]
    fn sixty_four_bit_offsets() {
        let mut bytes = b"whale\0".to_vec();
        bytes.extend_from_slice(&42u64.to_be_bytes());
        bytes.extend_from_slice(&9u32.to_be_bytes());
        let entries = parse_index(&bytes, OffsetBits::Bits64);
        assert_eq!(entries, vec![IdxEntry { word: "whale".into(), offset: 42, size: 9 }]);
    }
}
