//! Split a word's raw payload into typed sub-entries (spec §4.E).

use byteorder::{BigEndian, ByteOrder};

use crate::error::StarDictError;
use crate::model::{DictEntry, EntryType};

/// Frames one word's payload according to the `sametypesequence` policy (or, if absent,
/// per-sub-entry type bytes).
///
/// Size-prefixed types (`W`, `P`, `X`) consume a 4-byte big-endian length then that many payload
/// bytes. All other types run to the next NUL byte — or, per the `sametypesequence` terminal-
/// omission rule, to end-of-slice if no NUL is found.
pub fn frame_entries(payload: &[u8], sametypesequence: Option<&[EntryType]>) -> Result<Vec<DictEntry>, StarDictError> {
    let mut out = Vec::new();
    let mut cursor = 0usize;
    let mut index = 0usize;

    while cursor < payload.len() {
        let entry_type = match sametypesequence {
            Some(seq) => *seq.get(index).ok_or(StarDictError::TruncatedData)?,
            None => {
                let ch = payload[cursor] as char;
                cursor += 1;
                EntryType::from_char(ch)?
            }
        };

        if entry_type.is_size_prefixed() {
            if cursor + 4 > payload.len() {
                return Err(StarDictError::TruncatedData);
            }
            let size = BigEndian::read_u32(&payload[cursor..cursor + 4]) as usize;
            cursor += 4;
            let end = cursor.checked_add(size).ok_or(StarDictError::TruncatedData)?;
            if end > payload.len() {
                return Err(StarDictError::TruncatedData);
            }
            out.push(DictEntry { entry_type, data: payload[cursor..end].to_vec() });
            cursor = end;
        } else {
            let end = payload[cursor..]
                .iter()
                .position(|&b| b == 0)
                .map(|rel| cursor + rel)
                .unwrap_or(payload.len());
            out.push(DictEntry { entry_type, data: payload[cursor..end].to_vec() });
            cursor = if end < payload.len() { end + 1 } else { end };
        }

        index += 1;
    }

    if let Some(seq) = sametypesequence {
        if out.len() != seq.len() {
            return Err(StarDictError::TruncatedData);
        }
    }

    Ok(out)
}
