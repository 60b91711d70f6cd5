//! Parse the dictzip (gzip + `RA` extra field) header of a `.dict.dz` file (spec §4.D).

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use rassert_rs::rassert;

use crate::error::StarDictError;
use crate::model::{DzHeader, GzipFlags, OperatingSystemType, RandomAccessInfo};

/// Parses the leading dictzip header from `reader`, leaving the stream positioned at
/// `header_length` (the first byte of the raw DEFLATE stream) on success.
pub fn read_dz_header<R: Read + Seek>(reader: &mut R) -> Result<DzHeader, StarDictError> {
    let mut magic = [0u8; 2];
    reader.read_exact(&mut magic)?;
    rassert!(magic == [0x1F, 0x8B], StarDictError::BadMagic);

    let compression_method = reader.read_u8()?;
    let flags = GzipFlags::from_byte(reader.read_u8()?);
    let modify_time = reader.read_u32::<LittleEndian>()?;
    let extra_flags = reader.read_u8()?;
    let operating_system_type = OperatingSystemType::from_byte(reader.read_u8()?);

    let mut consumed: u64 = 10;

    let random_access_info = if flags.extra {
        let xsize = reader.read_u16::<LittleEndian>()?;
        consumed += 2 + xsize as u64;
        let mut extra = vec![0u8; xsize as usize];
        reader.read_exact(&mut extra)?;
        parse_extra_fields(&extra)?
    } else {
        None
    };

    let original_file_name = if flags.name {
        Some(read_latin1_cstring(reader, &mut consumed)?)
    } else {
        None
    };

    let comment = if flags.comment {
        Some(read_latin1_cstring(reader, &mut consumed)?)
    } else {
        None
    };

    let crc16_value = if flags.hcrc {
        consumed += 2;
        Some(reader.read_u16::<LittleEndian>()?)
    } else {
        None
    };

    let header_length = consumed;
    reader.seek(SeekFrom::Start(header_length))?;

    Ok(DzHeader {
        compression_method,
        flags,
        modify_time,
        extra_flags,
        operating_system_type,
        random_access_info,
        original_file_name,
        comment,
        crc16_value,
        header_length,
    })
}

/// Walks the gzip FEXTRA subfields, interpreting only the `RA` tag; everything else is skipped
/// byte-wise (spec §4.D, §7: unknown extra tags are a non-fatal anomaly, not an error).
fn parse_extra_fields(extra: &[u8]) -> Result<Option<RandomAccessInfo>, StarDictError> {
    let mut pos = 0usize;
    let mut ra = None;
    while pos + 4 <= extra.len() {
        let tag = &extra[pos..pos + 2];
        let len = u16::from_le_bytes([extra[pos + 2], extra[pos + 3]]) as usize;
        let body_start = pos + 4;
        let body_end = body_start + len;
        if body_end > extra.len() {
            break;
        }
        if tag == b"RA" {
            ra = Some(parse_ra_subfield(&extra[body_start..body_end])?);
        }
        pos = body_end;
    }
    Ok(ra)
}

fn parse_ra_subfield(body: &[u8]) -> Result<RandomAccessInfo, StarDictError> {
    rassert!(body.len() >= 6, StarDictError::TruncatedData);
    let version = u16::from_le_bytes([body[0], body[1]]);
    rassert!(version == 1, StarDictError::BadRandomAccessVersion);
    let chunk_size = u16::from_le_bytes([body[2], body[3]]);
    let chunk_count = u16::from_le_bytes([body[4], body[5]]) as usize;
    rassert!(body.len() >= 6 + chunk_count * 2, StarDictError::TruncatedData);

    let mut compressed_chunk_lengths = Vec::with_capacity(chunk_count);
    for i in 0..chunk_count {
        let at = 6 + i * 2;
        compressed_chunk_lengths.push(u16::from_le_bytes([body[at], body[at + 1]]));
    }

    Ok(RandomAccessInfo { chunk_size, compressed_chunk_lengths })
}

fn read_latin1_cstring<R: Read>(reader: &mut R, consumed: &mut u64) -> Result<String, StarDictError> {
    let mut bytes = Vec::new();
    loop {
        let b = reader.read_u8()?;
        *consumed += 1;
        if b == 0 {
            break;
        }
        bytes.push(b);
    }
    // ISO-8859-1 maps byte values 0..=255 directly onto the same Unicode code points.
    Ok(bytes.into_iter().map(|b| b as char).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn minimal_header_with_ra(chunk_size: u16, compressed_lens: &[u16]) -> Vec<u8> {
        let mut ra = Vec::new();
        ra.extend_from_slice(b"RA");
        let subfield_len = 6 + compressed_lens.len() * 2;
        ra.extend_from_slice(&(subfield_len as u16).to_le_bytes());
        ra.extend_from_slice(&1u16.to_le_bytes()); // version
        ra.extend_from_slice(&chunk_size.to_le_bytes());
        ra.extend_from_slice(&(compressed_lens.len() as u16).to_le_bytes());
        for len in compressed_lens {
            ra.extend_from_slice(&len.to_le_bytes());
        }

        let mut header = Vec::new();
        header.extend_from_slice(&[0x1F, 0x8B]); // magic
        header.push(8); // compression method (deflate)
        header.push(0x04); // flags: EXTRA
        header.extend_from_slice(&0u32.to_le_bytes()); // mtime
        header.push(2); // extra flags
        header.push(3); // OS: unix
        header.extend_from_slice(&(ra.len() as u16).to_le_bytes()); // xsize
        header.extend_from_slice(&ra);
        header
    }

    #[test]
    fn parses_ra_table_and_header_length() {
        let bytes = minimal_header_with_ra(0x8000, &[100]);
        let xsize = bytes.len() - 12;
        let mut cursor = Cursor::new(bytes);
        let header = read_dz_header(&mut cursor).unwrap();
        assert_eq!(header.header_length, (12 + xsize) as u64);
        let ra = header.random_access_info.unwrap();
        assert_eq!(ra.chunk_size, 0x8000);
        assert_eq!(ra.compressed_chunk_lengths, vec![100]);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut cursor = Cursor::new(vec![0x1F, 0x8C, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(matches!(read_dz_header(&mut cursor), Err(StarDictError::BadMagic)));
    }

    #[test]
    fn bad_random_access_version_is_rejected() {
        let mut bytes = minimal_header_with_ra(10, &[5]);
        // RA subfield version lives right after the 4-byte tag+len, at offset 12+4.
        let ra_version_pos = 12 + 4;
        bytes[ra_version_pos] = 9;
        bytes[ra_version_pos + 1] = 0;
        let mut cursor = Cursor::new(bytes);
        assert!(matches!(read_dz_header(&mut cursor), Err(StarDictError::BadRandomAccessVersion)));
    }

    #[test]
    fn name_and_comment_flags_are_consumed() {
        let mut header = Vec::new();
        header.extend_from_slice(&[0x1F, 0x8B]);
        header.push(8);
        header.push(0x08 | 0x10); // NAME | COMMENT
        header.extend_from_slice(&0u32.to_le_bytes());
        header.push(0);
        header.push(3);
        header.extend_from_slice(b"name\0");
        header.extend_from_slice(b"a comment\0");
        header.extend_from_slice(b"payload-follows");

        let mut cursor = Cursor::new(header);
        let parsed = read_dz_header(&mut cursor).unwrap();
        assert_eq!(parsed.original_file_name.as_deref(), Some("name"));
        assert_eq!(parsed.comment.as_deref(), Some("a comment"));
        assert!(parsed.random_access_info.is_none());

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"payload-follows");
    }

    #[test]
    fn unknown_extra_tag_is_skipped_not_errored() {
        let mut extra = Vec::new();
        extra.extend_from_slice(b"ZZ");
        extra.extend_from_slice(&4u16.to_le_bytes());
        extra.extend_from_slice(&[1, 2, 3, 4]);

        let mut header = Vec::new();
        header.extend_from_slice(&[0x1F, 0x8B]);
        header.push(8);
        header.push(0x04);
        header.extend_from_slice(&0u32.to_le_bytes());
        header.push(0);
        header.push(3);
        header.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        header.extend_from_slice(&extra);

        let mut cursor = Cursor::new(header);
        let parsed = read_dz_header(&mut cursor).unwrap();
        assert!(parsed.random_access_info.is_none());
    }
}
