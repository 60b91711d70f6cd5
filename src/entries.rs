//! Stream or materialize per-word payloads from `.dict`/`.dict.dz` (spec §4.F).

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use flate2::Decompress;

use crate::dictzip::read_dz_header;
use crate::error::StarDictError;
use crate::framer::frame_entries;
use crate::model::{DictEntry, EntryType, IdxEntry};

/// Default batch size: number of index entries coalesced per streaming read (spec §5).
pub const DEFAULT_BATCH_SIZE: usize = 1000;
/// Default input buffer size, in bytes (spec §5).
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024 * 1024;

fn is_dz(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".dz")
}

/// Opens `path` and returns a boxed reader positioned at the start of the logical (uncompressed)
/// byte stream: a raw DEFLATE decoder seeded past the dictzip header if `path` ends in `.dz`, or
/// the file itself otherwise.
fn open_logical_stream(path: &Path, buffer_size: usize) -> Result<Box<dyn Read>, StarDictError> {
    let file = File::open(path)?;
    if is_dz(path) {
        let mut reader = BufReader::with_capacity(buffer_size, file);
        read_dz_header(&mut reader)?;
        Ok(Box::new(flate2::read::DeflateDecoder::new(reader)))
    } else {
        Ok(Box::new(BufReader::with_capacity(buffer_size, file)))
    }
}

/// Fully materializes dict entries for every given index entry, in the same order as `indexes`.
pub fn read_all(
    path: impl AsRef<Path>,
    indexes: &[IdxEntry],
    sametypesequence: Option<&[EntryType]>,
) -> Result<Vec<(IdxEntry, Vec<DictEntry>)>, StarDictError> {
    let path = path.as_ref();
    let mut stream = open_logical_stream(path, DEFAULT_BUFFER_SIZE)?;
    let mut data = Vec::new();
    stream
        .read_to_end(&mut data)
        .map_err(|_| if is_dz(path) { StarDictError::CorruptCompressed } else { StarDictError::TruncatedData })?;

    let mut out = Vec::with_capacity(indexes.len());
    for entry in indexes {
        let start = entry.offset as usize;
        let end = start
            .checked_add(entry.size as usize)
            .ok_or(StarDictError::IndexOutOfBounds)?;
        if end > data.len() {
            return Err(StarDictError::IndexOutOfBounds);
        }
        let sub_entries = frame_entries(&data[start..end], sametypesequence)?;
        out.push((entry.clone(), sub_entries));
    }
    Ok(out)
}

/// Streams dict entries for every given index entry, sorted ascending by offset to keep the
/// underlying decoder moving forward (spec §4.F, §5, §9).
pub fn iterate(
    path: impl AsRef<Path>,
    indexes: &[IdxEntry],
    sametypesequence: Option<&[EntryType]>,
    batch_size: usize,
    buffer_size: usize,
) -> Result<DictEntryIterator, StarDictError> {
    let path = path.as_ref();
    let source = open_logical_stream(path, buffer_size)?;
    let mut sorted: Vec<IdxEntry> = indexes.to_vec();
    sorted.sort_by_key(|e| e.offset);

    Ok(DictEntryIterator {
        source,
        dz: is_dz(path),
        sametypesequence: sametypesequence.map(|s| s.to_vec()),
        entries: sorted,
        batch_size: batch_size.max(1),
        next_batch_start: 0,
        cursor_offset: 0,
        pending: VecDeque::new(),
        done: false,
    })
}

/// A lazy sequence of `(index_entry, dict_entry_list)` pairs, produced by [`iterate`].
///
/// Dropping this iterator releases the underlying file handle and decoder state; no special
/// cleanup call is required (spec §5: cancellation just means scope exit).
pub struct DictEntryIterator {
    source: Box<dyn Read>,
    dz: bool,
    sametypesequence: Option<Vec<EntryType>>,
    entries: Vec<IdxEntry>,
    batch_size: usize,
    next_batch_start: usize,
    cursor_offset: u64,
    pending: VecDeque<(IdxEntry, Vec<DictEntry>)>,
    done: bool,
}

impl DictEntryIterator {
    fn io_err(&self) -> StarDictError {
        if self.dz {
            StarDictError::CorruptCompressed
        } else {
            StarDictError::TruncatedData
        }
    }

    /// Reads and discards `count` bytes, advancing the cursor over a gap between two index
    /// ranges that isn't covered by any entry.
    fn skip(&mut self, mut count: u64) -> Result<(), StarDictError> {
        let mut buf = [0u8; 4096];
        while count > 0 {
            let want = count.min(buf.len() as u64) as usize;
            let read = self.source.read(&mut buf[..want]).map_err(|_| self.io_err())?;
            if read == 0 {
                return Err(StarDictError::TruncatedData);
            }
            count -= read as u64;
        }
        Ok(())
    }

    /// Reads exactly `len` bytes of the logical stream.
    fn read_exact_window(&mut self, len: u64) -> Result<Vec<u8>, StarDictError> {
        let mut buf = vec![0u8; len as usize];
        let mut filled = 0usize;
        while filled < buf.len() {
            let read = self.source.read(&mut buf[filled..]).map_err(|_| self.io_err())?;
            if read == 0 {
                return Err(StarDictError::TruncatedData);
            }
            filled += read;
        }
        Ok(buf)
    }

    /// Reads the remainder of the logical stream (the final batch's window).
    fn read_to_end_window(&mut self) -> Result<Vec<u8>, StarDictError> {
        let mut buf = Vec::new();
        self.source.read_to_end(&mut buf).map_err(|_| self.io_err())?;
        Ok(buf)
    }

    fn fill_next_batch(&mut self) -> Result<(), StarDictError> {
        let idx = self.next_batch_start;
        if idx >= self.entries.len() {
            self.done = true;
            return Ok(());
        }
        let next_idx = (idx + self.batch_size).min(self.entries.len());
        let batch_start_offset = self.entries[idx].offset;

        if batch_start_offset < self.cursor_offset {
            return Err(StarDictError::IndexOutOfBounds);
        }
        let gap = batch_start_offset - self.cursor_offset;
        if gap > 0 {
            self.skip(gap)?;
            self.cursor_offset += gap;
        }

        let raw = if next_idx < self.entries.len() {
            let window = self.entries[next_idx].offset - batch_start_offset;
            let raw = self.read_exact_window(window)?;
            self.cursor_offset += window;
            raw
        } else {
            let raw = self.read_to_end_window()?;
            self.cursor_offset += raw.len() as u64;
            self.done = true;
            raw
        };

        for entry in &self.entries[idx..next_idx] {
            let start = (entry.offset - batch_start_offset) as usize;
            let end = start
                .checked_add(entry.size as usize)
                .ok_or(StarDictError::IndexOutOfBounds)?;
            if end > raw.len() {
                return Err(StarDictError::IndexOutOfBounds);
            }
            let sub_entries = frame_entries(&raw[start..end], self.sametypesequence.as_deref())?;
            self.pending.push_back((entry.clone(), sub_entries));
        }

        self.next_batch_start = next_idx;
        Ok(())
    }
}

impl Iterator for DictEntryIterator {
    type Item = Result<(IdxEntry, Vec<DictEntry>), StarDictError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.fill_next_batch() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

/// Fetches dict entries for a single index entry via direct random access into a `.dict.dz`
/// file's dictzip chunk table (or a plain seek for an uncompressed `.dict`), rather than reading
/// sequentially from the start.
///
/// Per spec §9, implementations MAY use the RA table for point lookups; this is the point-lookup
/// counterpart to [`read_all`]/[`iterate`]'s sequential access.
pub fn read_one(
    path: impl AsRef<Path>,
    entry: &IdxEntry,
    sametypesequence: Option<&[EntryType]>,
) -> Result<Vec<DictEntry>, StarDictError> {
    let path = path.as_ref();
    if !is_dz(path) {
        let mut file = File::open(path)?;
        let len = file.seek(SeekFrom::End(0))?;
        let end = entry.offset.checked_add(entry.size as u64).ok_or(StarDictError::IndexOutOfBounds)?;
        if end > len {
            return Err(StarDictError::IndexOutOfBounds);
        }
        file.seek(SeekFrom::Start(entry.offset))?;
        let mut data = vec![0u8; entry.size as usize];
        file.read_exact(&mut data).map_err(|_| StarDictError::TruncatedData)?;
        return frame_entries(&data, sametypesequence);
    }

    let mut file = BufReader::new(File::open(path)?);
    let header = read_dz_header(&mut file)?;
    let Some(ra) = header.random_access_info.as_ref() else {
        // No RA table: fall back to sequential decode-and-slice.
        let mut decoder = flate2::read::DeflateDecoder::new(file);
        let mut data = Vec::new();
        decoder.read_to_end(&mut data).map_err(|_| StarDictError::CorruptCompressed)?;
        let end = entry.offset.checked_add(entry.size as u64).ok_or(StarDictError::IndexOutOfBounds)? as usize;
        if end > data.len() {
            return Err(StarDictError::IndexOutOfBounds);
        }
        return frame_entries(&data[entry.offset as usize..end], sametypesequence);
    };

    let chunk_size = ra.chunk_size as u64;
    let start_chunk = (entry.offset / chunk_size) as usize;
    // Index by the last *included* byte, not the exclusive end, so a range that ends exactly on
    // a chunk boundary doesn't spill into the next (possibly absent) chunk.
    let end_chunk = if entry.size == 0 {
        start_chunk
    } else {
        ((entry.offset + entry.size as u64 - 1) / chunk_size) as usize
    };
    if end_chunk >= ra.compressed_chunk_lengths.len() {
        return Err(StarDictError::IndexOutOfBounds);
    }

    // Prefix-sum the compressed chunk offsets from header_length.
    let mut chunk_offset = header.header_length;
    let mut pieces = Vec::with_capacity(end_chunk - start_chunk + 1);
    for (i, &compressed_len) in ra.compressed_chunk_lengths.iter().enumerate() {
        if i > end_chunk {
            break;
        }
        if i >= start_chunk {
            file.seek(SeekFrom::Start(chunk_offset))?;
            let mut compressed = vec![0u8; compressed_len as usize];
            file.read_exact(&mut compressed).map_err(|_| StarDictError::TruncatedData)?;
            let mut decoder = Decompress::new(false);
            let mut decoded = vec![0u8; ra.chunk_size as usize];
            decoder
                .decompress(&compressed, &mut decoded, flate2::FlushDecompress::None)
                .map_err(|_| StarDictError::CorruptCompressed)?;
            pieces.push(decoded);
        }
        chunk_offset += compressed_len as u64;
    }

    let cut_front = (entry.offset % chunk_size) as usize;
    let size = entry.size as usize;
    let data = match pieces.len() {
        0 => unreachable!(),
        1 => pieces[0][cut_front..cut_front + size].to_vec(),
        n => {
            let mut joined = pieces[0][cut_front..].to_vec();
            for piece in pieces.iter().take(n - 1).skip(1) {
                joined.extend_from_slice(piece);
            }
            // Bytes still owed from the last piece; a modulo here would wrongly compute 0 when
            // the range ends exactly on a chunk boundary (the last piece is then needed in full).
            let remaining = size - joined.len();
            joined.extend_from_slice(&pieces[n - 1][..remaining]);
            joined
        }
    };

    frame_entries(&data, sametypesequence)
}
