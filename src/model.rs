//! Shared data types for the StarDict format (spec §3).

use crate::error::StarDictError;

/// The two StarDict format revisions this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V2_4_2,
    V3_0_0,
}

impl Version {
    pub fn parse(value: &str) -> Result<Self, StarDictError> {
        match value {
            "2.4.2" => Ok(Version::V2_4_2),
            "3.0.0" => Ok(Version::V3_0_0),
            _ => Err(StarDictError::BadField("version".into())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Version::V2_4_2 => "2.4.2",
            Version::V3_0_0 => "3.0.0",
        }
    }
}

/// Width, in bits, of the offset field within an index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetBits {
    Bits32,
    Bits64,
}

impl OffsetBits {
    pub fn bytes(self) -> usize {
        match self {
            OffsetBits::Bits32 => 4,
            OffsetBits::Bits64 => 8,
        }
    }
}

impl Default for OffsetBits {
    fn default() -> Self {
        OffsetBits::Bits32
    }
}

/// One of the fourteen entry-type codes a dict payload sub-entry can carry (spec §6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// `m` — UTF-8 plain text meaning.
    Meaning,
    /// `l` — meaning in locale encoding.
    MeaningLocale,
    /// `g` — Pango markup.
    Pango,
    /// `t` — phonetic text.
    Phonetic,
    /// `x` — XDXF XML.
    Xdxf,
    /// `y` — Chinese YinBiao or Japanese Kana.
    YinbiaoKana,
    /// `k` — KingSoft PowerWord XML.
    PowerWord,
    /// `w` — MediaWiki.
    MediaWiki,
    /// `h` — HTML.
    Html,
    /// `n` — WordNet.
    WordNet,
    /// `r` — resource reference list.
    Resources,
    /// `W` — WAV audio, size-prefixed.
    Wav,
    /// `P` — picture, size-prefixed.
    Picture,
    /// `X` — reserved binary extension, size-prefixed.
    Extension,
}

impl EntryType {
    pub fn from_char(ch: char) -> Result<Self, StarDictError> {
        use EntryType::*;
        Ok(match ch {
            'm' => Meaning,
            'l' => MeaningLocale,
            'g' => Pango,
            't' => Phonetic,
            'x' => Xdxf,
            'y' => YinbiaoKana,
            'k' => PowerWord,
            'w' => MediaWiki,
            'h' => Html,
            'n' => WordNet,
            'r' => Resources,
            'W' => Wav,
            'P' => Picture,
            'X' => Extension,
            other => return Err(StarDictError::UnknownEntryType(other)),
        })
    }

    pub fn as_char(self) -> char {
        use EntryType::*;
        match self {
            Meaning => 'm',
            MeaningLocale => 'l',
            Pango => 'g',
            Phonetic => 't',
            Xdxf => 'x',
            YinbiaoKana => 'y',
            PowerWord => 'k',
            MediaWiki => 'w',
            Html => 'h',
            WordNet => 'n',
            Resources => 'r',
            Wav => 'W',
            Picture => 'P',
            Extension => 'X',
        }
    }

    /// Size-prefixed types (`W`, `P`, `X`) carry a 4-byte big-endian length ahead of their
    /// payload instead of being NUL-terminated.
    pub fn is_size_prefixed(self) -> bool {
        matches!(self, EntryType::Wav | EntryType::Picture | EntryType::Extension)
    }
}

/// The parsed `.ifo` descriptor (spec §3, §4.B, §6.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarDictInfo {
    pub version: Version,
    pub bookname: String,
    pub wordcount: u64,
    pub idxfilesize: u64,
    pub idxoffsetbits: OffsetBits,
    pub synwordcount: Option<u64>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub sametypesequence: Option<Vec<EntryType>>,
    pub dicttype: Option<String>,
}

/// One parsed `.idx` record (spec §3, §4.C, §6.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxEntry {
    pub word: String,
    pub offset: u64,
    pub size: u32,
}

/// A single framed sub-entry from a word's payload (spec §3, §4.E).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub entry_type: EntryType,
    pub data: Vec<u8>,
}

/// Bit flags recorded in a gzip/dictzip header's FLG byte (spec §4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GzipFlags {
    pub text: bool,
    pub hcrc: bool,
    pub extra: bool,
    pub name: bool,
    pub comment: bool,
}

impl GzipFlags {
    pub(crate) fn from_byte(byte: u8) -> Self {
        GzipFlags {
            text: byte & 0x01 != 0,
            hcrc: byte & 0x02 != 0,
            extra: byte & 0x04 != 0,
            name: byte & 0x08 != 0,
            comment: byte & 0x10 != 0,
        }
    }
}

/// OS-type byte recorded by gzip, per RFC 1952 §2.3.1. Parsed but not interpreted downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingSystemType {
    FatFilesystem,
    Amiga,
    Vms,
    Unix,
    VmCms,
    AtariTos,
    HpfsFilesystem,
    Macintosh,
    ZSystem,
    CpM,
    Tops20,
    NtfsFilesystem,
    Qdos,
    AcornRiscos,
    Unknown,
}

impl OperatingSystemType {
    pub(crate) fn from_byte(byte: u8) -> Self {
        use OperatingSystemType::*;
        match byte {
            0 => FatFilesystem,
            1 => Amiga,
            2 => Vms,
            3 => Unix,
            4 => VmCms,
            5 => AtariTos,
            6 => HpfsFilesystem,
            7 => Macintosh,
            8 => ZSystem,
            9 => CpM,
            10 => Tops20,
            11 => NtfsFilesystem,
            12 => Qdos,
            13 => AcornRiscos,
            _ => Unknown,
        }
    }
}

/// The dictzip `RA` extra-field chunk table (spec §3, §4.D).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomAccessInfo {
    /// Logical (uncompressed) size of every chunk except possibly the last.
    pub chunk_size: u16,
    /// Compressed length of each chunk, in file order.
    pub compressed_chunk_lengths: Vec<u16>,
}

/// The parsed dictzip header metadata (spec §3, §4.D).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DzHeader {
    pub compression_method: u8,
    pub flags: GzipFlags,
    pub modify_time: u32,
    pub extra_flags: u8,
    pub operating_system_type: OperatingSystemType,
    pub random_access_info: Option<RandomAccessInfo>,
    pub original_file_name: Option<String>,
    pub comment: Option<String>,
    pub crc16_value: Option<u16>,
    /// File offset at which the raw DEFLATE stream begins.
    pub header_length: u64,
}
