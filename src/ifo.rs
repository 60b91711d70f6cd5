//! Parse `.ifo` text headers into a typed [`StarDictInfo`] (spec §4.B, §6.1).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rassert_rs::rassert;

use crate::error::StarDictError;
use crate::model::{EntryType, OffsetBits, StarDictInfo, Version};

const MAGIC: &str = "StarDict's dict ifo file";

/// Reads and parses an `.ifo` file from disk.
pub fn read_info(path: impl AsRef<Path>) -> Result<StarDictInfo, StarDictError> {
    let text = fs::read_to_string(path)?;
    parse_info(&text)
}

/// Parses `.ifo` text already read into memory.
pub fn parse_info(text: &str) -> Result<StarDictInfo, StarDictError> {
    let items = parse_items(text)?;
    let get = |key: &str| items.get(key).map(String::as_str);

    let version = Version::parse(get("version").ok_or_else(|| missing("version"))?)?;
    let bookname = get("bookname").ok_or_else(|| missing("bookname"))?.to_string();
    rassert!(!bookname.is_empty(), missing("bookname"));
    let wordcount = parse_u64(get("wordcount").ok_or_else(|| missing("wordcount"))?, "wordcount")?;
    let idxfilesize = parse_u64(get("idxfilesize").ok_or_else(|| missing("idxfilesize"))?, "idxfilesize")?;
    let idxoffsetbits = parse_offsetbits(get("idxoffsetbits"))?;
    let synwordcount = get("synwordcount")
        .map(|v| parse_u64(v, "synwordcount"))
        .transpose()?;
    let sametypesequence = get("sametypesequence")
        .map(parse_typesequence)
        .transpose()?;

    Ok(StarDictInfo {
        version,
        bookname,
        wordcount,
        idxfilesize,
        idxoffsetbits,
        synwordcount,
        author: get("author").map(str::to_string),
        email: get("email").map(str::to_string),
        website: get("website").map(str::to_string),
        description: get("description").map(str::to_string),
        date: get("date").map(str::to_string),
        sametypesequence,
        dicttype: get("dicttype").map(str::to_string),
    })
}

fn parse_items(text: &str) -> Result<HashMap<String, String>, StarDictError> {
    let mut lines = text.split('\n');
    let magic = lines.next().unwrap_or("");
    rassert!(magic == MAGIC, StarDictError::BadMagic);

    let mut items = HashMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some(eq) = line.find('=') else {
            continue;
        };
        let (key, value) = line.split_at(eq);
        items.insert(key.to_string(), value[1..].to_string());
    }
    Ok(items)
}

fn parse_u64(value: &str, field: &str) -> Result<u64, StarDictError> {
    value.parse().map_err(|_| bad(field))
}

fn parse_offsetbits(value: Option<&str>) -> Result<OffsetBits, StarDictError> {
    match value {
        None => Ok(OffsetBits::Bits32),
        Some("32") => Ok(OffsetBits::Bits32),
        Some("64") => Ok(OffsetBits::Bits64),
        Some(_) => Err(bad("idxoffsetbits")),
    }
}

fn parse_typesequence(value: &str) -> Result<Vec<EntryType>, StarDictError> {
    value.chars().map(EntryType::from_char).collect()
}

fn missing(field: &str) -> StarDictError {
    StarDictError::MissingField(field.to_string())
}

fn bad(field: &str) -> StarDictError {
    StarDictError::BadField(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_viable_ifo() {
        let text = "StarDict's dict ifo file\n\
                    version=3.0.0\n\
                    bookname=dict name\n\
                    wordcount=2\n\
                    idxfilesize=33\n\
                    idxoffsetbits=32";
        let info = parse_info(text).unwrap();
        assert_eq!(info.version, Version::V3_0_0);
        assert_eq!(info.bookname, "dict name");
        assert_eq!(info.wordcount, 2);
        assert_eq!(info.idxfilesize, 33);
        assert_eq!(info.idxoffsetbits, OffsetBits::Bits32);
        assert!(info.author.is_none());
        assert!(info.sametypesequence.is_none());
    }

    #[test]
    fn missing_magic_fails() {
        let text = "not the right magic\nversion=3.0.0\n";
        assert!(matches!(parse_info(text), Err(StarDictError::BadMagic)));
    }

    #[test]
    fn value_containing_equals_is_preserved() {
        let text = "StarDict's dict ifo file\n\
                    version=3.0.0\n\
                    bookname=dict name\n\
                    wordcount=1\n\
                    idxfilesize=1\n\
                    website=https://example.com/?a=b&c=d\n";
        let info = parse_info(text).unwrap();
        assert_eq!(info.website.as_deref(), Some("https://example.com/?a=b&c=d"));
    }

    #[test]
    fn missing_bookname_fails() {
        let text = "StarDict's dict ifo file\nversion=3.0.0\n";
        assert!(matches!(
            parse_info(text),
            Err(StarDictError::MissingField(f)) if f == "bookname"
        ));
    }

    #[test]
    fn bad_idxoffsetbits_fails() {
        let text = "StarDict's dict ifo file\n\
                    version=3.0.0\nbookname=x\nwordcount=1\nidxfilesize=1\nidxoffsetbits=16\n";
        assert!(matches!(parse_info(text), Err(StarDictError::BadField(f)) if f == "idxoffsetbits"));
    }

    #[test]
    fn unknown_entry_type_in_sametypesequence_fails() {
        let text = "StarDict's dict ifo file\n\
                    version=3.0.0\nbookname=x\nwordcount=1\nidxfilesize=1\nsametypesequence=mz\n";
        assert!(matches!(
            parse_info(text),
            Err(StarDictError::UnknownEntryType('z'))
        ));
    }

    #[test]
    fn sametypesequence_is_parsed_in_order() {
        let text = "StarDict's dict ifo file\n\
                    version=3.0.0\nbookname=x\nwordcount=1\nidxfilesize=1\nsametypesequence=mx\n";
        let info = parse_info(text).unwrap();
        assert_eq!(
            info.sametypesequence.unwrap(),
            vec![EntryType::Meaning, EntryType::Xdxf]
        );
    }

    #[test]
    fn no_trailing_newline_on_last_line_still_parses() {
        let text = "StarDict's dict ifo file\nversion=3.0.0\nbookname=x\nwordcount=1\nidxfilesize=1";
        assert!(parse_info(text).is_ok());
    }
}
