use std::io;

/// Error type representing everything that can go wrong while reading a StarDict dictionary.
///
/// A single enum surfaces from every component in this crate (path bundling excluded, see
/// [`crate::paths`]): bundling silently skips incomplete file triples rather than erroring.
#[derive(Debug, thiserror::Error)]
pub enum StarDictError {
    /// The leading magic bytes/string of a file did not match what was expected.
    #[error("bad magic bytes")]
    BadMagic,

    /// A required `.ifo` key was missing.
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// A field was present but could not be parsed into its expected type.
    #[error("malformed field '{0}'")]
    BadField(String),

    /// An entry-type code was not one of the fourteen recognized StarDict type codes.
    #[error("unknown entry type code '{0}'")]
    UnknownEntryType(char),

    /// The dictzip `RA` extra field declared a version other than 1.
    #[error("unsupported random-access header version")]
    BadRandomAccessVersion,

    /// A read came up short of the number of bytes the format promised.
    #[error("truncated data")]
    TruncatedData,

    /// The DEFLATE stream could not be decoded.
    #[error("corrupt compressed stream")]
    CorruptCompressed,

    /// An index entry's byte range falls outside the logical data stream.
    #[error("index range out of bounds")]
    IndexOutOfBounds,

    /// A wrapped `io::Error`.
    #[error("I/O error")]
    Io(#[from] io::Error),
}
