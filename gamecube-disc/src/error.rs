use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "file system table truncated: {entries} entries need 0x{needed:x} bytes, found 0x{found:x}"
    )]
    TruncatedTable {
        entries: u32,
        needed: u64,
        found: usize,
    },

    #[error("malformed file system table entry {index}: {reason}")]
    MalformedEntry { index: u32, reason: MalformedReason },

    #[error("failed to enumerate {}", path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("file name is not valid UTF-8: {}", path.display())]
    InvalidName { path: PathBuf },

    #[error("{what} exceeds the 32-bit range of the disc format")]
    SizeOverflow { what: &'static str },

    #[error("{what} at 0x{offset:x}..0x{end:x} lies outside the 0x{len:x}-byte image")]
    OutOfBounds {
        what: &'static str,
        offset: u64,
        end: u64,
        len: usize,
    },

    #[error("failed to read main executable")]
    Dol(#[from] dol::Error),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum MalformedReason {
    #[error("root entry is not a directory")]
    RootNotDirectory,

    #[error("root entry declares no entries")]
    EmptyRoot,

    #[error("directory end index {end_index} does not follow its own index")]
    EndIndexNotAfterSelf { end_index: u32 },

    #[error("directory end index {end_index} is past the entry count {entry_count}")]
    EndIndexPastTable { end_index: u32, entry_count: u32 },

    #[error("directory end index {end_index} is past its parent's end index {parent_end_index}")]
    EndIndexPastParent {
        end_index: u32,
        parent_end_index: u32,
    },

    #[error("name offset 0x{name_offset:x} is outside the 0x{len:x}-byte string table")]
    NameOutOfBounds { name_offset: u32, len: usize },

    #[error("name at offset 0x{name_offset:x} is not null-terminated")]
    UnterminatedName { name_offset: u32 },
}
