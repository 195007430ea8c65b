use std::convert::TryFrom;
use std::path::Path;

use crate::entry::ENTRY_SIZE;
use crate::error::Error;
use crate::tree::Tree;

/// The unpadded size in bytes of the file system table for `tree`: one entry per node plus the
/// root, and one null-terminated name per node.
pub fn raw_size(tree: &Tree) -> Result<u32, Error> {
    let (entries, names) = tree
        .iter()
        .fold((1u64, 0u64), |(entries, names), node| {
            (entries + 1, names + node.name().len() as u64 + 1)
        });
    u32::try_from(entries * ENTRY_SIZE as u64 + names).map_err(|_| Error::SizeOverflow {
        what: "file system table",
    })
}

/// Scans `root` and returns the unpadded size of its file system table.
pub fn calculate_size<P: AsRef<Path>>(root: P) -> Result<u32, Error> {
    raw_size(&Tree::scan(root)?)
}
