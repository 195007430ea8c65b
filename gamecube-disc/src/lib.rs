//! Reading and writing GameCube disc images, centered on the file system table (FST).
//!
//! The FST is a preorder-flattened directory tree: an array of 12-byte [`Entry`] records where
//! each directory names the index one past its last descendant, followed by a table of
//! null-terminated names. [`FsTable::decode`] turns the raw table back into paths and
//! [`EncodedFsTable::encode`] lays out a [`Tree`] at a given disc offset.

mod align;
mod entry;
mod error;
mod fs_table_reader;
mod fs_table_writer;
mod header;
mod reader;
mod size;
mod tree;

#[cfg(test)]
mod tests;

pub use crate::align::{align_up, padding, FILE_ALIGNMENT, FS_TABLE_ALIGNMENT};
pub use crate::entry::{Entry, EntryKind, ENTRY_SIZE, MAX_NAME_OFFSET};
pub use crate::error::{Error, MalformedReason};
pub use crate::fs_table_reader::{FileData, FsTable, FsTableReader, ROOT_PATH};
pub use crate::fs_table_writer::{EncodedFsTable, FilePlacement};
pub use crate::header::{Header, HEADER_SIZE};
pub use crate::reader::{Reader, APPLOADER_OFFSET, BI2_OFFSET, BI2_SIZE};
pub use crate::size::{calculate_size, raw_size};
pub use crate::tree::{Iter, Node, Tree};

/// The size in bytes of a GameCube disc image.
pub const SIZE: usize = 1459978240;
