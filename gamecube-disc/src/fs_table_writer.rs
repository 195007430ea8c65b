use std::convert::TryFrom;
use std::path::PathBuf;
use std::slice;

use log::debug;

use crate::align::{align_up, FILE_ALIGNMENT, FS_TABLE_ALIGNMENT};
use crate::entry::{Entry, ENTRY_SIZE, MAX_NAME_OFFSET};
use crate::error::Error;
use crate::fs_table_reader::FileData;
use crate::size::raw_size;
use crate::tree::{Node, Tree};

/// Where a file's payload comes from and where it goes on the disc.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilePlacement {
    pub source: PathBuf,
    pub file: FileData,
}

/// A file system table laid out for a specific disc offset.
#[derive(Clone, Debug)]
pub struct EncodedFsTable {
    raw: Vec<u8>,
    files: Vec<FilePlacement>,
    raw_size: u32,
}

struct OpenDirectory<'a> {
    index: u32,
    end_index: u32,
    /// Root-relative path with a trailing separator, or empty for the root.
    path: String,
    children: slice::Iter<'a, Node>,
}

impl EncodedFsTable {
    /// Lays out the table for `tree` starting at disc offset `fs_table_offset`, followed by every
    /// file's payload.
    ///
    /// The first payload starts at the next 0x100-byte boundary after the table, and every payload
    /// starts on a 16-byte boundary.
    pub fn encode(tree: &Tree, fs_table_offset: u32) -> Result<EncodedFsTable, Error> {
        let overflow = |what| Error::SizeOverflow { what };

        // Count pass: size the table and find every directory's extent up front.
        let raw_size = raw_size(tree)?;
        let mut descendant_counts = Vec::new();
        let total_entries = count_descendants(tree.children(), &mut descendant_counts) + 1;
        let total_entries =
            u32::try_from(total_entries).map_err(|_| overflow("file system table"))?;

        let file_region_start = fs_table_offset
            .checked_add(raw_size)
            .and_then(|end| align_up(end, FS_TABLE_ALIGNMENT))
            .ok_or_else(|| overflow("file system table offset"))?;
        let size = file_region_start - fs_table_offset;
        debug!(
            "file system table at 0x{:08x}: {} entries, 0x{:x} bytes (0x{:x} padded), files from 0x{:08x}",
            fs_table_offset, total_entries, raw_size, size, file_region_start,
        );

        let entries_size = total_entries as usize * ENTRY_SIZE;
        let mut raw = Vec::with_capacity(size as usize);
        let mut strings = Vec::with_capacity(raw_size as usize - entries_size);
        let mut files = Vec::new();
        let mut file_cursor = file_region_start;
        let mut next_directory = 0;

        raw.extend_from_slice(&Entry::root(total_entries).to_bytes());
        let mut open = vec![OpenDirectory {
            index: 0,
            end_index: total_entries,
            path: String::new(),
            children: tree.children().iter(),
        }];
        let mut index = 1;

        // Emission pass.
        while let Some(dir) = open.last_mut() {
            let node = match dir.children.next() {
                Some(node) => node,
                None => {
                    debug_assert_eq!(index, dir.end_index);
                    open.pop();
                    continue;
                }
            };
            let parent_index = dir.index;
            let path = format!("{}{}", dir.path, node.name());

            let name_offset = u32::try_from(strings.len())
                .ok()
                .filter(|&offset| offset <= MAX_NAME_OFFSET)
                .ok_or_else(|| overflow("string table"))?;
            strings.extend_from_slice(node.name().as_bytes());
            strings.push(0);

            match node {
                Node::File { size, source, .. } => {
                    let size = *size;
                    // Align before placing rather than after, so the last file may end anywhere.
                    let offset =
                        align_up(file_cursor, FILE_ALIGNMENT).ok_or_else(|| overflow("file data"))?;
                    file_cursor = offset
                        .checked_add(size)
                        .ok_or_else(|| overflow("file data"))?;
                    raw.extend_from_slice(&Entry::file(name_offset, offset, size).to_bytes());
                    files.push(FilePlacement {
                        source: source.clone(),
                        file: FileData { path, size, offset },
                    });
                }
                Node::Directory { children, .. } => {
                    let end_index = index + descendant_counts[next_directory] + 1;
                    next_directory += 1;
                    raw.extend_from_slice(
                        &Entry::directory(name_offset, parent_index, end_index).to_bytes(),
                    );
                    open.push(OpenDirectory {
                        index,
                        end_index,
                        path: path + "/",
                        children: children.iter(),
                    });
                }
            }
            index += 1;
        }

        raw.append(&mut strings);
        debug_assert_eq!(raw.len(), raw_size as usize);
        raw.resize(size as usize, 0);

        Ok(EncodedFsTable {
            raw,
            files,
            raw_size,
        })
    }

    /// Table bytes including the trailing alignment padding.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Every file in table order, which is also ascending disc offset order.
    pub fn files(&self) -> &[FilePlacement] {
        &self.files
    }

    /// The table size without trailing padding, as recorded in the disc header.
    pub fn raw_size(&self) -> u32 {
        self.raw_size
    }

    /// The table size with trailing padding: the distance from the table to the first payload.
    pub fn size(&self) -> u32 {
        self.raw.len() as u32
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<FilePlacement>) {
        (self.raw, self.files)
    }
}

/// Returns the number of entries below `nodes`, recording each directory's own count in preorder.
fn count_descendants(nodes: &[Node], counts: &mut Vec<u32>) -> usize {
    let mut total = 0;
    for node in nodes {
        total += 1;
        if let Node::Directory { children, .. } = node {
            let slot = counts.len();
            counts.push(0);
            let descendants = count_descendants(children, counts);
            counts[slot] = descendants as u32;
            total += descendants;
        }
    }
    total
}
