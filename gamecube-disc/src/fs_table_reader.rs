use std::collections::BTreeMap;

use log::debug;

use crate::entry::{Entry, ENTRY_SIZE};
use crate::error::{Error, MalformedReason};

/// The key under which [`FsTable::entries`] records the root directory.
pub const ROOT_PATH: &str = ".";

/// A file's root-relative path and the location of its payload on the disc.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FileData {
    /// Slash-separated, relative to the root directory, without a leading `./`.
    pub path: String,
    pub size: u32,
    pub offset: u32,
}

/// Bounds-checked access to the entries and string table of a raw file system table.
#[derive(Clone, Copy, Debug)]
pub struct FsTableReader<'data> {
    data: &'data [u8],
    entry_count: u32,
}

impl<'data> FsTableReader<'data> {
    /// Checks that `data` holds every entry the root declares.
    ///
    /// Trailing padding after the string table is not required.
    pub fn new(data: &'data [u8]) -> Result<FsTableReader<'data>, Error> {
        if data.len() < ENTRY_SIZE {
            return Err(Error::TruncatedTable {
                entries: 1,
                needed: ENTRY_SIZE as u64,
                found: data.len(),
            });
        }
        let root = Entry::parse(data);
        let entry_count = root.end_index();
        // The count includes the root itself.
        let reason = if !root.is_dir() {
            Some(MalformedReason::RootNotDirectory)
        } else if entry_count == 0 {
            Some(MalformedReason::EmptyRoot)
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(Error::MalformedEntry { index: 0, reason });
        }
        let needed = u64::from(entry_count) * ENTRY_SIZE as u64;
        if needed > data.len() as u64 {
            return Err(Error::TruncatedTable {
                entries: entry_count,
                needed,
                found: data.len(),
            });
        }
        Ok(FsTableReader { data, entry_count })
    }

    pub fn root_entry_count(&self) -> u32 {
        self.entry_count
    }

    pub fn root(&self) -> Entry {
        Entry::parse(self.data)
    }

    /// # Panics
    ///
    /// Panics if `index` is not less than [`root_entry_count`](FsTableReader::root_entry_count).
    pub fn entry(&self, index: u32) -> Entry {
        if index >= self.entry_count {
            panic!("index out of range: {}", index);
        }
        Entry::parse(&self.data[index as usize * ENTRY_SIZE..])
    }

    pub fn string_table(&self) -> &'data [u8] {
        &self.data[self.entry_count as usize * ENTRY_SIZE..]
    }

    /// Returns the raw name of the entry at `index`, without its null terminator.
    pub fn name(&self, index: u32, entry: &Entry) -> Result<&'data [u8], Error> {
        let strings = self.string_table();
        let name_offset = entry.name_offset();
        let malformed = |reason| Error::MalformedEntry { index, reason };

        let tail = match strings.get(name_offset as usize..) {
            Some(tail) if !tail.is_empty() => tail,
            _ => {
                return Err(malformed(MalformedReason::NameOutOfBounds {
                    name_offset,
                    len: strings.len(),
                }))
            }
        };
        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| malformed(MalformedReason::UnterminatedName { name_offset }))?;
        Ok(&tail[..len])
    }
}

/// A decoded file system table.
#[derive(Clone, Debug, Default)]
pub struct FsTable {
    entries: BTreeMap<String, Entry>,
    files: Vec<FileData>,
}

struct OpenDirectory {
    /// Length of the path prefix before this directory's name was appended.
    parent_path_len: usize,
    end_index: u32,
}

impl FsTable {
    /// Rebuilds absolute paths for every entry of a raw table in a single pass.
    pub fn decode(data: &[u8]) -> Result<FsTable, Error> {
        let reader = FsTableReader::new(data)?;
        let entry_count = reader.root_entry_count();

        let mut entries = BTreeMap::new();
        let mut files = Vec::new();
        entries.insert(ROOT_PATH.to_owned(), reader.root());

        // The root directory is implicit: it contributes no name and never closes.
        let mut open: Vec<OpenDirectory> = Vec::new();
        let mut path = String::new();

        for index in 1..entry_count {
            while let Some(dir) = open.last() {
                if dir.end_index > index {
                    break;
                }
                path.truncate(dir.parent_path_len);
                open.pop();
            }

            let entry = reader.entry(index);
            let name = String::from_utf8_lossy(reader.name(index, &entry)?);
            let full_path = format!("{}{}", path, name);

            if entry.is_dir() {
                let end_index = entry.end_index();
                let parent_end_index = open.last().map_or(entry_count, |dir| dir.end_index);
                let reason = if end_index <= index {
                    Some(MalformedReason::EndIndexNotAfterSelf { end_index })
                } else if end_index > entry_count {
                    Some(MalformedReason::EndIndexPastTable {
                        end_index,
                        entry_count,
                    })
                } else if end_index > parent_end_index {
                    Some(MalformedReason::EndIndexPastParent {
                        end_index,
                        parent_end_index,
                    })
                } else {
                    None
                };
                if let Some(reason) = reason {
                    return Err(Error::MalformedEntry { index, reason });
                }

                open.push(OpenDirectory {
                    parent_path_len: path.len(),
                    end_index,
                });
                path.push_str(&name);
                path.push('/');
            } else {
                files.push(FileData {
                    path: full_path.clone(),
                    size: entry.data_size(),
                    offset: entry.data_offset(),
                });
            }

            entries.insert(full_path, entry);
        }

        debug!(
            "decoded file system table: {} entries, {} files",
            entry_count,
            files.len(),
        );
        Ok(FsTable { entries, files })
    }

    /// Every entry keyed by its root-relative path. The root is keyed by [`ROOT_PATH`].
    pub fn entries(&self) -> &BTreeMap<String, Entry> {
        &self.entries
    }

    /// Every file in table order.
    pub fn files(&self) -> &[FileData] {
        &self.files
    }

    pub fn file(&self, path: &str) -> Option<&FileData> {
        self.files.iter().find(|file| file.path == path)
    }

    /// Root-relative paths of every directory except the root, parents before children.
    pub fn directories(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(|(path, entry)| entry.is_dir() && path.as_str() != ROOT_PATH)
            .map(|(path, _)| path.as_str())
    }

    pub fn into_parts(self) -> (BTreeMap<String, Entry>, Vec<FileData>) {
        (self.entries, self.files)
    }
}
