use std::io::{self, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

/// The size in bytes of one file system table entry.
pub const ENTRY_SIZE: usize = 0xc;

/// The largest string table offset an entry can hold.
pub const MAX_NAME_OFFSET: u32 = 0x00ff_ffff;

const DIRECTORY_FLAG: u8 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// One node of the flattened file system table.
///
/// The second and third words change meaning with the entry's kind:
///
/// | kind      | word 1         | word 2                                      |
/// |-----------|----------------|---------------------------------------------|
/// | file      | data offset    | data size                                   |
/// | directory | parent index   | end index (total entry count for the root)  |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Entry {
    kind: EntryKind,
    name_offset: u32,
    offset_or_parent: u32,
    size_or_end: u32,
}

impl Entry {
    pub fn file(name_offset: u32, data_offset: u32, data_size: u32) -> Entry {
        Entry {
            kind: EntryKind::File,
            name_offset: name_offset & MAX_NAME_OFFSET,
            offset_or_parent: data_offset,
            size_or_end: data_size,
        }
    }

    pub fn directory(name_offset: u32, parent_index: u32, end_index: u32) -> Entry {
        Entry {
            kind: EntryKind::Directory,
            name_offset: name_offset & MAX_NAME_OFFSET,
            offset_or_parent: parent_index,
            size_or_end: end_index,
        }
    }

    /// The root directory, which has no name or parent and whose end index is the entry count.
    pub fn root(total_entries: u32) -> Entry {
        Entry::directory(0, 0, total_entries)
    }

    /// Parses an entry from the first [`ENTRY_SIZE`] bytes of `data`.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` is less than [`ENTRY_SIZE`].
    pub fn parse(data: &[u8]) -> Entry {
        let word = BigEndian::read_u32(&data[0..4]);
        Entry {
            kind: if (word >> 24) as u8 == DIRECTORY_FLAG {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            name_offset: word & MAX_NAME_OFFSET,
            offset_or_parent: BigEndian::read_u32(&data[4..8]),
            size_or_end: BigEndian::read_u32(&data[8..12]),
        }
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        w.write_u32::<BigEndian>((u32::from(self.flag()) << 24) | self.name_offset)?;
        w.write_u32::<BigEndian>(self.offset_or_parent)?;
        w.write_u32::<BigEndian>(self.size_or_end)
    }

    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut bytes = [0; ENTRY_SIZE];
        BigEndian::write_u32(
            &mut bytes[0..4],
            (u32::from(self.flag()) << 24) | self.name_offset,
        );
        BigEndian::write_u32(&mut bytes[4..8], self.offset_or_parent);
        BigEndian::write_u32(&mut bytes[8..12], self.size_or_end);
        bytes
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn name_offset(&self) -> u32 {
        self.name_offset
    }

    pub fn data_offset(&self) -> u32 {
        self.offset_or_parent
    }

    pub fn data_size(&self) -> u32 {
        self.size_or_end
    }

    pub fn parent_index(&self) -> u32 {
        self.offset_or_parent
    }

    /// One past the index of this directory's last descendant.
    ///
    /// For the root entry this is the total number of entries, which is the same thing.
    pub fn end_index(&self) -> u32 {
        self.size_or_end
    }

    fn flag(&self) -> u8 {
        match self.kind {
            EntryKind::File => 0,
            EntryKind::Directory => DIRECTORY_FLAG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Entry, EntryKind, ENTRY_SIZE};

    #[test]
    fn parse_file() {
        let data = [
            0x00, 0x00, 0x01, 0x23, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04,
        ];
        let entry = Entry::parse(&data);
        assert_eq!(entry.kind(), EntryKind::File);
        assert_eq!(entry.name_offset(), 0x123);
        assert_eq!(entry.data_offset(), 0x10000);
        assert_eq!(entry.data_size(), 4);
    }

    #[test]
    fn parse_directory() {
        let data = [
            0x01, 0x12, 0x34, 0x56, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x09,
        ];
        let entry = Entry::parse(&data);
        assert!(entry.is_dir());
        assert_eq!(entry.name_offset(), 0x123456);
        assert_eq!(entry.parent_index(), 2);
        assert_eq!(entry.end_index(), 9);
    }

    #[test]
    fn unknown_flag_is_a_file() {
        let mut data = [0; ENTRY_SIZE];
        data[0] = 0x02;
        assert!(Entry::parse(&data).is_file());
    }

    #[test]
    fn root_layout() {
        assert_eq!(
            Entry::root(4).to_bytes(),
            [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04],
        );
    }

    #[test]
    fn write_to_matches_to_bytes() {
        let entry = Entry::directory(0x0c, 1, 7);
        let mut written = Vec::new();
        entry.write_to(&mut written).unwrap();
        assert_eq!(written, entry.to_bytes());
        assert_eq!(Entry::parse(&written), entry);
    }

    #[test]
    fn name_offset_is_truncated_to_24_bits() {
        let entry = Entry::file(0x0100_0005, 0, 0);
        assert_eq!(entry.name_offset(), 5);
        assert!(entry.is_file());
    }
}
