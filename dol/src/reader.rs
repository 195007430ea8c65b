use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::{Section, HEADER_SIZE, SECTION_COUNT};

const ENTRY_POINT_OFFSET: usize = 0xe0;
const SECTION_OFFSET_TABLE_OFFSET: usize = 0;
const SECTION_LOAD_ADDRESS_TABLE_OFFSET: usize = 0x48;
const SECTION_SIZE_TABLE_OFFSET: usize = 0x90;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Reader<'data> {
    data: &'data [u8],
}

impl<'data> Reader<'data> {
    /// Parses the section tables and bounds `data` to the end of the farthest section.
    pub fn new(data: &'data [u8]) -> Result<Reader<'data>, Error> {
        if data.len() < HEADER_SIZE {
            return Err(Error::TruncatedHeader { len: data.len() });
        }
        let mut reader = Reader { data };

        // Bound the data slice.
        let farthest_end = reader
            .iter_sections()
            .filter(|section| !section.is_empty())
            .map(Section::end)
            .max()
            .unwrap_or(0)
            .max(HEADER_SIZE as u64);
        if farthest_end > data.len() as u64 {
            return Err(Error::Truncated {
                needed: farthest_end,
                len: data.len(),
            });
        }
        reader.data = &data[..farthest_end as usize];
        Ok(reader)
    }

    /// # Panics
    ///
    /// Panics if `index` is not less than [`SECTION_COUNT`].
    pub fn section(self, index: usize) -> Section {
        if index >= SECTION_COUNT {
            panic!("index out of range: {}", index);
        }
        Section {
            index,
            offset: self.read_u32(4 * index + SECTION_OFFSET_TABLE_OFFSET),
            load_address: self.read_u32(4 * index + SECTION_LOAD_ADDRESS_TABLE_OFFSET),
            size: self.read_u32(4 * index + SECTION_SIZE_TABLE_OFFSET),
        }
    }

    pub fn iter_sections(self) -> impl ExactSizeIterator<Item = Section> + 'data {
        (0..SECTION_COUNT).map(move |index| self.section(index))
    }

    pub fn entry_point(self) -> u32 {
        self.read_u32(ENTRY_POINT_OFFSET)
    }

    /// The size in bytes of the executable, header included.
    pub fn size(self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(self) -> &'data [u8] {
        self.data
    }

    fn read_u32(self, offset: usize) -> u32 {
        BigEndian::read_u32(&self.data[offset..offset + 4])
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("DOL header truncated: {len} bytes, need 0x100")]
    TruncatedHeader { len: usize },

    #[error("DOL truncated: sections end at 0x{needed:x}, data is 0x{len:x} bytes")]
    Truncated { needed: u64, len: usize },
}
