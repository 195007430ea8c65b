use byteorder::{BigEndian, ByteOrder};

use crate::error::Error;

/// The size in bytes of a GameCube disc header.
pub const HEADER_SIZE: usize = 0x440;

const GAME_NAME_OFFSET: usize = 0x20;
const GAME_NAME_SIZE: usize = 0x3e0;
const DOL_OFFSET_OFFSET: usize = 0x420;
const FS_TABLE_OFFSET_OFFSET: usize = 0x424;
const FS_TABLE_SIZE_OFFSET: usize = 0x428;
const FS_TABLE_MAX_SIZE_OFFSET: usize = 0x42c;

/// The disc header, kept verbatim so that fields this crate doesn't interpret survive a rebuild.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    data: Vec<u8>,
}

impl Header {
    /// Copies the header from the start of `data`.
    pub fn new(data: &[u8]) -> Result<Header, Error> {
        match data.get(..HEADER_SIZE) {
            Some(header) => Ok(Header {
                data: header.to_vec(),
            }),
            None => Err(Error::OutOfBounds {
                what: "disc header",
                offset: 0,
                end: HEADER_SIZE as u64,
                len: data.len(),
            }),
        }
    }

    pub fn game_code(&self) -> String {
        escape(&self.data[0..4])
    }

    pub fn maker_code(&self) -> String {
        escape(&self.data[4..6])
    }

    pub fn disc_id(&self) -> u8 {
        self.data[6]
    }

    pub fn version(&self) -> u8 {
        self.data[7]
    }

    pub fn game_name(&self) -> String {
        let name = &self.data[GAME_NAME_OFFSET..GAME_NAME_OFFSET + GAME_NAME_SIZE];
        let len = name.iter().position(|&b| b == 0).unwrap_or(name.len());
        String::from_utf8_lossy(&name[..len]).into_owned()
    }

    pub fn dol_offset(&self) -> u32 {
        self.read_u32(DOL_OFFSET_OFFSET)
    }

    pub fn fs_table_offset(&self) -> u32 {
        self.read_u32(FS_TABLE_OFFSET_OFFSET)
    }

    /// The unpadded size of the file system table.
    pub fn fs_table_size(&self) -> u32 {
        self.read_u32(FS_TABLE_SIZE_OFFSET)
    }

    pub fn fs_table_max_size(&self) -> u32 {
        self.read_u32(FS_TABLE_MAX_SIZE_OFFSET)
    }

    pub fn set_dol_offset(&mut self, offset: u32) {
        self.write_u32(DOL_OFFSET_OFFSET, offset);
    }

    pub fn set_fs_table_offset(&mut self, offset: u32) {
        self.write_u32(FS_TABLE_OFFSET_OFFSET, offset);
    }

    /// Sets both the size and the maximum size of the file system table.
    pub fn set_fs_table_size(&mut self, size: u32) {
        self.write_u32(FS_TABLE_SIZE_OFFSET, size);
        self.write_u32(FS_TABLE_MAX_SIZE_OFFSET, size);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn read_u32(&self, offset: usize) -> u32 {
        BigEndian::read_u32(&self.data[offset..offset + 4])
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        BigEndian::write_u32(&mut self.data[offset..offset + 4], value);
    }
}

fn escape(data: &[u8]) -> String {
    data.iter()
        .copied()
        .map(|c| (c as char).escape_default())
        .flatten()
        .collect()
}
