use byteorder::{BigEndian, ByteOrder};

use crate::align::align_up;
use crate::error::Error;
use crate::fs_table_reader::{FileData, FsTable};
use crate::header::{Header, HEADER_SIZE};

pub const BI2_OFFSET: usize = HEADER_SIZE;
pub const BI2_SIZE: usize = 0x2000;
pub const APPLOADER_OFFSET: usize = BI2_OFFSET + BI2_SIZE;

const APPLOADER_SIZE_OFFSET: usize = APPLOADER_OFFSET + 0x14;
const APPLOADER_TRAILER_SIZE_OFFSET: usize = APPLOADER_OFFSET + 0x18;
const APPLOADER_ALIGNMENT: u32 = 0x100;

/// Bounds-checked access to the regions of a disc image.
#[derive(Clone, Debug)]
pub struct Reader<'data> {
    data: &'data [u8],
    header: Header,
}

impl<'data> Reader<'data> {
    pub fn new(data: &'data [u8]) -> Result<Reader<'data>, Error> {
        Ok(Reader {
            data,
            header: Header::new(data)?,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn bi2(&self) -> Result<&'data [u8], Error> {
        self.region("bi2", BI2_OFFSET as u64, BI2_SIZE as u64)
    }

    /// The apploader body and trailer, padded to a 0x100-byte boundary.
    pub fn apploader(&self) -> Result<&'data [u8], Error> {
        let size = self
            .read_u32("apploader size", APPLOADER_SIZE_OFFSET)?
            .checked_add(self.read_u32("apploader trailer size", APPLOADER_TRAILER_SIZE_OFFSET)?)
            .and_then(|size| align_up(size, APPLOADER_ALIGNMENT))
            .ok_or(Error::SizeOverflow { what: "apploader" })?;
        self.region("apploader", APPLOADER_OFFSET as u64, u64::from(size))
    }

    pub fn main_executable(&self) -> Result<dol::Reader<'data>, Error> {
        let offset = self.header.dol_offset() as usize;
        let data = self.data.get(offset..).ok_or(Error::OutOfBounds {
            what: "main executable",
            offset: offset as u64,
            end: offset as u64,
            len: self.data.len(),
        })?;
        Ok(dol::Reader::new(data)?)
    }

    /// The raw file system table as declared by the header, without trailing padding.
    pub fn fs_table_bytes(&self) -> Result<&'data [u8], Error> {
        self.region(
            "file system table",
            u64::from(self.header.fs_table_offset()),
            u64::from(self.header.fs_table_size()),
        )
    }

    pub fn fs_table(&self) -> Result<FsTable, Error> {
        FsTable::decode(self.fs_table_bytes()?)
    }

    pub fn file_data(&self, file: &FileData) -> Result<&'data [u8], Error> {
        // Empty files may be placed at the very end of the image.
        if file.size == 0 {
            return Ok(&[]);
        }
        self.region("file data", u64::from(file.offset), u64::from(file.size))
    }

    /// Looks up a file by its root-relative path, such as `audio/bgm.hps`.
    pub fn find_file(&self, path: &str) -> Result<Option<&'data [u8]>, Error> {
        match self.fs_table()?.file(path) {
            Some(file) => self.file_data(file).map(Some),
            None => Ok(None),
        }
    }

    fn region(&self, what: &'static str, offset: u64, len: u64) -> Result<&'data [u8], Error> {
        let end = offset + len;
        if end > self.data.len() as u64 {
            return Err(Error::OutOfBounds {
                what,
                offset,
                end,
                len: self.data.len(),
            });
        }
        Ok(&self.data[offset as usize..end as usize])
    }

    fn read_u32(&self, what: &'static str, offset: usize) -> Result<u32, Error> {
        Ok(BigEndian::read_u32(self.region(what, offset as u64, 4)?))
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, ByteOrder};

    use super::{Reader, APPLOADER_OFFSET, BI2_OFFSET};
    use crate::entry::Entry;
    use crate::error::Error;

    const DOL_OFFSET: usize = 0x2600;
    const FST_OFFSET: usize = 0x2800;

    /// A tiny image: a 0x30-byte apploader, a header-only DOL and a one-file table.
    fn image() -> Vec<u8> {
        let mut data = vec![0; 0x3000];
        data[..4].copy_from_slice(b"GTST");
        data[BI2_OFFSET] = 0xb1;
        BigEndian::write_u32(&mut data[APPLOADER_OFFSET + 0x14..], 0x20);
        BigEndian::write_u32(&mut data[APPLOADER_OFFSET + 0x18..], 0x10);
        BigEndian::write_u32(&mut data[0x420..], DOL_OFFSET as u32);
        BigEndian::write_u32(&mut data[0x424..], FST_OFFSET as u32);
        BigEndian::write_u32(&mut data[0x428..], 2 * 0xc + 7);

        let mut fst = Vec::new();
        Entry::root(2).write_to(&mut fst).unwrap();
        Entry::file(0, 0x2900, 5).write_to(&mut fst).unwrap();
        fst.extend_from_slice(b"x.bin\0\0");
        data[FST_OFFSET..FST_OFFSET + fst.len()].copy_from_slice(&fst);
        data[0x2900..0x2905].copy_from_slice(b"hello");
        data
    }

    #[test]
    fn regions() {
        let data = image();
        let disc = Reader::new(&data).unwrap();
        assert_eq!(disc.header().game_code(), "GTST");
        assert_eq!(disc.bi2().unwrap()[0], 0xb1);
        assert_eq!(disc.apploader().unwrap().len(), 0x100);
        assert_eq!(disc.main_executable().unwrap().size(), 0x100);
        assert_eq!(disc.fs_table_bytes().unwrap().len(), 0x1f);
    }

    #[test]
    fn find_file() {
        let data = image();
        let disc = Reader::new(&data).unwrap();
        assert_eq!(disc.find_file("x.bin").unwrap(), Some(&b"hello"[..]));
        assert_eq!(disc.find_file("y.bin").unwrap(), None);
    }

    #[test]
    fn table_outside_image() {
        let mut data = image();
        BigEndian::write_u32(&mut data[0x424..], 0x2ff0);
        let disc = Reader::new(&data).unwrap();
        assert!(matches!(
            disc.fs_table(),
            Err(Error::OutOfBounds {
                what: "file system table",
                ..
            })
        ));
    }

    #[test]
    fn image_without_header() {
        assert!(Reader::new(&[0; 0x20]).is_err());
    }
}
