use std::convert::TryFrom;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use gamecube_disc::{
    align_up, EncodedFsTable, Header, Tree, APPLOADER_OFFSET, BI2_OFFSET, BI2_SIZE, SIZE,
};
use log::{debug, info, warn};
use thiserror::Error;

use crate::locale::LocaleFormat;

const SYS_FILES: [&str; 5] = [
    "apploader.bin",
    "bi2.bin",
    "fst.bin",
    "header.bin",
    "main.dol",
];

const DOL_ALIGNMENT: u32 = 4;
const FS_TABLE_OFFSET_ALIGNMENT: u32 = 4;

#[derive(Debug, Error)]
#[error("{} is not an extracted disc; missing {}", root.display(), missing.join(", "))]
pub struct InvalidLayout {
    root: PathBuf,
    missing: Vec<String>,
}

/// Checks that `root` has the `sys/` and `files/` layout written by `extract`, logging every
/// missing item.
pub fn validate(root: &Path) -> Result<(), InvalidLayout> {
    let mut missing = Vec::new();
    let mut require = |path: PathBuf, is_dir: bool| {
        let present = if is_dir { path.is_dir() } else { path.is_file() };
        if !present {
            warn!(
                "missing {} {}",
                if is_dir { "directory" } else { "file" },
                path.display(),
            );
            missing.push(path.display().to_string());
        }
    };

    require(root.to_owned(), true);
    require(root.join("files"), true);
    require(root.join("sys"), true);
    for name in &SYS_FILES {
        require(root.join("sys").join(name), false);
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(InvalidLayout {
            root: root.to_owned(),
            missing,
        })
    }
}

/// Disc offsets of the regions that follow the apploader.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    pub dol_offset: u32,
    pub fs_table_offset: u32,
}

impl Layout {
    pub fn plan(apploader_len: usize, dol_len: usize) -> Result<Layout, gamecube_disc::Error> {
        let overflow = || gamecube_disc::Error::SizeOverflow {
            what: "disc layout",
        };
        let apploader_len = u32::try_from(apploader_len).map_err(|_| overflow())?;
        let dol_len = u32::try_from(dol_len).map_err(|_| overflow())?;

        let dol_offset = (APPLOADER_OFFSET as u32)
            .checked_add(apploader_len)
            .and_then(|end| align_up(end, DOL_ALIGNMENT))
            .ok_or_else(overflow)?;
        let fs_table_offset = dol_offset
            .checked_add(dol_len)
            .and_then(|end| align_up(end, FS_TABLE_OFFSET_ALIGNMENT))
            .ok_or_else(overflow)?;
        Ok(Layout {
            dol_offset,
            fs_table_offset,
        })
    }
}

/// Builds a disc image at `output` from a directory previously written by `extract`.
pub fn build(root: &Path, output: &Path) -> Result<()> {
    validate(root)?;
    let sys = root.join("sys");

    let mut header = Header::new(&read(&sys.join("header.bin"))?).context("invalid header.bin")?;
    let bi2 = read(&sys.join("bi2.bin"))?;
    if bi2.len() != BI2_SIZE {
        bail!("bi2.bin is 0x{:x} bytes, expected 0x{:x}", bi2.len(), BI2_SIZE);
    }
    let apploader = read(&sys.join("apploader.bin"))?;
    let dol = read(&sys.join("main.dol"))?;

    let layout = Layout::plan(apploader.len(), dol.len())?;
    debug!("layout: {:x?}", layout);

    let tree = Tree::scan(root.join("files"))?;
    let fst = EncodedFsTable::encode(&tree, layout.fs_table_offset)?;

    header.set_fs_table_size(fst.raw_size());
    header.set_fs_table_offset(layout.fs_table_offset);
    header.set_dol_offset(layout.dol_offset);

    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let mut disc = DiscWriter::new(BufWriter::new(file));
    let write_error = || format!("failed to write {}", output.display());

    disc.write_at(0, header.as_bytes()).with_context(write_error)?;
    disc.write_at(BI2_OFFSET as u64, &bi2).with_context(write_error)?;
    disc.write_at(APPLOADER_OFFSET as u64, &apploader).with_context(write_error)?;
    disc.write_at(u64::from(layout.dol_offset), &dol).with_context(write_error)?;
    disc.write_at(u64::from(layout.fs_table_offset), fst.raw()).with_context(write_error)?;

    for placement in fst.files() {
        if placement.file.size == 0 {
            continue;
        }
        info!("writing {}", placement.source.display());
        let source = File::open(&placement.source)
            .with_context(|| format!("failed to open {}", placement.source.display()))?;
        let size = u64::from(placement.file.size);
        let copied = disc
            .copy_at(u64::from(placement.file.offset), source, size)
            .with_context(write_error)?;
        if copied != size {
            bail!(
                "{} shrank from {} to {} bytes during the build",
                placement.source.display(),
                size,
                copied,
            );
        }
    }

    let len = disc.finish().with_context(write_error)?;
    if len > SIZE as u64 {
        warn!(
            "{} is {} bytes, larger than a {}-byte disc",
            output.display(),
            LocaleFormat(&len),
            LocaleFormat(&SIZE),
        );
    }
    info!(
        "wrote {} files, {} bytes to {}",
        LocaleFormat(&fst.files().len()),
        LocaleFormat(&len),
        output.display(),
    );
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Sequential writer that zero-fills the gaps between regions placed at absolute offsets.
struct DiscWriter<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> DiscWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    fn seek_forward(&mut self, offset: u64) -> io::Result<()> {
        if offset < self.position {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "region at 0x{:x} overlaps data ending at 0x{:x}",
                    offset, self.position
                ),
            ));
        }
        io::copy(&mut io::repeat(0).take(offset - self.position), &mut self.inner)?;
        self.position = offset;
        Ok(())
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.seek_forward(offset)?;
        self.inner.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    /// Copies at most `len` bytes from `reader`, returning how many were copied.
    fn copy_at<R: Read>(&mut self, offset: u64, reader: R, len: u64) -> io::Result<u64> {
        self.seek_forward(offset)?;
        let copied = io::copy(&mut reader.take(len), &mut self.inner)?;
        self.position += copied;
        Ok(copied)
    }

    /// Flushes and returns the total length written.
    fn finish(mut self) -> io::Result<u64> {
        self.inner.flush()?;
        Ok(self.position)
    }
}
