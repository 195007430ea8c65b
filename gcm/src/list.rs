use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use gamecube_disc::Reader;

use crate::locale::LocaleFormat;
use crate::map_disc;

/// Prints every file's path in table order. Directories are implied by the paths.
pub fn files(disc_path: &Path) -> Result<()> {
    let image = map_disc(disc_path)?;
    let disc = Reader::new(&image).context("failed to read disc header")?;
    let fst = disc
        .fs_table()
        .context("failed to decode file system table")?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    for file in fst.files() {
        writeln!(stdout, "{}", file.path)?;
    }
    Ok(())
}

pub fn info(disc_path: &Path) -> Result<()> {
    let image = map_disc(disc_path)?;
    let disc = Reader::new(&image).context("failed to read disc header")?;
    let header = disc.header();

    println!("game:     {}", header.game_name());
    println!(
        "code:     {}{} (disc {}, version {})",
        header.game_code(),
        header.maker_code(),
        header.disc_id(),
        header.version(),
    );
    println!(
        "fst:      offset = 0x{:08x}, size = 0x{:08x}, max size = 0x{:08x}",
        header.fs_table_offset(),
        header.fs_table_size(),
        header.fs_table_max_size(),
    );

    let dol = disc.main_executable()?;
    println!(
        "dol:      offset = 0x{:08x}, size = 0x{:08x}, entry point = 0x{:08x}",
        header.dol_offset(),
        dol.size(),
        dol.entry_point(),
    );
    for section in dol.iter_sections().filter(|section| !section.is_empty()) {
        println!(
            "section:  {} {:2}: offset = 0x{:08x}, load_addr = 0x{:08x}, size = 0x{:08x}",
            if section.is_text() { "text" } else { "data" },
            section.index,
            section.offset,
            section.load_address,
            section.size,
        );
    }

    let fst = disc
        .fs_table()
        .context("failed to decode file system table")?;
    let total: u64 = fst.files().iter().map(|file| u64::from(file.size)).sum();
    println!(
        "files:    {} in {} directories, {} bytes",
        LocaleFormat(&fst.files().len()),
        LocaleFormat(&fst.directories().count()),
        LocaleFormat(&total),
    );
    Ok(())
}
