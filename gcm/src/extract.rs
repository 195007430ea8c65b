use std::fs;
use std::path::{Component, Path};

use anyhow::{bail, Context, Result};
use gamecube_disc::{FsTable, Reader};
use log::info;
use rayon::prelude::*;

use crate::locale::LocaleFormat;
use crate::map_disc;

/// Extracts the system regions of a disc to `output/sys` and its file system to `output/files`.
pub fn extract(disc_path: &Path, output: &Path, jobs: Option<usize>) -> Result<()> {
    let image = map_disc(disc_path)?;
    let disc = Reader::new(&image).context("failed to read disc header")?;
    info!(
        "extracting {} ({}{}) to {}",
        disc.header().game_name(),
        disc.header().game_code(),
        disc.header().maker_code(),
        output.display(),
    );

    let sys = output.join("sys");
    let files = output.join("files");
    for dir in &[&sys, &files] {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    write(&sys.join("header.bin"), disc.header().as_bytes())?;
    write(&sys.join("bi2.bin"), disc.bi2()?)?;
    write(&sys.join("apploader.bin"), disc.apploader()?)?;
    write(&sys.join("fst.bin"), disc.fs_table_bytes()?)?;
    write(&sys.join("main.dol"), disc.main_executable()?.as_bytes())?;

    let fst = disc
        .fs_table()
        .context("failed to decode file system table")?;
    extract_files(&disc, &fst, &files, jobs)?;

    info!(
        "extracted {} files from {}",
        LocaleFormat(&fst.files().len()),
        disc_path.display(),
    );
    Ok(())
}

fn extract_files(disc: &Reader, fst: &FsTable, output: &Path, jobs: Option<usize>) -> Result<()> {
    for path in fst.entries().keys().filter(|path| path.as_str() != gamecube_disc::ROOT_PATH) {
        check_relative(path)?;
    }

    // Every directory exists before any file is written, so the parallel writes below never race
    // a missing parent.
    for dir in fst.directories() {
        let path = output.join(dir);
        info!("creating directory {}", path.display());
        fs::create_dir_all(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.unwrap_or(0))
        .build()
        .context("failed to start extraction threads")?;
    pool.install(|| {
        fst.files().par_iter().try_for_each(|file| {
            let data = disc
                .file_data(file)
                .with_context(|| format!("failed to read {}", file.path))?;
            write(&output.join(&file.path), data)
        })
    })
}

/// Rejects table paths that would land outside the output directory.
fn check_relative(path: &str) -> Result<()> {
    let normal = Path::new(path)
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if path.is_empty() || !normal {
        bail!("refusing to extract {:?} outside the output directory", path);
    }
    Ok(())
}

fn write(path: &Path, data: &[u8]) -> Result<()> {
    info!("writing {}", path.display());
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}
