use std::fs::File;
use std::path::Path;
use std::process;

use anyhow::Context;
use log::error;
use memmap::{Mmap, MmapOptions};

use crate::args::Command;

mod args;
mod build;
mod extract;
mod list;
mod locale;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let arg = args::parse_args();
    let result = match arg.command {
        Command::Extract { disc, output, jobs } => extract::extract(&disc, &output, jobs),
        Command::Build { root, output } => build::build(&root, &output),
        Command::Files { disc } => list::files(&disc),
        Command::Info { disc } => list::info(&disc),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
}

/// Maps a disc image into memory for reading.
pub fn map_disc(path: &Path) -> anyhow::Result<Mmap> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    // The image is only ever read, and is assumed not to change while mapped.
    unsafe { MmapOptions::new().map(&file) }
        .with_context(|| format!("failed to map {}", path.display()))
}
