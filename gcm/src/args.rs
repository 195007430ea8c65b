use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Extracts, lists and rebuilds GameCube disc images
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Arg {
    #[command(subcommand)]
    /// Command
    pub command: Command,
}

#[derive(Subcommand, Debug)]
/// Commands
pub enum Command {
    /// Extract a disc into `sys/` and `files/` directories
    #[command(alias = "e")]
    Extract {
        /// Disc image to read
        disc: PathBuf,
        /// Directory to extract into
        output: PathBuf,
        /// Number of threads writing files, one per CPU by default
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Build a disc from a previously extracted directory
    #[command(alias = "b")]
    Build {
        /// Directory containing `sys/` and `files/`
        root: PathBuf,
        /// Disc image to write
        output: PathBuf,
    },
    /// Print the path of every file on a disc
    #[command(alias = "f")]
    Files {
        /// Disc image to read
        disc: PathBuf,
    },
    /// Print the header, main executable and file system table layout of a disc
    Info {
        /// Disc image to read
        disc: PathBuf,
    },
}

pub fn parse_args() -> Arg {
    Arg::parse()
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Arg, Command};

    #[test]
    fn aliases() {
        let arg = Arg::try_parse_from(["gcm", "e", "disc.iso", "out", "-j", "3"]).unwrap();
        match arg.command {
            Command::Extract { jobs, .. } => assert_eq!(jobs, Some(3)),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(matches!(
            Arg::try_parse_from(["gcm", "b", "root", "out.iso"]).unwrap().command,
            Command::Build { .. }
        ));
        assert!(matches!(
            Arg::try_parse_from(["gcm", "f", "disc.iso"]).unwrap().command,
            Command::Files { .. }
        ));
    }

    #[test]
    fn build_needs_output() {
        assert!(Arg::try_parse_from(["gcm", "build", "root"]).is_err());
    }
}
