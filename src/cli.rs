use crate::config::Overrides;
use crate::transform::Engine;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-shrink",
    about = "A tool for shrinking image files",
    long_about = "img-shrink shrinks image files in place and reports the original size, \
                  new size, and shrink percentage of every file plus a summary. \
                  Files are processed concurrently with a configurable limit.",
    version,
    after_help = "EXAMPLES:\n  \
    img-shrink shrink photo.jpg\n  \
    img-shrink shrink \"./images/*.jpg\" -l 70 -c 8\n  \
    img-shrink shrink ./album -r -e native -vv\n  \
    img-shrink --config shrink.yaml shrink \"*.png\""
)]
pub struct Args {
    #[arg(
        short = 'v',
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase verbosity (-v warnings, -vv info, -vvv debug)"
    )]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Config file (default is $HOME/.img-shrink.yaml)"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Shrink image files",
        long_about = "Shrink image files and display the original size, new size, and shrink percentage. \
                      Arguments may be file paths, glob patterns or directories."
    )]
    Shrink {
        #[arg(
            required = true,
            value_name = "FILES",
            help = "Image files, glob patterns or directories"
        )]
        files: Vec<String>,

        #[arg(
            short = 'l',
            long,
            help = "Compression level (1-100, lower means smaller file) [default: 80]"
        )]
        level: Option<u8>,

        #[arg(
            short = 'c',
            long,
            help = "Number of images to process concurrently [default: 4]"
        )]
        concurrency: Option<usize>,

        #[arg(
            short = 'e',
            long,
            value_enum,
            help = "Transform engine [default: magick]"
        )]
        engine: Option<Engine>,

        #[arg(
            short = 'r',
            long,
            help = "Process subdirectories recursively",
            long_help = "When an argument is a directory, also shrink images in its subdirectories."
        )]
        recursive: bool,

        #[arg(long, help = "Hide the progress bar")]
        no_progress: bool,
    },

    #[command(about = "Print the version number")]
    Version,
}

/// Flags left unset fall through to the config file and environment.
pub fn shrink_overrides(
    level: Option<u8>,
    concurrency: Option<usize>,
    engine: Option<Engine>,
    recursive: bool,
    no_progress: bool,
) -> Overrides {
    Overrides {
        level,
        concurrency,
        engine,
        recursive: recursive.then_some(true),
        progress: no_progress.then_some(false),
    }
}
