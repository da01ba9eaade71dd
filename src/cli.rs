use clap::{Parser, Subcommand};

use crate::io::DEFAULT_BUNDLE_NAME;

#[derive(Parser, Debug)]
#[command(name = "assetzip")]
#[command(version)]
#[command(about = "Pack game assets into a ZIP bundle and load them back lazily", long_about = None)]
#[command(after_help = "Examples:\n  \
  assetzip pack assets/die1.png assets/soundBonus.mp3 -o dist\n  \
  assetzip list -v dist/bundle.zip\n  \
  assetzip load https://cdn.example.com/bundle.zip die1.png soundBonus.mp3")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch files or URLs and pack them into one bundle
    Pack {
        /// Asset paths or HTTP URLs; each is stored under its base name
        #[arg(value_name = "SOURCES", required = true)]
        sources: Vec<String>,

        /// Directory to write the bundle into
        #[arg(short = 'o', value_name = "DIR", default_value = ".")]
        out_dir: String,

        /// Bundle file name
        #[arg(short = 'n', value_name = "NAME", default_value = DEFAULT_BUNDLE_NAME)]
        name: String,

        /// Compression level, 0 (store) to 9 (best)
        #[arg(short = 'L', value_name = "LEVEL", default_value_t = 6,
              value_parser = clap::value_parser!(u32).range(0..=9))]
        level: u32,
    },

    /// List the entries of a bundle
    List {
        /// Bundle path or HTTP URL
        #[arg(value_name = "ARCHIVE")]
        archive: String,

        /// Show sizes, ratio and compression method
        #[arg(short = 'v')]
        verbose: bool,
    },

    /// Extract entries from a bundle
    Extract {
        /// Bundle path or HTTP URL
        #[arg(value_name = "ARCHIVE")]
        archive: String,

        /// Entries to extract (default: all)
        #[arg(value_name = "NAMES")]
        names: Vec<String>,

        /// Extract files into exdir
        #[arg(short = 'd', value_name = "DIR", default_value = ".")]
        extract_dir: String,
    },

    /// Decode entries through the resource cache and report what loaded
    Load {
        /// Bundle path or HTTP URL
        #[arg(value_name = "ARCHIVE")]
        archive: String,

        /// Entries to load (default: all)
        #[arg(value_name = "NAMES")]
        names: Vec<String>,
    },
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Maximum log level implied by the quiet flags.
    pub fn log_level(&self) -> tracing::Level {
        match self.quiet {
            0 => tracing::Level::INFO,
            1 => tracing::Level::WARN,
            _ => tracing::Level::ERROR,
        }
    }
}
