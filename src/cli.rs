use crate::DecodeOptions;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    pub dbf_path: PathBuf,

    /// Reject blank numeric fields instead of reading them as zero
    #[arg(long)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the file header
    Info,
    /// Print the field descriptors
    Fields,
    /// Print the records, one per line
    Records {
        #[arg(long)]
        include_deleted: bool,
    },
    /// Decode and re-encode into another file
    Rewrite {
        output: PathBuf,
        /// Last-update date to store (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

impl Cli {
    pub fn decode_options(&self) -> DecodeOptions {
        if self.strict {
            DecodeOptions::strict()
        } else {
            DecodeOptions::lenient()
        }
    }
}
