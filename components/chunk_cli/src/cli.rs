//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect, pack and unpack precompiled chunks
#[derive(Parser, Debug)]
#[command(name = "chunkc")]
#[command(version, about = "Inspect, pack and unpack precompiled chunks")]
pub struct Cli {
    /// Log decoding details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,
}

/// `chunkc` subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Report whether a file is precompiled and list its contents
    Inspect {
        /// Chunk file to examine
        file: PathBuf,
    },

    /// Write a precompiled artifact from a JSON prototype tree
    Pack {
        /// JSON prototype tree
        input: PathBuf,

        /// Artifact to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decode a precompiled artifact to JSON
    Unpack {
        /// Artifact to decode
        file: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
